// Tuning constants shared by the core and the web frontend.
// Parameter structs take their defaults from here; override through config.

// Scroll physics
pub const SCROLL_LERP: f64 = 0.05; // fraction of the remaining distance covered per tick
pub const SCROLL_DURATION_MS: f64 = 1200.0; // eased scroll_to length
pub const SCROLL_WHEEL_MULTIPLIER: f64 = 1.0;
pub const SCROLL_TOUCH_MULTIPLIER: f64 = 2.0;
pub const SCROLL_SETTLE_EPSILON: f64 = 0.1; // px; below this the smoothed value snaps to target

// Ambient voice
pub const AMBIENT_SOURCE_URL: &str =
    "https://actions.google.com/sounds/v1/ambiences/humming_waves.ogg";
pub const AMBIENT_FADE_IN_MS: f64 = 3000.0;
pub const AMBIENT_FADE_IN_VOLUME: f32 = 0.05;
pub const AMBIENT_STEP_FADE_MS: f64 = 2000.0;
pub const AMBIENT_FALLBACK_VOLUME: f32 = 0.05;

// Volume per narrative step; rises with tension then settles
pub const AMBIENT_VOLUME_TABLE: [f32; 9] = [0.05, 0.1, 0.15, 0.2, 0.18, 0.15, 0.12, 0.08, 0.05];

// Playback rate = base + step * per_step (applied instantly)
pub const AMBIENT_RATE_BASE: f32 = 0.85;
pub const AMBIENT_RATE_PER_STEP: f32 = 0.03;

// Frame ticker lag smoothing (used only when enabled)
pub const TICKER_LAG_THRESHOLD_MS: f64 = 500.0;
pub const TICKER_ADJUSTED_LAG_MS: f64 = 33.0;

// Background material
pub const VISUAL_THEME_FADE_MS: f64 = 1500.0;

// Narrative
pub const INTRO_STEP_NOT_STARTED: i32 = 0;
pub const INTRO_STEP_FIRST: i32 = 1;
pub const INTRO_STEP_LAST: i32 = AMBIENT_VOLUME_TABLE.len() as i32 - 1;
