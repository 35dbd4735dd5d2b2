// Page-level constants for the web frontend: element ids, key bindings and
// loading milestones. No web-sys types here so host tests can include it.

// Elements the host page provides
pub const CANVAS_ID: &str = "background-canvas";
pub const CONFIG_SCRIPT_ID: &str = "recueil-config";
pub const LOADING_OVERLAY_ID: &str = "loading-overlay";
pub const LOADING_BAR_ID: &str = "loading-bar";
pub const START_OVERLAY_ID: &str = "start-overlay";
pub const START_BUTTON_ID: &str = "intro-start";
pub const POEM_ROOT_ID: &str = "poem";

// Attributes and CSS hooks written on <body>/<html>
pub const ATTR_INTRO_STEP: &str = "data-intro-step";
pub const ATTR_READY: &str = "data-ready";
pub const ATTR_STARTED: &str = "data-started";
pub const CSS_VAR_SCROLL_PROGRESS: &str = "--scroll-progress";
pub const CSS_VAR_LOADING_PROGRESS: &str = "--loading-progress";

// Location hash prefix selecting a poem, e.g. `#/poem/unworried`
pub const POEM_HASH_PREFIX: &str = "#/poem/";

// Loading milestones reported to the store
pub const LOADING_AFTER_CATALOG: f64 = 0.5;
pub const LOADING_AFTER_RENDERER: f64 = 1.0;

/// Narrative affordances reachable from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntroCommand {
    Start,
    Advance,
}

/// Map a `KeyboardEvent.key` value to a narrative command.
///
/// No key moves backwards; steps only increase.
#[inline]
pub fn intro_command_for_key(key: &str) -> Option<IntroCommand> {
    match key {
        "Enter" => Some(IntroCommand::Start),
        "ArrowDown" | "PageDown" | " " => Some(IntroCommand::Advance),
        _ => None,
    }
}

/// The step after `current`, held at `last`.
#[inline]
pub fn next_intro_step(current: i32, last: i32) -> i32 {
    current.saturating_add(1).min(last).max(current)
}

/// Extract the slug from a location hash of the form `#/poem/<slug>`.
#[inline]
pub fn slug_from_hash(hash: &str) -> Option<&str> {
    hash.strip_prefix(POEM_HASH_PREFIX)
        .map(|s| s.trim_end_matches('/'))
        .filter(|s| !s.is_empty())
}
