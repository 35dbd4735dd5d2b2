// Maps narrative state onto the background material: theme colours and
// turbulence crossfade when the poem changes, intro step and time are
// written through every frame. No web-sys types here so host tests can
// include it.

use glam::Vec3;
use recueil_core::{
    AtmosphericTheme, ContentItem, Easing, Field, FrameTicker, MaterialHandle, ParticleKind,
    ProgressionStore, Registration, StateChange, Tick, Tween, VisualParams,
};
use std::cell::RefCell;
use std::rc::Rc;

pub const DEFAULT_PRIMARY: &str = "#0b1020";
pub const DEFAULT_SECONDARY: &str = "#1d2540";
pub const DEFAULT_TURBULENCE: f32 = 0.2;

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Parse `#rgb` or `#rrggbb` into linear RGB.
pub fn parse_color(hex: &str) -> Option<Vec3> {
    let digits = hex.trim().strip_prefix('#')?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let (r, g, b) = match digits.len() {
        3 => {
            let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
            (short(0)?, short(1)?, short(2)?)
        }
        6 => (
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ),
        _ => return None,
    };
    Some(Vec3::new(
        srgb_to_linear(r as f32 / 255.0),
        srgb_to_linear(g as f32 / 255.0),
        srgb_to_linear(b as f32 / 255.0),
    ))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeTarget {
    pub primary: Vec3,
    pub secondary: Vec3,
    pub turbulence: f32,
}

impl Default for ThemeTarget {
    fn default() -> Self {
        Self {
            primary: parse_color(DEFAULT_PRIMARY).unwrap_or(Vec3::ZERO),
            secondary: parse_color(DEFAULT_SECONDARY).unwrap_or(Vec3::ZERO),
            turbulence: DEFAULT_TURBULENCE,
        }
    }
}

impl ThemeTarget {
    /// Unparseable colours keep the corresponding colour of `previous`.
    pub fn from_theme(theme: &AtmosphericTheme, previous: &ThemeTarget) -> Self {
        let fallback = previous;
        let primary = parse_color(&theme.primary_color).unwrap_or_else(|| {
            log::warn!("[visual] bad primary colour {:?}", theme.primary_color);
            fallback.primary
        });
        let secondary = parse_color(&theme.secondary_color).unwrap_or_else(|| {
            log::warn!("[visual] bad secondary colour {:?}", theme.secondary_color);
            fallback.secondary
        });
        Self {
            primary,
            secondary,
            turbulence: theme.turbulence.max(0.0),
        }
    }

    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            primary: self.primary.lerp(to.primary, t),
            secondary: self.secondary.lerp(to.secondary, t),
            turbulence: self.turbulence + (to.turbulence - self.turbulence) * t,
        }
    }
}

struct Crossfade {
    from: ThemeTarget,
    to: ThemeTarget,
    tween: Tween,
}

struct VisualInner {
    material: MaterialHandle,
    params: VisualParams,
    current: ThemeTarget,
    fade: Option<Crossfade>,
}

impl VisualInner {
    fn write_theme(&self, particle: Option<ParticleKind>) {
        let theme = self.current;
        self.material.borrow_mut().update(|u| {
            u.primary = theme.primary.extend(1.0).to_array();
            u.secondary = theme.secondary.extend(1.0).to_array();
            u.turbulence = theme.turbulence;
            if let Some(kind) = particle {
                u.particle_kind = kind.shader_index();
            }
        });
    }

    fn show_item(&mut self, item: Option<&ContentItem>) {
        let to = item
            .map(|i| ThemeTarget::from_theme(&i.theme, &self.current))
            .unwrap_or_default();
        let particle = item.map(|i| i.theme.particle_type).unwrap_or_default();
        log::debug!("[visual] theme -> {:?}", item.map(|i| i.slug.as_str()));
        self.fade = Some(Crossfade {
            from: self.current,
            to,
            tween: Tween::new(0.0, 1.0, self.params.theme_fade_ms, Easing::default()),
        });
        if self.params.theme_fade_ms <= 0.0 {
            self.current = to;
            self.fade = None;
        }
        self.write_theme(Some(particle));
    }

    fn advance(&mut self, tick: &Tick) {
        if let Some(fade) = self.fade.as_mut() {
            let t = fade.tween.advance(tick.delta_ms) as f32;
            self.current = fade.from.lerp(&fade.to, t);
            if fade.tween.is_finished() {
                self.current = fade.to;
                self.fade = None;
            }
            self.write_theme(None);
        }
        let time = (tick.time_ms / 1000.0) as f32;
        self.material.borrow_mut().update(|u| u.time = time);
    }
}

/// Keeps the background material in step with the store and the clock.
pub struct VisualMapper {
    inner: Rc<RefCell<VisualInner>>,
    store_registration: Registration,
    ticker_registration: Registration,
}

impl VisualMapper {
    /// The current poem (if any) is applied without a fade.
    pub fn mount(
        store: &ProgressionStore,
        ticker: &FrameTicker,
        material: MaterialHandle,
        params: VisualParams,
        seed: f32,
    ) -> Self {
        let item = store.current_content_item();
        let current = item
            .as_ref()
            .map(|i| ThemeTarget::from_theme(&i.theme, &ThemeTarget::default()))
            .unwrap_or_default();
        let particle = item.map(|i| i.theme.particle_type).unwrap_or_default();
        let step = store.intro_step() as f32;
        material.borrow_mut().update(|u| {
            u.seed = seed;
            u.intro_step = step;
        });
        let inner = Rc::new(RefCell::new(VisualInner {
            material,
            params,
            current,
            fade: None,
        }));
        inner.borrow().write_theme(Some(particle));

        let weak = Rc::downgrade(&inner);
        let store_registration = store.subscribe(
            &[Field::CurrentContentItem, Field::IntroStep],
            move |change| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                match change {
                    StateChange::CurrentContentItem(item) => {
                        inner.borrow_mut().show_item(item.as_deref());
                    }
                    StateChange::IntroStep { current, .. } => {
                        let step = *current as f32;
                        inner.borrow().material.borrow_mut().update(|u| u.intro_step = step);
                    }
                    _ => {}
                }
            },
        );

        let weak = Rc::downgrade(&inner);
        let ticker_registration = ticker.register(move |tick| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().advance(tick);
            }
        });

        Self {
            inner,
            store_registration,
            ticker_registration,
        }
    }

    pub fn material(&self) -> MaterialHandle {
        self.inner.borrow().material.clone()
    }

    pub fn current_theme(&self) -> ThemeTarget {
        self.inner.borrow().current
    }

    pub fn is_fading(&self) -> bool {
        self.inner.borrow().fade.is_some()
    }

    pub fn set_scroll_progress(&self, progress: f64) {
        let progress = progress.clamp(0.0, 1.0) as f32;
        self.inner
            .borrow()
            .material
            .borrow_mut()
            .update(|u| u.scroll_progress = progress);
    }

    pub fn set_resolution(&self, width: u32, height: u32) {
        let resolution = [width.max(1) as f32, height.max(1) as f32];
        self.inner
            .borrow()
            .material
            .borrow_mut()
            .update(|u| u.resolution = resolution);
    }

    pub fn release(&mut self) {
        self.store_registration.release();
        self.ticker_registration.release();
        self.inner.borrow_mut().fade = None;
    }
}

impl Drop for VisualMapper {
    fn drop(&mut self) {
        self.release();
    }
}
