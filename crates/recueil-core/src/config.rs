//! Presentation configuration.
//!
//! Every tunable has a named default in `constants`; a host page may
//! override any subset of them with a JSON document.

use crate::audio::AmbientAudioParams;
use crate::constants::VISUAL_THEME_FADE_MS;
use crate::content::sanity::SanityProject;
use crate::error::ConfigError;
use crate::scroll::ScrollOptions;
use crate::ticker::TickerOptions;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualParams {
    pub theme_fade_ms: f64,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            theme_fade_ms: VISUAL_THEME_FADE_MS,
        }
    }
}

/// Where the catalog comes from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ContentSource {
    #[default]
    InMemory,
    Sanity(SanityProject),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub scroll: ScrollOptions,
    pub audio: AmbientAudioParams,
    pub ticker: TickerOptions,
    pub visual: VisualParams,
    pub content: ContentSource,
}

impl PresentationConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
