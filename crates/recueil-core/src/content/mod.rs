//! Content items and the read-only lookup the presentation consumes.

pub mod catalog;
pub mod sanity;

pub use catalog::InMemoryCatalog;

use crate::error::LookupError;
use crate::registration::Liveness;
use crate::store::ProgressionStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    Firefly,
    #[default]
    Dust,
    FrogIcon,
    Leaf,
}

impl ParticleKind {
    /// Index written into the background material uniforms.
    pub fn shader_index(self) -> u32 {
        match self {
            ParticleKind::Firefly => 0,
            ParticleKind::Dust => 1,
            ParticleKind::FrogIcon => 2,
            ParticleKind::Leaf => 3,
        }
    }
}

/// Visual style attached to a content item.
///
/// Colours stay opaque tokens here; only the visual mapper interprets them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtmosphericTheme {
    pub primary_color: String,
    pub secondary_color: String,
    pub turbulence: f32,
    pub particle_type: ParticleKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(rename = "content", default)]
    pub lines: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub theme: AtmosphericTheme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_ambience_url: Option<String>,
}

/// Read-only catalog access. Both calls are side-effect free.
///
/// A slug that matches nothing yields `Ok(None)`; channel failures surface
/// as `Err` and are left to the caller.
#[async_trait(?Send)]
pub trait ContentLookup {
    async fn fetch_all(&self) -> Result<Vec<ContentItem>, LookupError>;
    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, LookupError>;
}

/// Fetch the catalog into `store`, then record `progress`.
///
/// A failed fetch is logged and still counts as the milestone. Returns
/// `false` without touching the store when `alive` ended during the fetch.
pub async fn load_catalog(
    lookup: &dyn ContentLookup,
    store: &ProgressionStore,
    alive: &Liveness,
    progress: f64,
) -> bool {
    let result = lookup.fetch_all().await;
    if !alive.is_alive() {
        log::debug!("[content] catalog arrived after unmount; dropped");
        return false;
    }
    match result {
        Ok(items) => {
            log::info!("[content] catalog loaded ({} items)", items.len());
            store.set_catalog(items);
        }
        Err(e) => log::error!("[content] catalog load failed: {}", e),
    }
    store.set_loading_progress(progress);
    true
}
