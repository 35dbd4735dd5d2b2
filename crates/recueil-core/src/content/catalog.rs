use super::{AtmosphericTheme, ContentItem, ContentLookup, ParticleKind};
use crate::error::LookupError;
use async_trait::async_trait;
use fnv::FnvHashMap;

/// Catalog held entirely in memory, indexed by slug.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    items: Vec<ContentItem>,
    by_slug: FnvHashMap<String, usize>,
}

impl InMemoryCatalog {
    /// Build from `items`, keeping the first item for any repeated slug.
    pub fn new(items: impl IntoIterator<Item = ContentItem>) -> Self {
        let mut kept = Vec::new();
        let mut by_slug = FnvHashMap::default();
        for item in items {
            if by_slug.contains_key(&item.slug) {
                log::warn!("[content] duplicate slug '{}' ignored", item.slug);
                continue;
            }
            by_slug.insert(item.slug.clone(), kept.len());
            kept.push(item);
        }
        Self {
            items: kept,
            by_slug,
        }
    }

    /// The six poems the presentation ships with.
    pub fn with_default_poems() -> Self {
        Self::new(default_poems())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&ContentItem> {
        self.by_slug.get(slug).map(|&i| &self.items[i])
    }
}

#[async_trait(?Send)]
impl ContentLookup for InMemoryCatalog {
    async fn fetch_all(&self) -> Result<Vec<ContentItem>, LookupError> {
        Ok(self.items.clone())
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<ContentItem>, LookupError> {
        Ok(self.get(slug).cloned())
    }
}

fn poem(
    id: &str,
    title: &str,
    slug: &str,
    symbol: &str,
    lines: &[&str],
    colors: (&str, &str),
    turbulence: f32,
    particle_type: ParticleKind,
) -> ContentItem {
    ContentItem {
        id: id.to_owned(),
        title: title.to_owned(),
        slug: slug.to_owned(),
        lines: lines.iter().map(|l| (*l).to_owned()).collect(),
        symbol: Some(symbol.to_owned()),
        theme: AtmosphericTheme {
            primary_color: colors.0.to_owned(),
            secondary_color: colors.1.to_owned(),
            turbulence,
            particle_type,
        },
        audio_ambience_url: None,
    }
}

pub fn default_poems() -> Vec<ContentItem> {
    vec![
        poem(
            "1",
            "art of letting go",
            "art-of-letting-go",
            "❃",
            &[
                "spinning pulse of green",
                "rises from the mossy floor,",
                "where light forgets to stay.",
            ],
            ("#e8f5e9", "#2e7d32"),
            0.3,
            ParticleKind::Dust,
        ),
        poem(
            "2",
            "lovely color",
            "lovely-color",
            "✧",
            &["Unfolding breath", "on black velvet,", "the night exhales."],
            ("#050505", "#ffffff"),
            0.1,
            ParticleKind::Dust,
        ),
        poem(
            "3",
            "I used to know you",
            "i-used-to-know-you",
            "✦",
            &["A cat’s tail plaits", "through moonlight,", "silver on the tongue."],
            ("#1a1a2e", "#e0e0e0"),
            0.8,
            ParticleKind::Leaf,
        ),
        poem(
            "4",
            "unworried",
            "unworried",
            "❊",
            &[
                "This is a quiet orbit of change",
                "and my way of transience.",
                "The morning is a pale glass.",
            ],
            ("#fdfaf6", "#1a1a1a"),
            0.2,
            ParticleKind::Dust,
        ),
        poem(
            "5",
            "her",
            "her",
            "✻",
            &[
                "Soft light on the wall,",
                "shadows dance in silence,",
                "memories remain.",
            ],
            ("#fff5f5", "#ff8a80"),
            0.4,
            ParticleKind::Dust,
        ),
        poem(
            "6",
            "nightlight",
            "nightlight",
            "✽",
            &["A single spark", "in the vast dark,", "guiding the way home."],
            ("#0a0a0a", "#ffd54f"),
            0.6,
            ParticleKind::Dust,
        ),
    ]
}
