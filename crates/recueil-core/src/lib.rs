pub mod audio;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod material;
pub mod registration;
pub mod scroll;
pub mod store;
pub mod ticker;
pub mod tween;

pub use audio::*;
pub use config::*;
pub use constants::*;
pub use content::{
    load_catalog, AtmosphericTheme, ContentItem, ContentLookup, InMemoryCatalog, ParticleKind,
};
pub use error::*;
pub use material::*;
pub use registration::{Liveness, Registration};
pub use scroll::*;
pub use store::*;
pub use ticker::*;
pub use tween::*;
