pub mod gesture;
pub mod keyboard;

pub use gesture::{wire_scroll_input, ScrollWiring};
pub use keyboard::{handle_intro_key, wire_intro_keys};
