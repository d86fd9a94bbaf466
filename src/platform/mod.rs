//! Platform abstraction layer
//!
//! Browser-facing adapters kept free of `web_sys` so they can be tested
//! natively:
//! - Input events (keyboard, touch swipe, device tilt)
//! - Presence server status

pub mod input;
pub mod presence;

pub use input::{Controls, InputState};
pub use presence::{Presence, PresenceStatus};
