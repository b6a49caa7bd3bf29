#![forbid(unsafe_code)]

//! The necromancer's minion roller.
//!
//! - [`app`]: the minion form, persisted counts and roll history
//! - [`console`]: a line-driven front end over virtual form elements
//! - [`render`]: plain-text roll results

pub mod app;
pub mod console;
pub mod render;

pub use app::{AppError, NecRomancer, NecRomancerState, STORAGE_KEY};
pub use console::{Console, Outcome};
