//! Shared data model for gamedeck.
//!
//! Every scanner normalizes its vendor metadata into a [`Game`]; the
//! aggregator only ever sees these types, and the dispatcher only ever
//! interprets a [`LaunchCommand`].

pub mod command;
pub mod dirs;
pub mod game;
pub mod icon;
pub mod platform;
pub mod sort;

// Re-export primary types.
pub use command::{CommandError, LaunchCommand};
pub use game::{EmptyField, Game, GameDetails};
pub use platform::Platform;
pub use sort::{SortOrder, sort_games};
