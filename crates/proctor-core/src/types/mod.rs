//! Core types for proctor.

mod certification;
mod item;
mod message;
mod profile;
mod progress;
mod review;
mod simulation;

pub use certification::*;
pub use item::*;
pub use message::*;
pub use profile::*;
pub use progress::*;
pub use review::*;
pub use simulation::*;

pub(crate) use profile::{percent, round_to};

#[cfg(test)]
pub(crate) use item::sample_content;
