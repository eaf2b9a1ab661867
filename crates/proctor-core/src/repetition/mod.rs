//! Spaced repetition of missed and bookmarked items.

mod queue;
mod scheduler;

pub use queue::ReviewQueue;
pub use scheduler::ReviewScheduler;
