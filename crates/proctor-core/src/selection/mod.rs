//! Adaptive item selection.

mod selector;

pub use selector::{closest_in_window, weakest_domain, AdaptiveSelector, Selection};
