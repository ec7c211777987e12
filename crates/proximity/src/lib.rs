pub mod tracker;

pub use tracker::{ProximityChange, ProximityTracker, Transition};
