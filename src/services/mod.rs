pub mod tracker;
pub mod views;

pub use tracker::{Snapshot, TrackerService};
