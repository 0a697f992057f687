//! Derived, never-persisted views over meal and weight events.

pub mod daily;
pub mod trend;
