//! Pipeline orchestration: configuration, capability probing, the
//! extraction state machine, and batch coordination.

pub mod batch;
pub mod capabilities;
pub mod config;
pub mod pipeline;
