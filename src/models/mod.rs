// src/models/mod.rs
pub mod job;
pub mod scene;
pub mod storyboard;
pub mod video;

pub use job::{AccessToken, JobHandle, JobKind, JobOutput, JobStatus};
pub use scene::{Scenario, Scene};
pub use video::OrchestrationResult;
