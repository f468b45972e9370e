// Workflow orchestration module - scenario in, rendered video out
pub mod credentials;
pub mod events;
pub mod orchestrator;
pub mod poller;
pub mod render;
pub mod scenes;
pub mod storyboard;

#[cfg(test)]
pub(crate) mod testing;

pub use events::{EventSink, Stage, StageEvent, StageStatus};
pub use orchestrator::Orchestrator;
pub use poller::PollPolicy;
