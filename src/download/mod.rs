pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod sink;
