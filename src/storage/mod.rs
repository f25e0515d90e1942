pub mod fallback;
pub mod orchestrator;
pub mod remote;
