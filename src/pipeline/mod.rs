pub mod extraction;
pub mod structuring;
pub mod normalize;
pub mod scoring;
pub mod processor; // Document processing orchestrator
