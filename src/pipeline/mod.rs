pub mod answer;
pub mod generation;
pub mod orchestrator;
pub mod prompt;
pub mod response;
pub mod safety;

pub use orchestrator::{MedicalAnswerPipeline, PipelineError};
