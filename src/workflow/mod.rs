pub mod generation_flow;
pub mod grading_flow;

pub use generation_flow::{fallback_questions, GenerationOutcome, TestGenerationService};
pub use grading_flow::grade;
