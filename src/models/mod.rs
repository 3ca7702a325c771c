pub mod grade;
pub mod question;
pub mod result;

pub use grade::{GradeReport, GradeVerdict, MatchStrategy, SubmissionRecord};
pub use question::{Difficulty, GenerationRequest, Question};
pub use result::{NewResult, SavedResult};
