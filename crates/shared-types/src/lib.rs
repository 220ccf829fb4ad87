pub mod types;

pub use types::{RecordValue, SubmissionRecord};
