pub mod client;
pub mod selection;

pub use client::{AnalysisTransport, HttpTransport, PhotoSubmissionClient, SubmissionError};
pub use selection::{
    select_files, PhotoFile, PhotoSelection, MAX_PHOTOS_PER_SUBMISSION, TRUNCATION_NOTICE,
};
