pub mod types;
pub mod source;
pub mod preprocess;
pub mod vision;
pub mod grouping;
pub mod line_filter;
pub mod orchestrator;

pub use types::*;
pub use source::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("text detection request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("text detection service error: {0}")]
    Recognition(String),
}
