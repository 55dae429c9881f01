//! Run orchestration: the daily digest pipeline and the content poster.

pub mod pipeline;
pub mod poster;

pub use pipeline::{DigestPipeline, RunReport};
pub use poster::{ContentPoster, PostOutcome};
