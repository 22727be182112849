//! Input loading and results-file reading.
//!
//! - **input**: JSON method, candidate and ground-truth files from the extractor
//! - **output**: reading back results files written by [`crate::matching::ResultStore`]

pub mod input;
pub mod output;

pub use input::{load_candidates, load_ground_truth, load_methods, MatchInputs};
pub use output::{read_results, summarize_results};
