//! Core library: normalization, similarity scoring, clone classification and
//! the analysis pipeline that drives them.

pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod similarity;

pub use error::{AnalysisError, ErrorKind};
pub use models::{AnalysisRequest, AnalysisResult, SimilarityPair, TextItem, DEFAULT_THRESHOLD};
pub use pipeline::analyze;
