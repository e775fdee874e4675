//! Sentiment classification against an OpenAI-compatible completion service.

pub mod catalog;
pub mod classifier;
pub mod client;
pub mod domain;
pub mod parse;

pub use catalog::ModelCatalog;
pub use classifier::{ClassificationError, Classifier, SentimentClassifier};
pub use client::{CompletionClient, CompletionRequest, OpenAiCompatibleClient, UpstreamError};
pub use domain::{Classification, SentimentLabel, SentimentResult};
