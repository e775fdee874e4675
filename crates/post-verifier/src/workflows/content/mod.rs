//! Remote post retrieval: reference parsing, the polling fetch adapter, and normalization.

pub mod apify;
pub mod domain;
pub mod fetch;
pub mod normalizer;
pub mod reference;

pub use apify::ApifyTaskClient;
pub use domain::{Bullish, NormalizedContent};
pub use fetch::{
    AdapterError, ContentError, ContentFetcher, ContentSource, ExtractionJobs, FetchedItem,
    JobRun,
};
pub use normalizer::{normalize, NormalizeError};
pub use reference::extract_post_reference;
