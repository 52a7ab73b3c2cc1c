pub mod arxiv;
pub mod semantic_scholar;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Which provider a paper came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaperOrigin {
    #[serde(rename = "Semantic Scholar")]
    SemanticScholar,
    #[serde(rename = "arXiv")]
    Arxiv,
}

impl fmt::Display for PaperOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperOrigin::SemanticScholar => f.write_str("Semantic Scholar"),
            PaperOrigin::Arxiv => f.write_str("arXiv"),
        }
    }
}

/// A search hit as the provider returned it. Only presence is checked here;
/// acceptance rules live in the fetch pipeline.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub abstract_text: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API error: {0}")]
    Api(String),
}

#[async_trait]
pub trait PaperSource: Send + Sync {
    fn origin(&self) -> PaperOrigin;
    /// One page of results starting at `offset`.
    async fn search(&self, query: &str, offset: u32, max_results: u32) -> Result<Vec<RawRecord>, SourceError>;
}
