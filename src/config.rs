use std::sync::Arc;

use crate::apis::{self, PaperSource};
use crate::contribution::ContributionPredictor;
use crate::llm::{self, LlmBackend};
use crate::search::PaperFetcher;
use crate::timeline::DEFAULT_YEARS_BACK;

pub const DEFAULT_LIMIT: usize = 100;
pub const DEFAULT_START_YEAR: i32 = 2000;

/// Fixed parameters of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisDefaults {
    pub limit: usize,
    pub start_year: i32,
    pub years_back: i32,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            start_year: DEFAULT_START_YEAR,
            years_back: DEFAULT_YEARS_BACK,
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub narrative_model: String,
    pub semantic_scholar_api_key: Option<String>,
    pub defaults: AnalysisDefaults,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let groq_api_key = std::env::var("GROQ_API_KEY").ok().filter(|k| !k.trim().is_empty());
        let narrative_model = std::env::var("LIT_TIMELINE_MODEL")
            .unwrap_or_else(|_| llm::DEFAULT_MODEL.to_string());
        let semantic_scholar_api_key = std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok();

        Self {
            groq_api_key,
            narrative_model,
            semantic_scholar_api_key,
            defaults: AnalysisDefaults::default(),
        }
    }

    /// Semantic Scholar first, arXiv as the fallback.
    pub fn build_fetcher(&self) -> PaperFetcher {
        let primary: Arc<dyn PaperSource> = Arc::new(apis::semantic_scholar::SemanticScholarClient::new(
            self.semantic_scholar_api_key.clone(),
        ));
        let fallback: Arc<dyn PaperSource> = Arc::new(apis::arxiv::ArxivClient::new());
        PaperFetcher::new(primary, fallback)
    }

    pub fn build_predictor(&self) -> ContributionPredictor {
        let narrator = match &self.groq_api_key {
            Some(key) => {
                let backend: Arc<dyn LlmBackend> = Arc::new(llm::OpenAiCompatibleBackend::groq(
                    key.clone(),
                    self.narrative_model.clone(),
                ));
                Some(backend)
            }
            None => {
                tracing::warn!("GROQ_API_KEY not set: contribution narratives will use the template");
                None
            }
        };
        ContributionPredictor::new(narrator)
    }

    /// Return a list of source status descriptions.
    pub fn source_status(&self) -> Vec<SourceStatus> {
        vec![
            SourceStatus { name: "semantic_scholar".into(), role: "primary search".into(), enabled: true,
                note: if self.semantic_scholar_api_key.is_some() { "API key set".into() } else { "No API key (rate limited)".into() } },
            SourceStatus { name: "arxiv".into(), role: "fallback search".into(), enabled: true,
                note: "No API key required".into() },
            SourceStatus { name: "groq".into(), role: "contribution narrative".into(), enabled: self.groq_api_key.is_some(),
                note: if self.groq_api_key.is_some() { format!("Model {}", self.narrative_model) } else { "Disabled: GROQ_API_KEY not set, template fallback".into() } },
        ]
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub role: String,
    pub enabled: bool,
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(groq: Option<&str>) -> Config {
        Config {
            groq_api_key: groq.map(str::to_string),
            narrative_model: llm::DEFAULT_MODEL.to_string(),
            semantic_scholar_api_key: None,
            defaults: AnalysisDefaults::default(),
        }
    }

    #[test]
    fn test_defaults() {
        let d = AnalysisDefaults::default();
        assert_eq!((d.limit, d.start_year, d.years_back), (100, 2000, 10));
    }

    #[test]
    fn test_predictor_without_key_uses_template() {
        assert!(!config(None).build_predictor().has_narrator());
        assert!(config(Some("gsk_test")).build_predictor().has_narrator());
    }

    #[test]
    fn test_source_status() {
        let statuses = config(None).source_status();
        assert_eq!(statuses.len(), 3);
        let groq = statuses.iter().find(|s| s.name == "groq").unwrap();
        assert!(!groq.enabled);
    }
}
