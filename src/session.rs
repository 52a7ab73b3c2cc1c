use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::apis::PaperOrigin;
use crate::config::AnalysisDefaults;
use crate::contribution::{ContributionInsight, ContributionPredictor};
use crate::search::{Paper, PaperFetcher};
use crate::timeline::{self, Timeline};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please enter a research topic")]
    EmptyQuery,
    #[error("No analysis has been run in this session")]
    NoAnalysis,
    #[error("Unknown paper id: {0}")]
    UnknownPaper(String),
}

/// Result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    pub query: String,
    pub papers: Vec<Paper>,
    pub timeline: Timeline,
    pub thoughts: Vec<String>,
}

/// Display record plus its session identity.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineCard {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub source: PaperOrigin,
    pub link: String,
    pub predicted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearView {
    pub year: i32,
    pub count: usize,
    pub papers: Vec<TimelineCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    pub query: String,
    pub papers_retrieved: usize,
    pub thoughts: Vec<String>,
    pub timeline: Vec<YearView>,
}

/// State for one interactive session: the latest run and the insights
/// computed for its papers.
#[derive(Debug, Default)]
pub struct Session {
    run: Option<AnalysisRun>,
    insights: HashMap<String, ContributionInsight>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standalone fetch. Takes `&mut self` so it is serialized with the
    /// other session actions, but leaves the current run untouched.
    pub async fn fetch_papers(
        &mut self,
        fetcher: &PaperFetcher,
        query: &str,
        limit: usize,
        start_year: i32,
    ) -> Result<Vec<Paper>, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        let papers = fetcher.fetch(query, limit, start_year).await;
        tracing::info!("Fetched {} papers for: {}", papers.len(), query);
        Ok(papers)
    }

    /// Fetch and group papers for `query`, replacing the previous run.
    pub async fn analyze(
        &mut self,
        fetcher: &PaperFetcher,
        query: &str,
        defaults: &AnalysisDefaults,
    ) -> Result<&AnalysisRun, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        let mut thoughts = Vec::new();
        let mut think = |msg: String| {
            tracing::info!("{}", msg);
            thoughts.push(msg);
        };

        think("Analyzing research query intent".to_string());
        think(format!("Retrieving academic publications ({} → Present)", defaults.start_year));

        let papers = fetcher.fetch(query, defaults.limit, defaults.start_year).await;
        think(format!("Retrieved {} papers", papers.len()));

        think("Constructing chronological research timeline".to_string());
        let timeline = timeline::build_timeline(&papers, defaults.years_back);
        think("Timeline construction completed".to_string());

        self.insights.clear();
        Ok(self.run.insert(AnalysisRun {
            query: query.to_string(),
            papers,
            timeline,
            thoughts,
        }))
    }

    /// Insight for a displayed paper, computed once per session.
    pub async fn predict(
        &mut self,
        predictor: &ContributionPredictor,
        paper_id: &str,
    ) -> Result<&ContributionInsight, SessionError> {
        let run = self.run.as_ref().ok_or(SessionError::NoAnalysis)?;
        let entry = run
            .timeline
            .entry(paper_id)
            .ok_or_else(|| SessionError::UnknownPaper(paper_id.to_string()))?;

        if !self.insights.contains_key(paper_id) {
            tracing::info!("Predicting contribution for {}", paper_id);
            let insight = predictor.predict(&entry.title).await;
            self.insights.insert(paper_id.to_string(), insight);
        }
        self.insights
            .get(paper_id)
            .ok_or_else(|| SessionError::UnknownPaper(paper_id.to_string()))
    }

    pub fn view(&self) -> Option<AnalysisView> {
        let run = self.run.as_ref()?;
        let timeline = run
            .timeline
            .buckets()
            .iter()
            .map(|bucket| YearView {
                year: bucket.year,
                count: bucket.papers.len(),
                papers: bucket
                    .papers
                    .iter()
                    .enumerate()
                    .map(|(idx, p)| {
                        let id = timeline::paper_id(bucket.year, idx);
                        TimelineCard {
                            predicted: self.insights.contains_key(&id),
                            id,
                            title: p.title.clone(),
                            authors: p.authors.clone(),
                            source: p.source,
                            link: p.link.clone(),
                        }
                    })
                    .collect(),
            })
            .collect();

        Some(AnalysisView {
            query: run.query.clone(),
            papers_retrieved: run.papers.len(),
            thoughts: run.thoughts.clone(),
            timeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::{PaperSource, RawRecord, SourceError};
    use crate::contribution::tests::ScriptedLlm;
    use async_trait::async_trait;
    use chrono::Datelike;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticSource {
        origin: PaperOrigin,
        records: Vec<RawRecord>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PaperSource for StaticSource {
        fn origin(&self) -> PaperOrigin {
            self.origin
        }

        async fn search(&self, _query: &str, offset: u32, _max: u32) -> Result<Vec<RawRecord>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if offset == 0 {
                Ok(self.records.clone())
            } else {
                Ok(Vec::new())
            }
        }
    }

    fn source(origin: PaperOrigin, titles: &[(&str, i32)]) -> Arc<StaticSource> {
        Arc::new(StaticSource {
            origin,
            records: titles
                .iter()
                .map(|(t, y)| RawRecord {
                    title: Some(t.to_string()),
                    year: Some(*y),
                    ..Default::default()
                })
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    fn this_year() -> i32 {
        chrono::Local::now().year()
    }

    fn fetcher() -> (PaperFetcher, Arc<StaticSource>) {
        let now = this_year();
        let primary = source(
            PaperOrigin::SemanticScholar,
            &[("Honeypot Survey", now - 1), ("Neural Intrusion Detection", now - 1), ("Old Work", 2001)],
        );
        let fallback = source(PaperOrigin::Arxiv, &[("Cyber Deception Traps", now)]);
        (PaperFetcher::new(primary.clone(), fallback), primary)
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_fetch() {
        let (fetcher, primary) = fetcher();
        let mut session = Session::new();
        let err = session.analyze(&fetcher, "   ", &AnalysisDefaults::default()).await;
        assert!(matches!(err, Err(SessionError::EmptyQuery)));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
        assert!(session.view().is_none());
    }

    #[tokio::test]
    async fn test_fetch_papers_keeps_current_run() {
        let (fetcher, primary) = fetcher();
        let mut session = Session::new();
        assert!(matches!(
            session.fetch_papers(&fetcher, " ", 10, 2000).await,
            Err(SessionError::EmptyQuery)
        ));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 0);

        session.analyze(&fetcher, "cyber", &AnalysisDefaults::default()).await.unwrap();
        let papers = session.fetch_papers(&fetcher, "other topic", 2, 2000).await.unwrap();
        assert_eq!(papers.len(), 2);
        let view = session.view().unwrap();
        assert_eq!(view.query, "cyber");
        assert_eq!(view.papers_retrieved, 4);
    }

    #[tokio::test]
    async fn test_analyze_builds_timeline_and_thoughts() {
        let (fetcher, _) = fetcher();
        let mut session = Session::new();
        let run = session.analyze(&fetcher, "  cyber deception ", &AnalysisDefaults::default()).await.unwrap();
        assert_eq!(run.query, "cyber deception");
        assert_eq!(run.papers.len(), 4);
        assert_eq!(run.thoughts.len(), 5);
        assert_eq!(run.thoughts[2], "Retrieved 4 papers");

        let view = session.view().unwrap();
        let years: Vec<_> = view.timeline.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![this_year(), this_year() - 1]);
        assert_eq!(view.timeline[1].count, 2);
        assert_eq!(view.timeline[1].papers[1].id, format!("{}_1", this_year() - 1));
        assert_eq!(view.papers_retrieved, 4);
    }

    #[tokio::test]
    async fn test_predict_is_cached_per_paper() {
        let (fetcher, _) = fetcher();
        let llm = ScriptedLlm::replying(Some("Generated."));
        let predictor = ContributionPredictor::new(Some(llm.clone()));
        let mut session = Session::new();
        session.analyze(&fetcher, "cyber", &AnalysisDefaults::default()).await.unwrap();

        let id = format!("{}_1", this_year() - 1);
        let first = session.predict(&predictor, &id).await.unwrap().clone();
        let second = session.predict(&predictor, &id).await.unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(llm.call_count(), 1);
        assert!(first.domains.contains(&"Cybersecurity".to_string()));
        assert!(session.view().unwrap().timeline[1].papers[1].predicted);

        session.predict(&predictor, &format!("{}_0", this_year())).await.unwrap();
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_new_analysis_clears_insights() {
        let (fetcher, _) = fetcher();
        let llm = ScriptedLlm::replying(Some("Generated."));
        let predictor = ContributionPredictor::new(Some(llm.clone()));
        let mut session = Session::new();
        let id = format!("{}_0", this_year());

        session.analyze(&fetcher, "cyber", &AnalysisDefaults::default()).await.unwrap();
        session.predict(&predictor, &id).await.unwrap();
        session.analyze(&fetcher, "cyber again", &AnalysisDefaults::default()).await.unwrap();
        assert!(!session.view().unwrap().timeline[0].papers[0].predicted);
        session.predict(&predictor, &id).await.unwrap();
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_predict_errors() {
        let (fetcher, _) = fetcher();
        let predictor = ContributionPredictor::default();
        let mut session = Session::new();
        assert!(matches!(session.predict(&predictor, "2020_0").await, Err(SessionError::NoAnalysis)));

        session.analyze(&fetcher, "cyber", &AnalysisDefaults::default()).await.unwrap();
        // fetched, but outside the timeline window
        assert!(matches!(
            session.predict(&predictor, "2001_0").await,
            Err(SessionError::UnknownPaper(_))
        ));
    }
}
