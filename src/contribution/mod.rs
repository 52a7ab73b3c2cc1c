//! Heuristic contribution insight for a single paper title.
//!
//! Everything except the narrative paragraph is a pure function of the
//! title. The paragraph comes from the configured chat backend when there is
//! one and falls back to a fixed template otherwise.

pub mod domains;
pub mod narrative;
pub mod rules;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::llm::{LlmBackend, LlmRequest, Message};
pub use domains::{infer_domains, DomainMatch};
pub use rules::{confidence_score, estimate_novelty, infer_research_type, NoveltyTier, ResearchType};

pub const NARRATIVE_TEMPERATURE: f32 = 0.4;

pub const IMPACT_STATEMENT: &str = "This research may influence future investigations, inspire \
     methodological refinement, and contribute to technological advancements.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionInsight {
    pub paragraph: String,
    pub confidence: u8,
    pub novelty: NoveltyTier,
    pub impact: String,
    pub domains: Vec<String>,
    pub subdomains: BTreeSet<String>,
    pub research_type: ResearchType,
    /// False when the templated paragraph was used.
    pub generated: bool,
}

#[derive(Clone, Default)]
pub struct ContributionPredictor {
    narrator: Option<Arc<dyn LlmBackend>>,
}

impl ContributionPredictor {
    pub fn new(narrator: Option<Arc<dyn LlmBackend>>) -> Self {
        Self { narrator }
    }

    pub fn has_narrator(&self) -> bool {
        self.narrator.is_some()
    }

    pub async fn predict(&self, title: &str) -> ContributionInsight {
        let DomainMatch { domains, subdomains } = infer_domains(title);
        let research_type = infer_research_type(title);

        let generated = self.generate(title, &domains, &subdomains, research_type).await;
        let (paragraph, generated) = match generated {
            Some(p) => (p, true),
            None => (narrative::fallback_paragraph(title, &domains, research_type), false),
        };

        ContributionInsight {
            paragraph,
            confidence: confidence_score(title),
            novelty: estimate_novelty(title),
            impact: IMPACT_STATEMENT.to_string(),
            domains,
            subdomains,
            research_type,
            generated,
        }
    }

    async fn generate(
        &self,
        title: &str,
        domains: &[String],
        subdomains: &BTreeSet<String>,
        research_type: ResearchType,
    ) -> Option<String> {
        let narrator = self.narrator.as_ref()?;
        let req = LlmRequest {
            messages: vec![Message::user(narrative::build_prompt(
                title,
                domains,
                subdomains,
                research_type,
            ))],
            temperature: NARRATIVE_TEMPERATURE,
        };
        match narrator.complete(req).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                tracing::warn!("{} returned an empty narrative, using template", narrator.model_id());
                None
            }
            Err(e) => {
                tracing::warn!("Narrative generation via {} failed: {}", narrator.model_id(), e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted backend that counts calls and keeps the last request.
    pub(crate) struct ScriptedLlm {
        reply: Option<String>,
        pub calls: AtomicUsize,
        pub last: Mutex<Option<LlmRequest>>,
    }

    impl ScriptedLlm {
        pub(crate) fn replying(reply: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedLlm {
        async fn complete(&self, req: LlmRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(req);
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(LlmError::Api { status: 503, message: "unavailable".into() }),
            }
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    const TITLE: &str = "A Novel Adaptive Framework for Intrusion Detection";

    #[tokio::test]
    async fn test_scenario_intrusion_detection() {
        let insight = ContributionPredictor::default().predict(TITLE).await;
        assert!(insight.domains.contains(&"Cybersecurity".to_string()));
        assert_eq!(insight.research_type, ResearchType::ProposedFramework);
        assert_eq!(insight.novelty, NoveltyTier::High);
        assert_eq!(insight.impact, IMPACT_STATEMENT);
        assert!(!insight.generated);
        assert!(insight.paragraph.contains("a novel adaptive framework for intrusion detection"));
    }

    #[tokio::test]
    async fn test_generated_paragraph() {
        let llm = ScriptedLlm::replying(Some("  Generated paragraph.  "));
        let predictor = ContributionPredictor::new(Some(llm.clone()));
        let insight = predictor.predict(TITLE).await;
        assert!(insight.generated);
        assert_eq!(insight.paragraph, "Generated paragraph.");
        assert_eq!(llm.call_count(), 1);

        let last = llm.last.lock().unwrap().clone().unwrap();
        assert_eq!(last.temperature, NARRATIVE_TEMPERATURE);
        assert_eq!(last.messages.len(), 1);
        assert_eq!(last.messages[0].role, "user");
        assert!(last.messages[0].content.contains(TITLE));
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back() {
        let predictor = ContributionPredictor::new(Some(ScriptedLlm::replying(None)));
        let insight = predictor.predict(TITLE).await;
        assert!(!insight.generated);
        assert!(insight.paragraph.starts_with("This research appears to investigate"));
    }

    #[tokio::test]
    async fn test_blank_reply_falls_back() {
        let predictor = ContributionPredictor::new(Some(ScriptedLlm::replying(Some("   "))));
        let insight = predictor.predict("Honeypots").await;
        assert!(!insight.generated);
        assert!(!insight.paragraph.is_empty());
    }

    #[tokio::test]
    async fn test_rule_fields_are_deterministic() {
        let predictor = ContributionPredictor::default();
        let a = predictor.predict(TITLE).await;
        let b = predictor.predict(TITLE).await;
        assert_eq!(a, b);
    }
}
