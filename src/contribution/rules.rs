use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResearchType {
    #[serde(rename = "Survey / Review Paper")]
    Survey,
    #[serde(rename = "Proposed Framework / Model")]
    ProposedFramework,
    #[serde(rename = "Dataset Contribution")]
    Dataset,
    #[serde(rename = "Comparative Study")]
    ComparativeStudy,
    #[serde(rename = "System Architecture Design")]
    SystemArchitecture,
    #[serde(rename = "Experimental Research")]
    Experimental,
}

impl ResearchType {
    pub fn label(self) -> &'static str {
        match self {
            ResearchType::Survey => "Survey / Review Paper",
            ResearchType::ProposedFramework => "Proposed Framework / Model",
            ResearchType::Dataset => "Dataset Contribution",
            ResearchType::ComparativeStudy => "Comparative Study",
            ResearchType::SystemArchitecture => "System Architecture Design",
            ResearchType::Experimental => "Experimental Research",
        }
    }
}

impl fmt::Display for ResearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoveltyTier {
    #[serde(rename = "High Innovation")]
    High,
    #[serde(rename = "Moderate to High Innovation")]
    ModerateToHigh,
    #[serde(rename = "Knowledge Consolidation")]
    KnowledgeConsolidation,
    #[serde(rename = "Moderate Innovation")]
    Moderate,
}

impl NoveltyTier {
    pub fn label(self) -> &'static str {
        match self {
            NoveltyTier::High => "High Innovation",
            NoveltyTier::ModerateToHigh => "Moderate to High Innovation",
            NoveltyTier::KnowledgeConsolidation => "Knowledge Consolidation",
            NoveltyTier::Moderate => "Moderate Innovation",
        }
    }
}

impl fmt::Display for NoveltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const RESEARCH_TYPE_RULES: &[(&[&str], ResearchType)] = &[
    (&["survey", "review"], ResearchType::Survey),
    (&["framework", "model"], ResearchType::ProposedFramework),
    (&["dataset"], ResearchType::Dataset),
    (&["evaluation", "comparative"], ResearchType::ComparativeStudy),
    (&["architecture", "system"], ResearchType::SystemArchitecture),
];

const NOVELTY_RULES: &[(&[&str], NoveltyTier)] = &[
    (&["novel", "innovative", "first"], NoveltyTier::High),
    (&["adaptive", "hybrid", "robust"], NoveltyTier::ModerateToHigh),
    (&["survey", "review"], NoveltyTier::KnowledgeConsolidation),
];

/// Terms that suggest a methodological contribution. Each counts once.
pub const ACADEMIC_KEYWORDS: [&str; 23] = [
    "model", "framework", "analysis", "approach",
    "method", "system", "design", "optimization",
    "prediction", "evaluation", "simulation",
    "performance", "dataset", "adaptive",
    "efficient", "novel", "dynamic",
    "comparative", "experimental", "hybrid",
    "architecture", "algorithm", "robust",
];

pub const MIN_CONFIDENCE: u8 = 65;
pub const MAX_CONFIDENCE: u8 = 98;
const BASE_CONFIDENCE: usize = 70;

fn first_match<T: Copy>(title: &str, rules: &[(&[&str], T)]) -> Option<T> {
    let t = title.to_lowercase();
    rules
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| t.contains(k)))
        .map(|(_, v)| *v)
}

pub fn infer_research_type(title: &str) -> ResearchType {
    first_match(title, RESEARCH_TYPE_RULES).unwrap_or(ResearchType::Experimental)
}

pub fn estimate_novelty(title: &str) -> NoveltyTier {
    first_match(title, NOVELTY_RULES).unwrap_or(NoveltyTier::Moderate)
}

/// 70 plus two points per academic keyword and per three words of title,
/// clamped to 65..=98.
pub fn confidence_score(title: &str) -> u8 {
    let t = title.to_lowercase();
    let hits = ACADEMIC_KEYWORDS.iter().filter(|k| t.contains(*k)).count();
    let length_bonus = title.split_whitespace().count() / 3;
    let score = BASE_CONFIDENCE + 2 * (hits + length_bonus);
    score.clamp(MIN_CONFIDENCE as usize, MAX_CONFIDENCE as usize) as u8
}
