use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::apis::PaperOrigin;
use crate::search::Paper;
use crate::text;

pub const DEFAULT_YEARS_BACK: i32 = 10;

/// Per-paper payload shown under a year. The year itself is the bucket key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub title: String,
    pub authors: String,
    pub source: PaperOrigin,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBucket {
    pub year: i32,
    pub papers: Vec<TimelineEntry>,
}

/// Year buckets, newest first. Never contains an empty bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    buckets: Vec<YearBucket>,
}

impl Timeline {
    pub fn buckets(&self) -> &[YearBucket] {
        &self.buckets
    }

    /// Look up an entry by its `"{year}_{index}"` identity.
    pub fn entry(&self, paper_id: &str) -> Option<&TimelineEntry> {
        let (year, index) = paper_id.split_once('_')?;
        let year: i32 = year.parse().ok()?;
        let index: usize = index.parse().ok()?;
        self.buckets
            .iter()
            .find(|b| b.year == year)
            .and_then(|b| b.papers.get(index))
    }
}

/// Session identity of the `index`-th paper in `year`'s bucket.
pub fn paper_id(year: i32, index: usize) -> String {
    format!("{}_{}", year, index)
}

/// Group papers by year over the trailing `years_back` years.
pub fn build_timeline(papers: &[Paper], years_back: i32) -> Timeline {
    build_timeline_as_of(papers, years_back, chrono::Local::now().year())
}

pub fn build_timeline_as_of(papers: &[Paper], years_back: i32, current_year: i32) -> Timeline {
    let start_year = current_year - years_back;
    let mut grouped: BTreeMap<i32, Vec<TimelineEntry>> = BTreeMap::new();

    for paper in papers {
        if !(start_year..=current_year).contains(&paper.year) {
            continue;
        }
        grouped.entry(paper.year).or_default().push(TimelineEntry {
            title: text::squash_whitespace(&paper.title),
            authors: paper.authors.clone(),
            source: paper.source,
            link: paper.link.clone(),
        });
    }

    let buckets = grouped
        .into_iter()
        .rev()
        .filter(|(_, papers)| !papers.is_empty())
        .map(|(year, papers)| YearBucket { year, papers })
        .collect();
    Timeline { buckets }
}
