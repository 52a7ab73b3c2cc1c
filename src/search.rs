use std::collections::HashSet;
use std::sync::Arc;

use chrono::Datelike;
use serde::Serialize;

use crate::apis::{PaperOrigin, PaperSource, RawRecord};
use crate::text;

/// Page size requested from the primary source.
pub const PAGE_SIZE: u32 = 100;
/// The Graph API rejects offsets past 1000, so paging stops there.
pub const MAX_PAGES: u32 = 10;
/// Fallback over-fetch factor, since much of its output is filtered away.
const FALLBACK_OVERFETCH: usize = 3;
const MAX_AUTHORS: usize = 3;
pub const NO_LINK: &str = "#";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paper {
    pub title: String,
    pub authors: String,
    pub year: i32,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub link: String,
    pub source: PaperOrigin,
}

/// Two-stage fetch: page through the primary source, then top up the
/// shortfall from the fallback with a single request.
pub struct PaperFetcher {
    primary: Arc<dyn PaperSource>,
    fallback: Arc<dyn PaperSource>,
}

/// Per-invocation accumulator: seen titles plus accepted papers.
struct Accumulator {
    start_year: i32,
    current_year: i32,
    limit: usize,
    seen_titles: HashSet<String>,
    papers: Vec<Paper>,
}

impl Accumulator {
    fn is_full(&self) -> bool {
        self.papers.len() >= self.limit
    }

    /// Apply the acceptance rules to one record. Returns whether it was kept.
    fn offer(&mut self, record: RawRecord, origin: PaperOrigin) -> bool {
        let (Some(title), Some(year)) = (record.title, record.year) else {
            return false;
        };
        if self.seen_titles.contains(&title) {
            return false;
        }
        if !(self.start_year..=self.current_year).contains(&year) {
            return false;
        }
        self.seen_titles.insert(title.clone());
        self.papers.push(Paper {
            title,
            authors: record.authors
                .into_iter()
                .take(MAX_AUTHORS)
                .collect::<Vec<_>>()
                .join(", "),
            year,
            abstract_text: text::clean(record.abstract_text.as_deref()),
            link: record.url.unwrap_or_else(|| NO_LINK.to_string()),
            source: origin,
        });
        true
    }

    /// Offer records in order until the limit is hit.
    fn extend(&mut self, records: Vec<RawRecord>, origin: PaperOrigin) -> usize {
        let mut accepted = 0;
        for record in records {
            if self.is_full() {
                break;
            }
            if self.offer(record, origin) {
                accepted += 1;
            }
        }
        accepted
    }
}

impl PaperFetcher {
    pub fn new(primary: Arc<dyn PaperSource>, fallback: Arc<dyn PaperSource>) -> Self {
        Self { primary, fallback }
    }

    /// Fetch up to `limit` unique papers published between `start_year` and
    /// the current year, sorted ascending by year. Provider failures only
    /// shorten the result.
    pub async fn fetch(&self, query: &str, limit: usize, start_year: i32) -> Vec<Paper> {
        let current_year = chrono::Local::now().year();
        self.fetch_as_of(query, limit, start_year, current_year).await
    }

    pub async fn fetch_as_of(
        &self,
        query: &str,
        limit: usize,
        start_year: i32,
        current_year: i32,
    ) -> Vec<Paper> {
        let mut acc = Accumulator {
            start_year,
            current_year,
            limit,
            seen_titles: HashSet::new(),
            papers: Vec::new(),
        };

        self.page_primary(query, &mut acc).await;

        if !acc.is_full() {
            let remaining = limit - acc.papers.len();
            let request = (remaining * FALLBACK_OVERFETCH).min(u32::MAX as usize) as u32;
            let origin = self.fallback.origin();
            match self.fallback.search(query, 0, request).await {
                Ok(records) => {
                    let accepted = acc.extend(records, origin);
                    tracing::debug!("{} fallback accepted {} of {} requested", origin, accepted, request);
                }
                Err(e) => tracing::warn!("{} fallback search failed: {}", origin, e),
            }
        }

        let mut papers = acc.papers;
        papers.sort_by_key(|p| p.year);
        papers.truncate(limit);
        papers
    }

    async fn page_primary(&self, query: &str, acc: &mut Accumulator) {
        let origin = self.primary.origin();
        let mut offset = 0;
        for _ in 0..MAX_PAGES {
            if acc.is_full() {
                break;
            }
            let page = match self.primary.search(query, offset, PAGE_SIZE).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("{} search stopped at offset {}: {}", origin, offset, e);
                    break;
                }
            };
            if page.is_empty() {
                break;
            }
            let page_len = page.len();
            let accepted = acc.extend(page, origin);
            tracing::debug!("{} offset {}: accepted {} of {}", origin, offset, accepted, page_len);
            offset += PAGE_SIZE;
        }
    }
}
