use std::time::Duration;

use super::{PaperOrigin, PaperSource, RawRecord, SourceError};
use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const BASE_URL: &str = "https://export.arxiv.org/api/query";

pub struct ArxivClient {
    client: reqwest::Client,
}

impl ArxivClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("lit-timeline/0.1")
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    fn search_request(&self, query: &str, offset: u32, max_results: u32) -> Result<reqwest::Request, SourceError> {
        let search_query = format!("all:{}", query.trim());
        let start = offset.to_string();
        let max_results = max_results.to_string();
        Ok(self.client.get(BASE_URL)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", start.as_str()),
                ("max_results", max_results.as_str()),
            ])
            .build()?)
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    fn origin(&self) -> PaperOrigin {
        PaperOrigin::Arxiv
    }

    async fn search(&self, query: &str, offset: u32, max_results: u32) -> Result<Vec<RawRecord>, SourceError> {
        let req = self.search_request(query, offset, max_results)?;
        let resp = self.client.execute(req).await?;
        if !resp.status().is_success() {
            return Err(SourceError::Api(format!("arXiv returned {}", resp.status())));
        }
        let body = resp.text().await?;
        parse_atom_feed(&body)
    }
}

/// `href` of an `alternate`/abs link element, if this is one.
fn abs_href(e: &BytesStart<'_>) -> Option<String> {
    let mut href = None;
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"href" {
            href = Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    href.filter(|h| h.contains("/abs/"))
}

fn parse_atom_feed(xml: &str) -> Result<Vec<RawRecord>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut in_entry = false;
    let mut in_author = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut summary = String::new();
    let mut entry_id = String::new();
    let mut published = String::new();
    let mut author_name = String::new();
    let mut authors: Vec<String> = Vec::new();
    let mut link_abs: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "entry" {
                    in_entry = true;
                    title.clear();
                    summary.clear();
                    entry_id.clear();
                    published.clear();
                    authors.clear();
                    link_abs = None;
                } else if in_entry {
                    if tag == "author" {
                        in_author = true;
                        author_name.clear();
                    } else if tag == "link" && link_abs.is_none() {
                        link_abs = abs_href(&e);
                    }
                    current_tag = tag;
                }
            }
            Ok(Event::Empty(e)) if in_entry => {
                if e.name().as_ref() == b"link" && link_abs.is_none() {
                    link_abs = abs_href(&e);
                }
            }
            Ok(Event::Text(e)) if in_entry => {
                let text = e.unescape().unwrap_or_default().to_string();
                match current_tag.as_str() {
                    "title" => title.push_str(&text),
                    "summary" => summary.push_str(&text),
                    "id" => entry_id.push_str(&text),
                    "published" => published.push_str(&text),
                    "name" if in_author => author_name.push_str(&text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "entry" && in_entry {
                    in_entry = false;
                    let title = title.trim().replace('\n', " ");
                    let entry_id = entry_id.trim();
                    records.push(RawRecord {
                        title: (!title.is_empty()).then_some(title),
                        authors: authors.clone(),
                        year: published.trim().get(..4).and_then(|y| y.parse::<i32>().ok()),
                        abstract_text: (!summary.trim().is_empty()).then(|| summary.clone()),
                        url: link_abs.take().or_else(|| (!entry_id.is_empty()).then(|| entry_id.to_string())),
                    });
                } else if tag == "author" && in_author {
                    in_author = false;
                    if !author_name.trim().is_empty() {
                        authors.push(author_name.trim().to_string());
                    }
                }
                if tag == current_tag {
                    current_tag.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }
    Ok(records)
}
