use std::time::Duration;

use super::{PaperOrigin, PaperSource, RawRecord, SourceError};
use async_trait::async_trait;
use serde::Deserialize;

const BASE_URL: &str = "https://api.semanticscholar.org/graph/v1";
const FIELDS: &str = "title,authors,year,abstract,url";

pub struct SemanticScholarClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("lit-timeline/0.1")
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }
}

#[derive(Deserialize)]
struct S2SearchResponse {
    data: Option<Vec<S2Paper>>,
}

#[derive(Deserialize)]
struct S2Paper {
    title: Option<String>,
    authors: Option<Vec<S2Author>>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    year: Option<i32>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct S2Author {
    name: Option<String>,
}

fn s2_to_record(p: S2Paper) -> RawRecord {
    RawRecord {
        title: p.title.filter(|t| !t.is_empty()),
        authors: p.authors
            .map(|a| a.into_iter().filter_map(|a| a.name).collect())
            .unwrap_or_default(),
        year: p.year,
        abstract_text: p.abstract_text,
        url: p.url,
    }
}

fn parse_search_response(body: &str) -> Result<Vec<RawRecord>, SourceError> {
    let resp: S2SearchResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Parse(format!("Semantic Scholar response: {}", e)))?;
    Ok(resp.data.unwrap_or_default().into_iter().map(s2_to_record).collect())
}

#[async_trait]
impl PaperSource for SemanticScholarClient {
    fn origin(&self) -> PaperOrigin {
        PaperOrigin::SemanticScholar
    }

    async fn search(&self, query: &str, offset: u32, max_results: u32) -> Result<Vec<RawRecord>, SourceError> {
        let url = format!("{}/paper/search", BASE_URL);
        let limit = max_results.min(100).to_string();
        let offset = offset.to_string();
        let resp = self.add_auth(
            self.client.get(&url)
                .header("Accept", "application/json")
                .query(&[
                    ("query", query),
                    ("limit", limit.as_str()),
                    ("offset", offset.as_str()),
                    ("fields", FIELDS),
                ])
        ).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Api(format!("Semantic Scholar returned {}", resp.status())));
        }
        let body = resp.text().await?;
        parse_search_response(&body)
    }
}
