use std::sync::Arc;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters,
    model::*, tool, tool_handler, tool_router,
    transport::stdio, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod apis;
mod config;
mod contribution;
mod llm;
mod search;
mod session;
mod text;
mod timeline;

use config::Config;
use contribution::ContributionPredictor;
use search::PaperFetcher;
use session::{Session, SessionError};

/// Upper bound on the `limit` accepted by `fetch_papers`.
const MAX_FETCH_LIMIT: u32 = 1000;

// ── Parameter structs ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
struct FetchPapersParams {
    #[schemars(description = "Research topic to search for")]
    query: String,
    #[schemars(description = "Maximum papers to return (default 100, max 1000)")]
    limit: Option<u32>,
    #[schemars(description = "Earliest publication year to keep (default 2000)")]
    start_year: Option<i32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AnalyzeTopicParams {
    #[schemars(description = "Research topic, e.g. \"Cyber Deception Techniques\"")]
    query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PredictContributionParams {
    #[schemars(description = "Paper id from the latest analysis, formatted YEAR_INDEX (e.g. \"2023_0\")")]
    paper_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ClassifyTitleParams {
    #[schemars(description = "Paper title to classify")]
    title: String,
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn session_error(e: SessionError) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

// ── Server ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LitTimelineServer {
    tool_router: ToolRouter<Self>,
    config: Arc<Config>,
    fetcher: Arc<PaperFetcher>,
    predictor: ContributionPredictor,
    session: Arc<Mutex<Session>>,
}

#[tool_router]
impl LitTimelineServer {
    pub fn create() -> Self {
        let config = Config::from_env();
        let fetcher = config.build_fetcher();
        let predictor = config.build_predictor();

        tracing::info!(
            "Initialized fetcher (semantic_scholar → arxiv), narrative backend: {}",
            if predictor.has_narrator() { config.narrative_model.as_str() } else { "template only" }
        );

        Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            predictor,
            session: Arc::new(Mutex::new(Session::new())),
        }
    }

    #[tool(description = "List the search sources and narrative backend and their status")]
    async fn list_sources(&self) -> Result<CallToolResult, McpError> {
        to_json(&self.config.source_status())
    }

    #[tool(description = "Fetch deduplicated papers for a topic from Semantic Scholar, topped up from arXiv, sorted by year")]
    async fn fetch_papers(
        &self,
        Parameters(params): Parameters<FetchPapersParams>,
    ) -> Result<CallToolResult, McpError> {
        let limit = params
            .limit
            .map(|l| l.clamp(1, MAX_FETCH_LIMIT) as usize)
            .unwrap_or(self.config.defaults.limit);
        let start_year = params.start_year.unwrap_or(self.config.defaults.start_year);

        let mut session = self.session.lock().await;
        let papers = session
            .fetch_papers(&self.fetcher, &params.query, limit, start_year)
            .await
            .map_err(session_error)?;
        to_json(&papers)
    }

    #[tool(description = "Analyze a research topic: fetch papers and build a year-by-year timeline of the last 10 years. Replaces the previous analysis.")]
    async fn analyze_topic(
        &self,
        Parameters(params): Parameters<AnalyzeTopicParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        session
            .analyze(&self.fetcher, &params.query, &self.config.defaults)
            .await
            .map_err(session_error)?;

        let view = session.view().ok_or_else(|| session_error(SessionError::NoAnalysis))?;
        if view.timeline.is_empty() {
            tracing::info!("No timeline available for: {}", view.query);
        }
        to_json(&view)
    }

    #[tool(description = "Predict the research contribution of a paper from the latest analysis (cached per paper)")]
    async fn predict_contribution(
        &self,
        Parameters(params): Parameters<PredictContributionParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        let insight = session
            .predict(&self.predictor, params.paper_id.trim())
            .await
            .map_err(session_error)?;
        to_json(insight)
    }

    #[tool(description = "Classify an arbitrary paper title: domains, research type, novelty, confidence and a summary paragraph")]
    async fn classify_title(
        &self,
        Parameters(params): Parameters<ClassifyTitleParams>,
    ) -> Result<CallToolResult, McpError> {
        let title = params.title.trim();
        if title.is_empty() {
            return Err(McpError::invalid_params("Title must not be empty".to_string(), None));
        }
        let insight = self.predictor.predict(title).await;
        to_json(&insight)
    }
}

#[tool_handler]
impl ServerHandler for LitTimelineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Research literature timelines. Call analyze_topic with a topic to get \
                 papers grouped by year (Semantic Scholar, topped up from arXiv), then \
                 predict_contribution with a paper id for a domain, novelty and \
                 confidence estimate plus a summary paragraph."
                    .into(),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting lit-timeline MCP server");

    let server = LitTimelineServer::create();
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
