//! `/sentiment` handler
//!
//! Normalizes the request, invokes the model once per tweet with a
//! schema-constrained prompt, reconciles each payload against the requested
//! category list, and aggregates the summary. A single tweet's model
//! failure never aborts the batch.

use crate::analysis::{self, Summary, TweetAnalysis};
use crate::config::AppState;
use crate::gateway::chat::{ResponseFormat, RunRequest};
use crate::http;
use crate::logger;
use crate::prompt;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Deterministic sampling for classification
const TEMPERATURE: f64 = 0.0;
const MAX_TOKENS: u32 = 256;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SentimentResponse<'a> {
    model: &'a str,
    requested_categories: &'a [String],
    count: usize,
    results: &'a [TweetAnalysis],
    summary: Option<Summary>,
}

pub async fn handle(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let whole_body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read /sentiment body: {e}"));
            return http::error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    let body: Value = match serde_json::from_slice(&whole_body) {
        Ok(v) => v,
        Err(_) => return http::error_response(StatusCode::BAD_REQUEST, "Invalid JSON"),
    };

    let tweets = analysis::parse_tweets(&body);
    if tweets.is_empty() {
        return http::error_response(
            StatusCode::BAD_REQUEST,
            "No valid tweets found. Provide 'tweet' or 'tweets'.",
        );
    }
    let categories = analysis::resolve_categories(&body);

    let mut results = Vec::with_capacity(tweets.len());
    for (index, text) in tweets.into_iter().enumerate() {
        match score_tweet(state, &text, &categories).await {
            Ok(payload) => {
                results.push(TweetAnalysis::from_payload(index, text, &categories, payload));
            }
            Err(e) => {
                logger::log_gateway_error("sentiment", &e);
                results.push(TweetAnalysis::failed(index, text));
            }
        }
    }

    let summary = analysis::build_summary(&results, &categories);

    http::json_response(
        StatusCode::OK,
        &SentimentResponse {
            model: state.gateway.model(),
            requested_categories: &categories,
            count: results.len(),
            results: &results,
            summary,
        },
    )
}

/// One schema-constrained model call for one tweet
async fn score_tweet(
    state: &Arc<AppState>,
    text: &str,
    categories: &[String],
) -> Result<Value, crate::gateway::Error> {
    let mut run = RunRequest::new(prompt::sentiment_messages(text, categories));
    run.temperature = Some(TEMPERATURE);
    run.max_tokens = Some(MAX_TOKENS);
    run.response_format = Some(ResponseFormat::json_schema(prompt::sentiment_schema()));
    state.gateway.run(&run).await
}
