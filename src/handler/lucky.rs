//! `/lucky` handler
//!
//! Generates one fictional tweet from a randomized flavor profile. Unlike
//! `/sentiment`, a malformed JSON body is tolerated here: the seed simply
//! falls back to a random topic. A model failure fails the whole request.

use crate::analysis::{CategoryScore, LUCKY_FLAVOR_CATEGORIES, LUCKY_TOPICS};
use crate::config::AppState;
use crate::gateway::chat::RunRequest;
use crate::http;
use crate::logger;
use crate::prompt;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Higher temperature to lean into the flavor profile
const TEMPERATURE: f64 = 0.9;
const MAX_TOKENS: u32 = 64;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LuckyResponse<'a> {
    tweet: &'a str,
    flavor_profile: &'a [CategoryScore],
}

pub async fn handle(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let body: Option<Value> = match req.collect().await {
        Ok(collected) => serde_json::from_slice(&collected.to_bytes()).ok(),
        Err(_) => None,
    };

    // ThreadRng is not Send; finish all random draws before awaiting
    let (seed, profile) = {
        let mut rng = rand::thread_rng();
        let seed = resolve_seed(body.as_ref(), &mut rng);
        let profile = build_flavor_profile(&mut rng);
        (seed, profile)
    };

    let mut run = RunRequest::new(prompt::lucky_messages(&seed, &profile));
    run.temperature = Some(TEMPERATURE);
    run.max_tokens = Some(MAX_TOKENS);

    match state.gateway.run(&run).await {
        Ok(payload) => {
            let raw = match payload {
                Value::String(text) => text,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            let tweet = strip_wrapping_quotes(&raw);
            http::json_response(
                StatusCode::OK,
                &LuckyResponse {
                    tweet,
                    flavor_profile: &profile,
                },
            )
        }
        Err(e) => {
            logger::log_gateway_error("lucky", &e);
            http::error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "AI call failed generating tweet",
            )
        }
    }
}

/// Use a trimmed non-empty client seed, otherwise draw a random topic
fn resolve_seed<R: Rng>(body: Option<&Value>, rng: &mut R) -> String {
    if let Some(seed) = body.and_then(|b| b.get("seed")).and_then(Value::as_str) {
        let trimmed = seed.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    LUCKY_TOPICS[rng.gen_range(0..LUCKY_TOPICS.len())].to_string()
}

/// Assign each flavor category a uniform random intensity in [0, 10]
fn build_flavor_profile<R: Rng>(rng: &mut R) -> Vec<CategoryScore> {
    LUCKY_FLAVOR_CATEGORIES
        .iter()
        .map(|name| CategoryScore {
            name: (*name).to_string(),
            score: Some(rng.gen_range(0..=10)),
        })
        .collect()
}

/// Strip exactly one wrapping pair of matching straight or curly quotes
fn strip_wrapping_quotes(text: &str) -> &str {
    const PAIRS: [(char, char); 4] = [
        ('"', '"'),
        ('\'', '\''),
        ('\u{201c}', '\u{201d}'),
        ('\u{2018}', '\u{2019}'),
    ];

    let trimmed = text.trim();
    for (open, close) in PAIRS {
        if let Some(rest) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return rest.trim();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_resolve_seed_uses_trimmed_client_seed() {
        let mut rng = StdRng::seed_from_u64(1);
        let body = json!({"seed": "  meme stocks  "});
        assert_eq!(resolve_seed(Some(&body), &mut rng), "meme stocks");
    }

    #[test]
    fn test_resolve_seed_falls_back_to_topic_list() {
        let mut rng = StdRng::seed_from_u64(1);
        for body in [None, Some(json!({})), Some(json!({"seed": "   "})), Some(json!({"seed": 7}))] {
            let seed = resolve_seed(body.as_ref(), &mut rng);
            assert!(LUCKY_TOPICS.contains(&seed.as_str()));
        }
    }

    #[test]
    fn test_resolve_seed_is_deterministic_per_rng_seed() {
        let first = resolve_seed(None, &mut StdRng::seed_from_u64(42));
        let second = resolve_seed(None, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_flavor_profile_shape() {
        let profile = build_flavor_profile(&mut StdRng::seed_from_u64(7));
        assert_eq!(profile.len(), LUCKY_FLAVOR_CATEGORIES.len());
        for (entry, expected) in profile.iter().zip(LUCKY_FLAVOR_CATEGORIES) {
            assert_eq!(entry.name, expected);
            assert!(entry.score.expect("score") <= 10);
        }
    }

    #[test]
    fn test_flavor_profile_is_deterministic_per_rng_seed() {
        let first = build_flavor_profile(&mut StdRng::seed_from_u64(99));
        let second = build_flavor_profile(&mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[test]
    fn test_strip_straight_quotes() {
        assert_eq!(strip_wrapping_quotes("\"buy the dip\""), "buy the dip");
        assert_eq!(strip_wrapping_quotes("'buy the dip'"), "buy the dip");
        assert_eq!(strip_wrapping_quotes("  \" spaced \"  "), "spaced");
    }

    #[test]
    fn test_strip_curly_quotes() {
        assert_eq!(strip_wrapping_quotes("\u{201c}fed pivot\u{201d}"), "fed pivot");
        assert_eq!(strip_wrapping_quotes("\u{2018}fed pivot\u{2019}"), "fed pivot");
    }

    #[test]
    fn test_strip_only_one_layer() {
        assert_eq!(strip_wrapping_quotes("\"\"double\"\""), "\"double\"");
    }

    #[test]
    fn test_no_strip_on_unmatched_quotes() {
        assert_eq!(strip_wrapping_quotes("\"half done"), "\"half done");
        assert_eq!(strip_wrapping_quotes("mid \" quote"), "mid \" quote");
        assert_eq!(strip_wrapping_quotes("plain text"), "plain text");
    }

    #[test]
    fn test_strip_degenerate_inputs() {
        assert_eq!(strip_wrapping_quotes("\""), "\"");
        assert_eq!(strip_wrapping_quotes("\"\""), "");
        assert_eq!(strip_wrapping_quotes(""), "");
    }
}
