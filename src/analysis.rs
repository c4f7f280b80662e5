//! Sentiment analysis domain logic
//!
//! Request normalization, reconciliation of model output against the
//! requested category list, and summary aggregation. Everything here is
//! pure; the model gateway is called elsewhere.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

/// Categories used when the client does not specify any
pub const DEFAULT_CATEGORIES: [&str; 5] = [
    "Bullishness",
    "Fear",
    "Hype",
    "Uncertainty",
    "Long-term conviction",
];

/// Extra flavor tags appended to the defaults for `/lucky` profiles
pub const LUCKY_FLAVOR_CATEGORIES: [&str; 7] = [
    "Bullishness",
    "Fear",
    "Hype",
    "Uncertainty",
    "Long-term conviction",
    "Funny",
    "Random",
];

/// Topic seeds for `/lucky` when the client does not supply one
pub const LUCKY_TOPICS: [&str; 9] = [
    "markets today",
    "crypto volatility",
    "tech stocks and earnings",
    "AI bubble",
    "energy sector and oil",
    "Fed decisions and interest rates",
    "SPY and overall market sentiment",
    "HFT firms",
    "market manipulation",
];

/// Hard cap on requested categories; excess entries are dropped silently
pub const MAX_CATEGORIES: usize = 8;

/// Error marker embedded in a result entry when the model call failed
pub const AI_CALL_FAILED: &str = "AI call failed";

/// One scored category; `score` is `None` when the model produced nothing
/// usable for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: Option<u8>,
}

/// Per-tweet analysis entry as returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct TweetAnalysis {
    pub index: usize,
    pub text: String,
    pub explanation: Option<String>,
    pub categories: Vec<CategoryScore>,
    pub raw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl TweetAnalysis {
    /// Build an entry from a successful model payload.
    ///
    /// The category list is re-derived from the requested list so its
    /// length and order never depend on what the model returned.
    pub fn from_payload(index: usize, text: String, requested: &[String], payload: Value) -> Self {
        let explanation = payload
            .get("explanation")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let categories = reconcile_scores(requested, &payload);
        let raw = if payload.is_null() { None } else { Some(payload) };
        Self {
            index,
            text,
            explanation,
            categories,
            raw,
            error: None,
        }
    }

    /// Build an entry for a failed model call; the batch continues past it
    pub const fn failed(index: usize, text: String) -> Self {
        Self {
            index,
            text,
            explanation: None,
            categories: Vec::new(),
            raw: None,
            error: Some(AI_CALL_FAILED),
        }
    }
}

/// Batch summary: result count and per-category averages in requested order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub avg_by_category: IndexMap<String, Option<f64>>,
}

/// Extract tweet texts from a parsed request body.
///
/// Field priority is `tweets` (array) > `tweet` (string) > `text` (string);
/// the first present shape wins and the others are ignored. Entries are
/// trimmed, and non-string or empty entries dropped.
pub fn parse_tweets(body: &Value) -> Vec<String> {
    match body.get("tweets").and_then(Value::as_array) {
        Some(list) => list
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string)
            .collect(),
        None => body
            .get("tweet")
            .and_then(Value::as_str)
            .or_else(|| body.get("text").and_then(Value::as_str))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| vec![t.to_string()])
            .unwrap_or_default(),
    }
}

/// Resolve the effective category list for a request.
///
/// Trims and drops unusable entries, falls back to [`DEFAULT_CATEGORIES`]
/// when nothing usable remains, then dedups (first occurrence wins) and
/// caps at [`MAX_CATEGORIES`].
pub fn resolve_categories(body: &Value) -> Vec<String> {
    let mut categories: Vec<String> = body
        .get("categories")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    if categories.is_empty() {
        categories = DEFAULT_CATEGORIES.iter().map(|c| (*c).to_string()).collect();
    }

    let deduped: IndexSet<String> = categories.into_iter().collect();
    deduped.into_iter().take(MAX_CATEGORIES).collect()
}

/// Round a raw model score and clamp it into [0, 10]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 10.0) as u8
}

/// Rebuild the category list from the model payload.
///
/// Iterates the *requested* names and looks each one up in the model's
/// `categories` array by exact case-sensitive match. Non-numeric or missing
/// scores become `None`. The output always has the requested cardinality
/// and order.
pub fn reconcile_scores(requested: &[String], payload: &Value) -> Vec<CategoryScore> {
    let returned = payload.get("categories").and_then(Value::as_array);
    requested
        .iter()
        .map(|name| {
            let score = returned
                .and_then(|list| {
                    list.iter()
                        .find(|entry| entry.get("name").and_then(Value::as_str) == Some(name.as_str()))
                })
                .and_then(|entry| entry.get("score"))
                .and_then(Value::as_f64)
                .map(clamp_score);
            CategoryScore {
                name: name.clone(),
                score,
            }
        })
        .collect()
}

/// Compute per-category averages over all results.
///
/// A category with no numeric contributions averages to `None`, never zero.
#[allow(clippy::cast_precision_loss)]
pub fn build_summary(results: &[TweetAnalysis], categories: &[String]) -> Option<Summary> {
    if results.is_empty() {
        return None;
    }

    let mut avg_by_category = IndexMap::with_capacity(categories.len());
    for name in categories {
        let scores: Vec<f64> = results
            .iter()
            .flat_map(|r| &r.categories)
            .filter(|c| &c.name == name)
            .filter_map(|c| c.score.map(f64::from))
            .collect();
        let avg = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };
        avg_by_category.insert(name.clone(), avg);
    }

    Some(Summary {
        total: results.len(),
        avg_by_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_tweets_array_priority() {
        let body = json!({"tweets": ["  a ", "b"], "tweet": "c", "text": "d"});
        assert_eq!(parse_tweets(&body), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_tweets_single_field_fallback() {
        let body = json!({"tweet": "  hello  "});
        assert_eq!(parse_tweets(&body), vec!["hello"]);

        let body = json!({"text": "world"});
        assert_eq!(parse_tweets(&body), vec!["world"]);

        // tweet wins over text even when it trims to nothing
        let body = json!({"tweet": "   ", "text": "world"});
        assert!(parse_tweets(&body).is_empty());
    }

    #[test]
    fn test_parse_tweets_drops_unusable_entries() {
        let body = json!({"tweets": ["ok", 42, null, "  ", {"x": 1}]});
        assert_eq!(parse_tweets(&body), vec!["ok"]);

        let body = json!({"tweets": []});
        assert!(parse_tweets(&body).is_empty());

        let body = json!({});
        assert!(parse_tweets(&body).is_empty());
    }

    #[test]
    fn test_resolve_categories_defaults_when_empty() {
        assert_eq!(resolve_categories(&json!({})), owned(&DEFAULT_CATEGORIES));
        assert_eq!(
            resolve_categories(&json!({"categories": ["  ", 3]})),
            owned(&DEFAULT_CATEGORIES)
        );
    }

    #[test]
    fn test_resolve_categories_dedup_and_cap() {
        let body = json!({
            "categories": ["A", "B", "A", "C", "D", "E", "F", "G", "H", "I"]
        });
        let resolved = resolve_categories(&body);
        assert_eq!(resolved, owned(&["A", "B", "C", "D", "E", "F", "G", "H"]));
        assert_eq!(resolved.len(), MAX_CATEGORIES);
    }

    #[test]
    fn test_resolve_categories_case_sensitive_dedup() {
        let body = json!({"categories": ["Fear", "fear", "Fear"]});
        assert_eq!(resolve_categories(&body), owned(&["Fear", "fear"]));
    }

    #[test]
    fn test_clamp_score_rounding_and_bounds() {
        assert_eq!(clamp_score(10.6), 10);
        assert_eq!(clamp_score(-3.0), 0);
        assert_eq!(clamp_score(6.4), 6);
        assert_eq!(clamp_score(6.5), 7);
        assert_eq!(clamp_score(0.0), 0);
        assert_eq!(clamp_score(10.0), 10);
    }

    #[test]
    fn test_reconcile_preserves_requested_order_and_cardinality() {
        let requested = owned(&["Fear", "Hype", "Uncertainty"]);
        // Model returns them shuffled, with an extra category and one missing
        let payload = json!({
            "categories": [
                {"name": "Hype", "score": 8},
                {"name": "Greed", "score": 9},
                {"name": "Fear", "score": 2}
            ]
        });
        let scores = reconcile_scores(&requested, &payload);
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], CategoryScore { name: "Fear".into(), score: Some(2) });
        assert_eq!(scores[1], CategoryScore { name: "Hype".into(), score: Some(8) });
        assert_eq!(scores[2], CategoryScore { name: "Uncertainty".into(), score: None });
    }

    #[test]
    fn test_reconcile_non_numeric_score_is_absent() {
        let requested = owned(&["Fear"]);
        let payload = json!({"categories": [{"name": "Fear", "score": "7"}]});
        assert_eq!(reconcile_scores(&requested, &payload)[0].score, None);

        let payload = json!({"categories": [{"name": "Fear"}]});
        assert_eq!(reconcile_scores(&requested, &payload)[0].score, None);
    }

    #[test]
    fn test_reconcile_clamps_out_of_range_scores() {
        let requested = owned(&["Fear", "Hype"]);
        let payload = json!({
            "categories": [
                {"name": "Fear", "score": 10.6},
                {"name": "Hype", "score": -3}
            ]
        });
        let scores = reconcile_scores(&requested, &payload);
        assert_eq!(scores[0].score, Some(10));
        assert_eq!(scores[1].score, Some(0));
    }

    #[test]
    fn test_reconcile_name_match_is_case_sensitive() {
        let requested = owned(&["Fear"]);
        let payload = json!({"categories": [{"name": "fear", "score": 5}]});
        assert_eq!(reconcile_scores(&requested, &payload)[0].score, None);
    }

    #[test]
    fn test_reconcile_without_categories_array() {
        let requested = owned(&["Fear", "Hype"]);
        let scores = reconcile_scores(&requested, &json!("free text"));
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|c| c.score.is_none()));
    }

    #[test]
    fn test_from_payload_extracts_explanation() {
        let requested = owned(&["Fear"]);
        let payload = json!({"explanation": "Mild concern.", "categories": []});
        let result = TweetAnalysis::from_payload(0, "t".into(), &requested, payload);
        assert_eq!(result.explanation.as_deref(), Some("Mild concern."));
        assert!(result.raw.is_some());
        assert!(result.error.is_none());

        // Non-string explanation is dropped
        let payload = json!({"explanation": 3, "categories": []});
        let result = TweetAnalysis::from_payload(0, "t".into(), &requested, payload);
        assert_eq!(result.explanation, None);
    }

    #[test]
    fn test_failed_entry_shape() {
        let result = TweetAnalysis::failed(2, "down".into());
        assert_eq!(result.index, 2);
        assert_eq!(result.explanation, None);
        assert!(result.categories.is_empty());
        assert!(result.raw.is_none());
        assert_eq!(result.error, Some(AI_CALL_FAILED));
    }

    #[test]
    fn test_summary_averages() {
        let requested = owned(&["Fear", "Hype"]);
        let results = vec![
            TweetAnalysis::from_payload(
                0,
                "a".into(),
                &requested,
                json!({"categories": [{"name": "Fear", "score": 4}]}),
            ),
            TweetAnalysis::from_payload(
                1,
                "b".into(),
                &requested,
                json!({"categories": [{"name": "Fear", "score": 7}]}),
            ),
        ];
        let summary = build_summary(&results, &requested).expect("summary");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.avg_by_category["Fear"], Some(5.5));
        // No numeric contribution at all stays absent, not zero
        assert_eq!(summary.avg_by_category["Hype"], None);
    }

    #[test]
    fn test_summary_ignores_failed_entries() {
        let requested = owned(&["Fear"]);
        let results = vec![
            TweetAnalysis::from_payload(
                0,
                "a".into(),
                &requested,
                json!({"categories": [{"name": "Fear", "score": 6}]}),
            ),
            TweetAnalysis::failed(1, "b".into()),
        ];
        let summary = build_summary(&results, &requested).expect("summary");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.avg_by_category["Fear"], Some(6.0));
    }

    #[test]
    fn test_summary_empty_results() {
        assert!(build_summary(&[], &owned(&["Fear"])).is_none());
    }

    #[test]
    fn test_summary_map_order_matches_requested() {
        let requested = owned(&["Zeta", "Alpha"]);
        let summary = build_summary(&[TweetAnalysis::failed(0, "x".into())], &requested)
            .expect("summary");
        let keys: Vec<&String> = summary.avg_by_category.keys().collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
    }
}
