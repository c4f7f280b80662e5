//! Prompt construction for both endpoints, plus the structured-output
//! schema the sentiment call constrains the model with.

use crate::analysis::CategoryScore;
use crate::gateway::chat::Message;
use serde_json::{json, Value};

const SENTIMENT_SYSTEM: &str = concat!(
    "You are a precise classifier for financial tweets. ",
    "You MUST output a JSON object that matches the provided JSON schema. ",
    "Per-category analysis: ",
    "- You will be given a list of categories (e.g., Bullishness, Fear, Hype). ",
    "- For each category, output exactly one entry in the 'categories' array. ",
    "- Each entry must have 'name' equal to the input category name. ",
    "- Each entry must have 'score' as an integer from 0 to 10. ",
    "Overall explanation: ",
    "- Provide exactly ONE sentence summarizing the tweet's sentiment across all categories. ",
    "- It MUST be concise, factual, and directly reference the tweet content. ",
    "- It MUST be 10-30 words and contain a summary of your overall analysis. ",
    "IMPORTANT: ",
    "- The 'categories' array must contain ALL categories provided in the input, no more and no less. ",
    "- Do NOT add categories. ",
    "- Do NOT output anything except valid JSON that fits the schema.",
);

/// JSON schema for the sentiment call: one explanation sentence plus
/// name/score pairs, scores constrained to integers in [0, 10]
pub fn sentiment_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "explanation": {
                "type": "string",
                "description": "One-sentence overall explanation of the tweet sentiment across all categories."
            },
            "categories": {
                "type": "array",
                "description": "Per-category scores for the requested analysis dimensions.",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Category name exactly as provided in the input."
                        },
                        "score": {
                            "type": "integer",
                            "description": "Category intensity from 0 (not present) to 10 (extremely strong).",
                            "minimum": 0,
                            "maximum": 10
                        }
                    },
                    "required": ["name", "score"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["explanation", "categories"],
        "additionalProperties": false
    })
}

/// Messages for one sentiment-scoring call
pub fn sentiment_messages(text: &str, categories: &[String]) -> Vec<Message> {
    vec![
        Message::system(SENTIMENT_SYSTEM.to_string()),
        Message::user(format!(
            "Tweet: \"{text}\"\n\nCategories: {}\n\nReturn ONLY valid JSON according to the schema.",
            categories.join(", ")
        )),
    ]
}

/// Messages for one `/lucky` generation call; the flavor profile is a soft
/// intensity target embedded into the system prompt
pub fn lucky_messages(seed: &str, profile: &[CategoryScore]) -> Vec<Message> {
    let flavor_lines = profile
        .iter()
        .map(|c| format!("{}: {}/10", c.name, c.score.unwrap_or(0)))
        .collect::<Vec<_>>()
        .join("\n");

    let system = format!(
        concat!(
            "You generate realistic but fictional financial tweets. ",
            "The tweet should sound like a retail trader commenting on markets or a specific stock, ",
            "or something a touch random. ",
            "Do not give financial advice. ",
            "Do not use emojis or hashtags. ",
            "Keep it under 25 words. ",
            "You are given a random 'flavor profile' of categories with intensity scores from 0 to 10. ",
            "Write the tweet so that, overall, it roughly matches these intensities. ",
            "0 means not present at all, 10 means extremely strong.\n\n",
            "Flavor profile:\n{flavor}\n\n",
            "Return only the tweet text with no quotes or extra commentary."
        ),
        flavor = flavor_lines
    );

    vec![
        Message::system(system),
        Message::user(format!("Generate one tweet about: {seed}")),
    ]
}
