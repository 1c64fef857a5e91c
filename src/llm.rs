use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LlmConfig;
use crate::models::Product;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected model output: {0}")]
    Parse(String),
}

/// Client for the hosted language model behind semantic search. The matching
/// itself happens remotely; this module only owns the prompt contract and
/// the shape of the reply.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

/// The slice of a product the model sees.
#[derive(Debug, Serialize)]
pub struct CandidateProduct {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub description: String,
    pub categories: Vec<String>,
}

impl From<&Product> for CandidateProduct {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            brand: p.brand.clone(),
            description: p.description.clone(),
            categories: p.categories.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct MatchReply {
    product_ids: Vec<String>,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Ask the model which candidates are a strong semantic match for the
    /// query. Returns raw id strings; callers drop ids they do not know.
    pub async fn match_products(
        &self,
        query: &str,
        candidates: &[CandidateProduct],
    ) -> Result<Vec<String>, LlmError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: build_prompt(query, candidates),
            }],
        };

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessagesResponse = response.json().await?;
        let text = body
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .ok_or_else(|| LlmError::Parse("no text block in response".into()))?;

        parse_match_reply(text)
    }
}

fn build_prompt(query: &str, candidates: &[CandidateProduct]) -> String {
    let mut prompt = String::from(
        "You are an expert product recommender for a perfume store. Your task is to \
         find products that are a good semantic match for a user's search query.\n\n",
    );
    prompt.push_str(&format!("Analyze the user's query: \"{query}\"\n\n"));
    prompt.push_str("Consider the following list of available products:\n");
    for c in candidates {
        prompt.push_str(&format!(
            "- Product ID: {}\n  Name: {}\n  Brand: {}\n  Description: {}\n  Categories: {}\n",
            c.id,
            c.name,
            c.brand,
            c.description,
            c.categories.join(", ")
        ));
    }
    prompt.push_str(
        "\nBased on the query, return the product IDs of the items that are the best \
         semantic fit. For example, if the query is \"a scent for summer\", you should \
         look for products with descriptions that mention \"fresh\", \"citrus\", \
         \"oceanic\", or \"light floral\" notes, even if the word \"summer\" isn't there.\n\
         \nReply with JSON of the form {\"product_ids\": [\"...\"]} and nothing else. \
         Do not include products that are only a weak match. If no products are a good \
         match, return an empty array.",
    );
    prompt
}

/// The reply must be the agreed JSON object; a fenced code block around it is
/// tolerated, anything else is a parse error.
fn parse_match_reply(text: &str) -> Result<Vec<String>, LlmError> {
    let trimmed = text.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim);

    let reply: MatchReply = serde_json::from_str(stripped)
        .map_err(|e| LlmError::Parse(format!("{e}: {stripped}")))?;
    Ok(reply.product_ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, description: &str) -> CandidateProduct {
        CandidateProduct {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: "Maison Test".into(),
            description: description.into(),
            categories: vec!["floral".into(), "fresh".into()],
        }
    }

    #[test]
    fn prompt_contains_query_and_every_candidate() {
        let candidates = vec![
            candidate("Sea Breeze", "citrus and oceanic notes"),
            candidate("Oud Nights", "deep smoky amber"),
        ];
        let prompt = build_prompt("a scent for summer", &candidates);

        assert!(prompt.contains("a scent for summer"));
        for c in &candidates {
            assert!(prompt.contains(&c.id.to_string()));
            assert!(prompt.contains(&c.name));
        }
        assert!(prompt.contains("weak match"));
    }

    #[test]
    fn parses_plain_json_reply() {
        let ids = parse_match_reply(r#"{"product_ids": ["a", "b"]}"#).unwrap();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn parses_fenced_json_reply() {
        let ids =
            parse_match_reply("```json\n{\"product_ids\": [\"x\"]}\n```").unwrap();
        assert_eq!(ids, vec!["x"]);
    }

    #[test]
    fn empty_list_is_a_valid_reply() {
        let ids = parse_match_reply(r#"{"product_ids": []}"#).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn prose_reply_is_a_parse_error() {
        let err = parse_match_reply("I think Sea Breeze fits best.").unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }
}
