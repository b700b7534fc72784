use crate::api::{ApiError, ApiResult, EnvConfig};
use crate::models::{ChatMessage, ChatRole};
use serde::{Deserialize, Serialize};

/// Steers the model toward short, practical wellness answers and away from
/// medical diagnosis.
pub(crate) const COACH_SYSTEM_PROMPT: &str = "You are Verve, a friendly fitness and wellness coach. \
Give short, practical answers about training, recovery, nutrition and healthy habits. \
You are not a medical professional: for symptoms, injuries or anything health-critical, \
recommend seeing a doctor instead of diagnosing.";

// generateContent wire format. The provider speaks camelCase; parts beyond
// plain text (inline data, tool calls) are out of scope for this client.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first candidate; multi-part answers are joined as-is.
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            return None;
        }

        let text = content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<String>();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn wire_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        // The provider calls the assistant side "model".
        ChatRole::Coach => "model",
    }
}

pub(crate) fn build_chat_request(history: &[ChatMessage], system: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: history
            .iter()
            .filter(|m| !m.text.trim().is_empty())
            .map(|m| Content {
                role: Some(wire_role(m.role).to_string()),
                parts: vec![Part {
                    text: m.text.clone(),
                }],
            })
            .collect(),
        system_instruction: Some(Content {
            role: None,
            parts: vec![Part {
                text: system.to_string(),
            }],
        }),
        generation_config: Some(GenerationConfig {
            temperature: Some(0.7),
            max_output_tokens: Some(512),
        }),
    }
}

/// Client for the generative text endpoint behind the coach page.
#[derive(Clone)]
pub(crate) struct AssistantClient {
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
}

impl AssistantClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            base_url,
            api_key,
            model,
        }
    }

    pub fn load_from_env() -> Self {
        let env = EnvConfig::new();
        Self::new(env.assistant_url, env.assistant_key, env.assistant_model)
    }

    fn generate_endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(&self.api_key)
        )
    }

    pub async fn generate(&self, history: &[ChatMessage]) -> ApiResult<String> {
        let request = build_chat_request(history, COACH_SYSTEM_PROMPT);

        let client = reqwest::Client::new();
        let res = client
            .post(self.generate_endpoint())
            .json(&request)
            .send()
            .await
            .map_err(ApiError::network)?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::http(status, body, "Coach request failed"));
        }

        let data: GenerateContentResponse = res.json().await.map_err(ApiError::parse)?;
        data.first_text()
            .ok_or_else(|| ApiError::parse("empty response from assistant"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: ChatRole, text: &str) -> ChatMessage {
        ChatMessage {
            id: format!("m-{}", text.len()),
            role,
            text: text.to_string(),
            at_ms: 0,
        }
    }

    #[test]
    fn test_request_serializes_to_provider_contract() {
        let history = [
            msg(ChatRole::User, "How often should I stretch?"),
            msg(ChatRole::Coach, "Daily, ten minutes is plenty."),
            msg(ChatRole::User, "Before or after lifting?"),
        ];
        let req = build_chat_request(&history, "be brief");
        let v = serde_json::to_value(req).expect("should serialize");

        assert_eq!(v["contents"].as_array().map(|a| a.len()), Some(3));
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["contents"][1]["role"], "model");
        assert_eq!(
            v["contents"][2]["parts"][0]["text"],
            "Before or after lifting?"
        );
        assert_eq!(v["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 512);
        // The system content carries no role.
        assert!(v["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_request_skips_blank_messages() {
        let history = [msg(ChatRole::User, "   "), msg(ChatRole::User, "hi")];
        let req = build_chat_request(&history, "s");
        assert_eq!(req.contents.len(), 1);
    }

    #[test]
    fn test_response_first_text_joins_parts() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Warm up first. "}, {"text": "Then lift."}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse =
            serde_json::from_str(json).expect("response should parse");
        assert_eq!(
            parsed.first_text().as_deref(),
            Some("Warm up first. Then lift.")
        );
    }

    #[test]
    fn test_response_without_candidates_yields_none() {
        let parsed: GenerateContentResponse =
            serde_json::from_str("{}").expect("empty object should parse");
        assert!(parsed.first_text().is_none());

        let blank: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#,
        )
        .expect("should parse");
        assert!(blank.first_text().is_none());
    }

    #[test]
    fn test_generate_endpoint_shape() {
        let c = AssistantClient::new(
            "https://generativelanguage.googleapis.com".to_string(),
            "secret key".to_string(),
            "gemini-2.0-flash".to_string(),
        );
        assert_eq!(
            c.generate_endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=secret%20key"
        );
    }
}
