//! The external classifier seam: best-effort semantic choice mapping.
//!
//! The resolver depends on a small async interface rather than a concrete
//! HTTP client so the deterministic fallback can be tested in isolation.
//! `SolarClassifier` is the production implementation, asking Upstage Solar
//! for a JSON object naming one candidate id.

use crate::encounter::Choice;
use async_trait::async_trait;
use serde::Deserialize;
use solar::{Message, Request, Solar};
use thiserror::Error;

const CLASSIFY_MAX_TOKENS: usize = 150;
const CLASSIFY_TEMPERATURE: f32 = 0.2;

const SYSTEM_PROMPT: &str = "You map player input to game choice IDs. \
Reply only with JSON: {\"choice_id\": \"exact_id_from_list\"}. No other text.";

const SCENARIO_BASE: &str = "플레이어는 핵전쟁 이후의 폐허가 된 서울에서 생존하고 있습니다.";

/// Why a classification attempt produced nothing usable.
///
/// Every variant is recovered by falling through to the lexical fallback;
/// none of these reach the player.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Unusable classifier response: {0}")]
    Parse(String),
}

impl From<solar::Error> for ClassifyError {
    fn from(error: solar::Error) -> Self {
        match error {
            solar::Error::Parse(message) => ClassifyError::Parse(message),
            other => ClassifyError::Unavailable(other.to_string()),
        }
    }
}

/// A candidate choice rendered for the classifier prompt.
#[derive(Debug, Clone)]
pub struct CandidateSummary {
    pub id: String,
    pub description: String,
    /// Requirement hint shown to the classifier. Resource thresholds are
    /// always included; the gadget list only when the choice's results
    /// would change the inventory.
    pub requirement_hint: Option<String>,
}

impl CandidateSummary {
    /// Render one choice for the prompt.
    pub fn from_choice(choice: &Choice) -> Self {
        let mut hints = Vec::new();

        if let Some(requirements) = &choice.requirements {
            if let Some(resources) = &requirements.resources {
                for (kind, minimum) in resources {
                    hints.push(format!("{kind} {minimum} 이상"));
                }
            }
            if choice.results.touches_gadgets() {
                if let Some(gadgets) = &requirements.gadgets {
                    if !gadgets.is_empty() {
                        hints.push(format!("필요 가젯: {}", gadgets.join(", ")));
                    }
                }
            }
        }

        Self {
            id: choice.id.clone(),
            description: choice.match_text().to_string(),
            requirement_hint: (!hints.is_empty()).then(|| hints.join(" / ")),
        }
    }
}

/// A classification request: player text plus rendered candidates.
#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    pub player_input: String,
    pub scenario_name: Option<String>,
    pub scenario_description: Option<String>,
    pub candidates: Vec<CandidateSummary>,
}

/// The classifier's answer: one proposed candidate identifier.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub choice_id: String,
}

/// Maps player input to a candidate id, best-effort.
#[async_trait]
pub trait ChoiceClassifier: Send + Sync {
    async fn classify(&self, request: &ClassifyRequest) -> Result<Proposal, ClassifyError>;
}

/// Production classifier backed by the Upstage Solar chat API.
pub struct SolarClassifier {
    client: Solar,
}

impl SolarClassifier {
    pub fn new(client: Solar) -> Self {
        Self { client }
    }

    /// Create from the UPSTAGE_API_KEY environment variable.
    pub fn from_env() -> Result<Self, solar::Error> {
        Ok(Self::new(Solar::from_env()?))
    }

    fn build_prompt(request: &ClassifyRequest) -> String {
        let mut scenario = String::from(SCENARIO_BASE);
        if let Some(name) = &request.scenario_name {
            scenario.push_str(&format!("\n\n**지금 겪는 일**: {name}"));
        }
        if let Some(description) = &request.scenario_description {
            scenario.push_str(&format!("\n{description}"));
        }

        let mut candidates = String::new();
        for (index, candidate) in request.candidates.iter().enumerate() {
            candidates.push_str(&format!(
                "{}. ID: {}\n   설명: {}\n",
                index + 1,
                candidate.id,
                candidate.description
            ));
            if let Some(hint) = &candidate.requirement_hint {
                candidates.push_str(&format!("   조건: {hint}\n"));
            }
        }

        let id_list = request
            .candidates
            .iter()
            .map(|candidate| candidate.id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let example_id = request
            .candidates
            .first()
            .map(|candidate| candidate.id.as_str())
            .unwrap_or("choice_1");

        format!(
            r#"당신은 텍스트 어드벤처 게임의 AI입니다. **현재 시나리오**를 바탕으로 플레이어의 입력과 가장 적합한 선택지를 판단해주세요.

## 현재 시나리오 (상황)
{scenario}

## 사용 가능한 선택지 (반드시 아래 ID 중 하나를 그대로 사용)
{candidates}

## 플레이어 입력
"{input}"

위 플레이어 입력이 **이 시나리오 안에서** 어떤 선택지에 해당하는지 판단하고, 해당 선택지의 ID만 반환하세요.
가능한 ID: {id_list}
**반드시 위 목록에 있는 ID를 그대로** 사용해야 합니다. JSON 형식으로만 답하세요. 다른 설명 금지.
예시: {{"choice_id": "{example_id}"}}"#,
            input = request.player_input,
        )
    }
}

/// Response shape we expect from the model.
#[derive(Debug, Deserialize)]
struct ClassifierReply {
    #[serde(default)]
    choice_id: String,
}

#[async_trait]
impl ChoiceClassifier for SolarClassifier {
    async fn classify(&self, request: &ClassifyRequest) -> Result<Proposal, ClassifyError> {
        let prompt = Self::build_prompt(request);

        let api_request = Request::new(vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(prompt),
        ])
        .with_max_tokens(CLASSIFY_MAX_TOKENS)
        .with_temperature(CLASSIFY_TEMPERATURE)
        .with_json_mode();

        let response = self.client.complete(api_request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(ClassifyError::Parse("empty response body".to_string()));
        }

        let reply: ClassifierReply = serde_json::from_str(extract_json(text))
            .map_err(|e| ClassifyError::Parse(format!("{e}: {text}")))?;

        let choice_id = reply.choice_id.trim().to_string();
        if choice_id.is_empty() {
            return Err(ClassifyError::Parse("response carried no choice_id".to_string()));
        }

        tracing::debug!(choice_id = %choice_id, "classifier proposal");
        Ok(Proposal { choice_id })
    }
}

/// Extract JSON from a response that might have markdown code fences.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let content_start = start + 7;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let content_start = start + 3;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn choice(value: serde_json::Value) -> Choice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_json_plain() {
        let text = r#"{"choice_id": "choice_run"}"#;
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn test_extract_json_fenced() {
        let text = "```json\n{\"choice_id\": \"choice_run\"}\n```";
        assert_eq!(extract_json(text), r#"{"choice_id": "choice_run"}"#);
    }

    #[test]
    fn test_extract_json_fence_without_specifier() {
        let text = "```\n{\"choice_id\": \"x\"}\n```";
        assert_eq!(extract_json(text), r#"{"choice_id": "x"}"#);
    }

    #[test]
    fn test_candidate_resource_hint_always_shown() {
        let summary = CandidateSummary::from_choice(&choice(json!({
            "id": "choice_bribe",
            "text": "뇌물을 준다",
            "requirements": { "resources": { "money": 2 } }
        })));
        assert!(summary.requirement_hint.unwrap().contains("money 2"));
    }

    #[test]
    fn test_candidate_gadget_hint_only_with_gadget_results() {
        // Gadget requirement without gadget results: hint suppressed.
        let quiet = CandidateSummary::from_choice(&choice(json!({
            "id": "choice_fight",
            "text": "싸운다",
            "requirements": { "gadgets": ["권총"] }
        })));
        assert!(quiet.requirement_hint.is_none());

        // Same requirement, but the choice trades gadgets: hint shown.
        let loud = CandidateSummary::from_choice(&choice(json!({
            "id": "choice_fight",
            "text": "싸운다",
            "requirements": { "gadgets": ["권총"] },
            "results": { "gadgets": [{ "action": "lose", "id": "권총" }] }
        })));
        assert!(loud.requirement_hint.unwrap().contains("권총"));
    }

    #[test]
    fn test_prompt_lists_candidates_and_ids() {
        let request = ClassifyRequest {
            player_input: "도망갈게".to_string(),
            scenario_name: Some("약탈자들".to_string()),
            scenario_description: Some("세 명이 길을 막고 있다.".to_string()),
            candidates: vec![
                CandidateSummary {
                    id: "choice_fight".to_string(),
                    description: "싸운다".to_string(),
                    requirement_hint: None,
                },
                CandidateSummary {
                    id: "choice_run".to_string(),
                    description: "도망간다".to_string(),
                    requirement_hint: None,
                },
            ],
        };

        let prompt = SolarClassifier::build_prompt(&request);
        assert!(prompt.contains("choice_fight, choice_run"));
        assert!(prompt.contains("2. ID: choice_run"));
        assert!(prompt.contains("약탈자들"));
        assert!(prompt.contains("도망갈게"));
        assert!(prompt.contains(r#"{"choice_id": "choice_fight"}"#));
    }
}
