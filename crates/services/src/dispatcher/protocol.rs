//! Message shapes exchanged between the panel and the background dispatcher.
//!
//! Every request carries a `type` discriminant. Responses are untagged and
//! match the per-request shapes: `{text}` / `{error}` for generation,
//! a record or `null` for lookups, `{success[, error]}` for writes.

use buddy_core::model::{HintLevel, ProblemId, ProblemRecord};
use serde::{Deserialize, Serialize};

use crate::generation::PromptIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AiRequestKind {
    Hint,
    Solution,
    Review,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "getAIResponse", rename_all = "camelCase")]
    GetAiResponse {
        request_type: AiRequestKind,
        problem: ProblemRecord,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
    #[serde(rename = "getProblemData", rename_all = "camelCase")]
    GetProblemData { problem_id: ProblemId },
    #[serde(rename = "saveProblemData", rename_all = "camelCase")]
    SaveProblemData {
        problem_id: ProblemId,
        data: ProblemRecord,
    },
    #[serde(rename = "deleteNotes", rename_all = "camelCase")]
    DeleteNotes { problem_id: ProblemId },
}

impl Request {
    #[must_use]
    pub fn ai(intent: &PromptIntent, problem: ProblemRecord) -> Self {
        let (request_type, level, code) = match intent {
            PromptIntent::Hint(level) => (AiRequestKind::Hint, Some(level.value()), None),
            PromptIntent::Solution => (AiRequestKind::Solution, None, None),
            PromptIntent::Review { code } => (AiRequestKind::Review, None, Some(code.clone())),
        };
        Request::GetAiResponse {
            request_type,
            problem,
            level,
            code,
        }
    }
}

/// `{text}` on success, `{error}` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AiReply {
    Text { text: String },
    Error { error: String },
}

/// `{success: true}` or `{success: false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Ai(AiReply),
    Ack(Ack),
    Problem(Option<ProblemRecord>),
}

/// Fire-and-forget notifications from the dashboard to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PanelSignal {
    ApiKeyUpdated,
    TogglePanel,
}

/// Turns the wire fields of a `getAIResponse` request back into an intent.
///
/// # Errors
///
/// Returns a user-facing message when the level or code is missing or invalid.
pub fn intent_from_wire(
    kind: AiRequestKind,
    level: Option<u8>,
    code: Option<String>,
) -> Result<PromptIntent, String> {
    match kind {
        AiRequestKind::Hint => {
            let level = level.ok_or_else(|| "Hint level is required.".to_string())?;
            HintLevel::new(level)
                .map(PromptIntent::Hint)
                .map_err(|err| err.to_string())
        }
        AiRequestKind::Solution => Ok(PromptIntent::Solution),
        AiRequestKind::Review => Ok(PromptIntent::Review {
            code: code.unwrap_or_default(),
        }),
    }
}
