//! Message-routed façade consumed by the panel.
//!
//! Each request type is handled independently. Record upserts serialise on an
//! async mutex so the read → reduce → write sequence of one request never
//! interleaves with another's.

mod protocol;

use std::sync::Arc;

use buddy_core::model::{HintLevel, ProblemId, ProblemRecord, StatsDelta};
use serde_json::Value;
use storage::codec::{decode_api_key, decode_problems, decode_stats, encode};
use storage::repository::{Entries, KeyValueStore, StoreKey};
use tokio::sync::Mutex;

use crate::error::{DispatchError, GenerationError};
use crate::generation::{GenerationGateway, PromptIntent, build_prompt};

pub use protocol::{
    Ack, AiReply, AiRequestKind, PanelSignal, Request, Response, intent_from_wire,
};

#[derive(Clone)]
pub struct BackgroundDispatcher {
    store: Arc<dyn KeyValueStore>,
    generation: Arc<dyn GenerationGateway>,
    write_lock: Arc<Mutex<()>>,
}

impl BackgroundDispatcher {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, generation: Arc<dyn GenerationGateway>) -> Self {
        Self {
            store,
            generation,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Route one typed request.
    pub async fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::GetAiResponse {
                request_type,
                problem,
                level,
                code,
            } => {
                let reply = match intent_from_wire(request_type, level, code) {
                    Ok(intent) => self.ai_reply(&intent, &problem).await,
                    Err(error) => AiReply::Error { error },
                };
                Response::Ai(reply)
            }
            Request::GetProblemData { problem_id } => match self.get_problem_data(&problem_id).await {
                Ok(record) => Response::Problem(record),
                Err(err) => {
                    tracing::warn!(%problem_id, error = %err, "problem lookup failed");
                    Response::Problem(None)
                }
            },
            Request::SaveProblemData { problem_id, data } => {
                match self.save_problem_data(&problem_id, data).await {
                    Ok(()) => Response::Ack(Ack::ok()),
                    Err(err) => Response::Ack(Ack::failed(err.to_string())),
                }
            }
            Request::DeleteNotes { problem_id } => match self.delete_notes(&problem_id).await {
                Ok(()) => Response::Ack(Ack::ok()),
                Err(err) => Response::Ack(Ack::failed(err.to_string())),
            },
        }
    }

    /// Route a raw JSON message. Unknown or malformed messages get no reply.
    pub async fn dispatch_json(&self, message: Value) -> Option<Value> {
        let request: Request = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unrecognised message");
                return None;
            }
        };
        let response = self.dispatch(request).await;
        serde_json::to_value(response).ok()
    }

    /// Generation round trip, flattened into the wire reply.
    pub async fn ai_reply(&self, intent: &PromptIntent, problem: &ProblemRecord) -> AiReply {
        match self.get_ai_response(intent, problem).await {
            Ok(text) => AiReply::Text { text },
            Err(err) => {
                tracing::info!(kind = intent.label(), error = %err, "assistant request failed");
                AiReply::Error {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Produce assistant text for the intent.
    ///
    /// Hint requests are checked against the stored progress of the problem
    /// named by `problem.url`: only level `hintsUsed + 1` is granted, and a
    /// request without a usable identifier is refused.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Generation` with `MissingCredential` when no key
    /// is stored, `DispatchError::ProblemId` when `problem.url` is not a problem
    /// URL, `DispatchError::Hint` for a level other than the next, or any
    /// gateway error.
    pub async fn get_ai_response(
        &self,
        intent: &PromptIntent,
        problem: &ProblemRecord,
    ) -> Result<String, DispatchError> {
        let entries = self.store.get(&[StoreKey::ApiKey]).await?;
        let credential =
            decode_api_key(&entries)?.ok_or(GenerationError::MissingCredential)?;

        if let PromptIntent::Hint(level) = intent {
            self.check_hint_gate(*level, problem).await?;
        }

        let prompt = build_prompt(intent, problem);
        Ok(self.generation.generate(&credential, &prompt).await?)
    }

    async fn check_hint_gate(&self, level: HintLevel, problem: &ProblemRecord) -> Result<(), DispatchError> {
        let problem_id: ProblemId = problem.url.parse()?;
        let unlocked = self
            .get_problem_data(&problem_id)
            .await?
            .map_or(0, |record| record.hints_used);
        level.ensure_next(unlocked)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DispatchError::Storage` if the store cannot be read or decoded.
    pub async fn get_problem_data(&self, problem_id: &ProblemId) -> Result<Option<ProblemRecord>, DispatchError> {
        let entries = self.store.get(&[StoreKey::Problems]).await?;
        let mut problems = decode_problems(&entries)?;
        Ok(problems.remove(problem_id))
    }

    /// Upsert a record and fold its delta into the aggregate stats.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Storage` if the read or the write fails.
    pub async fn save_problem_data(&self, problem_id: &ProblemId, data: ProblemRecord) -> Result<(), DispatchError> {
        let _guard = self.write_lock.lock().await;

        let entries = self.store.get(&[StoreKey::Stats, StoreKey::Problems]).await?;
        let mut stats = decode_stats(&entries)?;
        let mut problems = decode_problems(&entries)?;

        let delta = StatsDelta::between(problems.get(problem_id), &data);
        stats.apply(delta);
        problems.insert(problem_id.clone(), data);

        let mut update = Entries::new();
        encode(&mut update, StoreKey::Stats, &stats)?;
        encode(&mut update, StoreKey::Problems, &problems)?;
        self.store.set(update).await?;

        tracing::debug!(%problem_id, ?delta, "problem record saved");
        Ok(())
    }

    /// Clear a problem's notes, keeping the rest of its record.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::NotFound` when no record exists for the identifier.
    pub async fn delete_notes(&self, problem_id: &ProblemId) -> Result<(), DispatchError> {
        let _guard = self.write_lock.lock().await;

        let entries = self.store.get(&[StoreKey::Problems]).await?;
        let mut problems = decode_problems(&entries)?;
        let record = problems.get_mut(problem_id).ok_or(DispatchError::NotFound)?;
        record.clear_notes();

        let mut update = Entries::new();
        encode(&mut update, StoreKey::Problems, &problems)?;
        self.store.set(update).await?;
        Ok(())
    }

    /// Whether a usable credential is stored.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Storage` if the store cannot be read.
    pub async fn has_credential(&self) -> Result<bool, DispatchError> {
        let entries = self.store.get(&[StoreKey::ApiKey]).await?;
        Ok(decode_api_key(&entries)?.is_some())
    }
}
