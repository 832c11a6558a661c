use std::sync::Arc;

use async_trait::async_trait;
use buddy_core::model::{ProblemId, ProblemRecord};
use services::dispatcher::{Ack, AiReply, BackgroundDispatcher, Request, Response};
use services::generation::PromptIntent;

/// The panel's view of the background side. Calls never fail outright:
/// failures come back inside the reply shapes.
#[async_trait]
pub trait PanelBackend: Send + Sync {
    async fn load_problem(&self, problem_id: &ProblemId) -> Option<ProblemRecord>;

    async fn has_credential(&self) -> bool;

    async fn save_problem(&self, problem_id: &ProblemId, record: ProblemRecord) -> Ack;

    async fn ask(&self, intent: &PromptIntent, problem: &ProblemRecord) -> AiReply;
}

/// Talks to a `BackgroundDispatcher` through its message protocol.
#[derive(Clone)]
pub struct DispatcherBackend {
    dispatcher: Arc<BackgroundDispatcher>,
}

impl DispatcherBackend {
    #[must_use]
    pub fn new(dispatcher: Arc<BackgroundDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl PanelBackend for DispatcherBackend {
    async fn load_problem(&self, problem_id: &ProblemId) -> Option<ProblemRecord> {
        let request = Request::GetProblemData {
            problem_id: problem_id.clone(),
        };
        match self.dispatcher.dispatch(request).await {
            Response::Problem(record) => record,
            other => {
                tracing::warn!(?other, "unexpected reply to getProblemData");
                None
            }
        }
    }

    async fn has_credential(&self) -> bool {
        self.dispatcher.has_credential().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "credential probe failed");
            false
        })
    }

    async fn save_problem(&self, problem_id: &ProblemId, record: ProblemRecord) -> Ack {
        let request = Request::SaveProblemData {
            problem_id: problem_id.clone(),
            data: record,
        };
        match self.dispatcher.dispatch(request).await {
            Response::Ack(ack) => ack,
            other => Ack::failed(format!("unexpected reply: {other:?}")),
        }
    }

    async fn ask(&self, intent: &PromptIntent, problem: &ProblemRecord) -> AiReply {
        match self.dispatcher.dispatch(Request::ai(intent, problem.clone())).await {
            Response::Ai(reply) => reply,
            other => AiReply::Error {
                error: format!("unexpected reply: {other:?}"),
            },
        }
    }
}
