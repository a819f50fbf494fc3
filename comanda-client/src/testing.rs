//! Scripted transport for unit tests

use crate::error::{ClientError, ClientResult};
use crate::http::{Action, EnvelopeTransport, RpcRequest};
use async_trait::async_trait;
use serde_json::Value;
use shared::response::Envelope;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Answers each action from a per-action queue and records every request
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<HashMap<Action, VecDeque<ClientResult<Envelope>>>>,
    requests: Mutex<Vec<RpcRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, action: Action, response: ClientResult<Envelope>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(action)
            .or_default()
            .push_back(response);
        self
    }

    pub(crate) fn ok(self, action: Action, payload: Value) -> Self {
        self.respond(action, Ok(Envelope::ok(payload)))
    }

    pub(crate) fn err(self, action: Action, message: &str) -> Self {
        self.respond(action, Ok(Envelope::err(message)))
    }

    pub(crate) fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn called_actions(&self) -> Vec<Action> {
        self.requests().into_iter().map(|r| r.action).collect()
    }
}

#[async_trait]
impl EnvelopeTransport for ScriptedTransport {
    async fn call(&self, request: RpcRequest) -> ClientResult<Envelope> {
        let action = request.action.clone();
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .get_mut(&action)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(ClientError::Status { status: 404, body: format!("no route for {action}") }))
    }
}
