//! Tolerant endpoint prober
//!
//! Action names differ between vendor deployments and cannot be discovered
//! up front. The prober tries candidate `(module, function)` pairs in order
//! and returns the first answer without `erro`.

use crate::error::{ClientError, ClientResult};
use crate::http::{Action, EnvelopeTransport, RpcRequest};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn EnvelopeTransport>,
}

impl Prober {
    pub fn new(transport: Arc<dyn EnvelopeTransport>) -> Self {
        Self { transport }
    }

    /// Try `preferred` (if any) and then `fallbacks`, one call each.
    ///
    /// Business errors and transport failures move on to the next candidate.
    /// Returns the success payload (`Value::Null` when `sucesso` is absent) or
    /// [`ClientError::ProbeExhausted`].
    pub async fn probe(
        &self,
        preferred: Option<&Action>,
        fallbacks: &[Action],
        body: &Value,
    ) -> ClientResult<Value> {
        let candidates = candidate_order(preferred, fallbacks);
        let mut attempts = 0;

        for action in candidates {
            attempts += 1;
            let request = RpcRequest::new(action.clone(), body.clone());
            match self.transport.call(request).await {
                Ok(envelope) => match envelope.into_result() {
                    Ok(payload) => {
                        tracing::info!(%action, attempts, "Probe succeeded");
                        return Ok(payload);
                    }
                    Err(message) => {
                        tracing::warn!(%action, error = %message, "Probe candidate rejected");
                    }
                },
                Err(e) => {
                    tracing::warn!(%action, error = %e, "Probe candidate failed");
                }
            }
        }

        Err(ClientError::ProbeExhausted { attempts })
    }
}

/// Preferred first, then fallbacks, without repeating a pair
fn candidate_order<'a>(preferred: Option<&'a Action>, fallbacks: &'a [Action]) -> Vec<&'a Action> {
    let mut order: Vec<&Action> = Vec::with_capacity(fallbacks.len() + 1);
    for action in preferred.into_iter().chain(fallbacks) {
        if !order.contains(&action) {
            order.push(action);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    const A: Action = Action::new("a", "b");
    const C: Action = Action::new("c", "d");
    const E: Action = Action::new("e", "f");

    #[tokio::test]
    async fn test_first_success_wins_and_stops() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .err(A, "função inexistente")
                .ok(C, json!({"ok": true}))
                .ok(E, json!({"ok": "never"})),
        );
        let prober = Prober::new(transport.clone());

        let payload = prober.probe(None, &[A, C, E], &json!({})).await.unwrap();
        assert_eq!(payload, json!({"ok": true}));
        assert_eq!(transport.called_actions(), vec![A, C]);
    }

    #[tokio::test]
    async fn test_transport_errors_are_swallowed() {
        // A has no scripted answer -> transport error
        let transport = Arc::new(ScriptedTransport::new().ok(C, Value::Null));
        let prober = Prober::new(transport.clone());

        let payload = prober.probe(None, &[A, C], &json!({})).await.unwrap();
        assert_eq!(payload, Value::Null);
    }

    #[tokio::test]
    async fn test_preferred_tried_first_once() {
        let transport = Arc::new(ScriptedTransport::new().err(C, "no").ok(A, json!(1)));
        let prober = Prober::new(transport.clone());

        let payload = prober.probe(Some(&C), &[C, A], &json!({})).await.unwrap();
        assert_eq!(payload, json!(1));
        assert_eq!(transport.called_actions(), vec![C, A]);
    }

    #[tokio::test]
    async fn test_exhausted() {
        let transport = Arc::new(ScriptedTransport::new().err(A, "x").err(C, "y"));
        let prober = Prober::new(transport.clone());

        let err = prober.probe(None, &[A, C], &json!({})).await.unwrap_err();
        assert!(matches!(err, ClientError::ProbeExhausted { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let prober = Prober::new(Arc::new(ScriptedTransport::new()));
        let err = prober.probe(None, &[], &json!({})).await.unwrap_err();
        assert!(matches!(err, ClientError::ProbeExhausted { attempts: 0 }));
    }
}
