//! In-flight call table

use std::collections::HashMap;

use parking_lot::Mutex;
use pubsub_rpc_protocol::{JsonRpcResponse, RequestId};
use tokio::sync::oneshot;

use crate::error::{ClientError, ClientResult};

type Outcome = ClientResult<JsonRpcResponse>;

/// Calls awaiting a response, keyed by correlation id.
///
/// Each entry is settled at most once: whoever removes it (response,
/// timeout, disconnect or a dropped caller) decides the outcome.
#[derive(Debug, Default)]
pub(crate) struct PendingCalls {
    calls: Mutex<HashMap<RequestId, oneshot::Sender<Outcome>>>,
}

impl PendingCalls {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a call. The returned guard forgets the entry when dropped.
    pub(crate) fn register(&self, id: RequestId) -> (PendingGuard<'_>, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().insert(id.clone(), tx);
        (PendingGuard { pending: self, id }, rx)
    }

    /// Settle a call. Returns false if no call with this id is pending.
    pub(crate) fn complete(&self, id: &RequestId, outcome: Outcome) -> bool {
        let Some(tx) = self.calls.lock().remove(id) else {
            return false;
        };
        // The caller may have stopped waiting in the meantime
        let _ = tx.send(outcome);
        true
    }

    /// Fail every pending call with the error built by `reason`
    pub(crate) fn reject_all(&self, reason: impl Fn() -> ClientError) -> usize {
        let drained: Vec<_> = self.calls.lock().drain().collect();
        let count = drained.len();
        for (_, tx) in drained {
            let _ = tx.send(Err(reason()));
        }
        count
    }

    pub(crate) fn len(&self) -> usize {
        self.calls.lock().len()
    }

    fn forget(&self, id: &RequestId) {
        self.calls.lock().remove(id);
    }
}

/// Removes its call from the table on drop (timeout or caller gave up)
pub(crate) struct PendingGuard<'a> {
    pending: &'a PendingCalls,
    id: RequestId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.forget(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_complete_settles_once() {
        let pending = PendingCalls::new();
        let id = RequestId::from("a-1");
        let (_guard, rx) = pending.register(id.clone());

        let response = JsonRpcResponse::success(Some(id.clone()), serde_json::json!(5));
        assert!(pending.complete(&id, Ok(response.clone())));
        assert!(!pending.complete(&id, Ok(response.clone())));

        assert_eq!(rx.await.unwrap().unwrap(), response);
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn test_guard_forgets_entry() {
        let pending = PendingCalls::new();
        let id = RequestId::from("a-1");
        {
            let (_guard, _rx) = pending.register(id.clone());
            assert_eq!(pending.len(), 1);
        }
        assert_eq!(pending.len(), 0);
        assert!(!pending.complete(&id, Err(ClientError::Timeout)));
    }

    #[tokio::test]
    async fn test_reject_all() {
        let pending = PendingCalls::new();
        let (_g1, rx1) = pending.register(RequestId::from("a-1"));
        let (_g2, rx2) = pending.register(RequestId::from("a-2"));

        assert_eq!(pending.reject_all(|| ClientError::Disconnected), 2);
        assert!(matches!(rx1.await.unwrap(), Err(ClientError::Disconnected)));
        assert!(matches!(rx2.await.unwrap(), Err(ClientError::Disconnected)));
        assert_eq!(pending.len(), 0);
    }
}
