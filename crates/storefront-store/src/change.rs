//! Change notifications between store handles.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

use crate::OriginId;

/// A slot was written or deleted by some handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreChange {
    /// Key of the slot that changed.
    pub key: String,
    /// Handle that made the change.
    pub origin: OriginId,
}

/// Receives changes made through other handles of the same store.
///
/// Notifications from the feed's own handle are skipped. When the feed falls
/// behind, the oldest notifications are dropped; readers reload the slot
/// anyway, so only the fact that something changed matters.
#[derive(Debug)]
pub struct ChangeFeed {
    rx: broadcast::Receiver<StoreChange>,
    origin: OriginId,
}

impl ChangeFeed {
    pub(crate) fn new(rx: broadcast::Receiver<StoreChange>, origin: OriginId) -> Self {
        Self { rx, origin }
    }

    /// Take the next pending change without waiting.
    pub fn try_next(&mut self) -> Option<StoreChange> {
        loop {
            match self.rx.try_recv() {
                Ok(change) if change.origin == self.origin => continue,
                Ok(change) => return Some(change),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, origin = %self.origin, "change feed lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Take every pending change without waiting.
    pub fn drain(&mut self) -> Vec<StoreChange> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next change from another handle.
    ///
    /// Returns `None` once every handle of the store has been dropped.
    pub async fn next(&mut self) -> Option<StoreChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.origin == self.origin => continue,
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, origin = %self.origin, "change feed lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// The handle this feed belongs to.
    pub fn origin(&self) -> &OriginId {
        &self.origin
    }
}
