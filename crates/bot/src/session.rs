//! Transient per-user conversation state.
//!
//! Two maps behind one mutex: citizen intake flows, keyed by submitter id,
//! and executor pending actions, keyed by actor id. Entries expire after a
//! TTL; expiry is enforced on access and by a janitor task, so an abandoned
//! dialog cannot pin memory. Sessions are in-memory only — a restart drops
//! them, which is an accepted limitation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use muraciet_core::intake::IntakeFlow;
use muraciet_core::types::{ChatId, DbId, UserId};

/// How often the janitor pass runs.
const JANITOR_INTERVAL: Duration = Duration::from_secs(300);

/// Which executor sub-dialog a pending action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Reply,
    Reject,
    EditReply,
}

impl ActionKind {
    /// Verb used in deep-link payloads.
    pub fn verb(&self) -> &'static str {
        match self {
            ActionKind::Reply => "reply",
            ActionKind::Reject => "reject",
            ActionKind::EditReply => "edit",
        }
    }
}

/// The channel message an action was entered from, kept for the in-place
/// edit after completion.
#[derive(Debug, Clone)]
pub struct PendingOrigin {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub content: String,
    pub has_photo: bool,
}

/// An executor's in-flight reply/reject/edit dialog.
///
/// `origin` is `None` when the dialog was re-entered from a deep link after
/// the original association was lost; completion then skips the channel
/// message edit.
#[derive(Debug, Clone)]
pub struct PendingAction {
    pub record_id: DbId,
    pub kind: ActionKind,
    pub origin: Option<PendingOrigin>,
}

struct Entry<T> {
    value: T,
    touched: Instant,
}

impl<T> Entry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            touched: Instant::now(),
        }
    }
}

#[derive(Default)]
struct Inner {
    intake: HashMap<UserId, Entry<IntakeFlow>>,
    pending: HashMap<UserId, Entry<PendingAction>>,
}

pub struct SessionStore {
    inner: Mutex<Inner>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl,
        }
    }

    /// Begin (or restart) an intake conversation for a submitter.
    pub async fn start_intake(&self, user_id: UserId, flow: IntakeFlow) {
        let mut inner = self.inner.lock().await;
        inner.intake.insert(user_id, Entry::new(flow));
    }

    /// Remove and return the submitter's intake flow, if any and not
    /// expired. The caller puts it back with [`restore_intake`] unless the
    /// conversation ended.
    ///
    /// [`restore_intake`]: Self::restore_intake
    pub async fn take_intake(&self, user_id: UserId) -> Option<IntakeFlow> {
        let mut inner = self.inner.lock().await;
        let entry = inner.intake.remove(&user_id)?;
        (entry.touched.elapsed() < self.ttl).then_some(entry.value)
    }

    pub async fn restore_intake(&self, user_id: UserId, flow: IntakeFlow) {
        self.start_intake(user_id, flow).await;
    }

    pub async fn has_intake(&self, user_id: UserId) -> bool {
        let inner = self.inner.lock().await;
        matches!(inner.intake.get(&user_id), Some(e) if e.touched.elapsed() < self.ttl)
    }

    pub async fn end_intake(&self, user_id: UserId) {
        let mut inner = self.inner.lock().await;
        inner.intake.remove(&user_id);
    }

    pub async fn set_pending(&self, user_id: UserId, action: PendingAction) {
        let mut inner = self.inner.lock().await;
        inner.pending.insert(user_id, Entry::new(action));
    }

    pub async fn take_pending(&self, user_id: UserId) -> Option<PendingAction> {
        let mut inner = self.inner.lock().await;
        let entry = inner.pending.remove(&user_id)?;
        (entry.touched.elapsed() < self.ttl).then_some(entry.value)
    }

    pub async fn restore_pending(&self, user_id: UserId, action: PendingAction) {
        self.set_pending(user_id, action).await;
    }

    /// Drop every expired entry, returning how many went.
    pub async fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let ttl = self.ttl;
        let before = inner.intake.len() + inner.pending.len();
        inner.intake.retain(|_, e| e.touched.elapsed() < ttl);
        inner.pending.retain(|_, e| e.touched.elapsed() < ttl);
        before - (inner.intake.len() + inner.pending.len())
    }
}

/// Periodic cleanup of abandoned sessions. Runs until `cancel` fires.
pub async fn run_janitor(sessions: Arc<SessionStore>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(JANITOR_INTERVAL);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session janitor stopping");
                break;
            }
            _ = interval.tick() => {
                let purged = sessions.purge_expired().await;
                if purged > 0 {
                    tracing::debug!(purged, "Session janitor: dropped expired sessions");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ttl_ms: u64) -> SessionStore {
        SessionStore::new(Duration::from_millis(ttl_ms))
    }

    #[tokio::test]
    async fn take_removes_the_entry() {
        let sessions = store(60_000);
        sessions.start_intake(42, IntakeFlow::new()).await;
        assert!(sessions.has_intake(42).await);
        assert!(sessions.take_intake(42).await.is_some());
        assert!(sessions.take_intake(42).await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_dropped_on_access() {
        let sessions = store(1);
        sessions.start_intake(42, IntakeFlow::new()).await;
        sessions
            .set_pending(
                7,
                PendingAction {
                    record_id: 1,
                    kind: ActionKind::Reply,
                    origin: None,
                },
            )
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(sessions.take_intake(42).await.is_none());
        assert!(sessions.take_pending(7).await.is_none());
    }

    #[tokio::test]
    async fn purge_counts_expired_entries() {
        let sessions = store(1);
        sessions.start_intake(1, IntakeFlow::new()).await;
        sessions.start_intake(2, IntakeFlow::new()).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(sessions.purge_expired().await, 2);
        assert_eq!(sessions.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn sessions_are_keyed_per_user() {
        let sessions = store(60_000);
        sessions.start_intake(1, IntakeFlow::new()).await;
        sessions
            .set_pending(
                1,
                PendingAction {
                    record_id: 9,
                    kind: ActionKind::EditReply,
                    origin: None,
                },
            )
            .await;
        // A different user sees neither.
        assert!(!sessions.has_intake(2).await);
        assert!(sessions.take_pending(2).await.is_none());
        // Intake and pending maps are independent for the same user.
        assert!(sessions.has_intake(1).await);
        let pending = sessions.take_pending(1).await.unwrap();
        assert_eq!(pending.record_id, 9);
        assert_eq!(pending.kind, ActionKind::EditReply);
    }
}
