//! Shared state handed to every update handler.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use muraciet_core::guard::GuardPolicy;
use muraciet_core::types::ChatId;
use muraciet_core::validate::ValidationRules;
use muraciet_db::Storage;
use muraciet_telegram::BotApi;

use crate::config::BotConfig;
use crate::session::SessionStore;

/// Process-wide executor channel id.
///
/// Read-mostly; the only writer is the migration path when Telegram reports
/// the group was upgraded to a supergroup. Last writer wins, which is fine:
/// migrations are rare and every delivery retries individually. Zero means
/// no channel is configured.
pub struct ExecutorChannel {
    id: AtomicI64,
}

impl ExecutorChannel {
    pub fn new(chat_id: Option<ChatId>) -> Self {
        Self {
            id: AtomicI64::new(chat_id.unwrap_or(0)),
        }
    }

    pub fn get(&self) -> Option<ChatId> {
        match self.id.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }

    /// Adopt the post-migration chat id for the rest of this process's
    /// lifetime.
    pub fn migrate(&self, new_id: ChatId) {
        let old = self.id.swap(new_id, Ordering::Relaxed);
        tracing::warn!(old, new = new_id, "Executor channel migrated");
    }
}

pub struct AppState {
    pub api: BotApi,
    pub storage: Arc<dyn Storage>,
    pub config: BotConfig,
    pub sessions: Arc<SessionStore>,
    pub channel: ExecutorChannel,
    pub rules: ValidationRules,
    pub policy: GuardPolicy,
    /// Bot username from `getMe`, used to build deep links.
    pub bot_username: String,
}

impl AppState {
    pub fn new(api: BotApi, storage: Arc<dyn Storage>, config: BotConfig, bot_username: String) -> Self {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(config.session_ttl_secs)));
        let channel = ExecutorChannel::new(config.executor_chat_id);
        let policy = config.guard_policy();
        Self {
            api,
            storage,
            config,
            sessions,
            channel,
            rules: ValidationRules::default(),
            policy,
            bot_username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_treats_zero_as_unset() {
        assert_eq!(ExecutorChannel::new(None).get(), None);
        assert_eq!(ExecutorChannel::new(Some(-100123)).get(), Some(-100123));
    }

    #[test]
    fn migration_adopts_the_new_id() {
        let channel = ExecutorChannel::new(Some(-100123));
        channel.migrate(-100999);
        assert_eq!(channel.get(), Some(-100999));
    }
}
