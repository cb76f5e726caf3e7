//! Environment-driven configuration.

use std::collections::HashSet;

use muraciet_core::guard::GuardPolicy;
use muraciet_core::types::{ChatId, UserId};

/// Service configuration loaded from environment variables.
///
/// The bot token and database URL are required; everything else has a
/// default suitable for the production deployment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot API token (`BOT_TOKEN`). Required.
    pub token: String,
    /// Database URL (`DATABASE_URL`). Required; the scheme picks the
    /// storage backend.
    pub database_url: String,
    /// Executor moderation channel (`EXECUTOR_CHAT_ID`). Unset means new
    /// records are persisted but not routed anywhere.
    pub executor_chat_id: Option<ChatId>,
    /// Administrator identities (`ADMIN_USER_IDS`, comma-separated).
    pub admin_user_ids: HashSet<UserId>,
    /// Max submissions per submitter per trailing 24 h
    /// (`MAX_DAILY_SUBMISSIONS`); `0` disables the limit.
    pub max_daily_submissions: Option<u32>,
    /// Rejections that trigger auto-blacklisting
    /// (`AUTO_BLACKLIST_THRESHOLD`); `0` disables the rule.
    pub auto_blacklist_threshold: Option<u32>,
    /// Trailing window for counting rejections, in days
    /// (`AUTO_BLACKLIST_WINDOW_DAYS`).
    pub auto_blacklist_window_days: i64,
    /// Age at which an open record enters the SLA digest, in days
    /// (`SLA_AGE_DAYS`).
    pub sla_age_days: i64,
    /// Age at which the channel status line flips to the overdue marker,
    /// in days (`OVERDUE_DISPLAY_DAYS`). Presentational only.
    pub overdue_display_days: i64,
    /// Local hour (Baku) at which the SLA sweep fires (`SLA_SWEEP_HOUR`).
    pub sla_sweep_hour: u32,
    /// Idle lifetime of intake and executor sessions, in seconds
    /// (`SESSION_TTL_SECS`).
    pub session_ttl_secs: u64,
    /// Row cap for the CSV export (`EXPORT_LIMIT`).
    pub export_limit: i64,
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default         |
    /// |------------------------------|-----------------|
    /// | `BOT_TOKEN`                  | required        |
    /// | `DATABASE_URL`               | required        |
    /// | `EXECUTOR_CHAT_ID`           | unset           |
    /// | `ADMIN_USER_IDS`             | empty           |
    /// | `MAX_DAILY_SUBMISSIONS`      | `3` (`0` = off) |
    /// | `AUTO_BLACKLIST_THRESHOLD`   | `5` (`0` = off) |
    /// | `AUTO_BLACKLIST_WINDOW_DAYS` | `30`            |
    /// | `SLA_AGE_DAYS`               | `3`             |
    /// | `OVERDUE_DISPLAY_DAYS`       | `10`            |
    /// | `SLA_SWEEP_HOUR`             | `9`             |
    /// | `SESSION_TTL_SECS`           | `1800`          |
    /// | `EXPORT_LIMIT`               | `1000`          |
    pub fn from_env() -> Self {
        let token = std::env::var("BOT_TOKEN").expect("BOT_TOKEN must be set");
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let executor_chat_id = std::env::var("EXECUTOR_CHAT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().parse().expect("EXECUTOR_CHAT_ID must be a chat id"));

        let admin_user_ids = std::env::var("ADMIN_USER_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| {
                let s = s.trim();
                (!s.is_empty()).then(|| s.parse().expect("ADMIN_USER_IDS must be numeric"))
            })
            .collect();

        Self {
            token,
            database_url,
            executor_chat_id,
            admin_user_ids,
            max_daily_submissions: optional_limit("MAX_DAILY_SUBMISSIONS", Some(3)),
            auto_blacklist_threshold: optional_limit("AUTO_BLACKLIST_THRESHOLD", Some(5)),
            auto_blacklist_window_days: numeric("AUTO_BLACKLIST_WINDOW_DAYS", 30),
            sla_age_days: numeric("SLA_AGE_DAYS", 3),
            overdue_display_days: numeric("OVERDUE_DISPLAY_DAYS", 10),
            sla_sweep_hour: numeric("SLA_SWEEP_HOUR", 9),
            session_ttl_secs: numeric("SESSION_TTL_SECS", 1800),
            export_limit: numeric("EXPORT_LIMIT", 1000),
        }
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_user_ids.contains(&user_id)
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        GuardPolicy {
            daily_limit: self.max_daily_submissions,
            reject_threshold: self.auto_blacklist_threshold,
            reject_window_days: self.auto_blacklist_window_days,
        }
    }
}

/// A threshold that can be switched off: unset falls back to `default`,
/// an explicit `0` or empty value disables it.
fn optional_limit(var: &str, default: Option<u32>) -> Option<u32> {
    match std::env::var(var) {
        Err(_) => default,
        Ok(v) if v.trim().is_empty() || v.trim() == "0" => None,
        Ok(v) => Some(
            v.trim()
                .parse()
                .unwrap_or_else(|_| panic!("{var} must be a number")),
        ),
    }
}

fn numeric<T: std::str::FromStr>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Err(_) => default,
        Ok(v) => v
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{var} must be a number")),
    }
}
