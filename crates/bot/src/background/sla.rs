//! Daily SLA sweep over aged open applications.
//!
//! Fires once a day at a fixed Baku-local hour, scans for records still
//! open past the age threshold, and posts one aggregate digest to the
//! executor channel. Read-only: the sweep never mutates record state, and
//! it stays silent when there is nothing overdue or no channel configured.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tokio_util::sync::CancellationToken;

use muraciet_core::projection::{self, OverdueEntry};
use muraciet_core::timefmt;

use crate::routing;
use crate::state::AppState;

pub async fn run(state: Arc<AppState>, cancel: CancellationToken) {
    tracing::info!(
        hour = state.config.sla_sweep_hour,
        age_days = state.config.sla_age_days,
        "SLA sweeper started"
    );
    loop {
        let wait = next_run_delay(Utc::now(), state.config.sla_sweep_hour);
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("SLA sweeper stopping");
                break;
            }
            _ = tokio::time::sleep(wait) => sweep(&state).await,
        }
    }
}

async fn sweep(state: &AppState) {
    if state.channel.get().is_none() {
        tracing::debug!("SLA sweep skipped: no executor channel");
        return;
    }
    let age_days = state.config.sla_age_days;
    let cutoff = Utc::now() - Duration::days(age_days);
    let overdue = match state.storage.overdue_applications(cutoff).await {
        Ok(overdue) => overdue,
        Err(error) => {
            tracing::error!(error = %error, "SLA sweep query failed");
            return;
        }
    };
    if overdue.is_empty() {
        tracing::debug!("SLA sweep: nothing overdue");
        return;
    }

    let entries: Vec<OverdueEntry> = overdue
        .iter()
        .map(|record| OverdueEntry {
            id: record.id,
            body: record.body.clone(),
            created_at: record.created_at,
        })
        .collect();
    let digest = projection::sla_digest(&entries, age_days);
    tracing::info!(count = entries.len(), "SLA sweep: posting digest");
    if let Err(error) = routing::send_channel_message(state, &digest, None, None).await {
        tracing::warn!(error = %error, "SLA digest delivery failed");
    }
}

/// Time until the next occurrence of `hour`:00 Baku time.
fn next_run_delay(now: DateTime<Utc>, hour: u32) -> std::time::Duration {
    let offset = FixedOffset::east_opt(timefmt::UTC_OFFSET_HOURS * 3600).expect("valid offset");
    let now_local = now.with_timezone(&offset);
    let today = now_local
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .expect("valid hour")
        .and_local_timezone(offset)
        .single()
        .expect("fixed offset is unambiguous");
    let target = if today > now_local {
        today
    } else {
        today + Duration::days(1)
    };
    (target - now_local).to_std().unwrap_or_default()
}
