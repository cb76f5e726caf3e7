//! Executor-channel message projection.
//!
//! The channel message for an application is plain text that gets rewritten
//! in place as the record moves through its lifecycle: the status line flips
//! from pending to answered/rejected, and a reply excerpt block is appended
//! (or replaced, when a reply is edited). All functions here are pure string
//! transformations; transport limits are expressed in UTF-16 code units
//! because that is how the Bot API counts message length.

use crate::application::{Category, IdKind};
use crate::timefmt;
use crate::types::{DbId, Timestamp, UserId};

/// Caption ceiling for photo messages.
pub const CAPTION_LIMIT: usize = 1024;
/// Text ceiling for plain messages.
pub const TEXT_LIMIT: usize = 4096;

/// Reply excerpt length in characters, before the ellipsis.
pub const REPLY_EXCERPT_CHARS: usize = 300;

/// Status line for a record still awaiting action.
pub const MARKER_PENDING: &str = "🟡 Status: Gözləyir";
/// Status line for a record awaiting action past the overdue age.
pub const MARKER_OVERDUE: &str = "🔴 Status: Vaxtı keçir";

const REPLY_BLOCK_SEP: &str = "\n\n💬 Cavab: ";

// ---------------------------------------------------------------------------
// Actor and status lines
// ---------------------------------------------------------------------------

/// `@username`, falling back to `@<id>` when the executor has no username.
pub fn actor_handle(username: Option<&str>, user_id: UserId) -> String {
    match username {
        Some(name) if !name.is_empty() => format!("@{name}"),
        _ => format!("@{user_id}"),
    }
}

pub fn marker_answered(actor: &str) -> String {
    format!("🟢 Status: İcra edildi ({actor})")
}

pub fn marker_rejected(actor: &str) -> String {
    format!("⚫ Status: İmtina ({actor})")
}

/// Pending status line for a fresh or re-rendered post. Flips to the
/// overdue marker once the record is `overdue_days` old; presentational
/// only, the stored status does not change.
pub fn pending_status_line(created_at: Timestamp, now: Timestamp, overdue_days: i64) -> &'static str {
    if (now - created_at).num_days() >= overdue_days {
        MARKER_OVERDUE
    } else {
        MARKER_PENDING
    }
}

/// Replace the pending status line (either variant) with `new_marker`.
///
/// Content without a pending line is returned unchanged, which makes the
/// rewrite idempotent: a second completion attempt cannot clobber the
/// marker written by the first.
pub fn rewrite_status_line(content: &str, new_marker: &str) -> String {
    if content.contains(MARKER_PENDING) {
        content.replacen(MARKER_PENDING, new_marker, 1)
    } else if content.contains(MARKER_OVERDUE) {
        content.replacen(MARKER_OVERDUE, new_marker, 1)
    } else {
        content.to_string()
    }
}

// ---------------------------------------------------------------------------
// Summary and channel post
// ---------------------------------------------------------------------------

/// The fields every summary rendering needs, borrowed from either a draft
/// or a stored row.
#[derive(Debug, Clone, Copy)]
pub struct SummaryFields<'a> {
    pub fullname: &'a str,
    pub phone: &'a str,
    pub id_kind: IdKind,
    pub id_code: &'a str,
    pub category: Category,
    pub body: &'a str,
    pub created_at: Timestamp,
}

/// Confirmation summary shown to the citizen and reused in the channel
/// post and the executor detail view.
pub fn summary(f: &SummaryFields) -> String {
    format!(
        "📋 Müraciət xülasəsi:\n\
         👤 {fullname}\n\
         📱 Mobil nömrə: {phone}\n\
         🆔 {kind}: {code}\n\
         📂 Növ: {category}\n\
         ✍️ Məzmun: {body}\n\n\
         ⏰ {time}\n",
        fullname = f.fullname,
        phone = f.phone,
        kind = f.id_kind.label(),
        code = f.id_code,
        category = f.category.label(),
        body = f.body,
        time = timefmt::datetime_short(f.created_at),
    )
}

/// The full channel post for a newly persisted record.
pub fn channel_post(
    id: DbId,
    fields: &SummaryFields,
    submitter_handle: Option<&str>,
    submitter_id: UserId,
    status_line: &str,
) -> String {
    let handle = match submitter_handle {
        Some(h) if !h.is_empty() => format!("@{h}"),
        _ => "istifadəçi adı yoxdur".to_string(),
    };
    format!(
        "🆔 Müraciət #{id}\n\
         {status_line}\n\n\
         🆕 Yeni Müraciət\n\n\
         {summary}\n\
         Göndərən: {handle}\n\
         User ID: {submitter_id}",
        summary = summary(fields),
    )
}

/// Detail view sent to the executor's private chat, with the action prompt
/// under a divider.
pub fn detail_view(fields: &SummaryFields, prompt: &str) -> String {
    format!(
        "{summary}{divider}\n{prompt}",
        summary = summary(fields),
        divider = crate::texts::DETAIL_DIVIDER,
    )
}

// ---------------------------------------------------------------------------
// Reply excerpt block
// ---------------------------------------------------------------------------

/// First [`REPLY_EXCERPT_CHARS`] characters of the reply, with an ellipsis
/// when cut.
pub fn reply_excerpt(reply: &str) -> String {
    let mut excerpt: String = reply.chars().take(REPLY_EXCERPT_CHARS).collect();
    if reply.chars().count() > REPLY_EXCERPT_CHARS {
        excerpt.push('…');
    }
    excerpt
}

/// Content with any existing reply block removed.
pub fn strip_reply_block(content: &str) -> &str {
    match content.rfind(REPLY_BLOCK_SEP) {
        Some(pos) => &content[..pos],
        None => content,
    }
}

/// Append or replace the reply excerpt block, keeping the whole message
/// within `limit` UTF-16 units. When over budget, the head (original
/// content) is truncated, never the excerpt.
pub fn with_reply_block(content: &str, reply: &str, limit: usize) -> String {
    let head = strip_reply_block(content).trim_end();
    let block = format!("{REPLY_BLOCK_SEP}{}", reply_excerpt(reply));
    let head_budget = limit.saturating_sub(utf16_len(&block));
    if utf16_len(head) <= head_budget {
        format!("{head}{block}")
    } else {
        let truncated = truncate_utf16(head, head_budget.saturating_sub(1));
        format!("{truncated}…{block}")
    }
}

/// Clamp a message to `limit` UTF-16 units, ellipsizing when cut. Used for
/// the initial channel caption, which cannot exceed the photo caption
/// ceiling.
pub fn clamp_utf16(content: &str, limit: usize) -> String {
    if utf16_len(content) <= limit {
        content.to_string()
    } else {
        let mut out = truncate_utf16(content, limit.saturating_sub(1));
        out.push('…');
        out
    }
}

pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn truncate_utf16(s: &str, budget: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let width = ch.len_utf16();
        if used + width > budget {
            break;
        }
        out.push(ch);
        used += width;
    }
    out
}

// ---------------------------------------------------------------------------
// SLA digest
// ---------------------------------------------------------------------------

/// How many records the digest lists before folding the rest into a count.
pub const DIGEST_HEAD: usize = 10;

/// One aged record in the sweep result.
#[derive(Debug, Clone)]
pub struct OverdueEntry {
    pub id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// Daily reminder message listing aged open records.
pub fn sla_digest(entries: &[OverdueEntry], age_days: i64) -> String {
    let mut message = format!(
        "⚠️ SLA Xatırlatması\n\n{} müraciət {} gündən çoxdur cavabsızdır:\n\n",
        entries.len(),
        age_days
    );
    for entry in entries.iter().take(DIGEST_HEAD) {
        message.push_str(&format!(
            "🆔 {} - {}... ({})\n",
            entry.id,
            crate::application::short_label(&entry.body),
            timefmt::date(entry.created_at),
        ));
    }
    if entries.len() > DIGEST_HEAD {
        message.push_str(&format!(
            "\n...və daha {} müraciət",
            entries.len() - DIGEST_HEAD
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn fields() -> SummaryFields<'static> {
        SummaryFields {
            fullname: "Əliyev Anar Orxan oğlu",
            phone: "+994501234567",
            id_kind: IdKind::Fin,
            id_code: "1ABC23X",
            category: Category::Complaint,
            body: "Küçə işıqları bir həftədir yanmır.",
            created_at: Utc.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn summary_contains_every_field() {
        let text = summary(&fields());
        assert!(text.contains("👤 Əliyev Anar Orxan oğlu"));
        assert!(text.contains("📱 Mobil nömrə: +994501234567"));
        assert!(text.contains("🆔 FIN: 1ABC23X"));
        assert!(text.contains("📂 Növ: Şikayət"));
        assert!(text.contains("✍️ Məzmun: Küçə işıqları"));
        assert!(text.contains("⏰ 10.02.26 12:00:00"));
    }

    #[test]
    fn channel_post_has_id_status_and_submitter() {
        let post = channel_post(42, &fields(), Some("anar"), 555, MARKER_PENDING);
        assert!(post.starts_with("🆔 Müraciət #42\n🟡 Status: Gözləyir\n\n🆕 Yeni Müraciət"));
        assert!(post.contains("Göndərən: @anar"));
        assert!(post.contains("User ID: 555"));
    }

    #[test]
    fn channel_post_without_username() {
        let post = channel_post(7, &fields(), None, 555, MARKER_PENDING);
        assert!(post.contains("Göndərən: istifadəçi adı yoxdur"));
    }

    #[test]
    fn detail_view_separates_summary_from_prompt() {
        let view = detail_view(&fields(), "👇 Aşağıya cavab yazın:");
        let divider_at = view.find(crate::texts::DETAIL_DIVIDER).unwrap();
        assert!(view[..divider_at].contains("✍️ Məzmun: Küçə işıqları"));
        assert!(view.ends_with("👇 Aşağıya cavab yazın:"));
    }

    #[test]
    fn actor_handle_falls_back_to_id() {
        assert_eq!(actor_handle(Some("leyla"), 9), "@leyla");
        assert_eq!(actor_handle(None, 987654), "@987654");
        assert_eq!(actor_handle(Some(""), 12), "@12");
    }

    #[test]
    fn status_line_flips_when_overdue() {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            pending_status_line(created, created + Duration::days(3), 10),
            MARKER_PENDING
        );
        assert_eq!(
            pending_status_line(created, created + Duration::days(10), 10),
            MARKER_OVERDUE
        );
    }

    #[test]
    fn rewrite_replaces_pending_marker() {
        let post = channel_post(1, &fields(), Some("anar"), 5, MARKER_PENDING);
        let done = rewrite_status_line(&post, &marker_answered("@leyla"));
        assert!(done.contains("🟢 Status: İcra edildi (@leyla)"));
        assert!(!done.contains(MARKER_PENDING));
        // Everything else untouched.
        assert!(done.contains("✍️ Məzmun: Küçə işıqları"));
    }

    #[test]
    fn rewrite_replaces_overdue_marker_too() {
        let post = channel_post(1, &fields(), Some("anar"), 5, MARKER_OVERDUE);
        let done = rewrite_status_line(&post, &marker_rejected("@leyla"));
        assert!(done.contains("⚫ Status: İmtina (@leyla)"));
        assert!(!done.contains(MARKER_OVERDUE));
    }

    #[test]
    fn rewrite_is_idempotent_on_resolved_content() {
        let post = channel_post(1, &fields(), Some("anar"), 5, MARKER_PENDING);
        let once = rewrite_status_line(&post, &marker_answered("@a"));
        let twice = rewrite_status_line(&once, &marker_answered("@b"));
        assert_eq!(once, twice);
    }

    #[test]
    fn reply_excerpt_cuts_at_three_hundred_chars() {
        let short = "Baxıldı.";
        assert_eq!(reply_excerpt(short), short);
        let long = "c".repeat(350);
        let excerpt = reply_excerpt(&long);
        assert_eq!(excerpt.chars().count(), REPLY_EXCERPT_CHARS + 1);
        assert!(excerpt.ends_with('…'));
    }

    #[test]
    fn reply_block_is_appended_once() {
        let post = channel_post(1, &fields(), Some("anar"), 5, MARKER_PENDING);
        let with_one = with_reply_block(&post, "Təmir qrupu göndərildi.", TEXT_LIMIT);
        assert!(with_one.ends_with("💬 Cavab: Təmir qrupu göndərildi."));

        let with_two = with_reply_block(&with_one, "Yenilənmiş cavab.", TEXT_LIMIT);
        assert!(with_two.ends_with("💬 Cavab: Yenilənmiş cavab."));
        assert_eq!(with_two.matches("💬 Cavab:").count(), 1);
        // The head survives the replacement.
        assert!(with_two.contains("✍️ Məzmun: Küçə işıqları"));
    }

    #[test]
    fn reply_block_truncates_head_not_excerpt() {
        let head = "m".repeat(1100);
        let reply = "r".repeat(200);
        let result = with_reply_block(&head, &reply, CAPTION_LIMIT);
        assert!(utf16_len(&result) <= CAPTION_LIMIT);
        // The full excerpt is intact at the tail.
        assert!(result.ends_with(&format!("💬 Cavab: {reply}")));
        assert!(result.contains('…'));
    }

    #[test]
    fn clamp_respects_utf16_budget() {
        // Emoji weigh two UTF-16 units each.
        let text = "🟡".repeat(600);
        let clamped = clamp_utf16(&text, CAPTION_LIMIT);
        assert!(utf16_len(&clamped) <= CAPTION_LIMIT);
        assert!(clamped.ends_with('…'));
        assert_eq!(clamp_utf16("qısa mətn", CAPTION_LIMIT), "qısa mətn");
    }

    #[test]
    fn digest_lists_first_ten_then_counts_rest() {
        let created = Utc.with_ymd_and_hms(2026, 2, 1, 5, 0, 0).unwrap();
        let entries: Vec<OverdueEntry> = (1..=12)
            .map(|i| OverdueEntry {
                id: i,
                body: format!("Müraciət mətni nömrə {i}"),
                created_at: created,
            })
            .collect();
        let digest = sla_digest(&entries, 3);
        assert!(digest.starts_with("⚠️ SLA Xatırlatması\n\n12 müraciət 3 gündən çoxdur"));
        assert!(digest.contains("🆔 1 - Müraciət mətni nömrə 1... (01.02.2026)"));
        assert!(digest.contains("🆔 10 -"));
        assert!(!digest.contains("🆔 11 -"));
        assert!(digest.ends_with("...və daha 2 müraciət"));
    }

    #[test]
    fn digest_without_overflow_has_no_tail() {
        let created = Utc.with_ymd_and_hms(2026, 2, 1, 5, 0, 0).unwrap();
        let entries = vec![OverdueEntry {
            id: 3,
            body: "Qaz xətti ilə bağlı şikayət".to_string(),
            created_at: created,
        }];
        let digest = sla_digest(&entries, 3);
        assert!(!digest.contains("...və daha"));
    }
}
