//! Azerbaijani message catalog.
//!
//! Every user-visible string lives here so translations stay reviewable in
//! one place. Constants are grouped by audience: citizen intake, executor
//! dialog, admin commands. Dynamic messages are `format!` builders next to
//! the constants they belong with.

use crate::types::{ChatId, DbId, UserId};

// ---------------------------------------------------------------------------
// Citizen intake
// ---------------------------------------------------------------------------

pub const WELCOME: &str = "Zəhmət olmasa əvvəlcə SOYAD, AD və ATA ADINIZI daxil edin.";
pub const FULLNAME_ERROR: &str = "Zəhmət olmasa SOYAD və AD daxil edin (ATA ADI da ola bilər).";
pub const PHONE_PROMPT: &str = "📱 Mobil nömrənizi daxil edin.\nMəsələn: +994501234567";
pub const PHONE_ERROR: &str = "Nömrə düzgün formatda deyil. Məsələn: +994501234567";
pub const ID_KIND_PROMPT: &str = "🆔 Sənəd kodunun növünü seçin:";
pub const FIN_PROMPT: &str = "🆔 Şəxsiyyət vəsiqənizin FIN kodunu daxil edin (7 simvol).";
pub const FIN_ERROR: &str = "FIN 7 simvoldan ibarət olmalıdır (latın hərf/rəqəm).";
pub const PIN_PROMPT: &str = "🆔 Sənədinizin PIN kodunu daxil edin (5-6 simvol).";
pub const PIN_ERROR: &str = "PIN 5-6 simvoldan ibarət olmalıdır (latın hərf/rəqəm).";
pub const ID_PHOTO_PROMPT: &str =
    "📸 Şəxsiyyət vəsiqənizin ön tərəfinin şəklini göndərin (foto kimi).";
pub const ID_PHOTO_ERROR: &str = "Zəhmət olmasa foto göndərin.";
pub const CATEGORY_PROMPT: &str = "📋 Müraciət növünü seçin:";
pub const BODY_PROMPT: &str = "✍️ Müraciət mətnini ətraflı yazın (max 1000 simvol).";
pub const BODY_ERROR: &str =
    "Mətn çox qısadır (min 10 simvol) və ya çox uzundur (max 1000 simvol).";
pub const CHOICE_HINT: &str = "Zəhmət olmasa aşağıdakı düymələrdən birini seçin.";
pub const CONFIRM_SENT: &str = "✅ Müraciət təsdiqləndi və icraçılara göndərilir…";
pub const SUCCESS: &str = "✅ Müraciətiniz qeydə alındı. Təşəkkürlər!";
pub const SAVE_FAILED: &str =
    "⚠️ Müraciətinizi yadda saxlamaq mümkün olmadı. Zəhmət olmasa bir az sonra yenidən cəhd edin.";
pub const CANCELLED: &str = "❌ Müraciət ləğv edildi.";
pub const HELP: &str = "ℹ️ /start ilə yeni müraciət göndərə bilərsiniz.";
pub const UNKNOWN: &str = "⚠️ Anlaşılmadı. /start yazın.";
pub const GROUP_NUDGE: &str = "Zəhmət olmasa bot-a birbaşa mesaj yazın: /start";

/// Button labels for the confirmation step.
pub const BTN_CONFIRM: &str = "✅ Təsdiq et və göndər";
pub const BTN_EDIT: &str = "✏️ Düzəliş et";
pub const BTN_CANCEL: &str = "❌ Ləğv et";

// ---------------------------------------------------------------------------
// Anti-abuse notices
// ---------------------------------------------------------------------------

pub const BLACKLISTED_NOTICE: &str =
    "⚠️ Müraciətləriniz müvəqqəti qəbul edilmir. Xahiş edirik daha sonra yenidən yoxlayın.";
pub const AUTO_BLACKLIST_NOTICE: &str =
    "⚠️ Çox sayda imtina səbəbilə müraciətləriniz müvəqqəti qəbul edilmir.";

pub fn rate_limited(limit: u32) -> String {
    format!(
        "⚠️ Siz artıq son 24 saatda {limit} müraciət göndərmisiniz.\n\
         Zəhmət olmasa bir az gözləyin və ya əvvəlki müraciətlərinizin cavabını gözləyin."
    )
}

// ---------------------------------------------------------------------------
// Executor dialog
// ---------------------------------------------------------------------------

pub const BTN_EXEC_REPLY: &str = "✉️ Cavablandır";
pub const BTN_EXEC_REJECT: &str = "🚫 İmtina";
pub const BTN_EXEC_EDIT_REPLY: &str = "✏️ Cavabı düzəlt";

pub const EXECUTOR_GROUP_ONLY: &str = "Yalnız icraçı qrupunda istifadə oluna bilər";
pub const RECORD_NOT_FOUND: &str = "❌ Müraciət tapılmadı";
pub const ALREADY_HANDLED: &str = "⚠️ Bu müraciətə artıq baxılıb";
pub const EDIT_ONLY_ANSWERED: &str =
    "⚠️ Yalnız cavablandırılmış müraciətin cavabı redaktə oluna bilər";
pub const REPLY_SENT: &str = "✅ Cavab göndərildi";
pub const REJECT_SENT: &str = "✅ İmtina səbəbi göndərildi";
pub const REPLY_UPDATED: &str = "✅ Cavab yeniləndi";
pub const NOTIFY_FAILED: &str =
    "❌ Vətəndaşa mesaj çatdırıla bilmədi. Bir az sonra yenidən cəhd edin.";

pub const DETAIL_DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━";
pub const REPLY_DM_PROMPT: &str = "👇 Aşağıya cavab yazın:";
pub const REJECT_DM_PROMPT: &str = "👇 İmtina səbəbini yazın:";
pub const EDIT_DM_PROMPT: &str = "👇 Yeni cavab mətnini yazın:";
pub const PHOTO_CAPTION_FALLBACK: &str = "📎 Sənəd şəkli";

pub fn reply_fallback_prompt(id: DbId) -> String {
    format!("📝 Cavab mətni yazın (ID={id}):")
}

pub fn reject_fallback_prompt(id: DbId) -> String {
    format!("🚫 İmtina səbəbini yazın (ID={id}):")
}

pub fn edit_fallback_prompt(id: DbId) -> String {
    format!("✏️ Yeni cavab mətnini yazın (ID={id}):")
}

/// Shown above the stored reply when an executor re-opens it for editing.
pub fn current_reply(reply: &str) -> String {
    format!("Mövcud cavab:\n{reply}")
}

// ---------------------------------------------------------------------------
// Citizen notifications
// ---------------------------------------------------------------------------

pub fn reply_notification(text: &str) -> String {
    format!("✅ Müraciətinizə cavab:\n\n{text}")
}

pub fn reject_notification(reason: &str) -> String {
    format!("❌ Müraciət rədd edildi. Səbəb:\n\n{reason}")
}

pub fn updated_reply_notification(text: &str) -> String {
    format!("🔁 Müraciətinizə yenilənmiş cavab:\n\n{text}")
}

// ---------------------------------------------------------------------------
// Admin commands
// ---------------------------------------------------------------------------

pub const NOT_PERMITTED: &str = "❌ İcazə yoxdur";
pub const GENERIC_ERROR: &str = "❌ Xəta baş verdi";
pub const PONG: &str = "🏓 Pong";

pub const BLACKLIST_EMPTY: &str = "✅ Qara siyahı boşdur";
pub const BLACKLIST_HEADER: &str = "🛑 Qara Siyahı:\n\n";
pub const NO_REASON: &str = "(səbəb yoxdur)";
pub const ALREADY_BLACKLISTED: &str = "Artıq qara siyahıdadır";
pub const NOT_BLACKLISTED: &str = "Qara siyahıda deyil";
pub const BAN_USAGE: &str = "İstifadə: /ban <user_id> [səbəb]";
pub const UNBAN_USAGE: &str = "İstifadə: /unban <user_id>";
pub const USER_ID_NUMERIC: &str = "user_id rəqəm olmalıdır";
pub const DEFAULT_BAN_REASON: &str = "Admin ban";

pub fn banned(user_id: UserId) -> String {
    format!("✅ {user_id} qara siyahıya əlavə olundu")
}

pub fn unbanned(user_id: UserId) -> String {
    format!("✅ {user_id} qara siyahıdan silindi")
}

pub const CLEARALL_WARNING: &str = "⚠️ Xəbərdarlıq: Bütün müraciətlər SİLİNƏCƏK!\n\n\
     Bu əməliyyat geri çevrilə bilməz. Davam etmək istəyirsiniz?";
pub const BTN_CLEARALL_YES: &str = "✅ Bəli, sil";
pub const BTN_CLEARALL_NO: &str = "❌ Xeyr";
pub const CLEARALL_CANCELLED: &str = "❌ Ləğv edildi";

pub fn cleared(count: u64) -> String {
    format!("✅ {count} müraciət silindi!")
}

pub const EXPORT_EMPTY: &str = "⚠️ Export ediləcək məlumat yoxdur.";
pub const EXPORT_CAPTION: &str = "📊 Müraciətlər CSV export";
pub const EXPORT_FAILED: &str = "❌ Export xətası";

pub fn chat_id_reply(chat_id: ChatId) -> String {
    format!("Chat ID: {chat_id}")
}
