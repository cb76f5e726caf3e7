//! CSV rendering for the admin export.
//!
//! Output is tuned for Excel: UTF-8 BOM so Cyrillic/Azerbaijani text opens
//! correctly, every field quoted, phone numbers prefixed with `'` so they
//! are not mangled into numbers.

use muraciet_db::models::Application;

use muraciet_core::timefmt;

const BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADERS: &[&str] = &[
    "ID",
    "Ad Soyad",
    "Telefon",
    "Sənəd",
    "Kod",
    "Növ",
    "Məzmun",
    "Status",
    "Cavab",
    "Qeydlər",
    "Göndərilmə",
    "Yenilənmə",
    "User ID",
    "İstifadəçi adı",
];

/// Render the export rows. Status, category, and timestamps use the same
/// Azerbaijani renderings as the chat surface; unparseable stored values
/// (none are expected) fall back to the raw wire string.
pub fn render_csv(records: &[Application]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::from(BOM));

    writer.write_record(HEADERS)?;
    for record in records {
        let status = record
            .status()
            .map(|s| s.label().to_string())
            .unwrap_or_else(|_| record.status.clone());
        let category = record
            .category()
            .map(|c| c.label().to_string())
            .unwrap_or_else(|_| record.category.clone());
        let id_kind = record
            .id_kind()
            .map(|k| k.label().to_string())
            .unwrap_or_else(|_| record.id_kind.clone());
        writer.write_record([
            record.id.to_string(),
            record.fullname.clone(),
            format!("'{}", record.phone),
            id_kind,
            record.id_code.clone(),
            category,
            record.body.clone(),
            status,
            record.reply_text.clone().unwrap_or_default(),
            record.notes.clone().unwrap_or_default(),
            timefmt::datetime_long(record.created_at),
            timefmt::datetime_long(record.updated_at),
            record.submitter_id.to_string(),
            record.submitter_handle.clone().unwrap_or_default(),
        ])?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, body: &str) -> Application {
        let created = Utc.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap();
        Application {
            id,
            submitter_id: 42,
            submitter_handle: Some("anar".to_string()),
            fullname: "Əliyev Anar".to_string(),
            phone: "+994501234567".to_string(),
            id_kind: "fin".to_string(),
            id_code: "1ABC23X".to_string(),
            category: "complaint".to_string(),
            body: body.to_string(),
            photo_ref: None,
            status: "waiting".to_string(),
            reply_text: None,
            notes: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn starts_with_utf8_bom() {
        let bytes = render_csv(&[record(1, "Mətn")]).unwrap();
        assert!(bytes.starts_with(BOM));
    }

    #[test]
    fn every_field_is_quoted_and_phone_is_excel_safe() {
        let bytes = render_csv(&[record(1, "Mətn")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"'+994501234567\""));
        assert!(text.contains("\"ID\",\"Ad Soyad\""));
        assert!(text.contains("\"Gözləyir 🟡\""));
        assert!(text.contains("\"Şikayət\""));
        assert!(text.contains("\"10.02.2026 12:00:00\""));
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        let bytes = render_csv(&[record(1, "Deyirlər \"yox\" olur")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Deyirlər \"\"yox\"\" olur\""));
    }

    #[test]
    fn one_row_per_record_plus_header() {
        let bytes = render_csv(&[record(1, "Birinci"), record(2, "İkinci")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
