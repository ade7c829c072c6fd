//! Display formatting for history rows.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

use crate::api::RecordType;

/// Characters kept in the content preview.
pub const PREVIEW_CHARS: usize = 100;

/// Appended to a truncated preview.
pub const ELLIPSIS: &str = " ···";

/// Placeholder for missing values.
pub const NONE_LABEL: &str = "-";

/// A content preview. `truncated` is true when `text` is shorter than the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preview {
    pub text: String,
    pub truncated: bool,
}

impl Preview {
    /// Preview text with the ellipsis marker when truncated.
    pub fn display(&self) -> String {
        if self.truncated {
            format!("{}{ELLIPSIS}", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// First [`PREVIEW_CHARS`] characters of `content`.
pub fn preview(content: Option<&str>) -> Preview {
    let content = content.unwrap_or_default();
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => Preview {
            text: content[..cut].to_string(),
            truncated: true,
        },
        None => Preview {
            text: content.to_string(),
            truncated: false,
        },
    }
}

/// Human-scaled byte size: `500 B`, `2.0 KB`, `2.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1_048_576 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    }
}

/// Size column: character count for text, byte size for everything else.
pub fn format_size(kind: &RecordType, content: Option<&str>, file_size: Option<u64>) -> String {
    if *kind == RecordType::Text {
        if let Some(text) = content.filter(|t| !t.is_empty()) {
            return format!("{} chars", text.chars().count());
        }
    }
    match file_size {
        Some(bytes) if bytes > 0 => format_bytes(bytes),
        _ => NONE_LABEL.to_string(),
    }
}

/// Parse a server timestamp. Offset-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Local date and time, `YYYY/MM/DD HH:MM`.
pub fn format_time(raw: Option<&str>) -> String {
    match raw {
        None => NONE_LABEL.to_string(),
        Some(s) if s.trim().is_empty() => NONE_LABEL.to_string(),
        Some(s) => match parse_timestamp(s) {
            Some(dt) => dt.with_timezone(&Local).format("%Y/%m/%d %H:%M").to_string(),
            None => s.to_string(),
        },
    }
}

/// Read `favorited` from a record's `extra_data`. Anything unexpected is `false`.
pub fn parse_favorited(extra_data: Option<&str>) -> bool {
    extra_data
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
        .and_then(|v| v.get("favorited").and_then(serde_json::Value::as_bool))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_preview_boundary() {
        let exact = "a".repeat(100);
        let p = preview(Some(&exact));
        assert!(!p.truncated);
        assert_eq!(p.display(), exact);

        let over = "b".repeat(101);
        let p = preview(Some(&over));
        assert!(p.truncated);
        assert_eq!(p.text.chars().count(), 100);
        assert_eq!(p.display(), format!("{}{ELLIPSIS}", "b".repeat(100)));
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let text = "剪".repeat(101);
        let p = preview(Some(&text));
        assert!(p.truncated);
        assert_eq!(p.text.chars().count(), 100);
    }

    #[test]
    fn test_preview_missing_content() {
        let p = preview(None);
        assert_eq!(p.text, "");
        assert!(!p.truncated);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(1_048_576), "1.0 MB");
        assert_eq!(format_bytes(2_097_152), "2.0 MB");
    }

    #[test]
    fn test_format_size_text_counts_chars() {
        assert_eq!(
            format_size(&RecordType::Text, Some("héllo"), Some(999)),
            "5 chars"
        );
    }

    #[test]
    fn test_format_size_binary_and_missing() {
        assert_eq!(format_size(&RecordType::Image, Some("a.png"), Some(2048)), "2.0 KB");
        assert_eq!(format_size(&RecordType::File, None, None), "-");
        assert_eq!(format_size(&RecordType::File, None, Some(0)), "-");
        assert_eq!(format_size(&RecordType::Text, None, None), "-");
    }

    #[test]
    fn test_parse_timestamp_naive_is_utc() {
        let dt = parse_timestamp("2024-05-01T08:30:15.123456").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_timestamp_with_offset() {
        let dt = parse_timestamp("2024-05-01T08:30:00+08:00").unwrap();
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_format_time_fallbacks() {
        assert_eq!(format_time(None), "-");
        assert_eq!(format_time(Some("")), "-");
        assert_eq!(format_time(Some("yesterday")), "yesterday");
        let formatted = format_time(Some("2024-05-01T08:30:00"));
        assert_eq!(formatted.len(), "2024/05/01 08:30".len());
        assert!(formatted.starts_with("2024/0"));
    }

    #[test]
    fn test_parse_favorited() {
        assert!(parse_favorited(Some(r#"{"favorited": true}"#)));
        assert!(!parse_favorited(Some(r#"{"favorited": false}"#)));
        assert!(!parse_favorited(Some("not json")));
        assert!(!parse_favorited(Some(r#"{"favorited": "yes"}"#)));
        assert!(!parse_favorited(Some("[]")));
        assert!(!parse_favorited(None));
    }
}
