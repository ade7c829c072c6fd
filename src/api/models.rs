//! Wire types for the clipboard-history REST API.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Record ───────────────────────────────────────────────────────────────────

/// Kind of clipboard entry. Unknown server values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    Text,
    Image,
    File,
    Group,
    Other(String),
}

impl RecordType {
    /// Types the server can filter by, in cycling order.
    pub const FILTERABLE: [RecordType; 4] = [
        RecordType::Text,
        RecordType::Image,
        RecordType::File,
        RecordType::Group,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::File => "File",
            Self::Group => "Group",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Text" => Self::Text,
            "Image" => Self::Image,
            "File" => Self::File,
            "Group" => Self::Group,
            _ => Self::Other(s),
        }
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clipboard-history entry as returned by `/api/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: RecordType,
    /// Text content for text records, original file name otherwise.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_hash: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    /// ISO-8601, usually without an offset (server writes UTC).
    #[serde(default)]
    pub created_at: Option<String>,
    /// Opaque JSON string with auxiliary flags such as `favorited`.
    #[serde(default)]
    pub extra_data: Option<String>,
}

// ── Responses ────────────────────────────────────────────────────────────────

/// One page of history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<Record>,
    pub total: u64,
}

/// `/api/stats` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_records: u64,
    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
    #[serde(default)]
    pub latest_sync: Option<String>,
}

/// `/api/check-auth` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub username: Option<String>,
}

/// Server-authoritative favorite state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FavoriteState {
    #[serde(default)]
    pub id: Option<i64>,
    pub favorited: bool,
}

/// `/api/history/batch-delete` response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchDeleteResult {
    #[serde(default)]
    pub deleted_count: Option<u64>,
}

/// `/health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

/// Login request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Raw file downloaded from `/api/file/{id}`.
#[derive(Debug, Clone)]
pub struct FileBlob {
    pub bytes: Vec<u8>,
    /// File name from `Content-Disposition`, when the server sent one.
    pub filename: Option<String>,
}

// ── Query ────────────────────────────────────────────────────────────────────

/// Parameters of one `/api/history` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: u32,
    pub page_size: u32,
    pub kind: Option<RecordType>,
    pub search: Option<String>,
    pub favorited: Option<bool>,
}

impl HistoryQuery {
    /// Query-string pairs; empty filters are omitted.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(ref kind) = self.kind {
            pairs.push(("type", kind.as_str().to_string()));
        }
        if let Some(ref search) = self.search {
            if !search.is_empty() {
                pairs.push(("search", search.clone()));
            }
        }
        if let Some(favorited) = self.favorited {
            pairs.push(("favorited", favorited.to_string()));
        }
        pairs
    }
}

/// Extract the file name from a `Content-Disposition` header value.
///
/// Prefers the RFC 5987 `filename*=utf-8''...` form over plain `filename=`.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for part in value.split(';').map(str::trim) {
        if let Some(encoded) = part.strip_prefix("filename*=") {
            let encoded = encoded
                .split_once("''")
                .map(|(_, rest)| rest)
                .unwrap_or(encoded);
            // Percent-encoding only: `+` is a literal plus here.
            let decoded = urlencoding::decode(encoded)
                .ok()
                .map(|s| s.into_owned())
                .filter(|s| !s.is_empty());
            if decoded.is_some() {
                return decoded;
            }
        } else if let Some(name) = part.strip_prefix("filename=") {
            let name = name.trim_matches('"');
            if !name.is_empty() {
                plain = Some(name.to_string());
            }
        }
    }
    plain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_server_shape() {
        let json = r#"{
            "id": 7,
            "type": "Image",
            "content": "shot.png",
            "file_path": "history/abc.png",
            "file_hash": "abc",
            "file_size": 2048,
            "created_at": "2024-05-01T08:30:00",
            "extra_data": "{\"favorited\": true}"
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.kind, RecordType::Image);
        assert_eq!(record.file_size, Some(2048));
        assert_eq!(record.extra_data.as_deref(), Some("{\"favorited\": true}"));
    }

    #[test]
    fn test_record_tolerates_nulls_and_missing_fields() {
        let json = r#"{"id": 1, "type": "Text", "content": null, "created_at": null}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert!(record.content.is_none());
        assert!(record.file_path.is_none());
        assert!(record.extra_data.is_none());
    }

    #[test]
    fn test_unknown_record_type_is_kept() {
        let t: RecordType = serde_json::from_str("\"Html\"").unwrap();
        assert_eq!(t, RecordType::Other("Html".to_string()));
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"Html\"");
    }

    #[test]
    fn test_query_pairs_omit_empty_filters() {
        let query = HistoryQuery {
            page: 2,
            page_size: 20,
            kind: None,
            search: Some(String::new()),
            favorited: None,
        };
        assert_eq!(
            query.to_query_pairs(),
            vec![("page", "2".to_string()), ("page_size", "20".to_string())]
        );
    }

    #[test]
    fn test_query_pairs_with_filters() {
        let query = HistoryQuery {
            page: 1,
            page_size: 50,
            kind: Some(RecordType::File),
            search: Some("invoice".to_string()),
            favorited: Some(true),
        };
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("type", "File".to_string())));
        assert!(pairs.contains(&("search", "invoice".to_string())));
        assert!(pairs.contains(&("favorited", "true".to_string())));
    }

    #[test]
    fn test_filename_from_disposition_plain() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"report.pdf\""),
            Some("report.pdf".to_string())
        );
    }

    #[test]
    fn test_filename_from_disposition_prefers_encoded() {
        let header = "attachment; filename=\"fallback.txt\"; filename*=utf-8''%E6%88%AA%E5%9B%BE.png";
        assert_eq!(filename_from_disposition(header), Some("截图.png".to_string()));
    }

    #[test]
    fn test_filename_from_disposition_keeps_plus() {
        let header = "attachment; filename*=utf-8''a+b%20c.txt";
        assert_eq!(
            filename_from_disposition(header),
            Some("a+b c.txt".to_string())
        );
    }

    #[test]
    fn test_filename_from_disposition_bad_utf8_falls_back() {
        let header = "attachment; filename=\"fallback.bin\"; filename*=utf-8''%FF%FE";
        assert_eq!(filename_from_disposition(header), Some("fallback.bin".to_string()));
    }

    #[test]
    fn test_filename_from_disposition_absent() {
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn test_stats_optional_fields() {
        let stats: Stats = serde_json::from_str(r#"{"total_records": 12}"#).unwrap();
        assert_eq!(stats.total_records, 12);
        assert!(stats.by_type.is_empty());
        assert!(stats.latest_sync.is_none());
    }
}
