//! Upload normalization: raw file bytes in, embeddable plain text out.
//!
//! The engine itself never inspects file bytes; everything downstream of
//! this module works on normalized text. CSV uploads are validated and
//! re-emitted in delimited form so the tabular extractor can parse them;
//! JSON uploads are flattened into `key: value` lines; text and markdown
//! pass through with whitespace cleanup.

use thiserror::Error;

use crate::models::FileType;

/// Errors that can occur while normalizing an upload.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File extension not in the supported set.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// CSV content that cannot be parsed.
    #[error("Malformed CSV: {0}")]
    MalformedCsv(String),

    /// JSON content that cannot be parsed.
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),
}

/// Converts uploaded files of varying formats into plain text.
#[derive(Debug, Default)]
pub struct DocumentIngestor;

impl DocumentIngestor {
    /// Creates a new ingestor.
    pub fn new() -> Self {
        Self
    }

    /// Normalizes raw upload bytes into embeddable text.
    ///
    /// The format is chosen by file extension. Non-UTF-8 bytes are
    /// replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFileType` for unknown extensions and a
    /// format-specific error when CSV or JSON content does not parse.
    pub fn ingest(&self, bytes: &[u8], filename: &str) -> Result<(String, FileType), IngestError> {
        let extension = filename.rsplit('.').next().unwrap_or("");
        let file_type = FileType::from_extension(extension)
            .ok_or_else(|| IngestError::UnsupportedFileType(extension.to_string()))?;

        let text = String::from_utf8_lossy(bytes);
        let content = match file_type {
            FileType::Text | FileType::Markdown => clean_text(&text),
            FileType::Csv => normalize_csv(&text)?,
            FileType::Json => flatten_json(&text)?,
        };

        Ok((content, file_type))
    }
}

/// Trims trailing whitespace per line and drops blank lines, preserving
/// the line structure the structured-text rules match against.
fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validates CSV content and re-emits it in normalized delimited form:
/// trimmed cells, consistent quoting, no blank records.
fn normalize_csv(text: &str) -> Result<String, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| IngestError::MalformedCsv(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(IngestError::MalformedCsv("missing header row".to_string()));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&headers)
        .map_err(|e| IngestError::MalformedCsv(e.to_string()))?;

    for record in reader.records() {
        let record = record.map_err(|e| IngestError::MalformedCsv(e.to_string()))?;
        writer
            .write_record(&record)
            .map_err(|e| IngestError::MalformedCsv(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| IngestError::MalformedCsv(e.to_string()))?;
    let normalized = String::from_utf8_lossy(&bytes).trim_end().to_string();
    Ok(normalized)
}

/// Flattens a JSON document into indented `key: value` lines.
fn flatten_json(text: &str) -> Result<String, IngestError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| IngestError::MalformedJson(e.to_string()))?;

    let mut out = String::new();
    write_json_value(&value, 0, &mut out);
    Ok(out.trim_end().to_string())
}

fn write_json_value(value: &serde_json::Value, indent: usize, out: &mut String) {
    let prefix = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(map) => {
            for (key, nested) in map {
                if nested.is_object() || nested.is_array() {
                    out.push_str(&format!("{prefix}{key}:\n"));
                    write_json_value(nested, indent + 1, out);
                } else {
                    out.push_str(&format!("{prefix}{key}: {}\n", scalar_text(nested)));
                }
            }
        }
        serde_json::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    out.push_str(&format!("{prefix}Item {}:\n", index + 1));
                    write_json_value(item, indent + 1, out);
                } else {
                    out.push_str(&format!("{prefix}Item {}: {}\n", index + 1, scalar_text(item)));
                }
            }
        }
        scalar => {
            out.push_str(&format!("{prefix}{}\n", scalar_text(scalar)));
        }
    }
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_files_pass_through_cleaned() {
        let ingestor = DocumentIngestor::new();
        let bytes = b"Line one.   \n\n\nLine two.\n";

        let (content, file_type) = ingestor.ingest(bytes, "notes.txt").unwrap();

        assert_eq!(content, "Line one.\nLine two.");
        assert_eq!(file_type, FileType::Text);
    }

    #[test]
    fn markdown_preserves_structure_for_rule_matching() {
        let ingestor = DocumentIngestor::new();
        let bytes = b"## First Day Checklist\n- Complete HR paperwork\n- Collect laptop\n";

        let (content, file_type) = ingestor.ingest(bytes, "onboarding.md").unwrap();

        assert!(content.contains("## First Day Checklist\n- Complete HR paperwork"));
        assert_eq!(file_type, FileType::Markdown);
    }

    #[test]
    fn csv_is_normalized_but_stays_delimited() {
        let ingestor = DocumentIngestor::new();
        let bytes = b"Department , EmployeeCount\nEngineering , 45\nSales,30\n";

        let (content, file_type) = ingestor.ingest(bytes, "data.csv").unwrap();

        assert_eq!(content, "Department,EmployeeCount\nEngineering,45\nSales,30");
        assert_eq!(file_type, FileType::Csv);
    }

    #[test]
    fn ragged_csv_is_rejected() {
        let ingestor = DocumentIngestor::new();
        let bytes = b"A,B\n1,2,3\n";

        let result = ingestor.ingest(bytes, "bad.csv");
        assert!(matches!(result, Err(IngestError::MalformedCsv(_))));
    }

    #[test]
    fn json_flattens_to_key_value_lines() {
        let ingestor = DocumentIngestor::new();
        let bytes = br#"{"company": "Acme", "offices": [{"city": "Berlin"}]}"#;

        let (content, _) = ingestor.ingest(bytes, "info.json").unwrap();

        assert!(content.contains("company: Acme"));
        assert!(content.contains("city: Berlin"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let ingestor = DocumentIngestor::new();
        let result = ingestor.ingest(b"{not json", "bad.json");
        assert!(matches!(result, Err(IngestError::MalformedJson(_))));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let ingestor = DocumentIngestor::new();
        let result = ingestor.ingest(b"binary", "report.docx");

        match result {
            Err(IngestError::UnsupportedFileType(ext)) => assert_eq!(ext, "docx"),
            other => panic!("expected UnsupportedFileType, got {other:?}"),
        }
    }

    #[test]
    fn non_utf8_bytes_are_replaced_not_rejected() {
        let ingestor = DocumentIngestor::new();
        let bytes = [b'o', b'k', 0xFF, b'!'];

        let (content, _) = ingestor.ingest(&bytes, "legacy.txt").unwrap();
        assert!(content.starts_with("ok"));
    }
}
