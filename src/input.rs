//! Run input — a single logical message, plain text or one embedded file
//! with an accompanying instruction.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Default instruction accompanying a file when the caller gives none.
pub const DEFAULT_FILE_QUERY: &str =
    "Analyze this document and extract all relevant information.";

/// One part of a multi-part message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    Image {
        media_type: String,
        data_base64: String,
    },
    File {
        filename: String,
        media_type: String,
        data_base64: String,
    },
}

/// Input to a whole workflow run.
///
/// Exactly one form is chosen at start; the guardrail stage's `safe_text`
/// becomes the canonical text for all later single-text stages.
#[derive(Debug, Clone)]
pub enum WorkflowInput {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl WorkflowInput {
    /// Build a text input. Empty text is a precondition violation.
    pub fn text(text: impl Into<String>) -> Result<Self, WorkflowError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(WorkflowError::Precondition("input text is empty".into()));
        }
        Ok(Self::Text(text))
    }

    /// Build a multi-part input. An empty part list is a precondition violation.
    pub fn parts(parts: Vec<ContentPart>) -> Result<Self, WorkflowError> {
        if parts.is_empty() {
            return Err(WorkflowError::Precondition(
                "multipart message has no content parts".into(),
            ));
        }
        Ok(Self::Parts(parts))
    }

    /// Load a run input from a file on disk.
    ///
    /// `.txt` becomes plain text; `.pdf` a base64 file part; images a base64
    /// image part. Anything else is rejected. `query` accompanies non-text
    /// files and defaults to [`DEFAULT_FILE_QUERY`].
    pub fn from_file(path: &Path, query: Option<&str>) -> Result<Self, WorkflowError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if ext == "txt" {
            let text = std::fs::read_to_string(path).map_err(|e| {
                WorkflowError::Precondition(format!("cannot read {}: {e}", path.display()))
            })?;
            return Self::text(text.trim().to_string());
        }

        let media_type = match ext.as_str() {
            "pdf" => "application/pdf",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            other => {
                return Err(WorkflowError::Precondition(format!(
                    "unsupported file type: .{other} (supported: .txt, .pdf, .png, .jpg, .jpeg, .gif, .webp)"
                )));
            }
        };

        let bytes = std::fs::read(path).map_err(|e| {
            WorkflowError::Precondition(format!("cannot read {}: {e}", path.display()))
        })?;
        let data_base64 = BASE64.encode(&bytes);
        let query = query.unwrap_or(DEFAULT_FILE_QUERY).to_string();

        let file_part = if ext == "pdf" {
            ContentPart::File {
                filename: path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("document.pdf")
                    .to_string(),
                media_type: media_type.to_string(),
                data_base64,
            }
        } else {
            ContentPart::Image {
                media_type: media_type.to_string(),
                data_base64,
            }
        };

        Self::parts(vec![file_part, ContentPart::Text { text: query }])
    }

    /// Short human-readable view for progress events. Never includes base64
    /// payloads.
    pub fn preview(&self, max_chars: usize) -> String {
        match self {
            Self::Text(text) => truncate_for_display(text, max_chars),
            Self::Parts(parts) => {
                let mut lines = Vec::with_capacity(parts.len());
                for part in parts {
                    match part {
                        ContentPart::Text { text } => {
                            lines.push(format!("text: {}", truncate_for_display(text, max_chars)));
                        }
                        ContentPart::Image { media_type, .. } => {
                            lines.push(format!("[image ({media_type})]"));
                        }
                        ContentPart::File {
                            filename,
                            media_type,
                            ..
                        } => {
                            lines.push(format!("[file: {filename} ({media_type})]"));
                        }
                    }
                }
                lines.join("\n")
            }
        }
    }
}

/// Truncate text at a char boundary, noting how much was dropped.
pub(crate) fn truncate_for_display(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{kept}\n... [{} chars omitted]", total - max_chars)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn empty_text_is_precondition_error() {
        assert!(matches!(
            WorkflowInput::text("   "),
            Err(WorkflowError::Precondition(_))
        ));
    }

    #[test]
    fn empty_parts_is_precondition_error() {
        assert!(matches!(
            WorkflowInput::parts(vec![]),
            Err(WorkflowError::Precondition(_))
        ));
    }

    #[test]
    fn txt_file_loads_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.txt");
        std::fs::write(&path, "Hola, adjunto mi CV.\n").unwrap();

        let input = WorkflowInput::from_file(&path, None).unwrap();
        match input {
            WorkflowInput::Text(text) => assert_eq!(text, "Hola, adjunto mi CV."),
            other => panic!("expected text input, got {other:?}"),
        }
    }

    #[test]
    fn pdf_file_loads_as_file_part_with_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"%PDF-1.4 fake").unwrap();

        let input = WorkflowInput::from_file(&path, Some("Extract the candidate data")).unwrap();
        match input {
            WorkflowInput::Parts(parts) => {
                assert_eq!(parts.len(), 2);
                match &parts[0] {
                    ContentPart::File {
                        filename,
                        media_type,
                        data_base64,
                    } => {
                        assert_eq!(filename, "cv.pdf");
                        assert_eq!(media_type, "application/pdf");
                        assert!(!data_base64.is_empty());
                    }
                    other => panic!("expected file part, got {other:?}"),
                }
                match &parts[1] {
                    ContentPart::Text { text } => assert_eq!(text, "Extract the candidate data"),
                    other => panic!("expected text part, got {other:?}"),
                }
            }
            other => panic!("expected parts input, got {other:?}"),
        }
    }

    #[test]
    fn image_file_gets_default_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, [0x89, 0x50, 0x4e, 0x47]).unwrap();

        let input = WorkflowInput::from_file(&path, None).unwrap();
        match input {
            WorkflowInput::Parts(parts) => {
                assert!(matches!(
                    &parts[0],
                    ContentPart::Image { media_type, .. } if media_type == "image/png"
                ));
                assert!(matches!(
                    &parts[1],
                    ContentPart::Text { text } if text == DEFAULT_FILE_QUERY
                ));
            }
            other => panic!("expected parts input, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.docx");
        std::fs::write(&path, b"x").unwrap();
        assert!(matches!(
            WorkflowInput::from_file(&path, None),
            Err(WorkflowError::Precondition(_))
        ));
    }

    #[test]
    fn missing_file_rejected() {
        let path = Path::new("/nonexistent/input.txt");
        assert!(matches!(
            WorkflowInput::from_file(path, None),
            Err(WorkflowError::Precondition(_))
        ));
    }

    #[test]
    fn preview_hides_base64() {
        let input = WorkflowInput::Parts(vec![
            ContentPart::File {
                filename: "cv.pdf".into(),
                media_type: "application/pdf".into(),
                data_base64: "QUJDREVGRw==".repeat(100),
            },
            ContentPart::Text {
                text: "look at this".into(),
            },
        ]);
        let preview = input.preview(2000);
        assert!(preview.contains("[file: cv.pdf (application/pdf)]"));
        assert!(preview.contains("look at this"));
        assert!(!preview.contains("QUJDREVGRw"));
    }

    #[test]
    fn truncation_reports_omitted_chars() {
        let text = "x".repeat(3000);
        let preview = truncate_for_display(&text, 2000);
        assert!(preview.contains("[1000 chars omitted]"));
    }
}
