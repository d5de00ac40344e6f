// Customer feedback recording.
//
// A submission is one structured record appended to a spreadsheet-style
// CSV store. The write is a single synchronous call: a failure is surfaced
// to the operator and the record is not retried or queued. Permission
// problems get their own error variant so the operator message can point
// at sharing/filesystem rights rather than a generic I/O failure.
use chrono::Local;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("{0} must not be blank")]
    BlankField(&'static str),
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
    #[error("permission denied writing to {path}")]
    PermissionDenied { path: String },
    #[error("could not write feedback to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("could not serialize feedback record: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Outlet")]
    pub outlet: String,
    #[serde(rename = "Feedback")]
    pub feedback: String,
    #[serde(rename = "Submitted At")]
    pub submitted_at: String,
}

impl FeedbackRecord {
    /// Validate the form fields and stamp the submission time. Name and
    /// feedback text are required; a blank email is stored as `N/A`.
    pub fn new(
        customer_name: &str,
        email: &str,
        rating: u8,
        outlet: &str,
        feedback: &str,
    ) -> Result<FeedbackRecord, FeedbackError> {
        if customer_name.trim().is_empty() {
            return Err(FeedbackError::BlankField("Customer Name"));
        }
        if feedback.trim().is_empty() {
            return Err(FeedbackError::BlankField("Feedback"));
        }
        if !(1..=5).contains(&rating) {
            return Err(FeedbackError::RatingOutOfRange(rating));
        }
        let email = email.trim();
        Ok(FeedbackRecord {
            customer_name: customer_name.trim().to_string(),
            email: if email.is_empty() {
                "N/A".to_string()
            } else {
                email.to_string()
            },
            rating: format!("{} / 5", rating),
            outlet: outlet.to_string(),
            feedback: feedback.trim().to_string(),
            submitted_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }
}

fn write_error(path: &str, source: io::Error) -> FeedbackError {
    if source.kind() == io::ErrorKind::PermissionDenied {
        FeedbackError::PermissionDenied {
            path: path.to_string(),
        }
    } else {
        FeedbackError::Write {
            path: path.to_string(),
            source,
        }
    }
}

/// Append one record to the store, creating the file (with a header row)
/// on first use.
pub fn append_record(path: &str, record: &FeedbackRecord) -> Result<(), FeedbackError> {
    let is_new = !Path::new(path).exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| write_error(path, e))?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush().map_err(|e| write_error(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(outlet: &str) -> FeedbackRecord {
        FeedbackRecord::new("Amina", "", 4, outlet, "Quick exchange, no fuss").unwrap()
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        assert!(matches!(
            FeedbackRecord::new("  ", "", 5, "Hilal", "ok"),
            Err(FeedbackError::BlankField("Customer Name"))
        ));
        assert!(matches!(
            FeedbackRecord::new("Amina", "", 5, "Hilal", "   "),
            Err(FeedbackError::BlankField("Feedback"))
        ));
        assert!(matches!(
            FeedbackRecord::new("Amina", "", 0, "Hilal", "ok"),
            Err(FeedbackError::RatingOutOfRange(0))
        ));
    }

    #[test]
    fn blank_email_defaults_and_rating_is_formatted() {
        let r = record("Hilal");
        assert_eq!(r.email, "N/A");
        assert_eq!(r.rating, "4 / 5");
        // Timestamp format is `YYYY-MM-DD HH:MM:SS`.
        assert_eq!(r.submitted_at.len(), 19);
        assert_eq!(&r.submitted_at[4..5], "-");
        assert_eq!(&r.submitted_at[10..11], " ");
    }

    #[test]
    fn append_writes_header_once_then_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feedback.csv");
        let path = path.to_str().unwrap();

        append_record(path, &record("Hilal")).unwrap();
        append_record(path, &record("Jais")).unwrap();

        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Customer Name,Email,Rating,Outlet,Feedback,Submitted At"));
        assert!(lines[1].contains("Hilal"));
        assert!(lines[2].contains("Jais"));
    }
}
