//! # CSV Export
//!
//! Renders an export page as CSV with a fixed column order. Fields
//! containing quotes, commas or newlines are quoted, with internal double
//! quotes escaped by doubling (standard CSV escaping, handled by the csv
//! writer).

use chrono::Utc;

use super::errors::{ApiError, ApiResult};
use crate::store::ReviewRow;

/// Fixed export column order
const HEADER: [&str; 9] = [
    "ID",
    "Audio ID",
    "Title",
    "Rating",
    "Date",
    "Time",
    "Session ID",
    "IP Address",
    "Created At",
];

/// Render review rows as a CSV document, header included.
pub fn render_export(rows: &[ReviewRow]) -> ApiResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(HEADER)
        .map_err(|e| ApiError::Internal(format!("CSV write failed: {}", e)))?;

    for row in rows {
        writer
            .write_record([
                row.id.to_string(),
                row.audio_id.to_string(),
                row.title.clone(),
                row.rating.to_string(),
                row.date.clone().unwrap_or_default(),
                row.time.clone().unwrap_or_default(),
                row.session_id.clone(),
                row.ip_address.clone().unwrap_or_default(),
                row.created_at.clone(),
            ])
            .map_err(|e| ApiError::Internal(format!("CSV write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(format!("CSV not UTF-8: {}", e)))
}

/// Date-stamped attachment filename, e.g. `reviews-2024-06-01.csv` (UTC).
pub fn attachment_filename() -> String {
    format!("reviews-{}.csv", Utc::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ReviewRow {
        ReviewRow {
            id: 1,
            audio_id: 42,
            title: "Track A".to_string(),
            rating: 4.5,
            timestamp: None,
            date: Some("2024-06-01".to_string()),
            time: Some("12:00".to_string()),
            user_agent: None,
            session_id: "s1".to_string(),
            ip_address: Some("10.0.0.1".to_string()),
            created_at: "2024-06-01T12:00:00Z".to_string(),
            updated_at: "2024-06-01T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_header_and_row() {
        let csv = render_export(&[sample_row()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID,Audio ID,Title,Rating,Date,Time,Session ID,IP Address,Created At"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,42,Track A,4.5,2024-06-01,12:00,s1,10.0.0.1,2024-06-01T12:00:00Z"
        );
    }

    #[test]
    fn test_quotes_escaped_by_doubling() {
        let mut row = sample_row();
        row.title = r#"He said "hi""#.to_string();
        let csv = render_export(&[row]).unwrap();
        assert!(csv.contains(r#""He said ""hi""""#));
    }

    #[test]
    fn test_missing_optionals_render_empty() {
        let mut row = sample_row();
        row.date = None;
        row.ip_address = None;
        let csv = render_export(&[row]).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains(",,12:00,s1,,"));
    }

    #[test]
    fn test_filename_is_date_stamped() {
        let name = attachment_filename();
        assert!(name.starts_with("reviews-"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "reviews-2024-06-01.csv".len());
    }
}
