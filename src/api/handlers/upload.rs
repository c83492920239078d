//! Multipart form parsing shared by the record handlers.
//!
//! Create and update requests for repair requests and purchase orders arrive
//! as `multipart/form-data`: scalar fields as text parts, attachments as file
//! parts. Any part carrying a filename is treated as an upload regardless of
//! its field name.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::services::attachment_service::PendingFile;

const OFFLINE_HEADER: &str = "x-offline-request";

/// Parsed multipart body: text fields plus pending file uploads.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub files: Vec<PendingFile>,
}

impl MultipartForm {
    /// Raw text field value, if present.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Owned, non-empty text field value.
    pub fn text_owned(&self, key: &str) -> Option<String> {
        self.text(key)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
    }

    /// Parse a field as an `f64`.
    pub fn parse_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.text(key) {
            None => Ok(None),
            Some(v) => v.trim().parse::<f64>().map(Some).map_err(|_| {
                AppError::Validation(format!("Field '{}' must be a number", key))
            }),
        }
    }

    /// Parse a field as an RFC 3339 timestamp.
    pub fn parse_datetime(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        match self.text(key) {
            None => Ok(None),
            Some(v) => DateTime::parse_from_rfc3339(v.trim())
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| {
                    AppError::Validation(format!(
                        "Field '{}' must be an RFC 3339 timestamp",
                        key
                    ))
                }),
        }
    }

    /// Parse a field holding a bare enum value, e.g. `urgency=high`.
    pub fn parse_enum<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.text(key) {
            None => Ok(None),
            Some(v) => {
                serde_json::from_value(serde_json::Value::String(v.trim().to_string()))
                    .map(Some)
                    .map_err(|_| {
                        AppError::Validation(format!("Field '{}' has an invalid value", key))
                    })
            }
        }
    }

    /// Parse a field holding a JSON document, e.g. a replacement attachment
    /// list.
    pub fn parse_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.text(key) {
            None => Ok(None),
            Some(v) => serde_json::from_str(v).map(Some).map_err(|e| {
                AppError::Validation(format!("Field '{}' is not valid JSON: {}", key, e))
            }),
        }
    }
}

/// Drain a multipart body into text fields and pending files.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(|e| {
                AppError::Validation(format!("Failed to read file '{}': {}", file_name, e))
            })?;
            form.files.push(PendingFile {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(|e| {
                AppError::Validation(format!("Failed to read field '{}': {}", name, e))
            })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// True when the client marked this request as made from an offline device,
/// routing attachments to local storage.
pub fn is_offline_request(headers: &HeaderMap) -> bool {
    headers
        .get(OFFLINE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::status::Urgency;
    use axum::http::HeaderValue;

    fn form_with(fields: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: Vec::new(),
        }
    }

    #[test]
    fn test_parse_enum_reads_wire_format() {
        let form = form_with(&[("urgency", "high")]);
        let urgency: Option<Urgency> = form.parse_enum("urgency").unwrap();
        assert_eq!(urgency, Some(Urgency::High));
    }

    #[test]
    fn test_parse_enum_rejects_unknown_value() {
        let form = form_with(&[("urgency", "catastrophic")]);
        let result: Result<Option<Urgency>> = form.parse_enum("urgency");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_f64_rejects_non_numeric() {
        let form = form_with(&[("estimated_cost", "a lot")]);
        assert!(form.parse_f64("estimated_cost").is_err());
        assert_eq!(form_with(&[]).parse_f64("estimated_cost").unwrap(), None);
    }

    #[test]
    fn test_parse_datetime_accepts_rfc3339() {
        let form = form_with(&[("date_reported", "2025-06-11T10:30:00+05:30")]);
        let parsed = form.parse_datetime("date_reported").unwrap().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-06-11T05:00:00+00:00");
    }

    #[test]
    fn test_text_owned_drops_blank_values() {
        let form = form_with(&[("description", "   ")]);
        assert_eq!(form.text_owned("description"), None);
    }

    #[test]
    fn test_offline_header_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_offline_request(&headers));

        headers.insert(OFFLINE_HEADER, HeaderValue::from_static("true"));
        assert!(is_offline_request(&headers));

        headers.insert(OFFLINE_HEADER, HeaderValue::from_static("TRUE"));
        assert!(is_offline_request(&headers));

        headers.insert(OFFLINE_HEADER, HeaderValue::from_static("1"));
        assert!(is_offline_request(&headers));

        headers.insert(OFFLINE_HEADER, HeaderValue::from_static("false"));
        assert!(!is_offline_request(&headers));
    }
}
