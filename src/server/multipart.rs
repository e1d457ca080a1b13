//! Multipart form collection.

use crate::server::ApiError;
use axum::extract::Multipart;
use bytes::Bytes;
use std::collections::HashMap;
use std::str::FromStr;

/// A fully drained multipart form.
///
/// Fields carrying a filename are treated as uploads; everything else is
/// text. Handlers read from this instead of streaming the multipart body so
/// validation can happen before any file is materialized.
#[derive(Debug, Default)]
pub struct FormData {
    texts: HashMap<String, String>,
    files: HashMap<String, Bytes>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if field.file_name().is_some() {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
                form.files.insert(name, bytes);
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read field: {e}")))?;
                form.texts.insert(name, text);
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str).filter(|t| !t.is_empty())
    }

    pub fn require_text(&self, name: &str) -> Result<&str, ApiError> {
        self.text(name)
            .ok_or_else(|| ApiError::bad_request(format!("Missing required field: {name}")))
    }

    pub fn file(&self, name: &str) -> Option<&Bytes> {
        self.files.get(name)
    }

    /// Parse an optional text field.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, ApiError> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::bad_request(format!("Invalid value for field: {name}"))),
        }
    }

    /// Parse a required text field.
    pub fn require_parse<T: FromStr>(&self, name: &str) -> Result<T, ApiError> {
        self.parse(name)?
            .ok_or_else(|| ApiError::bad_request(format!("Missing required field: {name}")))
    }

    /// True when the field is a truthy flag (`true` / `1` / `yes`).
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.text(name), Some("true") | Some("1") | Some("yes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(texts: &[(&str, &str)]) -> FormData {
        let mut form = FormData::default();
        for (k, v) in texts {
            form.texts.insert(k.to_string(), v.to_string());
        }
        form
    }

    #[test]
    fn empty_text_counts_as_missing() {
        let form = form_with(&[("slug", "")]);
        assert!(form.text("slug").is_none());
        assert!(form.require_text("slug").is_err());
    }

    #[test]
    fn parse_rejects_garbage() {
        let form = form_with(&[("interval", "ten")]);
        assert!(form.parse::<u32>("interval").is_err());
    }

    #[test]
    fn parse_accepts_numbers() {
        let form = form_with(&[("interval", "10")]);
        assert_eq!(form.require_parse::<u32>("interval").unwrap(), 10);
    }

    #[test]
    fn flags_are_lenient() {
        assert!(form_with(&[("link", "true")]).flag("link"));
        assert!(form_with(&[("link", "1")]).flag("link"));
        assert!(!form_with(&[("link", "false")]).flag("link"));
        assert!(!form_with(&[]).flag("link"));
    }
}
