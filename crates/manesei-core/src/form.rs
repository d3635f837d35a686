//! Editor form
//!
//! The editor posts six fields. `Headers` carries the header block as a JSON
//! object of strings; the server turns the form back into a note file with
//! [`DocumentForm::to_file`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::Document;
use crate::header::serialize_note;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Failed to parse document headers: {0}")]
    InvalidHeaders(#[source] serde_json::Error),
}

/// Fields of the editor form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentForm {
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(rename = "Host", default)]
    pub host: String,
    #[serde(rename = "Slug", default)]
    pub slug: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    /// JSON object mapping header names to values
    #[serde(rename = "Headers", default)]
    pub headers: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

impl DocumentForm {
    /// Prefill the editor from an existing document
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            host: doc.host.clone(),
            slug: doc.slug.clone(),
            title: doc.title.clone(),
            headers: headers_json(&doc.headers),
            body: doc.content.clone(),
        }
    }

    /// An empty form for a new note under `host`
    pub fn new_child(host: &str) -> Self {
        Self {
            host: host.to_string(),
            ..Self::default()
        }
    }

    /// Decode the headers field
    ///
    /// An empty field or JSON `null` means no headers.
    pub fn header_map(&self) -> Result<BTreeMap<String, String>, FormError> {
        let raw = self.headers.trim();
        if raw.is_empty() {
            return Ok(BTreeMap::new());
        }

        let parsed: Option<BTreeMap<String, String>> =
            serde_json::from_str(raw).map_err(FormError::InvalidHeaders)?;
        Ok(parsed.unwrap_or_default())
    }

    /// The note file this form describes
    pub fn to_file(&self) -> Result<String, FormError> {
        let headers = self.header_map()?;
        Ok(serialize_note(
            &self.host,
            &self.slug,
            &self.title,
            &headers,
            &self.body,
        ))
    }
}

fn headers_json(headers: &BTreeMap<String, String>) -> String {
    // A map of strings always serializes
    serde_json::to_string(headers).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::parse_note;
    use pretty_assertions::assert_eq;

    fn form(headers: &str) -> DocumentForm {
        DocumentForm {
            id: "abc".to_string(),
            host: "root".to_string(),
            slug: "child".to_string(),
            title: "Child".to_string(),
            headers: headers.to_string(),
            body: "Hello\n".to_string(),
        }
    }

    #[test]
    fn test_to_file_without_headers() {
        for headers in ["", "  ", "null", "{}"] {
            assert_eq!(form(headers).to_file().unwrap(), "root:child Child\n\nHello\n");
        }
    }

    #[test]
    fn test_to_file_with_headers_in_key_order() {
        let file = form(r#"{"tags": "a, b", "status": "draft"}"#).to_file().unwrap();
        assert_eq!(file, "root:child Child\nstatus: draft\ntags: a, b\n\nHello\n");
    }

    #[test]
    fn test_invalid_headers() {
        let err = form("{not json").to_file().unwrap_err();
        assert!(matches!(err, FormError::InvalidHeaders(_)));
        assert!(err.to_string().starts_with("Failed to parse document headers"));

        assert!(form(r#"{"n": 1}"#).header_map().is_err());
    }

    #[test]
    fn test_from_document_round_trip() {
        let raw = "root:child Child\nstatus: draft\n\nHello\n";
        let doc = Document::from_note("abc", parse_note("abc", raw));

        let form = DocumentForm::from_document(&doc);
        assert_eq!(form.headers, r#"{"status":"draft"}"#);
        assert_eq!(form.to_file().unwrap(), raw);
    }

    #[test]
    fn test_new_child() {
        let form = DocumentForm::new_child("projects");
        assert_eq!(form.host, "projects");
        assert!(form.id.is_empty());
        assert!(form.body.is_empty());
    }

    #[test]
    fn test_deserialize_form_field_names() {
        let form: DocumentForm =
            serde_json::from_value(serde_json::json!({"Id": "x", "Slug": "s", "Body": "b"}))
                .unwrap();

        assert_eq!(form.id, "x");
        assert_eq!(form.slug, "s");
        assert_eq!(form.body, "b");
        assert!(form.host.is_empty());
    }
}
