use std::collections::HashMap;
use std::io;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::text_utils::parse_date_time;

pub mod content_file;
pub mod content_list;
pub mod markdown_renderer;
pub mod parsing_utils;

/// `[KEY]: # (value)` pairs found on top of a content file.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFields {
    pub file_name: PathBuf,
    fields: HashMap<String, String>,
}

impl HeaderFields {
    pub fn new(file_name: PathBuf, fields: HashMap<String, String>) -> Self {
        HeaderFields {
            file_name,
            fields,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key).map(|v| v.to_ascii_lowercase()).as_deref(), Some("true" | "yes" | "1"))
    }

    /// Space separated list.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| v.split_whitespace().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }

    pub fn date(&self, key: &str) -> io::Result<NaiveDateTime> {
        let value = self.get(key).ok_or_else(|| self.invalid(format!("Missing {} header", key)))?;
        parse_date_time(value).map_err(|e| self.invalid(e))
    }

    pub fn number(&self, key: &str) -> io::Result<Option<u32>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v.parse::<u32>()
                .map(Some)
                .map_err(|_| self.invalid(format!("{} is not a number: {}", key, v))),
        }
    }

    pub fn invalid(&self, desc: String) -> io::Error {
        io::Error::new(ErrorKind::InvalidData, format!("{} - file={}", desc, self.file_name.display()))
    }
}

/// A content file split into header, title and the markdown below the title.
#[derive(Debug, Clone)]
pub struct ParsedContent {
    pub header: HeaderFields,
    pub link: String,
    pub title: String,
    pub body: String,
}

/// Whether a piece of content can be shown to visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    Draft,
    Published,
}

impl PublishStatus {
    pub fn from_header(header: &HeaderFields) -> io::Result<PublishStatus> {
        match header.get("STATUS").map(|s| s.to_ascii_lowercase()).as_deref() {
            None | Some("published") => Ok(PublishStatus::Published),
            Some("draft") => Ok(PublishStatus::Draft),
            Some(other) => Err(header.invalid(format!("Unknown status {}", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Published => "published",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(pairs: &[(&str, &str)]) -> HeaderFields {
        let fields = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        HeaderFields::new(PathBuf::from("datalogs/sample.md"), fields)
    }

    #[test]
    fn test_header_accessors() {
        let h = header(&[
            ("TAGS", " rust  web "),
            ("FEATURED", "Yes"),
            ("SERIES_PART", "2"),
            ("AUTHOR", "  "),
        ]);
        assert_eq!(h.list("TAGS"), ["rust", "web"]);
        assert!(h.flag("FEATURED"));
        assert!(!h.flag("MISSING"));
        assert_eq!(h.number("SERIES_PART").unwrap(), Some(2));
        assert_eq!(h.get("AUTHOR"), None);
        assert_eq!(h.get_or("AUTHOR", "anon"), "anon");
    }

    #[test]
    fn test_header_errors() {
        let h = header(&[("DATE", "not a date"), ("SERIES_PART", "two")]);
        let err = h.date("DATE").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains("file=datalogs/sample.md"));
        assert!(h.number("SERIES_PART").is_err());
        assert!(header(&[]).date("DATE").is_err());
    }

    #[test]
    fn test_status() {
        assert_eq!(PublishStatus::from_header(&header(&[])).unwrap(), PublishStatus::Published);
        assert_eq!(PublishStatus::from_header(&header(&[("STATUS", "Draft")])).unwrap(), PublishStatus::Draft);
        assert!(PublishStatus::from_header(&header(&[("STATUS", "hidden")])).is_err());
    }
}
