use std::{fs, io};
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::content::parsing_utils::{parse_header, parse_title};
use crate::content::ParsedContent;

pub struct ContentFile {
    pub link: String,
    pub file_path: PathBuf,
    pub raw_content: String,
}

impl ContentFile {
    pub fn from_file(link: String, file_path: PathBuf) -> io::Result<ContentFile> {
        if !Self::is_markdown(&file_path) {
            return Err(io::Error::new(ErrorKind::Unsupported, format!("Not a markdown file: {}", file_path.display())));
        }

        let raw_content = fs::read_to_string(&file_path)?;

        Ok(ContentFile {
            link,
            file_path,
            raw_content,
        })
    }

    pub fn from_string(link: &str, file_path: &str, raw_content: &str) -> ContentFile {
        ContentFile {
            link: link.to_string(),
            file_path: PathBuf::from(file_path),
            raw_content: raw_content.to_string(),
        }
    }

    pub fn is_markdown(file_name: &PathBuf) -> bool {
        file_name.extension().and_then(|e| e.to_str()) == Some("md")
    }

    pub fn parse(&self) -> io::Result<ParsedContent> {
        let (header, lines, maybe_line) = parse_header(&self.file_path, self.raw_content.lines())?;
        let (title, body) = parse_title(lines, maybe_line);

        Ok(ParsedContent {
            header,
            link: self.link.clone(),
            title,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_data::DATALOG_MD;

    use super::*;

    #[test]
    fn test_parse() {
        let file = ContentFile::from_string("ownership-notes", "datalogs/ownership-notes.md", DATALOG_MD);
        let parsed = file.parse().unwrap();
        assert_eq!(parsed.link, "ownership-notes");
        assert_eq!(parsed.title, "Notes on ownership");
        assert_eq!(parsed.header.get("CATEGORY"), Some("systems-programming"));
        assert!(parsed.body.starts_with("\nBorrowing rules"));
        assert!(parsed.body.contains("<!-- more -->"));
    }

    #[test]
    fn test_reject_other_formats() {
        let err = ContentFile::from_file("x".to_string(), PathBuf::from("datalogs/x.html")).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
