use std::collections::HashMap;
use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::str::Lines;

use lazy_static::lazy_static;
use regex::Regex;

use crate::content::HeaderFields;

/// Reads the `[KEY]: # (value)` block on top of a content file. The block may be wrapped in
/// `<!--` / `-->` lines. Returns the remaining lines and the first line after the header.
pub fn parse_header<'a>(file_name: &Path, lines: Lines<'a>) -> io::Result<(HeaderFields, Lines<'a>, Option<&'a str>)> {
    let mut fields: HashMap<String, String> = HashMap::new();

    let mut lines = lines;
    let mut maybe_line = lines.next();

    // Skip optional HTML comment in the beginning
    let mut start_with_comment = false;

    while let Some(line) = maybe_line {
        let line = line.trim();
        if line.is_empty() {
            maybe_line = lines.next();
            continue;
        }

        if line == "<!--" {
            maybe_line = lines.next();
            start_with_comment = true;
        }
        break;
    }

    while let Some(line) = maybe_line {
        if line.trim().is_empty() {
            maybe_line = lines.next();
            continue;
        }

        let Some((key, val)) = extract_header(line) else {
            break;
        };
        fields.insert(key.to_ascii_uppercase(), val.to_string());
        maybe_line = lines.next();
    }

    if start_with_comment {
        loop {
            let Some(line) = maybe_line else {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("End of comment in the header is missing - file={}", file_name.display()))
                );
            };

            if line.trim() == "-->" {
                maybe_line = lines.next();
                break;
            }
            maybe_line = lines.next();
        }
    }

    if fields.is_empty() {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("Content header is missing - file={}", file_name.display()))
        );
    }

    Ok((HeaderFields::new(file_name.to_path_buf(), fields), lines, maybe_line))
}

/// Finds the first `# ` line. Everything after it is the body.
/// Without a title, the whole remaining text is the body.
pub fn parse_title<'a>(lines: Lines<'a>, maybe_line: Option<&'a str>) -> (String, String) {
    let mut scan = lines.clone();
    let mut current = maybe_line;
    while let Some(line) = current {
        if let Some(title) = line.strip_prefix("# ") {
            return (title.trim().to_string(), collect_lines(scan, None));
        }
        current = scan.next();
    }

    (String::new(), collect_lines(lines, maybe_line))
}

fn collect_lines<'a>(lines: Lines<'a>, first: Option<&'a str>) -> String {
    let mut body = String::new();
    for line in first.into_iter().chain(lines) {
        body.push_str(line);
        body.push('\n');
    }
    body
}

/// Text before `break_tag`, or `None` when the tag is absent.
pub fn split_summary<'a>(body: &'a str, break_tag: &str) -> Option<&'a str> {
    body.find(break_tag).map(|pos| &body[..pos])
}

/// Summary used when a body has no break tag: its first paragraph.
pub fn first_paragraph(body: &str) -> &str {
    let body = body.trim_start_matches(['\n', '\r']);
    match body.find("\n\n") {
        Some(pos) => &body[..pos],
        None => body,
    }
}

fn extract_header(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref HEADER_REGEX: Regex = Regex::new(r"^\s*\[(?P<key>\w+)\]: # \((?P<value>.*)\)\s*$").unwrap();
    }

    HEADER_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str());
        let val = cap.name("value").map(|val| val.as_str());
        match (key, val) {
            (Some(key), Some(val)) => Some((key, val)),
            _ => None
        }
    })
}

pub fn remove_comments(md_post: &str) -> io::Result<String> {
    let mut res: String = String::new();
    let mut slice = Some(md_post);

    let start_comment = "<!--";
    let end_comment = "-->";

    while let Some(block) = slice {
        let md_buf: &str = match block.find(start_comment) {
            Some(start) => {
                let to_render: &str = &block[0..start];

                let next: &str = &block[(start + start_comment.len())..];
                match next.find(end_comment) {
                    Some(end) => {
                        slice = Some(&next[(end + end_comment.len())..]);
                    }
                    None => {
                        return Err(io::Error::new(
                            ErrorKind::InvalidData,
                            "Error finding end of comment",
                        ));
                    }
                };

                to_render
            }
            None => {
                slice = None;
                block
            }
        };
        res.push_str(md_buf);
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_extract_header() {
        let res = extract_header("[ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)");
        assert_eq!(res, Some(("ID", "a63bd715-a3fe-4788-b0e1-2a3153778544")));
        let res = extract_header("[DATE]: # (2022-04-02 12:05:00.000)");
        assert_eq!(res, Some(("DATE", "2022-04-02 12:05:00.000")));
        let res = extract_header("[TAGS]: # (rust something-else)");
        assert_eq!(res, Some(("TAGS", "rust something-else")));
        let res = extract_header("[TAGS]: # ()");
        assert_eq!(res, Some(("TAGS", "")));

        assert!(extract_header("[AUTHOR]: (ada)").is_none());
        assert!(extract_header("# [AUTHOR]: # (ada)").is_none());
    }

    #[test]
    fn test_header_in_comment() {
        let file_name = PathBuf::from("datalogs/hello/index.md");
        let content = r##"

<!--

[ID]: # (21c1e9ad-4ebb-4168-a543-fbf77cc35a85)

[DATE]: # (2024-02-12 22:54:00.000)

[category]: # (tooling)

-->

# Hello
Body"##;

        let (header, lines, next_line) = parse_header(&file_name, content.lines()).unwrap();
        assert_eq!(header.get("ID"), Some("21c1e9ad-4ebb-4168-a543-fbf77cc35a85"));
        assert_eq!(header.get("CATEGORY"), Some("tooling"));
        let (title, body) = parse_title(lines, next_line);
        assert_eq!(title, "Hello");
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_header_without_comment() {
        let file_name = PathBuf::from("systems/probe.md");
        let content = "[ID]: # (1)\n[STAGE]: # (beta)\n# Probe\n\nText\n";
        let (header, lines, next_line) = parse_header(&file_name, content.lines()).unwrap();
        assert_eq!(header.get("STAGE"), Some("beta"));
        assert_eq!(next_line, Some("# Probe"));
        let (title, body) = parse_title(lines, next_line);
        assert_eq!(title, "Probe");
        assert_eq!(body, "\nText\n");
    }

    #[test]
    fn test_missing_title_keeps_body() {
        let file_name = PathBuf::from("pages/about.md");
        let content = "[ID]: # (about)\nJust text\nMore text";
        let (_header, lines, next_line) = parse_header(&file_name, content.lines()).unwrap();
        let (title, body) = parse_title(lines, next_line);
        assert_eq!(title, "");
        assert_eq!(body, "Just text\nMore text\n");
    }

    #[test]
    fn test_header_errors() {
        let file_name = PathBuf::from("datalogs/broken.md");
        let err = parse_header(&file_name, "<!--\n[ID]: # (1)\n# Title".lines()).err().unwrap();
        assert!(err.to_string().starts_with("End of comment in the header is missing"));

        let err = parse_header(&file_name, "# Title only\n".lines()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_split_summary() {
        let body = "Intro line\n\n<!-- more -->\nRest";
        assert_eq!(split_summary(body, "<!-- more -->"), Some("Intro line\n\n"));
        assert_eq!(split_summary("No break", "<!-- more -->"), None);
        assert_eq!(first_paragraph("\nFirst\nstill first\n\nSecond"), "First\nstill first");
        assert_eq!(first_paragraph("Only"), "Only");
    }

    #[test]
    fn test_remove_comments() {
        assert_eq!(remove_comments("Some text.<!-- more -->Wo<!-- xyz -->rd").unwrap(), "Some text.Word");
        assert_eq!(remove_comments("Some text.Word").unwrap(), "Some text.Word");
        assert_eq!(remove_comments("").unwrap(), "");
        assert_eq!(remove_comments("<!-- more --><!-- xyz -->").unwrap(), "");
        assert!(remove_comments("text <!-- open").is_err());
    }
}
