use std::ops::Index;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

const WORDS_PER_MINUTE: usize = 200;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses `YYYY-MM-DD HH:MM:SS[.mmm]`. The time part is optional and defaults to midnight.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    lazy_static! {
        static ref DATE_REGEX: Regex = Regex::new(
            r"^\s*(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2}):(\d{1,2})(\.\d{0,3})?)?\s*$"
        ).unwrap();
    }

    let Some(caps) = DATE_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let (h, mn, s) = match (caps.get(4), caps.get(5), caps.get(6)) {
        (Some(h), Some(mn), Some(s)) => (to_u32(h.as_str())?, to_u32(mn.as_str())?, to_u32(s.as_str())?),
        _ => (0, 0, 0),
    };

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time {}", buf))?;

    Ok(NaiveDateTime::new(date, time))
}

pub fn format_date_time(date_time: &NaiveDateTime) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

/// Url friendly form of a title or tag: ascii, lower case, words joined by `-`.
pub fn slugify(text: &str) -> String {
    let ascii = unidecode::unidecode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(|c| c.is_alphanumeric()))
        .count()
}

/// Minutes needed to read `text`, never less than one.
pub fn reading_time(text: &str) -> u32 {
    let words = word_count(text);
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    minutes.max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_time() {
        let date_time = parse_date_time("2017-09-10 10:42:32.123").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");

        let date_time = parse_date_time("2017-09-10 10:42:32").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");

        let date_time = parse_date_time("2017-9-1").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-01");
        assert_eq!(time, "00:00:00");
    }

    #[test]
    fn test_parse_invalid_date_time() {
        assert!(parse_date_time("").is_err());
        assert!(parse_date_time("yesterday").is_err());
        assert_eq!(parse_date_time("2023-02-30 10:00:00"), Err("Invalid date 2023-02-30 10:00:00".to_string()));
        assert_eq!(parse_date_time("2023-02-03 25:00:00"), Err("Invalid time 2023-02-03 25:00:00".to_string()));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Ábaco --- dir 2 "), "abaco-dir-2");
        assert_eq!(slugify("Rust"), "rust");
        assert_eq!(slugify("C++ & Zig"), "c-zig");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time("one two three"), 1);
        let long = "word ".repeat(401);
        assert_eq!(reading_time(&long), 3);
        assert_eq!(word_count("a - b --- c"), 3);
    }
}
