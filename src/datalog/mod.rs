use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::content::markdown_renderer::render_markdown;
use crate::content::parsing_utils::{first_paragraph, split_summary};
use crate::content::{ParsedContent, PublishStatus};
use crate::text_utils::{reading_time, slugify};

pub mod archive;
pub mod store;

pub const DATALOGS_URL: &str = "/datalogs";

/// A blog entry.
#[derive(Debug, Clone)]
pub struct DataLog {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub author: String,
    pub date: NaiveDateTime,
    pub status: PublishStatus,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub series: Option<String>,
    pub series_part: Option<u32>,
    pub featured: bool,
    pub reading_time: u32,
    pub summary_md: String,
    pub summary_html: String,
    pub body_html: String,
    pub file_path: PathBuf,
    pub asset_dir: Option<PathBuf>,
}

impl DataLog {
    pub fn from_content(content: ParsedContent, break_tag: &str, asset_dir: Option<PathBuf>) -> io::Result<DataLog> {
        let header = &content.header;
        let slug = header.get("SLUG").map(slugify).unwrap_or_else(|| content.link.clone());
        if slug.is_empty() {
            return Err(header.invalid("Empty slug".to_string()));
        }

        let date = header.date("DATE")?;
        let status = PublishStatus::from_header(header)?;
        let series = header.get("SERIES").map(|s| s.to_string());
        let series_part = header.number("SERIES_PART")?;

        let summary_md = match split_summary(&content.body, break_tag) {
            Some(summary) => summary,
            None => first_paragraph(&content.body),
        }.to_string();

        let img_prefix = format!("{}/{}", DATALOGS_URL, slug);
        let summary_html = render_markdown(&summary_md, Some(&img_prefix))?;
        let body_html = render_markdown(&content.body, Some(&img_prefix))?;

        let title = if content.title.is_empty() { slug.replace('-', " ") } else { content.title.clone() };

        Ok(DataLog {
            id: header.get_or("ID", &slug).to_string(),
            title,
            author: header.get_or("AUTHOR", "").to_string(),
            date,
            status,
            category: header.get("CATEGORY").map(|s| s.to_string()),
            tags: header.list("TAGS"),
            series,
            series_part,
            featured: header.flag("FEATURED"),
            reading_time: reading_time(&content.body),
            summary_md,
            summary_html,
            body_html,
            file_path: header.file_name.clone(),
            asset_dir,
            slug,
        })
    }

    /// Published and not scheduled for later.
    pub fn is_visible(&self, now: NaiveDateTime) -> bool {
        self.status == PublishStatus::Published && self.date <= now
    }

    pub fn url(&self) -> String {
        format!("{}/{}/", DATALOGS_URL, self.slug)
    }

    pub fn has_tag(&self, tag_slug: &str) -> bool {
        self.tags.iter().any(|t| slugify(t) == tag_slug)
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.summary_md.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}
