use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::content::markdown_renderer::render_markdown;
use crate::content::parsing_utils::{first_paragraph, split_summary};
use crate::content::{HeaderFields, ParsedContent, PublishStatus};
use crate::text_utils::slugify;

pub mod store;

pub const SYSTEMS_URL: &str = "/systems";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Production,
    Beta,
    Prototype,
    Archived,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Production, Stage::Beta, Stage::Prototype, Stage::Archived];

    pub fn parse(value: &str) -> Option<Stage> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" => Some(Stage::Production),
            "beta" => Some(Stage::Beta),
            "prototype" => Some(Stage::Prototype),
            "archived" => Some(Stage::Archived),
            _ => None,
        }
    }

    fn from_header(header: &HeaderFields) -> io::Result<Stage> {
        match header.get("STAGE") {
            None => Ok(Stage::Prototype),
            Some(v) => Stage::parse(v).ok_or_else(|| header.invalid(format!("Unknown stage {}", v))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Production => "production",
            Stage::Beta => "beta",
            Stage::Prototype => "prototype",
            Stage::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Production => "In production",
            Stage::Beta => "Beta",
            Stage::Prototype => "Prototype",
            Stage::Archived => "Archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

/// `label=value;label=value`. Pieces without `=` are ignored.
pub fn parse_metrics(buf: &str) -> Vec<Metric> {
    buf.split(';')
        .filter_map(|pair| {
            let (label, value) = pair.split_once('=')?;
            let (label, value) = (label.trim(), value.trim());
            if label.is_empty() || value.is_empty() {
                return None;
            }
            Some(Metric { label: label.to_string(), value: value.to_string() })
        })
        .collect()
}

/// A showcased project.
#[derive(Debug, Clone)]
pub struct SystemModule {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub date: NaiveDateTime,
    pub status: PublishStatus,
    pub stage: Stage,
    pub technologies: Vec<String>,
    pub metrics: Vec<Metric>,
    pub featured: bool,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub summary_html: String,
    pub body_html: String,
    pub file_path: PathBuf,
    pub asset_dir: Option<PathBuf>,
}

impl SystemModule {
    pub fn from_content(content: ParsedContent, break_tag: &str, asset_dir: Option<PathBuf>) -> io::Result<SystemModule> {
        let header = &content.header;
        let slug = header.get("SLUG").map(slugify).unwrap_or_else(|| content.link.clone());
        if slug.is_empty() {
            return Err(header.invalid("Empty slug".to_string()));
        }

        let summary_md = match split_summary(&content.body, break_tag) {
            Some(summary) => summary,
            None => first_paragraph(&content.body),
        };
        let img_prefix = format!("{}/{}", SYSTEMS_URL, slug);

        Ok(SystemModule {
            id: header.get_or("ID", &slug).to_string(),
            name: if content.title.is_empty() { slug.clone() } else { content.title.clone() },
            date: header.date("DATE")?,
            status: PublishStatus::from_header(header)?,
            stage: Stage::from_header(header)?,
            technologies: header.list("TECH").iter().map(|t| slugify(t)).collect(),
            metrics: header.get("METRICS").map(parse_metrics).unwrap_or_default(),
            featured: header.flag("FEATURED"),
            repo_url: header.get("REPO").map(|s| s.to_string()),
            demo_url: header.get("DEMO").map(|s| s.to_string()),
            summary_html: render_markdown(summary_md, Some(&img_prefix))?,
            body_html: render_markdown(&content.body, Some(&img_prefix))?,
            file_path: header.file_name.clone(),
            asset_dir,
            slug,
        })
    }

    pub fn is_visible(&self) -> bool {
        self.status == PublishStatus::Published
    }

    pub fn url(&self) -> String {
        format!("{}/{}/", SYSTEMS_URL, self.slug)
    }

    pub fn uses(&self, tech_slug: &str) -> bool {
        self.technologies.iter().any(|t| t == tech_slug)
    }
}

#[cfg(test)]
mod tests {
    use crate::content::content_file::ContentFile;

    use super::*;

    const SYSTEM_MD: &str = "[ID]: # (probe)
[DATE]: # (2023-08-01)
[STAGE]: # (Production)
[TECH]: # (Rust PostgreSQL)
[METRICS]: # (requests/day=1250000; uptime=99.95%; broken)
[FEATURED]: # (true)
[REPO]: # (https://example.com/probe)

# Probe

A health checker for small fleets.

<!-- more -->

![arch](arch.svg)
";

    #[test]
    fn test_from_content() {
        let content = ContentFile::from_string("probe", "systems/probe.md", SYSTEM_MD).parse().unwrap();
        let system = SystemModule::from_content(content, "<!-- more -->", None).unwrap();
        assert_eq!(system.name, "Probe");
        assert_eq!(system.stage, Stage::Production);
        assert_eq!(system.technologies, ["rust", "postgresql"]);
        assert_eq!(system.metrics, vec![
            Metric { label: "requests/day".to_string(), value: "1250000".to_string() },
            Metric { label: "uptime".to_string(), value: "99.95%".to_string() },
        ]);
        assert!(system.featured);
        assert!(system.is_visible());
        assert!(system.uses("rust"));
        assert_eq!(system.repo_url.as_deref(), Some("https://example.com/probe"));
        assert!(system.demo_url.is_none());
        assert_eq!(system.url(), "/systems/probe/");
        assert!(system.summary_html.contains("health checker"));
        assert!(system.body_html.contains("/systems/probe/arch.svg"));
    }

    #[test]
    fn test_unknown_stage() {
        let md = "[DATE]: # (2023-08-01)\n[STAGE]: # (alpha)\n# X\n";
        let content = ContentFile::from_string("x", "systems/x.md", md).parse().unwrap();
        assert!(SystemModule::from_content(content, "<!-- more -->", None).is_err());
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!(Stage::parse(" BETA "), Some(Stage::Beta));
        assert_eq!(Stage::parse("gamma"), None);
        assert!(Stage::ALL.iter().all(|s| Stage::parse(s.as_str()) == Some(*s)));
    }
}
