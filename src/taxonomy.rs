use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use std::{fs, io};

use serde::Deserialize;

use crate::text_utils::slugify;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub color: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TechKind {
    Language,
    Framework,
    Database,
    Infrastructure,
    Tool,
}

impl TechKind {
    pub fn label(&self) -> &'static str {
        match self {
            TechKind::Language => "Languages",
            TechKind::Framework => "Frameworks",
            TechKind::Database => "Databases",
            TechKind::Infrastructure => "Infrastructure",
            TechKind::Tool => "Tools",
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Technology {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub kind: TechKind,
    pub color: Option<String>,
}

/// Categories, series and technologies declared in the taxonomy file.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Taxonomy {
    #[serde(default, rename = "category")]
    pub categories: Vec<Category>,
    #[serde(default, rename = "series")]
    pub series: Vec<Series>,
    #[serde(default, rename = "technology")]
    pub technologies: Vec<Technology>,
}

fn check_unique<'a>(kind: &str, slugs: impl Iterator<Item = &'a str>) -> io::Result<()> {
    let mut seen = HashSet::new();
    for slug in slugs {
        if slug.is_empty() {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("Empty {} slug", kind)));
        }
        if !seen.insert(slug) {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("Duplicated {} slug: {}", kind, slug)));
        }
    }
    Ok(())
}

fn fill_slug(slug: &mut String, name: &str) {
    if slug.trim().is_empty() {
        *slug = slugify(name);
    }
}

impl Taxonomy {
    pub fn parse(buf: &str) -> io::Result<Taxonomy> {
        let mut taxonomy: Taxonomy = toml::from_str(buf)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error parsing taxonomy: {}", e)))?;

        for c in taxonomy.categories.iter_mut() {
            fill_slug(&mut c.slug, &c.name);
        }
        for s in taxonomy.series.iter_mut() {
            fill_slug(&mut s.slug, &s.name);
        }
        for t in taxonomy.technologies.iter_mut() {
            fill_slug(&mut t.slug, &t.name);
        }

        check_unique("category", taxonomy.categories.iter().map(|c| c.slug.as_str()))?;
        check_unique("series", taxonomy.series.iter().map(|s| s.slug.as_str()))?;
        check_unique("technology", taxonomy.technologies.iter().map(|t| t.slug.as_str()))?;

        Ok(taxonomy)
    }

    pub fn load(path: &Path) -> io::Result<Taxonomy> {
        let buf = fs::read_to_string(path)
            .map_err(|e| io::Error::new(e.kind(), format!("Error reading taxonomy {}: {}", path.display(), e)))?;
        Self::parse(&buf)
    }

    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    pub fn series(&self, slug: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.slug == slug)
    }

    pub fn technology(&self, slug: &str) -> Option<&Technology> {
        self.technologies.iter().find(|t| t.slug == slug)
    }
}
