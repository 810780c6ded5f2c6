use std::collections::HashSet;
use std::io;
use std::io::ErrorKind;
use std::path::Path;

use spdlog::{debug, info};

use crate::content::content_file::ContentFile;
use crate::content::content_list::ContentList;
use crate::systems::{Stage, SystemModule};

/// Every system, featured ones first, then newest first.
#[derive(Default)]
pub struct SystemStore {
    systems: Vec<SystemModule>,
}

impl SystemStore {
    pub fn load(root_dir: &Path, index_base_name: &str, break_tag: &str) -> io::Result<SystemStore> {
        let list = ContentList::new(root_dir, index_base_name);
        let mut systems = vec![];
        for entry in list.retrieve()? {
            debug!("Loading system {}", entry.path.display());
            let is_dir_entry = entry.path.file_stem().and_then(|s| s.to_str()) == Some(index_base_name);
            let asset_dir = if is_dir_entry { entry.path.parent().map(|p| p.to_path_buf()) } else { None };

            let content = ContentFile::from_file(entry.link, entry.path)?.parse()?;
            systems.push(SystemModule::from_content(content, break_tag, asset_dir)?);
        }

        let store = Self::from_systems(systems)?;
        info!("Loaded {} systems from {}", store.systems.len(), root_dir.display());
        Ok(store)
    }

    pub fn from_systems(mut systems: Vec<SystemModule>) -> io::Result<SystemStore> {
        let mut slugs = HashSet::new();
        for system in systems.iter() {
            if !slugs.insert(system.slug.as_str()) {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("Duplicated system slug {} - file={}", system.slug, system.file_path.display())));
            }
        }

        systems.sort_by(|a, b| {
            b.featured.cmp(&a.featured)
                .then_with(|| b.date.cmp(&a.date))
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(SystemStore { systems })
    }

    pub fn all(&self) -> &[SystemModule] {
        &self.systems
    }

    pub fn visible(&self) -> Vec<&SystemModule> {
        self.systems.iter().filter(|s| s.is_visible()).collect()
    }

    pub fn by_slug(&self, slug: &str) -> Option<&SystemModule> {
        self.systems.iter().find(|s| s.slug == slug && s.is_visible())
    }

    pub fn featured(&self, count: usize) -> Vec<&SystemModule> {
        self.systems.iter()
            .filter(|s| s.is_visible() && s.featured)
            .take(count)
            .collect()
    }

    pub fn filter(&self, tech: Option<&str>, stage: Option<Stage>) -> Vec<&SystemModule> {
        self.systems.iter()
            .filter(|s| s.is_visible())
            .filter(|s| tech.map_or(true, |t| s.uses(t)))
            .filter(|s| stage.map_or(true, |st| s.stage == st))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::content::PublishStatus;
    use crate::test_data::res_dir;
    use crate::text_utils::parse_date_time;

    use super::*;

    fn system(slug: &str, date: &str, stage: Stage, tech: &[&str], featured: bool) -> SystemModule {
        SystemModule {
            id: slug.to_string(),
            slug: slug.to_string(),
            name: slug.to_string(),
            date: parse_date_time(date).unwrap(),
            status: PublishStatus::Published,
            stage,
            technologies: tech.iter().map(|t| t.to_string()).collect(),
            metrics: vec![],
            featured,
            repo_url: None,
            demo_url: None,
            summary_html: String::new(),
            body_html: String::new(),
            file_path: format!("systems/{}.md", slug).into(),
            asset_dir: None,
        }
    }

    fn store() -> SystemStore {
        let mut hidden = system("hidden", "2024-06-01", Stage::Beta, &["rust"], true);
        hidden.status = PublishStatus::Draft;
        SystemStore::from_systems(vec![
            system("old", "2021-01-01", Stage::Archived, &["python"], false),
            system("new", "2024-01-01", Stage::Beta, &["rust", "postgresql"], false),
            system("star", "2022-01-01", Stage::Production, &["rust"], true),
            hidden,
        ]).unwrap()
    }

    #[test]
    fn test_order_and_visibility() {
        let store = store();
        let slugs: Vec<&str> = store.visible().iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, ["star", "new", "old"]);
        assert!(store.by_slug("hidden").is_none());
        assert_eq!(store.featured(3).len(), 1);
    }

    #[test]
    fn test_filter() {
        let store = store();
        assert_eq!(store.filter(Some("rust"), None).len(), 2);
        assert_eq!(store.filter(Some("rust"), Some(Stage::Beta)).len(), 1);
        assert_eq!(store.filter(None, Some(Stage::Archived))[0].slug, "old");
        assert!(store.filter(Some("cobol"), None).is_empty());
        assert_eq!(store.filter(None, None).len(), 3);
    }

    #[test]
    fn test_duplicated_slug() {
        let res = SystemStore::from_systems(vec![
            system("a", "2021-01-01", Stage::Beta, &[], false),
            system("a", "2022-01-01", Stage::Beta, &[], false),
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_load_bundled() {
        let store = SystemStore::load(&res_dir().join("systems"), "index", "<!-- more -->").unwrap();
        assert!(store.by_slug("fleet-probe").is_some());
        assert!(!store.featured(3).is_empty());
    }
}
