use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::datalog::store::DataLogStore;
use crate::systems::store::SystemStore;
use crate::taxonomy::{Taxonomy, TechKind, Technology};

#[derive(Debug, Clone, PartialEq)]
pub struct TechUsage {
    pub technology: Technology,
    pub system_count: usize,
    pub datalog_count: usize,
}

#[derive(Debug, Default)]
pub struct UsageReport {
    /// Technologies used by at least one visible system or datalog.
    pub used: Vec<TechUsage>,
    /// Declared in the taxonomy but never referenced.
    pub unused: Vec<Technology>,
    /// Referenced by systems but not declared.
    pub unknown: Vec<String>,
}

impl UsageReport {
    /// Used technologies grouped by kind, in kind order.
    pub fn by_kind(&self) -> BTreeMap<TechKind, Vec<&TechUsage>> {
        let mut groups: BTreeMap<TechKind, Vec<&TechUsage>> = BTreeMap::new();
        for usage in self.used.iter() {
            groups.entry(usage.technology.kind).or_default().push(usage);
        }
        groups
    }
}

/// Counts, per technology, the visible systems built with it and the visible datalogs tagged
/// with its slug. Most used first.
pub fn analyze(taxonomy: &Taxonomy, systems: &SystemStore, datalogs: &DataLogStore, now: NaiveDateTime) -> UsageReport {
    let visible_systems = systems.visible();
    let visible_logs = datalogs.visible(now);

    let mut used = vec![];
    let mut unused = vec![];
    for tech in taxonomy.technologies.iter() {
        let system_count = visible_systems.iter().filter(|s| s.uses(&tech.slug)).count();
        let datalog_count = visible_logs.iter().filter(|l| l.has_tag(&tech.slug)).count();
        if system_count == 0 && datalog_count == 0 {
            unused.push(tech.clone());
        } else {
            used.push(TechUsage { technology: tech.clone(), system_count, datalog_count });
        }
    }

    used.sort_by(|a, b| {
        b.system_count.cmp(&a.system_count)
            .then_with(|| b.datalog_count.cmp(&a.datalog_count))
            .then_with(|| a.technology.name.cmp(&b.technology.name))
    });

    let unknown: BTreeSet<String> = systems.all().iter()
        .flat_map(|s| s.technologies.iter())
        .filter(|t| taxonomy.technology(t).is_none())
        .cloned()
        .collect();

    UsageReport {
        used,
        unused,
        unknown: unknown.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use crate::content::content_file::ContentFile;
    use crate::datalog::DataLog;
    use crate::systems::SystemModule;
    use crate::test_data::{res_dir, test_now};

    use super::*;

    fn system(link: &str, tech: &str) -> SystemModule {
        let md = format!("[DATE]: # (2024-01-01)\n[TECH]: # ({})\n# {}\nBody\n", tech, link);
        let content = ContentFile::from_string(link, &format!("systems/{}.md", link), &md).parse().unwrap();
        SystemModule::from_content(content, "<!-- more -->", None).unwrap()
    }

    fn datalog(link: &str, tags: &str) -> DataLog {
        let md = format!("[DATE]: # (2024-01-01)\n[TAGS]: # ({})\n# {}\nBody\n", tags, link);
        let content = ContentFile::from_string(link, &format!("datalogs/{}.md", link), &md).parse().unwrap();
        DataLog::from_content(content, "<!-- more -->", None).unwrap()
    }

    #[test]
    fn test_analyze() {
        let taxonomy = Taxonomy::parse(r##"
[[technology]]
name = "Rust"
kind = "language"

[[technology]]
name = "Go"
kind = "language"

[[technology]]
name = "SQLite"
kind = "database"

[[technology]]
name = "Nomad"
kind = "infrastructure"
"##).unwrap();
        let systems = SystemStore::from_systems(vec![
            system("a", "rust sqlite"),
            system("b", "rust fortran"),
            system("c", "sqlite"),
        ]).unwrap();
        let datalogs = DataLogStore::from_logs(vec![
            datalog("x", "go"),
            datalog("y", "sqlite rust"),
            datalog("z", "SQLite"),
        ]).unwrap();

        let report = analyze(&taxonomy, &systems, &datalogs, test_now());
        let rows: Vec<(&str, usize, usize)> = report.used.iter()
            .map(|u| (u.technology.slug.as_str(), u.system_count, u.datalog_count))
            .collect();
        assert_eq!(rows, [("sqlite", 2, 2), ("rust", 2, 1), ("go", 0, 1)]);
        assert_eq!(report.unused.iter().map(|t| t.slug.as_str()).collect::<Vec<_>>(), ["nomad"]);
        assert_eq!(report.unknown, ["fortran"]);

        let groups = report.by_kind();
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), [TechKind::Language, TechKind::Database]);
        assert_eq!(groups[&TechKind::Language].len(), 2);
    }

    #[test]
    fn test_bundled() {
        let res = res_dir();
        let taxonomy = Taxonomy::load(&res.join("taxonomy.toml")).unwrap();
        let systems = SystemStore::load(&res.join("systems"), "index", "<!-- more -->").unwrap();
        let datalogs = DataLogStore::load(&res.join("datalogs"), "index", "<!-- more -->").unwrap();
        let report = analyze(&taxonomy, &systems, &datalogs, test_now());
        assert_eq!(report.used[0].technology.slug, "rust");
        assert!(report.unknown.is_empty());
    }
}
