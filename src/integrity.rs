use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::datalog::store::DataLogStore;
use crate::systems::store::SystemStore;
use crate::taxonomy::Taxonomy;

/// A reference from content to a taxonomy entry that does not exist.
#[derive(Debug, Clone, PartialEq)]
pub enum Problem {
    UnknownCategory { file: PathBuf, category: String },
    UnknownSeries { file: PathBuf, series: String },
    UnknownTechnology { file: PathBuf, technology: String },
    PartWithoutSeries { file: PathBuf },
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Problem::UnknownCategory { file, category } =>
                write!(f, "Unknown category {} - file={}", category, file.display()),
            Problem::UnknownSeries { file, series } =>
                write!(f, "Unknown series {} - file={}", series, file.display()),
            Problem::UnknownTechnology { file, technology } =>
                write!(f, "Unknown technology {} - file={}", technology, file.display()),
            Problem::PartWithoutSeries { file } =>
                write!(f, "SERIES_PART without SERIES - file={}", file.display()),
        }
    }
}

/// Checks every entry, drafts included, against the taxonomy.
pub fn check(taxonomy: &Taxonomy, datalogs: &DataLogStore, systems: &SystemStore) -> Vec<Problem> {
    let mut problems = vec![];

    for log in datalogs.all() {
        if let Some(ref category) = log.category {
            if taxonomy.category(category).is_none() {
                problems.push(Problem::UnknownCategory { file: log.file_path.clone(), category: category.clone() });
            }
        }
        match (&log.series, log.series_part) {
            (Some(series), _) if taxonomy.series(series).is_none() => {
                problems.push(Problem::UnknownSeries { file: log.file_path.clone(), series: series.clone() });
            }
            (None, Some(_)) => problems.push(Problem::PartWithoutSeries { file: log.file_path.clone() }),
            _ => {}
        }
    }

    for system in systems.all() {
        for tech in system.technologies.iter() {
            if taxonomy.technology(tech).is_none() {
                problems.push(Problem::UnknownTechnology { file: system.file_path.clone(), technology: tech.clone() });
            }
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use crate::content::content_file::ContentFile;
    use crate::datalog::DataLog;
    use crate::systems::SystemModule;
    use crate::test_data::res_dir;

    use super::*;

    fn taxonomy() -> Taxonomy {
        Taxonomy::parse(r##"
[[category]]
name = "Web"

[[series]]
name = "Alloc"

[[technology]]
name = "Rust"
kind = "language"
"##).unwrap()
    }

    fn datalog(link: &str, header: &str) -> DataLog {
        let md = format!("[DATE]: # (2024-01-01)\n{}\n# Title\nBody\n", header);
        let content = ContentFile::from_string(link, &format!("datalogs/{}.md", link), &md).parse().unwrap();
        DataLog::from_content(content, "<!-- more -->", None).unwrap()
    }

    fn system(link: &str, tech: &str) -> SystemModule {
        let md = format!("[DATE]: # (2024-01-01)\n[TECH]: # ({})\n# Title\nBody\n", tech);
        let content = ContentFile::from_string(link, &format!("systems/{}.md", link), &md).parse().unwrap();
        SystemModule::from_content(content, "<!-- more -->", None).unwrap()
    }

    #[test]
    fn test_problems() {
        let datalogs = DataLogStore::from_logs(vec![
            datalog("fine", "[CATEGORY]: # (web)\n[SERIES]: # (alloc)\n[SERIES_PART]: # (1)"),
            datalog("bad-category", "[CATEGORY]: # (cooking)"),
            datalog("bad-series", "[SERIES]: # (nope)"),
            datalog("orphan-part", "[SERIES_PART]: # (2)"),
        ]).unwrap();
        let systems = SystemStore::from_systems(vec![system("probe", "rust cobol")]).unwrap();

        let problems = check(&taxonomy(), &datalogs, &systems);
        assert_eq!(problems.len(), 4);
        assert!(problems.contains(&Problem::UnknownCategory {
            file: PathBuf::from("datalogs/bad-category.md"),
            category: "cooking".to_string(),
        }));
        assert!(problems.contains(&Problem::PartWithoutSeries { file: PathBuf::from("datalogs/orphan-part.md") }));
        assert_eq!(
            Problem::UnknownTechnology { file: PathBuf::from("systems/probe.md"), technology: "cobol".to_string() }.to_string(),
            "Unknown technology cobol - file=systems/probe.md");
    }

    #[test]
    fn test_bundled_content_is_consistent() {
        let res = res_dir();
        let taxonomy = Taxonomy::load(&res.join("taxonomy.toml")).unwrap();
        let datalogs = DataLogStore::load(&res.join("datalogs"), "index", "<!-- more -->").unwrap();
        let systems = SystemStore::load(&res.join("systems"), "index", "<!-- more -->").unwrap();
        assert_eq!(check(&taxonomy, &datalogs, &systems), vec![]);
    }
}
