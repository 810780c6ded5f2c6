use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use chrono::Local;

use folio::config::{read_config, Config};
use folio::datalog::store::DataLogStore;
use folio::integrity;
use folio::integrity::Problem;
use folio::systems::store::SystemStore;
use folio::taxonomy::Taxonomy;
use folio::tech_usage::{analyze, UsageReport};

use crate::ConfigArgs;

fn render_report(report: &UsageReport, problems: &[Problem]) -> String {
    let mut buf = String::new();

    for (kind, usages) in report.by_kind() {
        let _ = writeln!(&mut buf, "{}", kind.label());
        let _ = writeln!(&mut buf, "  {:<24} {:>8} {:>9}", "technology", "systems", "datalogs");
        for usage in usages {
            let _ = writeln!(&mut buf, "  {:<24} {:>8} {:>9}",
                usage.technology.name, usage.system_count, usage.datalog_count);
        }
        let _ = writeln!(&mut buf);
    }

    if !report.unused.is_empty() {
        let names: Vec<&str> = report.unused.iter().map(|t| t.name.as_str()).collect();
        let _ = writeln!(&mut buf, "Unused: {}", names.join(", "));
    }
    if !report.unknown.is_empty() {
        let _ = writeln!(&mut buf, "Not in taxonomy: {}", report.unknown.join(", "));
    }
    for problem in problems {
        let _ = writeln!(&mut buf, "Problem: {}", problem);
    }

    buf
}

fn load(config: &Config) -> anyhow::Result<(Taxonomy, DataLogStore, SystemStore)> {
    let defaults = &config.defaults;
    let paths = &config.paths;
    let taxonomy = Taxonomy::load(&paths.taxonomy_file)?;
    let datalogs = DataLogStore::load(&paths.datalogs_dir, &defaults.index_base_name, defaults.break_tag())
        .context("Loading datalogs")?;
    let systems = SystemStore::load(&paths.systems_dir, &defaults.index_base_name, defaults.break_tag())
        .context("Loading systems")?;
    Ok((taxonomy, datalogs, systems))
}

pub fn tech_usage_cmd(args: ConfigArgs) -> anyhow::Result<()> {
    let config = read_config(Path::new(&args.config_path))
        .with_context(|| format!("Loading {}", args.config_path))?;
    let (taxonomy, datalogs, systems) = load(&config)?;

    let report = analyze(&taxonomy, &systems, &datalogs, Local::now().naive_local());
    let problems = integrity::check(&taxonomy, &datalogs, &systems);
    print!("{}", render_report(&report, &problems));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use super::*;

    fn bundled_config() -> Config {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("res").join("folio.toml");
        let mut config = read_config(&path).unwrap();
        let res = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("res");
        config.paths.taxonomy_file = res.join("taxonomy.toml");
        config.paths.datalogs_dir = res.join("datalogs");
        config.paths.systems_dir = res.join("systems");
        config
    }

    #[test]
    fn test_bundled_report() {
        let (taxonomy, datalogs, systems) = load(&bundled_config()).unwrap();
        let now = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let report = analyze(&taxonomy, &systems, &datalogs, now);
        let problems = integrity::check(&taxonomy, &datalogs, &systems);

        let out = render_report(&report, &problems);
        assert!(out.starts_with("Languages\n"));
        assert!(out.contains("  Rust "));
        assert!(!out.contains("Problem:"));
    }
}
