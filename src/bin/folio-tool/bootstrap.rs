use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;

use crate::decompress::decompress_files;
use crate::BootstrapArgs;

const SAMPLE_CFG: &str = include_str!("../../../res/folio.toml");
const SAMPLE_START_DATE: &str = "2023-01-15";

fn write_folio_cfg(out_dir: &Path) -> anyhow::Result<()> {
    let file = File::create(out_dir.join("folio.toml"))?;
    let mut writer = BufWriter::new(file);

    let sample_cfg = replace_paths(out_dir, SAMPLE_CFG);
    let sample_cfg = replace_date(&sample_cfg);

    writer.write_all(sample_cfg.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Points every `res/...` path of the sample configuration at `prefix`.
fn replace_paths(prefix: &Path, config_data: &str) -> String {
    lazy_static! {
        static ref RES_REGEX: Regex = Regex::new(r#""res/"#).unwrap();
    }

    let prefix = prefix.to_string_lossy();
    let prefix = prefix.trim_end_matches('/');
    RES_REGEX.replace_all(config_data, format!("\"{}/", prefix).as_str()).to_string()
}

fn get_current_date() -> String {
    let current_local: DateTime<Local> = Local::now();
    current_local.format("%Y-%m-%d").to_string()
}

fn replace_date(config_data: &str) -> String {
    config_data.replace(SAMPLE_START_DATE, &get_current_date())
}

pub fn bootstrap_cmd(args: BootstrapArgs) -> anyhow::Result<()> {
    let out_path = fs::canonicalize(&args.out_dir)
        .with_context(|| format!("Error converting path to absolute: {}", args.out_dir))?;

    if !fs::metadata(&out_path)?.is_dir() {
        bail!("Output path must be a directory: {}", out_path.display());
    }

    decompress_files(&out_path).context("Error unpacking bundled files")?;
    write_folio_cfg(&out_path).context("Error writing folio.toml")?;

    println!("Site created in {}", out_path.display());
    println!("Start it with: folio -c {}", out_path.join("folio.toml").display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_sample_cfg() {
        let res = replace_paths(&PathBuf::from("/abs/path/"), SAMPLE_CFG);
        assert!(res.contains(r##"template_dir = "/abs/path/template""##));
        assert!(res.contains(r##"public_dir = "/abs/path/public""##));
        assert!(res.contains(r##"datalogs_dir = "/abs/path/datalogs""##));
        assert!(res.contains(r##"taxonomy_file = "/abs/path/taxonomy.toml""##));
        assert!(!res.contains("\"res/"));

        let res = replace_date(&res);
        assert!(res.contains(&format!("site_start_date = {}", get_current_date())));
        assert!(folio::config::parse_config(&res).is_ok());
    }
}
