use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::util::toml_date::TomlDate;

#[derive(Deserialize, Clone)]
pub struct Site {
    pub title: String,
    pub owner: String,
    pub tagline: String,
    pub email: Option<String>,
    pub activity_start_year: i32,
    pub site_start_date: TomlDate,
}

#[derive(Deserialize, Clone)]
pub struct Theme {
    pub accent_color: Option<String>,
    #[serde(default = "default_glass_alpha")]
    pub glass_alpha: f64,
    #[serde(default = "default_shade_factor")]
    pub shade_factor: f64,
}

fn default_glass_alpha() -> f64 {
    0.12
}

fn default_shade_factor() -> f64 {
    0.2
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            accent_color: None,
            glass_alpha: default_glass_alpha(),
            shade_factor: default_shade_factor(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub datalogs_dir: PathBuf,
    pub systems_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub taxonomy_file: PathBuf,
    pub messages_dir: Option<PathBuf>,
}

#[derive(Deserialize, Clone)]
pub struct Defaults {
    pub index_base_name: String,
    pub page_size: u32,
    pub systems_page_size: u32,
    pub summary_break_tag: Option<String>,
    pub rendering_cache_enabled: bool,
}

impl Defaults {
    pub fn break_tag(&self) -> &str {
        self.summary_break_tag.as_deref().unwrap_or("<!-- more -->")
    }
}

#[derive(Deserialize, Clone)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Clone)]
pub struct RssFeed {
    pub title: String,
    pub site_url: String,
    pub description: String,
    pub page_size: u32,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub site: Site,
    #[serde(default)]
    pub theme: Theme,
    pub paths: Paths,
    pub defaults: Defaults,
    pub server: Server,
    pub log: Option<Log>,
    pub rss_feed: Option<RssFeed>,
}

fn expand_path(path: PathBuf, exe_dir: Option<&Path>) -> PathBuf {
    let Some(exe_dir) = exe_dir else {
        return path;
    };

    match path.to_str() {
        Some(str_path) if str_path.starts_with("${exe_dir}") => {
            let exe_dir = exe_dir.to_string_lossy();
            PathBuf::from(str_path.replace("${exe_dir}", &exe_dir))
        }
        _ => path,
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    let cur_exe = env::current_exe().ok();
    let exe_dir = cur_exe.as_deref().and_then(|p| p.parent());
    let paths = cfg.paths;
    cfg.paths = Paths {
        template_dir: expand_path(paths.template_dir, exe_dir),
        public_dir: expand_path(paths.public_dir, exe_dir),
        datalogs_dir: expand_path(paths.datalogs_dir, exe_dir),
        systems_dir: expand_path(paths.systems_dir, exe_dir),
        pages_dir: expand_path(paths.pages_dir, exe_dir),
        taxonomy_file: expand_path(paths.taxonomy_file, exe_dir),
        messages_dir: paths.messages_dir.map(|p| expand_path(p, exe_dir)),
    };

    if cfg.defaults.page_size == 0 || cfg.defaults.systems_page_size == 0 {
        return Err(io::Error::new(ErrorKind::InvalidData, "Page sizes must be greater than 0"));
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const CFG: &str = r##"
[site]
title = "Folio"
owner = "Ada"
tagline = "Systems and notes"
activity_start_year = 2010
site_start_date = 2021-03-14

[paths]
template_dir = "${exe_dir}/template"
public_dir = "public"
datalogs_dir = "datalogs"
systems_dir = "systems"
pages_dir = "pages"
taxonomy_file = "taxonomy.toml"

[defaults]
index_base_name = "index"
page_size = 5
systems_page_size = 6
rendering_cache_enabled = false

[server]
address = "127.0.0.1"
port = 8001
"##;

    #[test]
    fn test_parse_minimal() {
        let cfg = parse_config(CFG).unwrap();
        assert_eq!(cfg.site.owner, "Ada");
        assert_eq!(cfg.site.site_start_date, TomlDate(NaiveDate::from_ymd_opt(2021, 3, 14).unwrap()));
        assert!(cfg.theme.accent_color.is_none());
        assert_eq!(cfg.theme.glass_alpha, 0.12);
        assert_eq!(cfg.defaults.break_tag(), "<!-- more -->");
        assert!(cfg.paths.messages_dir.is_none());
        assert!(cfg.log.is_none());
        assert!(!cfg.paths.template_dir.to_string_lossy().contains("${exe_dir}"));
        assert_eq!(cfg.paths.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_zero_page_size() {
        let cfg = CFG.replace("page_size = 5", "page_size = 0");
        let err = parse_config(&cfg).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_bundled_config() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("res").join("folio.toml");
        let cfg = read_config(&path).unwrap();
        assert_eq!(cfg.server.port, 8001);
        assert!(cfg.rss_feed.is_some());
        assert_eq!(cfg.log.as_ref().map(|l| l.level), Some(LogLevel::Info));
    }
}
