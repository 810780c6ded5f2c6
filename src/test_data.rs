use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::config::{Config, Defaults, Paths, RssFeed, Server, Site, Theme};
use crate::text_utils::parse_date_time;
use crate::util::toml_date::TomlDate;

pub const DATALOG_MD: &str = "<!--
[ID]: # (5f0c3b3e-8f0e-4b4e-9a53-0d5b8c6f3a11)
[DATE]: # (2024-03-10 09:30:00.000)
[AUTHOR]: # (Ada)
[CATEGORY]: # (systems-programming)
[TAGS]: # (rust Memory-Safety)
[SERIES]: # (allocators)
[SERIES_PART]: # (1)
-->

# Notes on ownership

Borrowing rules are easier once you draw the graph of who owns what.

<!-- more -->

## Lifetimes

![graph](graph.png)

A reference never outlives the value it points to.
";

/// The bundled `res` directory, which doubles as test fixture.
pub fn res_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("res")
}

/// Far enough in the future to see every bundled entry that is not a draft.
pub fn test_now() -> NaiveDateTime {
    parse_date_time("2030-01-01 00:00:00").unwrap()
}

pub fn sample_config() -> Config {
    let res = res_dir();
    Config {
        site: Site {
            title: "Folio".to_string(),
            owner: "Ada Example".to_string(),
            tagline: "Systems, notes and experiments".to_string(),
            email: Some("ada@example.com".to_string()),
            activity_start_year: 2012,
            site_start_date: TomlDate(chrono::NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()),
        },
        theme: Theme {
            accent_color: Some("#8b5cf6".to_string()),
            ..Theme::default()
        },
        paths: Paths {
            template_dir: res.join("template"),
            public_dir: res.join("public"),
            datalogs_dir: res.join("datalogs"),
            systems_dir: res.join("systems"),
            pages_dir: res.join("pages"),
            taxonomy_file: res.join("taxonomy.toml"),
            messages_dir: None,
        },
        defaults: Defaults {
            index_base_name: "index".to_string(),
            page_size: 2,
            systems_page_size: 6,
            summary_break_tag: None,
            rendering_cache_enabled: true,
        },
        server: Server {
            address: "127.0.0.1".to_string(),
            port: 8001,
        },
        log: None,
        rss_feed: Some(RssFeed {
            title: "Folio DataLogs".to_string(),
            site_url: "https://folio.example.com".to_string(),
            description: "Notes from the lab".to_string(),
            page_size: 10,
        }),
    }
}
