use std::io;

use chrono::{Datelike, NaiveDateTime};

use crate::config::Config;
use crate::view::render_template;

pub const LAYOUT_TEMPLATE: &str = "layout.tpl";

/// Highlighted entry of the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Nav {
    Home,
    DataLogs,
    Systems,
    About,
    Contact,
    Other,
}

#[derive(ramhorns::Content)]
struct LayoutView<'a> {
    site_title: &'a str,
    owner: &'a str,
    tagline: &'a str,
    page_title: &'a str,
    nav_home: bool,
    nav_datalogs: bool,
    nav_systems: bool,
    nav_about: bool,
    nav_contact: bool,
    has_feed: bool,
    start_year: i32,
    current_year: i32,
    body: &'a str,
}

/// Wraps a rendered page into `layout.tpl`.
pub fn render_layout(config: &Config, nav: Nav, page_title: &str, body: &str, now: NaiveDateTime) -> io::Result<String> {
    let site = &config.site;
    let page_title = if page_title.is_empty() { site.title.as_str() } else { page_title };

    render_template(&config.paths.template_dir, LAYOUT_TEMPLATE, &LayoutView {
        site_title: &site.title,
        owner: &site.owner,
        tagline: &site.tagline,
        page_title,
        nav_home: nav == Nav::Home,
        nav_datalogs: nav == Nav::DataLogs,
        nav_systems: nav == Nav::Systems,
        nav_about: nav == Nav::About,
        nav_contact: nav == Nav::Contact,
        has_feed: config.rss_feed.is_some(),
        start_year: site.activity_start_year,
        current_year: now.year(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_data::{sample_config, test_now};

    use super::*;

    #[test]
    fn test_layout_wraps_body() {
        let config = sample_config();
        let html = render_layout(&config, Nav::Systems, "Fleet probe", "<p>inner</p>", test_now()).unwrap();
        assert!(html.contains("<title>Fleet probe | Folio</title>"));
        assert!(html.contains("<p>inner</p>"));
        assert!(html.contains(r#"<a href="/systems/" class="active""#));
        assert!(!html.contains(r#"<a href="/datalogs/" class="active""#));
        assert!(html.contains("2012 - 2030"));
    }
}
