use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use spdlog::{error, info};

use crate::config::Config;
use crate::contact::{ContactForm, FieldErrors};
use crate::content::content_file::ContentFile;
use crate::content::content_list::ContentList;
use crate::content::markdown_renderer::render_markdown;
use crate::datalog::archive::{build_archive, filter_archive};
use crate::datalog::store::DataLogStore;
use crate::datalog::{DataLog, DATALOGS_URL};
use crate::format::month_name;
use crate::integrity;
use crate::render_cache::{Expire, RenderCache};
use crate::systems::store::SystemStore;
use crate::systems::Stage;
use crate::taxonomy::Taxonomy;
use crate::tech_usage;
use crate::text_utils::slugify;
use crate::theme::css_variables;
use crate::view::datalog_views::{self, ListContext};
use crate::view::layout::{render_layout, Nav};
use crate::view::page_views::{self, SiteStats};
use crate::view::rss_renderer::RssChannel;
use crate::view::system_views::{self, SystemFilter};

const HOME_LATEST: usize = 3;
const HOME_FEATURED: usize = 3;
const RELATED_COUNT: usize = 3;
const SYSTEM_DATALOGS: usize = 3;

pub const PAGES_URL: &str = "/page";

/// Local wall clock, used to decide which entries are published.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn not_found(desc: String) -> io::Error {
    io::Error::new(ErrorKind::NotFound, desc)
}

/// Everything the server shows: configuration, taxonomy and all content, loaded once.
pub struct Site {
    pub config: Config,
    pub taxonomy: Taxonomy,
    pub datalogs: DataLogStore,
    pub systems: SystemStore,
    pages: ContentList,
    cache: RenderCache<String>,
}

impl Site {
    /// Loads taxonomy and content. Content that references unknown taxonomy entries is
    /// rejected as a whole.
    pub fn load(config: Config) -> io::Result<Site> {
        let defaults = &config.defaults;
        let paths = &config.paths;

        let taxonomy = Taxonomy::load(&paths.taxonomy_file)?;
        let datalogs = DataLogStore::load(&paths.datalogs_dir, &defaults.index_base_name, defaults.break_tag())?;
        let systems = SystemStore::load(&paths.systems_dir, &defaults.index_base_name, defaults.break_tag())?;

        let problems = integrity::check(&taxonomy, &datalogs, &systems);
        if !problems.is_empty() {
            for problem in problems.iter() {
                error!("{}", problem);
            }
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("Found {} content problems, first: {}", problems.len(), problems[0])));
        }

        let cache = RenderCache::from_flag(defaults.rendering_cache_enabled);
        info!("Site loaded: {} categories, {} series, {} technologies, render cache {}",
            taxonomy.categories.len(), taxonomy.series.len(), taxonomy.technologies.len(),
            if cache.is_enabled() { "enabled" } else { "disabled" });

        Ok(Site {
            pages: ContentList::new(&paths.pages_dir, &defaults.index_base_name),
            cache,
            config,
            taxonomy,
            datalogs,
            systems,
        })
    }

    fn template_dir(&self) -> &Path {
        &self.config.paths.template_dir
    }

    /// Rendered pages show the visible entries and the current year, so they stay valid
    /// until the next scheduled DataLog goes live or the year changes.
    fn cache_expiry(&self, now: NaiveDateTime) -> Expire {
        let next_year = NaiveDate::from_ymd_opt(now.year() + 1, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        match (self.datalogs.next_scheduled(now), next_year) {
            (Some(scheduled), Some(year)) => Expire::At(scheduled.min(year)),
            (Some(date), None) | (None, Some(date)) => Expire::At(date),
            (None, None) => Expire::Never,
        }
    }

    fn cached(&self, kind: &str, link: &str, now: NaiveDateTime, render: impl FnOnce() -> io::Result<String>) -> io::Result<String> {
        if let Some(rendered) = self.cache.get_entry(kind, link, now) {
            return Ok(rendered.as_ref().clone());
        }
        let rendered = render()?;
        Ok(self.cache.add_entry(kind, link, rendered, now, self.cache_expiry(now)).as_ref().clone())
    }

    fn years_active(&self, now: NaiveDateTime) -> u32 {
        (now.year() - self.config.site.activity_start_year).max(0) as u32
    }

    /// Title and html of a markdown page, `None` when there is no such page.
    fn load_page(&self, name: &str) -> io::Result<Option<(String, String)>> {
        let Some(link) = self.pages.find(name) else {
            return Ok(None);
        };
        let content = ContentFile::from_file(link.link, link.path)?.parse()?;
        let body = render_markdown(&content.body, Some(&format!("{}/{}", PAGES_URL, name)))?;
        Ok(Some((content.title, body)))
    }

    pub fn home(&self, now: NaiveDateTime) -> io::Result<String> {
        let stats = SiteStats {
            years_active: self.years_active(now),
            datalog_count: self.datalogs.visible(now).len() as u32,
            system_count: self.systems.visible().len() as u32,
            technology_count: self.taxonomy.technologies.len() as u32,
        };
        let latest = self.datalogs.latest(HOME_LATEST, now);
        let featured = self.systems.featured(HOME_FEATURED);

        let body = page_views::render_home(self.template_dir(), &self.config.site, stats, &latest, &featured, &self.taxonomy)?;
        render_layout(&self.config, Nav::Home, "Home", &body, now)
    }

    pub fn about(&self, now: NaiveDateTime) -> io::Result<String> {
        let (title, page_html) = self.load_page("about")?.unwrap_or_else(|| ("About".to_string(), String::new()));
        let usage = tech_usage::analyze(&self.taxonomy, &self.systems, &self.datalogs, now);

        let body = page_views::render_about(self.template_dir(), &self.config.site, &title, &page_html, self.years_active(now), &usage)?;
        render_layout(&self.config, Nav::About, &title, &body, now)
    }

    pub fn contact(&self, form: &ContactForm, errors: &FieldErrors, sent: bool, now: NaiveDateTime) -> io::Result<String> {
        let intro = self.load_page("contact")?.map(|(_, html)| html).unwrap_or_default();
        let body = page_views::render_contact(self.template_dir(), &self.config.site, &intro, form, errors, sent)?;
        render_layout(&self.config, Nav::Contact, "Contact", &body, now)
    }

    pub fn page(&self, name: &str, now: NaiveDateTime) -> io::Result<String> {
        self.cached("page", name, now, || {
            let Some((title, html)) = self.load_page(name)? else {
                return Err(not_found(format!("Page {} not found", name)));
            };
            let body = page_views::render_page(self.template_dir(), &title, &html)?;
            render_layout(&self.config, Nav::Other, &title, &body, now)
        })
    }

    fn datalog_page(&self, logs: &[&DataLog], page: u32, ctx: &ListContext, title: &str, now: NaiveDateTime) -> io::Result<String> {
        let tags = self.datalogs.tag_cloud(now);
        let body = datalog_views::render_list(
            self.template_dir(), logs, page, self.config.defaults.page_size, ctx, &self.taxonomy, &tags)?;
        render_layout(&self.config, Nav::DataLogs, title, &body, now)
    }

    /// All visible entries, or the ones matching `query`.
    pub fn datalog_list(&self, page: u32, query: Option<&str>, now: NaiveDateTime) -> io::Result<String> {
        match query {
            Some(q) => {
                let logs = self.datalogs.search(q, now);
                let heading = format!("Search: {}", q);
                let base_url = format!("{}/?q={}", DATALOGS_URL, urlencode(q));
                let ctx = ListContext { heading: &heading, description: "", query: Some(q), base_url: &base_url };
                self.datalog_page(&logs, page, &ctx, &heading, now)
            }
            None => {
                let logs = self.datalogs.visible(now);
                let base_url = format!("{}/", DATALOGS_URL);
                let ctx = ListContext { heading: "DataLogs", description: "", query: None, base_url: &base_url };
                self.datalog_page(&logs, page, &ctx, "DataLogs", now)
            }
        }
    }

    pub fn categories(&self, now: NaiveDateTime) -> io::Result<String> {
        let counts = self.datalogs.category_counts(now);
        let tags = self.datalogs.tag_cloud(now);
        let body = datalog_views::render_categories(self.template_dir(), &self.taxonomy, &counts, &tags)?;
        render_layout(&self.config, Nav::DataLogs, "Categories", &body, now)
    }

    pub fn category(&self, slug: &str, page: u32, now: NaiveDateTime) -> io::Result<String> {
        let Some(category) = self.taxonomy.category(slug) else {
            return Err(not_found(format!("Category {} not found", slug)));
        };
        let logs = self.datalogs.in_category(slug, now);
        let base_url = datalog_views::category_url(slug);
        let ctx = ListContext {
            heading: &category.name,
            description: &category.description,
            query: None,
            base_url: &base_url,
        };
        self.datalog_page(&logs, page, &ctx, &category.name, now)
    }

    /// Tags are not declared anywhere, so a tag without visible entries does not exist.
    pub fn tag(&self, slug: &str, page: u32, now: NaiveDateTime) -> io::Result<String> {
        let logs = self.datalogs.with_tag(slug, now);
        let Some(name) = logs.first()
            .and_then(|l| l.tags.iter().find(|t| slugify(t) == slug))
            .cloned() else {
            return Err(not_found(format!("Tag {} not found", slug)));
        };
        let heading = format!("Tagged {}", name);
        let base_url = datalog_views::tag_url(slug);
        let ctx = ListContext { heading: &heading, description: "", query: None, base_url: &base_url };
        self.datalog_page(&logs, page, &ctx, &heading, now)
    }

    /// Entries of a series in reading order, on a single page.
    pub fn series(&self, slug: &str, now: NaiveDateTime) -> io::Result<String> {
        let Some(series) = self.taxonomy.series(slug) else {
            return Err(not_found(format!("Series {} not found", slug)));
        };
        let logs = self.datalogs.in_series(slug, now);
        let base_url = datalog_views::series_url(slug);
        let ctx = ListContext {
            heading: &series.name,
            description: &series.description,
            query: None,
            base_url: &base_url,
        };
        let page_size = (logs.len() as u32).max(1);
        let tags = self.datalogs.tag_cloud(now);
        let body = datalog_views::render_list(self.template_dir(), &logs, 1, page_size, &ctx, &self.taxonomy, &tags)?;
        render_layout(&self.config, Nav::DataLogs, &series.name, &body, now)
    }

    pub fn archive(&self, year: Option<i32>, month: Option<u32>, now: NaiveDateTime) -> io::Result<String> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Invalid month {}", m)));
            }
        }

        let visible = self.datalogs.visible(now);
        let archive = filter_archive(build_archive(&visible), year, month);
        if year.is_some() && archive.is_empty() {
            return Err(not_found(format!("Nothing archived for {:?}/{:?}", year, month)));
        }

        let heading = match (year, month) {
            (Some(y), Some(m)) => format!("Archive: {} {}", month_name(m), y),
            (Some(y), None) => format!("Archive: {}", y),
            _ => "Archive".to_string(),
        };
        let body = datalog_views::render_archive(self.template_dir(), &heading, &archive, &self.taxonomy)?;
        render_layout(&self.config, Nav::DataLogs, &heading, &body, now)
    }

    pub fn datalog(&self, slug: &str, now: NaiveDateTime) -> io::Result<String> {
        let Some(log) = self.datalogs.by_slug(slug, now) else {
            return Err(not_found(format!("DataLog {} not found", slug)));
        };

        self.cached("datalog", slug, now, || {
            let neighbours = self.datalogs.series_neighbours(log, now);
            let related = self.datalogs.related(log, RELATED_COUNT, now);
            let body = datalog_views::render_detail(self.template_dir(), log, neighbours, &related, &self.taxonomy)?;
            render_layout(&self.config, Nav::DataLogs, &log.title, &body, now)
        })
    }

    /// RSS feed of the newest entries. Without `[rss_feed]` there is no feed.
    pub fn feed(&self, now: NaiveDateTime) -> io::Result<Vec<u8>> {
        let Some(ref rss) = self.config.rss_feed else {
            return Err(not_found("RSS feed is not configured".to_string()));
        };

        let logs = self.datalogs.latest(rss.page_size as usize, now);
        let channel = RssChannel {
            ch_title: &rss.title,
            ch_link: &rss.site_url,
            ch_desc: &rss.description,
        };
        channel.render(&logs).map_err(|e| io::Error::other(format!("Error rendering RSS: {}", e)))
    }

    /// `stage` comes straight from the query string. Unknown stages are a bad request,
    /// unknown technologies just match nothing.
    pub fn system_list(&self, tech: Option<&str>, stage: Option<&str>, page: u32, now: NaiveDateTime) -> io::Result<String> {
        let stage = match stage {
            None => None,
            Some(s) => Some(Stage::parse(s)
                .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, format!("Unknown stage {}", s)))?),
        };

        let systems = self.systems.filter(tech, stage);
        let used = tech_usage::analyze(&self.taxonomy, &self.systems, &self.datalogs, now);
        let used_technologies: Vec<&str> = used.used.iter()
            .filter(|u| u.system_count > 0)
            .map(|u| u.technology.slug.as_str())
            .collect();

        let body = system_views::render_list(
            self.template_dir(),
            &systems,
            page,
            self.config.defaults.systems_page_size,
            SystemFilter { tech, stage },
            &self.taxonomy,
            &used_technologies,
        )?;
        render_layout(&self.config, Nav::Systems, "Systems", &body, now)
    }

    pub fn system(&self, slug: &str, now: NaiveDateTime) -> io::Result<String> {
        let Some(system) = self.systems.by_slug(slug) else {
            return Err(not_found(format!("System {} not found", slug)));
        };

        self.cached("system", slug, now, || {
            let datalogs: Vec<&DataLog> = self.datalogs.visible(now).into_iter()
                .filter(|l| system.technologies.iter().any(|t| l.has_tag(t)))
                .take(SYSTEM_DATALOGS)
                .collect();
            let body = system_views::render_detail(self.template_dir(), system, &datalogs, &self.taxonomy)?;
            render_layout(&self.config, Nav::Systems, &system.name, &body, now)
        })
    }

    pub fn not_found_page(&self, path: &str, now: NaiveDateTime) -> io::Result<String> {
        let body = page_views::render_not_found(self.template_dir(), path)?;
        render_layout(&self.config, Nav::Other, "Not found", &body, now)
    }

    pub fn theme_css(&self) -> String {
        css_variables(&self.config.theme, &self.taxonomy.categories, &self.taxonomy.technologies)
    }

    pub fn datalog_asset(&self, slug: &str, file: &str, now: NaiveDateTime) -> io::Result<PathBuf> {
        let asset_dir = self.datalogs.by_slug(slug, now).and_then(|l| l.asset_dir.as_deref());
        asset_path(asset_dir, slug, file)
    }

    pub fn system_asset(&self, slug: &str, file: &str) -> io::Result<PathBuf> {
        let asset_dir = self.systems.by_slug(slug).and_then(|s| s.asset_dir.as_deref());
        asset_path(asset_dir, slug, file)
    }

    pub fn page_asset(&self, name: &str, file: &str) -> io::Result<PathBuf> {
        let link = self.pages.find(name);
        let asset_dir = link.as_ref()
            .filter(|l| l.path.file_stem().and_then(|s| s.to_str()) == Some(self.config.defaults.index_base_name.as_str()))
            .and_then(|l| l.path.parent());
        asset_path(asset_dir, name, file)
    }

    pub fn public_file(&self, file: &str) -> io::Result<PathBuf> {
        asset_path(Some(&self.config.paths.public_dir), "public", file)
    }
}

/// A file next to a directory entry. Markdown sources and paths leaving the directory are refused.
fn asset_path(asset_dir: Option<&Path>, owner: &str, file: &str) -> io::Result<PathBuf> {
    if file.is_empty() || file.contains("..") || file.contains('/') || file.contains('\\') {
        return Err(io::Error::new(ErrorKind::PermissionDenied, format!("Access forbidden: {}", file)));
    }
    let Some(dir) = asset_dir else {
        return Err(not_found(format!("No files for {}", owner)));
    };
    if file.ends_with(".md") {
        return Err(not_found(format!("File {} not found for {}", file, owner)));
    }

    let path = dir.join(file);
    if !path.is_file() {
        return Err(not_found(format!("File {} not found for {}", file, owner)));
    }
    Ok(path)
}

fn urlencode(value: &str) -> String {
    serde_urlencoded::to_string([("", value)])
        .map(|s| s.trim_start_matches('=').to_string())
        .unwrap_or_default()
}
