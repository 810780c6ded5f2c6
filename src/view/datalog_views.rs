use std::collections::HashMap;
use std::io;
use std::path::Path;

use ramhorns::Content;

use crate::datalog::archive::ArchiveYear;
use crate::datalog::store::TagCount;
use crate::datalog::{DataLog, DATALOGS_URL};
use crate::format::{month_name, reading_time_label};
use crate::paginator::Paginator;
use crate::taxonomy::Taxonomy;
use crate::text_utils::{format_date_time, slugify};
use crate::view::{render_template, PaginationView};

pub const LIST_TEMPLATE: &str = "datalog_list.tpl";
pub const VIEW_TEMPLATE: &str = "datalog_view.tpl";
pub const CATEGORIES_TEMPLATE: &str = "categories.tpl";
pub const ARCHIVE_TEMPLATE: &str = "archive.tpl";

#[derive(Content, Debug)]
pub struct Chip {
    pub name: String,
    pub slug: String,
    pub url: String,
}

#[derive(Content, Debug)]
pub struct SeriesRef {
    pub name: String,
    pub url: String,
    pub part: u32,
    pub has_part: bool,
}

#[derive(Content, Debug)]
pub struct DataLogItem {
    pub title: String,
    pub url: String,
    pub author: String,
    pub date: String,
    pub time: String,
    pub reading_time: String,
    pub summary: String,
    pub featured: bool,
    pub category: Option<Chip>,
    pub series: Option<SeriesRef>,
    pub tags: Vec<Chip>,
}

pub fn category_url(slug: &str) -> String {
    format!("{}/category/{}/", DATALOGS_URL, slug)
}

pub fn tag_url(slug: &str) -> String {
    format!("{}/tag/{}/", DATALOGS_URL, slug)
}

pub fn series_url(slug: &str) -> String {
    format!("{}/series/{}/", DATALOGS_URL, slug)
}

pub fn archive_url(year: Option<i32>, month: Option<u32>) -> String {
    match (year, month) {
        (Some(y), Some(m)) => format!("{}/archive/{}/{:02}/", DATALOGS_URL, y, m),
        (Some(y), None) => format!("{}/archive/{}/", DATALOGS_URL, y),
        _ => format!("{}/archive/", DATALOGS_URL),
    }
}

impl DataLogItem {
    pub fn from(log: &DataLog, taxonomy: &Taxonomy) -> Self {
        let (date, time) = format_date_time(&log.date);

        let category = log.category.as_ref().map(|slug| Chip {
            name: taxonomy.category(slug).map_or_else(|| slug.clone(), |c| c.name.clone()),
            slug: slug.clone(),
            url: category_url(slug),
        });

        let series = log.series.as_ref().map(|slug| SeriesRef {
            name: taxonomy.series(slug).map_or_else(|| slug.clone(), |s| s.name.clone()),
            url: series_url(slug),
            part: log.series_part.unwrap_or_default(),
            has_part: log.series_part.is_some(),
        });

        let tags = log.tags.iter()
            .map(|tag| {
                let slug = slugify(tag);
                Chip { name: tag.clone(), url: tag_url(&slug), slug }
            })
            .collect();

        DataLogItem {
            title: log.title.clone(),
            url: log.url(),
            author: log.author.clone(),
            date,
            time,
            reading_time: reading_time_label(log.reading_time),
            summary: log.summary_html.clone(),
            featured: log.featured,
            category,
            series,
            tags,
        }
    }
}

#[derive(Content, Debug)]
pub struct TagCloudItem {
    pub name: String,
    pub url: String,
    pub count: u32,
}

fn tag_cloud(tags: &[TagCount]) -> Vec<TagCloudItem> {
    tags.iter()
        .map(|t| TagCloudItem { name: t.name.clone(), url: tag_url(&t.slug), count: t.count as u32 })
        .collect()
}

#[derive(Content)]
struct DataLogListView {
    heading: String,
    description: String,
    query: String,
    has_query: bool,
    total: u32,
    is_empty: bool,
    posts: Vec<DataLogItem>,
    tags: Vec<TagCloudItem>,
    pagination: PaginationView,
}

/// What a list page is about: all entries, a search, a category, a tag or a series.
pub struct ListContext<'a> {
    pub heading: &'a str,
    pub description: &'a str,
    pub query: Option<&'a str>,
    /// Url of the first page, used to build the page links.
    pub base_url: &'a str,
}

pub fn render_list(
    template_dir: &Path,
    logs: &[&DataLog],
    page: u32,
    page_size: u32,
    ctx: &ListContext,
    taxonomy: &Taxonomy,
    tags: &[TagCount],
) -> io::Result<String> {
    let paginator = Paginator::from(logs, page_size);
    let current = paginator.page_or_first(page);

    render_template(template_dir, LIST_TEMPLATE, &DataLogListView {
        heading: ctx.heading.to_string(),
        description: ctx.description.to_string(),
        query: ctx.query.unwrap_or_default().to_string(),
        has_query: ctx.query.is_some(),
        total: logs.len() as u32,
        is_empty: logs.is_empty(),
        posts: current.items.iter().map(|l| DataLogItem::from(l, taxonomy)).collect(),
        tags: tag_cloud(tags),
        pagination: PaginationView::new(current.number, current.page_count, ctx.base_url),
    })
}

#[derive(Content, Debug)]
pub struct NeighbourLink {
    pub title: String,
    pub url: String,
}

#[derive(Content)]
struct DataLogDetailView {
    id: String,
    post: DataLogItem,
    body: String,
    previous: Option<NeighbourLink>,
    next: Option<NeighbourLink>,
    has_related: bool,
    related: Vec<DataLogItem>,
}

pub fn render_detail(
    template_dir: &Path,
    log: &DataLog,
    neighbours: (Option<&DataLog>, Option<&DataLog>),
    related: &[&DataLog],
    taxonomy: &Taxonomy,
) -> io::Result<String> {
    let link = |l: &DataLog| NeighbourLink { title: l.title.clone(), url: l.url() };
    let (previous, next) = neighbours;

    render_template(template_dir, VIEW_TEMPLATE, &DataLogDetailView {
        id: log.id.clone(),
        post: DataLogItem::from(log, taxonomy),
        body: log.body_html.clone(),
        previous: previous.map(link),
        next: next.map(link),
        has_related: !related.is_empty(),
        related: related.iter().map(|l| DataLogItem::from(l, taxonomy)).collect(),
    })
}

#[derive(Content, Debug)]
struct CategoryCountView {
    name: String,
    url: String,
    slug: String,
    description: String,
    count: u32,
}

#[derive(Content)]
struct CategoriesView {
    categories: Vec<CategoryCountView>,
    tags: Vec<TagCloudItem>,
}

/// Every declared category, with the number of visible entries in it.
pub fn render_categories(
    template_dir: &Path,
    taxonomy: &Taxonomy,
    counts: &HashMap<String, usize>,
    tags: &[TagCount],
) -> io::Result<String> {
    let categories = taxonomy.categories.iter()
        .map(|c| CategoryCountView {
            name: c.name.clone(),
            url: category_url(&c.slug),
            slug: c.slug.clone(),
            description: c.description.clone(),
            count: counts.get(&c.slug).copied().unwrap_or_default() as u32,
        })
        .collect();

    render_template(template_dir, CATEGORIES_TEMPLATE, &CategoriesView { categories, tags: tag_cloud(tags) })
}

#[derive(Content)]
struct ArchiveMonthView {
    name: String,
    url: String,
    count: u32,
    posts: Vec<DataLogItem>,
}

#[derive(Content)]
struct ArchiveYearView {
    year: i32,
    url: String,
    count: u32,
    months: Vec<ArchiveMonthView>,
}

#[derive(Content)]
struct ArchiveView {
    heading: String,
    total: u32,
    years: Vec<ArchiveYearView>,
}

pub fn render_archive(template_dir: &Path, heading: &str, archive: &[ArchiveYear], taxonomy: &Taxonomy) -> io::Result<String> {
    let years: Vec<ArchiveYearView> = archive.iter()
        .map(|y| ArchiveYearView {
            year: y.year,
            url: archive_url(Some(y.year), None),
            count: y.count() as u32,
            months: y.months.iter()
                .map(|m| ArchiveMonthView {
                    name: month_name(m.month).to_string(),
                    url: archive_url(Some(y.year), Some(m.month)),
                    count: m.posts.len() as u32,
                    posts: m.posts.iter().map(|l| DataLogItem::from(l, taxonomy)).collect(),
                })
                .collect(),
        })
        .collect();

    render_template(template_dir, ARCHIVE_TEMPLATE, &ArchiveView {
        heading: heading.to_string(),
        total: years.iter().map(|y| y.count).sum(),
        years,
    })
}
