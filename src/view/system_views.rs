use std::io;
use std::path::Path;

use ramhorns::Content;

use crate::datalog::DataLog;
use crate::format::format_metric;
use crate::paginator::Paginator;
use crate::systems::{Stage, SystemModule, SYSTEMS_URL};
use crate::taxonomy::Taxonomy;
use crate::text_utils::format_date_time;
use crate::view::datalog_views::DataLogItem;
use crate::view::{render_template, PaginationView};

pub const LIST_TEMPLATE: &str = "system_list.tpl";
pub const VIEW_TEMPLATE: &str = "system_view.tpl";

#[derive(Content, Debug)]
pub struct TechChip {
    pub name: String,
    pub slug: String,
    pub url: String,
}

#[derive(Content, Debug)]
pub struct MetricView {
    pub label: String,
    pub value: String,
}

#[derive(Content, Debug)]
pub struct SystemItem {
    pub name: String,
    pub url: String,
    pub date: String,
    pub stage: &'static str,
    pub stage_label: &'static str,
    pub featured: bool,
    pub summary: String,
    pub technologies: Vec<TechChip>,
    pub metrics: Vec<MetricView>,
    pub has_repo: bool,
    pub repo_url: String,
    pub has_demo: bool,
    pub demo_url: String,
}

pub fn tech_filter_url(slug: &str) -> String {
    format!("{}/?tech={}", SYSTEMS_URL, slug)
}

impl SystemItem {
    pub fn from(system: &SystemModule, taxonomy: &Taxonomy) -> Self {
        let (date, _) = format_date_time(&system.date);
        let technologies = system.technologies.iter()
            .map(|slug| TechChip {
                name: taxonomy.technology(slug).map_or_else(|| slug.clone(), |t| t.name.clone()),
                slug: slug.clone(),
                url: tech_filter_url(slug),
            })
            .collect();

        SystemItem {
            name: system.name.clone(),
            url: system.url(),
            date,
            stage: system.stage.as_str(),
            stage_label: system.stage.label(),
            featured: system.featured,
            summary: system.summary_html.clone(),
            technologies,
            metrics: system.metrics.iter()
                .map(|m| MetricView { label: m.label.clone(), value: format_metric(&m.value) })
                .collect(),
            has_repo: system.repo_url.is_some(),
            repo_url: system.repo_url.clone().unwrap_or_default(),
            has_demo: system.demo_url.is_some(),
            demo_url: system.demo_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Content, Debug)]
struct FilterOption {
    label: String,
    url: String,
    selected: bool,
}

#[derive(Content)]
struct SystemListView {
    total: u32,
    is_empty: bool,
    is_filtered: bool,
    systems: Vec<SystemItem>,
    stages: Vec<FilterOption>,
    technologies: Vec<FilterOption>,
    pagination: PaginationView,
}

/// Active filters of the systems list.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFilter<'a> {
    pub tech: Option<&'a str>,
    pub stage: Option<Stage>,
}

impl SystemFilter<'_> {
    /// List url keeping the other filter, used by the filter links.
    fn url_with(&self, tech: Option<&str>, stage: Option<Stage>) -> String {
        let mut params = vec![];
        if let Some(tech) = tech {
            params.push(format!("tech={}", tech));
        }
        if let Some(stage) = stage {
            params.push(format!("stage={}", stage.as_str()));
        }
        if params.is_empty() {
            format!("{}/", SYSTEMS_URL)
        } else {
            format!("{}/?{}", SYSTEMS_URL, params.join("&"))
        }
    }

    pub fn base_url(&self) -> String {
        self.url_with(self.tech, self.stage)
    }
}

pub fn render_list(
    template_dir: &Path,
    systems: &[&SystemModule],
    page: u32,
    page_size: u32,
    filter: SystemFilter,
    taxonomy: &Taxonomy,
    used_technologies: &[&str],
) -> io::Result<String> {
    let paginator = Paginator::from(systems, page_size);
    let current = paginator.page_or_first(page);

    let mut stages = vec![FilterOption {
        label: "All stages".to_string(),
        url: filter.url_with(filter.tech, None),
        selected: filter.stage.is_none(),
    }];
    stages.extend(Stage::ALL.iter().map(|s| FilterOption {
        label: s.label().to_string(),
        url: filter.url_with(filter.tech, Some(*s)),
        selected: filter.stage == Some(*s),
    }));

    let mut technologies = vec![FilterOption {
        label: "All technologies".to_string(),
        url: filter.url_with(None, filter.stage),
        selected: filter.tech.is_none(),
    }];
    technologies.extend(used_technologies.iter().map(|slug| FilterOption {
        label: taxonomy.technology(slug).map_or_else(|| slug.to_string(), |t| t.name.clone()),
        url: filter.url_with(Some(slug), filter.stage),
        selected: filter.tech == Some(*slug),
    }));

    render_template(template_dir, LIST_TEMPLATE, &SystemListView {
        total: systems.len() as u32,
        is_empty: systems.is_empty(),
        is_filtered: filter.tech.is_some() || filter.stage.is_some(),
        systems: current.items.iter().map(|s| SystemItem::from(s, taxonomy)).collect(),
        stages,
        technologies,
        pagination: PaginationView::new(current.number, current.page_count, &filter.base_url()),
    })
}

#[derive(Content)]
struct SystemDetailView {
    id: String,
    system: SystemItem,
    body: String,
    has_datalogs: bool,
    datalogs: Vec<DataLogItem>,
}

/// `datalogs` are entries written about the technologies of the system.
pub fn render_detail(template_dir: &Path, system: &SystemModule, datalogs: &[&DataLog], taxonomy: &Taxonomy) -> io::Result<String> {
    render_template(template_dir, VIEW_TEMPLATE, &SystemDetailView {
        id: system.id.clone(),
        system: SystemItem::from(system, taxonomy),
        body: system.body_html.clone(),
        has_datalogs: !datalogs.is_empty(),
        datalogs: datalogs.iter().map(|l| DataLogItem::from(l, taxonomy)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use crate::content::content_file::ContentFile;

    use super::*;

    #[test]
    fn test_item() {
        let md = "[DATE]: # (2024-02-01)\n[STAGE]: # (beta)\n[TECH]: # (Rust sqlite)\n\
                  [METRICS]: # (Requests/day=1250000;Uptime=99.9%)\n[REPO]: # (https://git.example.com/probe)\n\
                  # Probe\nCollects things.\n";
        let content = ContentFile::from_string("probe", "systems/probe.md", md).parse().unwrap();
        let system = SystemModule::from_content(content, "<!-- more -->", None).unwrap();
        let taxonomy = Taxonomy::parse("[[technology]]\nname = \"Rust\"\nkind = \"language\"\n").unwrap();

        let item = SystemItem::from(&system, &taxonomy);
        assert_eq!(item.url, "/systems/probe/");
        assert_eq!(item.stage_label, "Beta");
        assert_eq!(item.technologies[0].name, "Rust");
        assert_eq!(item.technologies[1].name, "sqlite");
        assert_eq!(item.technologies[1].url, "/systems/?tech=sqlite");
        assert_eq!(item.metrics[0].value, "1.3M");
        assert_eq!(item.metrics[1].value, "99.9%");
        assert!(item.has_repo && !item.has_demo);
    }

    #[test]
    fn test_filter_urls() {
        let filter = SystemFilter { tech: Some("rust"), stage: Some(Stage::Beta) };
        assert_eq!(filter.base_url(), "/systems/?tech=rust&stage=beta");
        assert_eq!(filter.url_with(None, filter.stage), "/systems/?stage=beta");
        assert_eq!(SystemFilter::default().base_url(), "/systems/");
    }
}
