use std::io;
use std::path::Path;

use ramhorns::Content;

use crate::config::Site;
use crate::contact::{ContactForm, FieldErrors};
use crate::datalog::DataLog;
use crate::systems::SystemModule;
use crate::taxonomy::Taxonomy;
use crate::tech_usage::UsageReport;
use crate::view::datalog_views::DataLogItem;
use crate::view::render_template;
use crate::view::system_views::SystemItem;

pub const HOME_TEMPLATE: &str = "home.tpl";
pub const ABOUT_TEMPLATE: &str = "about.tpl";
pub const CONTACT_TEMPLATE: &str = "contact.tpl";
pub const PAGE_TEMPLATE: &str = "page.tpl";
pub const NOT_FOUND_TEMPLATE: &str = "not_found.tpl";

/// Counters shown under the hero section.
#[derive(Content, Debug, Default, PartialEq)]
pub struct SiteStats {
    pub years_active: u32,
    pub datalog_count: u32,
    pub system_count: u32,
    pub technology_count: u32,
}

#[derive(Content)]
struct HomeView<'a> {
    owner: &'a str,
    tagline: &'a str,
    stats: SiteStats,
    latest: Vec<DataLogItem>,
    has_latest: bool,
    featured: Vec<SystemItem>,
    has_featured: bool,
}

pub fn render_home(
    template_dir: &Path,
    site: &Site,
    stats: SiteStats,
    latest: &[&DataLog],
    featured: &[&SystemModule],
    taxonomy: &Taxonomy,
) -> io::Result<String> {
    render_template(template_dir, HOME_TEMPLATE, &HomeView {
        owner: &site.owner,
        tagline: &site.tagline,
        stats,
        has_latest: !latest.is_empty(),
        latest: latest.iter().map(|l| DataLogItem::from(l, taxonomy)).collect(),
        has_featured: !featured.is_empty(),
        featured: featured.iter().map(|s| SystemItem::from(s, taxonomy)).collect(),
    })
}

#[derive(Content, Debug)]
struct StackItem {
    name: String,
    slug: String,
    system_count: u32,
    datalog_count: u32,
}

#[derive(Content, Debug)]
struct StackGroup {
    kind: &'static str,
    technologies: Vec<StackItem>,
}

#[derive(Content)]
struct AboutView<'a> {
    owner: &'a str,
    title: &'a str,
    body: &'a str,
    years_active: u32,
    has_stack: bool,
    stack: Vec<StackGroup>,
}

/// Markdown of the about page, if any, followed by the tech stack grouped by kind.
pub fn render_about(
    template_dir: &Path,
    site: &Site,
    title: &str,
    body_html: &str,
    years_active: u32,
    usage: &UsageReport,
) -> io::Result<String> {
    let stack: Vec<StackGroup> = usage.by_kind().into_iter()
        .map(|(kind, entries)| StackGroup {
            kind: kind.label(),
            technologies: entries.iter()
                .map(|u| StackItem {
                    name: u.technology.name.clone(),
                    slug: u.technology.slug.clone(),
                    system_count: u.system_count as u32,
                    datalog_count: u.datalog_count as u32,
                })
                .collect(),
        })
        .collect();

    render_template(template_dir, ABOUT_TEMPLATE, &AboutView {
        owner: &site.owner,
        title,
        body: body_html,
        years_active,
        has_stack: !stack.is_empty(),
        stack,
    })
}

#[derive(Content, Debug, Default)]
struct FieldView {
    value: String,
    error: String,
    has_error: bool,
}

#[derive(Content)]
struct ContactView<'a> {
    intro: &'a str,
    email: &'a str,
    has_email: bool,
    sent: bool,
    has_errors: bool,
    name_field: FieldView,
    email_field: FieldView,
    subject_field: FieldView,
    message_field: FieldView,
}

fn field(value: &str, errors: &FieldErrors, key: &str) -> FieldView {
    let error = errors.get(key).cloned().unwrap_or_default();
    FieldView { value: value.to_string(), has_error: !error.is_empty(), error }
}

/// The contact form, blank, with the submitted values and their errors, or with the
/// thank-you notice when `sent`.
pub fn render_contact(
    template_dir: &Path,
    site: &Site,
    intro_html: &str,
    form: &ContactForm,
    errors: &FieldErrors,
    sent: bool,
) -> io::Result<String> {
    let email = site.email.as_deref().unwrap_or_default();
    render_template(template_dir, CONTACT_TEMPLATE, &ContactView {
        intro: intro_html,
        email,
        has_email: !email.is_empty(),
        sent,
        has_errors: !errors.is_empty(),
        name_field: field(&form.name, errors, "name"),
        email_field: field(&form.email, errors, "email"),
        subject_field: field(&form.subject, errors, "subject"),
        message_field: field(&form.message, errors, "message"),
    })
}

#[derive(Content)]
struct PageView<'a> {
    title: &'a str,
    body: &'a str,
}

pub fn render_page(template_dir: &Path, title: &str, body_html: &str) -> io::Result<String> {
    render_template(template_dir, PAGE_TEMPLATE, &PageView { title, body: body_html })
}

#[derive(Content)]
struct NotFoundView<'a> {
    path: &'a str,
}

pub fn render_not_found(template_dir: &Path, path: &str) -> io::Result<String> {
    render_template(template_dir, NOT_FOUND_TEMPLATE, &NotFoundView { path })
}

#[cfg(test)]
mod tests {
    use crate::test_data::sample_config;

    use super::*;

    #[test]
    fn test_contact_keeps_values_and_errors() {
        let config = sample_config();
        let form = ContactForm {
            name: "Ada <script>".to_string(),
            email: "nope".to_string(),
            ..ContactForm::default()
        };
        let errors = form.validate();
        let html = render_contact(&config.paths.template_dir, &config.site, "", &form, &errors, false).unwrap();

        assert!(html.contains("Ada &lt;script&gt;"));
        assert!(html.contains("This does not look like an email address."));
        assert!(html.contains("Message must have at least 10 characters."));
        assert!(!html.contains("Thank you"));
    }

    #[test]
    fn test_contact_sent() {
        let config = sample_config();
        let html = render_contact(&config.paths.template_dir, &config.site, "", &ContactForm::default(), &FieldErrors::new(), true)
            .unwrap();
        assert!(html.contains("Thank you"));
    }

    #[test]
    fn test_not_found_escapes_path() {
        let config = sample_config();
        let html = render_not_found(&config.paths.template_dir, "/<b>missing</b>").unwrap();
        assert!(html.contains("/&lt;b&gt;missing&lt;/b&gt;"));
    }
}
