use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::Path;

use ramhorns::{Content, Template};

pub mod datalog_views;
pub mod layout;
pub mod page_views;
pub mod rss_renderer;
pub mod system_views;

/// Renders an in-memory template. Parse failures are reported with the template name.
pub fn render_str<C: Content>(name: &str, template_src: &str, content: &C) -> io::Result<String> {
    let template = match Template::new(template_src) {
        Ok(x) => x,
        Err(e) => {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("Error parsing template {}: {}", name, e)));
        }
    };
    Ok(template.render(content))
}

/// Templates are read on every call so they can be edited while the server runs.
pub fn render_template<C: Content>(template_dir: &Path, name: &str, content: &C) -> io::Result<String> {
    let template_path = template_dir.join(name);
    let template_src = fs::read_to_string(&template_path)
        .map_err(|e| io::Error::other(format!("Error reading template {}: {}", template_path.display(), e)))?;
    render_str(name, &template_src, content)
}

/// One link of the page list under a paginated view.
#[derive(Content, Debug)]
pub struct PageLink {
    pub number: u32,
    pub url: String,
    pub current: bool,
}

#[derive(Content, Debug, Default)]
pub struct PaginationView {
    pub show: bool,
    pub number: u32,
    pub page_count: u32,
    pub has_previous: bool,
    pub previous_url: String,
    pub has_next: bool,
    pub next_url: String,
    pub pages: Vec<PageLink>,
}

/// `base_url` may already carry a query string, e.g. `/datalogs/?q=rust`.
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 && !base_url.contains('?') {
        return base_url.to_string();
    }
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}page={}", base_url, separator, page)
}

impl PaginationView {
    pub fn new(number: u32, page_count: u32, base_url: &str) -> Self {
        let pages = (1..=page_count)
            .map(|n| PageLink { number: n, url: page_url(base_url, n), current: n == number })
            .collect();

        PaginationView {
            show: page_count > 1,
            number,
            page_count,
            has_previous: number > 1,
            previous_url: page_url(base_url, number.saturating_sub(1).max(1)),
            has_next: number < page_count,
            next_url: page_url(base_url, number + 1),
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Content)]
    struct Greeting<'a> {
        name: &'a str,
        shout: bool,
    }

    #[test]
    fn test_render_str() {
        let out = render_str("hello.tpl", "Hi {{name}}{{#shout}}!{{/shout}}", &Greeting { name: "<Ada>", shout: true }).unwrap();
        assert_eq!(out, "Hi &lt;Ada&gt;!");
    }

    #[test]
    fn test_missing_template_is_not_a_not_found() {
        let err = render_template(Path::new("/nonexistent-folio-templates"), "home.tpl", &Greeting { name: "", shout: false })
            .unwrap_err();
        assert_ne!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("home.tpl"));
    }

    #[test]
    fn test_pagination() {
        let p = PaginationView::new(2, 3, "/datalogs/");
        assert!(p.show);
        assert_eq!(p.previous_url, "/datalogs/");
        assert_eq!(p.next_url, "/datalogs/?page=3");
        assert_eq!(p.pages.iter().filter(|l| l.current).map(|l| l.number).collect::<Vec<_>>(), [2]);

        let p = PaginationView::new(1, 1, "/datalogs/?q=rust");
        assert!(!p.show);
        assert!(!p.has_previous && !p.has_next);
        assert_eq!(p.pages[0].url, "/datalogs/?q=rust&page=1");
    }
}
