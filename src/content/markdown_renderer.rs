use std::io;
use std::io::ErrorKind;

use markdown::Options;

use crate::content::parsing_utils::remove_comments;

/// Renders GFM markdown to html. HTML comments are dropped first; relative image urls are
/// prefixed with `img_prefix` so previews shown on list pages still find the entry's images.
pub fn render_markdown(md_text: &str, img_prefix: Option<&str>) -> io::Result<String> {
    let buf = remove_comments(md_text)?;
    let buf = match img_prefix {
        Some(img_prefix) => change_images(img_prefix, &buf),
        None => buf,
    };

    match markdown::to_html_with_options(&buf, &Options::gfm()) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.reason.as_str())),
    }
}

fn is_absolute_url(url: &str) -> bool {
    url.starts_with('/') || url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:")
}

fn change_images(prefix: &str, md_post: &str) -> String {
    let mut parsed_string = String::new();
    let mut remaining_input = md_post;

    while let Some(text_start) = remaining_input.find("![") {
        let text_end = text_start + 2;

        parsed_string.push_str(&remaining_input[0..text_end]);
        remaining_input = &remaining_input[text_end..];

        let Some(link_end) = remaining_input.find("](") else {
            continue;
        };
        let link_text = &remaining_input[..link_end];
        let url_slice = &remaining_input[link_end + 2..];
        let Some(url_end) = url_slice.find(')') else {
            continue;
        };

        let url = &url_slice[..url_end];
        let prefixed_url = if is_absolute_url(url) {
            url.to_string()
        } else if prefix.ends_with('/') {
            format!("{}{}", prefix, url)
        } else {
            format!("{}/{}", prefix, url)
        };

        parsed_string.push_str(link_text);
        parsed_string.push_str("](");
        parsed_string.push_str(&prefixed_url);
        parsed_string.push(')');

        remaining_input = &url_slice[url_end + 1..];
    }

    parsed_string.push_str(remaining_input);
    parsed_string
}
