use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Local;
use uuid::Uuid;

use folio::text_utils::slugify;
use folio::util::os_helper::default_author;

use crate::{LogOutput, NewLogArgs};

struct LogHeader<'a> {
    id: &'a str,
    date: &'a str,
    author: &'a str,
    category: Option<&'a str>,
    tags: &'a [String],
    title: Option<&'a str>,
}

fn get_author(args: &NewLogArgs) -> String {
    match args.name {
        Some(ref name) => name.clone(),
        None => default_author(),
    }
}

fn render_header(h: &LogHeader) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "<!--");
    let _ = writeln!(&mut buf, "[ID]: # ({})", h.id);
    let _ = writeln!(&mut buf, "[DATE]: # ({})", h.date);
    let _ = writeln!(&mut buf, "[AUTHOR]: # ({})", h.author);
    if let Some(category) = h.category {
        let _ = writeln!(&mut buf, "[CATEGORY]: # ({})", category);
    }
    let _ = writeln!(&mut buf, "[TAGS]: # ({})", h.tags.join(" "));
    let _ = writeln!(&mut buf, "[STATUS]: # (draft)");
    let _ = writeln!(&mut buf, "-->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "# {}", h.title.unwrap_or("Replace with title"));
    let _ = writeln!(&mut buf);
    buf
}

fn render_body() -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "What was measured and why it matters.");
    let _ = writeln!(&mut buf, "This paragraph is the summary shown in lists.");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "<!-- more -->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## Findings");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "The rest of the DataLog. Remove the STATUS line to publish it.");

    buf
}

fn output_path(output: &LogOutput, slug: &str) -> Option<PathBuf> {
    match output {
        LogOutput::Stdout => None,
        LogOutput::File => Some(PathBuf::from(format!("{}.md", slug))),
        LogOutput::Dir => Some(PathBuf::from(slug).join("index.md")),
    }
}

pub fn new_log_cmd(args: NewLogArgs) -> anyhow::Result<()> {
    let id = Uuid::new_v4().to_string();
    let author = get_author(&args);
    let date = Local::now().format("%Y-%m-%d %H:%M:%S.000").to_string();
    let category = args.category.as_deref().map(slugify);
    let tags: Vec<String> = args.tags.iter().map(|t| slugify(t)).filter(|t| !t.is_empty()).collect();

    let header = render_header(&LogHeader {
        id: &id,
        date: &date,
        author: &author,
        category: category.as_deref(),
        tags: &tags,
        title: args.title.as_deref(),
    });
    let content = format!("{}{}", header, render_body());

    let slug = args.title.as_deref().map(slugify).unwrap_or_default();
    let Some(path) = output_path(&args.output, &slug) else {
        println!("{}", content);
        return Ok(());
    };

    if slug.is_empty() {
        bail!("A title is required for {} output", args.output);
    }
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Error creating {}", parent.display()))?;
    }

    fs::write(&path, content).with_context(|| format!("Error writing {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}
