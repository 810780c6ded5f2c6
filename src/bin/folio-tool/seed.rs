use std::fmt::Write;
use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{Duration, Local, NaiveDateTime};
use uuid::Uuid;

use folio::config::read_config;
use folio::systems::Stage;
use folio::taxonomy::Taxonomy;
use folio::text_utils::slugify;
use folio::util::os_helper::default_author;

use crate::SeedArgs;

const LOG_TOPICS: [&str; 6] = [
    "Measuring tail latency",
    "A week with flame graphs",
    "Profiling a cold start",
    "Notes on backpressure",
    "Reading a core dump",
    "Counting allocations",
];

const SYSTEM_NAMES: [&str; 4] = [
    "Ingest relay",
    "Metrics sink",
    "Build cache",
    "Log shipper",
];

/// What the seeder decided for one file.
#[derive(Debug, PartialEq)]
enum Outcome {
    Created,
    Skipped,
}

fn pick<'a, T>(items: &'a [T], i: usize) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(i % items.len())
    }
}

/// Up to `count` technology slugs starting at `start`, wrapping around without repeats.
fn distinct_techs(taxonomy: &Taxonomy, start: usize, count: usize) -> Vec<&str> {
    let mut slugs: Vec<&str> = vec![];
    for k in 0..count {
        if let Some(tech) = pick(&taxonomy.technologies, start + k) {
            if !slugs.contains(&tech.slug.as_str()) {
                slugs.push(&tech.slug);
            }
        }
    }
    slugs
}

fn seed_title(topics: &[&str], i: usize) -> String {
    let round = i / topics.len();
    let topic = topics[i % topics.len()];
    if round == 0 {
        topic.to_string()
    } else {
        format!("{} {}", topic, round + 1)
    }
}

fn render_log(taxonomy: &Taxonomy, i: usize, title: &str, author: &str, date: NaiveDateTime) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "<!--");
    let _ = writeln!(&mut buf, "[ID]: # ({})", Uuid::new_v4());
    let _ = writeln!(&mut buf, "[DATE]: # ({})", date.format("%Y-%m-%d %H:%M:%S.000"));
    let _ = writeln!(&mut buf, "[AUTHOR]: # ({})", author);
    if let Some(category) = pick(&taxonomy.categories, i) {
        let _ = writeln!(&mut buf, "[CATEGORY]: # ({})", category.slug);
    }
    let _ = writeln!(&mut buf, "[TAGS]: # ({})", distinct_techs(taxonomy, i, 2).join(" "));
    let _ = writeln!(&mut buf, "-->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "# {}", title);
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "A sample entry written by the seeder. Replace it with a real observation.");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "<!-- more -->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## Setup");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "Describe the machine, the load and the numbers.");
    buf
}

fn render_system(taxonomy: &Taxonomy, i: usize, name: &str, date: NaiveDateTime) -> String {
    let mut buf = String::new();
    let stage = Stage::ALL[i % Stage::ALL.len()];
    let tech = distinct_techs(taxonomy, i * 2, 3);

    let _ = writeln!(&mut buf, "<!--");
    let _ = writeln!(&mut buf, "[ID]: # ({})", Uuid::new_v4());
    let _ = writeln!(&mut buf, "[DATE]: # ({})", date.format("%Y-%m-%d %H:%M:%S.000"));
    let _ = writeln!(&mut buf, "[STAGE]: # ({})", stage.as_str());
    let _ = writeln!(&mut buf, "[TECH]: # ({})", tech.join(" "));
    let _ = writeln!(&mut buf, "[METRICS]: # (requests={};uptime=99.9%)", (i + 1) * 12_500);
    if i == 0 {
        let _ = writeln!(&mut buf, "[FEATURED]: # (yes)");
    }
    let _ = writeln!(&mut buf, "-->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "# {}", name);
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "A sample system written by the seeder.");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "<!-- more -->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## Architecture");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "What it does, how it is deployed and what it taught.");
    buf
}

fn write_new(path: &Path, content: &str) -> anyhow::Result<Outcome> {
    if path.exists() {
        return Ok(Outcome::Skipped);
    }
    fs::write(path, content).with_context(|| format!("Error writing {}", path.display()))?;
    Ok(Outcome::Created)
}

fn seed_logs(dir: &Path, taxonomy: &Taxonomy, count: u32, author: &str, now: NaiveDateTime) -> anyhow::Result<Vec<Outcome>> {
    fs::create_dir_all(dir).with_context(|| format!("Error creating {}", dir.display()))?;
    let mut outcomes = vec![];
    for i in 0..count as usize {
        let title = seed_title(&LOG_TOPICS, i);
        let date = now - Duration::weeks(i as i64);
        let path = dir.join(format!("{}.md", slugify(&title)));
        let outcome = write_new(&path, &render_log(taxonomy, i, &title, author, date))?;
        println!("{:?} {}", outcome, path.display());
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn seed_systems(dir: &Path, taxonomy: &Taxonomy, count: u32, now: NaiveDateTime) -> anyhow::Result<Vec<Outcome>> {
    fs::create_dir_all(dir).with_context(|| format!("Error creating {}", dir.display()))?;
    let mut outcomes = vec![];
    for i in 0..count as usize {
        let name = seed_title(&SYSTEM_NAMES, i);
        let date = now - Duration::weeks(4 * i as i64);
        let path = dir.join(format!("{}.md", slugify(&name)));
        let outcome = write_new(&path, &render_system(taxonomy, i, &name, date))?;
        println!("{:?} {}", outcome, path.display());
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

pub fn seed_cmd(args: SeedArgs) -> anyhow::Result<()> {
    let config = read_config(Path::new(&args.config_path))
        .with_context(|| format!("Loading {}", args.config_path))?;
    let taxonomy = Taxonomy::load(&config.paths.taxonomy_file)?;
    let now = Local::now().naive_local();
    let author = default_author();

    let logs = seed_logs(&config.paths.datalogs_dir, &taxonomy, args.logs, &author, now)?;
    let systems = seed_systems(&config.paths.systems_dir, &taxonomy, args.systems, now)?;

    let created = logs.iter().chain(systems.iter()).filter(|o| **o == Outcome::Created).count();
    println!("{} files created, {} skipped", created, logs.len() + systems.len() - created);
    Ok(())
}
