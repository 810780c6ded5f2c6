use std::collections::{HashMap, HashSet};
use std::io;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDateTime;
use spdlog::{debug, info};

use crate::content::content_file::ContentFile;
use crate::content::content_list::ContentList;
use crate::content::PublishStatus;
use crate::datalog::DataLog;
use crate::text_utils::slugify;

#[derive(Debug, Clone, PartialEq)]
pub struct TagCount {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

/// Every DataLog, newest first. Query methods only return visible entries.
#[derive(Default)]
pub struct DataLogStore {
    logs: Vec<DataLog>,
}

impl DataLogStore {
    pub fn load(root_dir: &Path, index_base_name: &str, break_tag: &str) -> io::Result<DataLogStore> {
        let list = ContentList::new(root_dir, index_base_name);
        let mut logs = vec![];
        for entry in list.retrieve()? {
            debug!("Loading datalog {}", entry.path.display());
            let is_dir_entry = entry.path.file_stem().and_then(|s| s.to_str()) == Some(index_base_name);
            let asset_dir = if is_dir_entry { entry.path.parent().map(|p| p.to_path_buf()) } else { None };

            let content = ContentFile::from_file(entry.link, entry.path)?.parse()?;
            logs.push(DataLog::from_content(content, break_tag, asset_dir)?);
        }

        let store = Self::from_logs(logs)?;
        info!("Loaded {} datalogs from {}", store.logs.len(), root_dir.display());
        Ok(store)
    }

    pub fn from_logs(mut logs: Vec<DataLog>) -> io::Result<DataLogStore> {
        let mut slugs = HashSet::new();
        for log in logs.iter() {
            if !slugs.insert(log.slug.as_str()) {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("Duplicated datalog slug {} - file={}", log.slug, log.file_path.display())));
            }
        }

        logs.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        Ok(DataLogStore { logs })
    }

    /// Including drafts and scheduled entries.
    pub fn all(&self) -> &[DataLog] {
        &self.logs
    }

    pub fn visible(&self, now: NaiveDateTime) -> Vec<&DataLog> {
        self.logs.iter().filter(|l| l.is_visible(now)).collect()
    }

    pub fn latest(&self, count: usize, now: NaiveDateTime) -> Vec<&DataLog> {
        self.logs.iter().filter(|l| l.is_visible(now)).take(count).collect()
    }

    pub fn by_slug(&self, slug: &str, now: NaiveDateTime) -> Option<&DataLog> {
        self.logs.iter().find(|l| l.slug == slug && l.is_visible(now))
    }

    /// Date at which the next scheduled entry becomes visible.
    pub fn next_scheduled(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.logs.iter()
            .filter(|l| l.status == PublishStatus::Published && l.date > now)
            .map(|l| l.date)
            .min()
    }

    pub fn in_category(&self, category: &str, now: NaiveDateTime) -> Vec<&DataLog> {
        self.logs.iter()
            .filter(|l| l.is_visible(now) && l.category.as_deref() == Some(category))
            .collect()
    }

    pub fn with_tag(&self, tag_slug: &str, now: NaiveDateTime) -> Vec<&DataLog> {
        self.logs.iter()
            .filter(|l| l.is_visible(now) && l.has_tag(tag_slug))
            .collect()
    }

    /// Entries of a series in reading order: part number first, then date.
    pub fn in_series(&self, series: &str, now: NaiveDateTime) -> Vec<&DataLog> {
        let mut logs: Vec<&DataLog> = self.logs.iter()
            .filter(|l| l.is_visible(now) && l.series.as_deref() == Some(series))
            .collect();
        logs.sort_by(|a, b| {
            let pa = a.series_part.unwrap_or(u32::MAX);
            let pb = b.series_part.unwrap_or(u32::MAX);
            pa.cmp(&pb).then_with(|| a.date.cmp(&b.date))
        });
        logs
    }

    pub fn search(&self, query: &str, now: NaiveDateTime) -> Vec<&DataLog> {
        self.logs.iter()
            .filter(|l| l.is_visible(now) && l.matches(query))
            .collect()
    }

    /// Tags of visible entries, most used first. Tags that only differ in case share one entry.
    pub fn tag_cloud(&self, now: NaiveDateTime) -> Vec<TagCount> {
        let mut tag_map: HashMap<String, TagCount> = HashMap::new();
        for log in self.visible(now) {
            for tag in log.tags.iter() {
                let slug = slugify(tag);
                if slug.is_empty() {
                    continue;
                }
                tag_map.entry(slug.clone())
                    .or_insert_with(|| TagCount { name: tag.clone(), slug, count: 0 })
                    .count += 1;
            }
        }

        let mut tags: Vec<TagCount> = tag_map.into_values().collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.slug.cmp(&b.slug)));
        tags
    }

    pub fn category_counts(&self, now: NaiveDateTime) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for log in self.visible(now) {
            if let Some(ref category) = log.category {
                *counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Other visible entries sharing the category or a tag. Each shared tag scores one,
    /// the same category two. Ties go to the newest entry.
    pub fn related(&self, log: &DataLog, count: usize, now: NaiveDateTime) -> Vec<&DataLog> {
        let tags: HashSet<String> = log.tags.iter().map(|t| slugify(t)).collect();

        let mut scored: Vec<(usize, &DataLog)> = self.visible(now).into_iter()
            .filter(|other| other.slug != log.slug)
            .map(|other| {
                let shared = other.tags.iter().filter(|t| tags.contains(&slugify(t))).count();
                let same_category = log.category.is_some() && other.category == log.category;
                (shared + if same_category { 2 } else { 0 }, other)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| b.date.cmp(&a.date)));
        scored.into_iter().take(count).map(|(_, l)| l).collect()
    }

    /// Previous and next visible entries in the series of `log`.
    pub fn series_neighbours(&self, log: &DataLog, now: NaiveDateTime) -> (Option<&DataLog>, Option<&DataLog>) {
        let Some(ref series) = log.series else {
            return (None, None);
        };

        let entries = self.in_series(series, now);
        let Some(pos) = entries.iter().position(|l| l.slug == log.slug) else {
            return (None, None);
        };

        let previous = if pos > 0 { entries.get(pos - 1).copied() } else { None };
        (previous, entries.get(pos + 1).copied())
    }
}
