use std::collections::BTreeMap;

use chrono::Datelike;

use crate::datalog::DataLog;

#[derive(Debug)]
pub struct ArchiveMonth<'a> {
    pub month: u32,
    pub posts: Vec<&'a DataLog>,
}

#[derive(Debug)]
pub struct ArchiveYear<'a> {
    pub year: i32,
    pub months: Vec<ArchiveMonth<'a>>,
}

impl ArchiveYear<'_> {
    pub fn count(&self) -> usize {
        self.months.iter().map(|m| m.posts.len()).sum()
    }
}

/// Buckets posts by year, then month. Years and months run newest first, and so do the
/// posts inside each month.
pub fn build_archive<'a>(posts: &[&'a DataLog]) -> Vec<ArchiveYear<'a>> {
    let mut buckets: BTreeMap<i32, BTreeMap<u32, Vec<&'a DataLog>>> = BTreeMap::new();
    for post in posts.iter().copied() {
        buckets.entry(post.date.year())
            .or_default()
            .entry(post.date.month())
            .or_default()
            .push(post);
    }

    buckets.into_iter().rev()
        .map(|(year, months)| ArchiveYear {
            year,
            months: months.into_iter().rev()
                .map(|(month, mut posts)| {
                    posts.sort_by(|a, b| b.date.cmp(&a.date));
                    ArchiveMonth { month, posts }
                })
                .collect(),
        })
        .collect()
}

/// Keeps the requested year, and inside it the requested month.
pub fn filter_archive(archive: Vec<ArchiveYear<'_>>, year: Option<i32>, month: Option<u32>) -> Vec<ArchiveYear<'_>> {
    archive.into_iter()
        .filter(|y| year.map_or(true, |wanted| y.year == wanted))
        .map(|mut y| {
            if let Some(wanted) = month {
                y.months.retain(|m| m.month == wanted);
            }
            y
        })
        .filter(|y| !y.months.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::content::PublishStatus;
    use crate::text_utils::parse_date_time;

    use super::*;

    fn log(slug: &str, date: &str) -> DataLog {
        DataLog {
            id: slug.to_string(),
            slug: slug.to_string(),
            title: slug.to_string(),
            author: String::new(),
            date: parse_date_time(date).unwrap(),
            status: PublishStatus::Published,
            category: None,
            tags: vec![],
            series: None,
            series_part: None,
            featured: false,
            reading_time: 1,
            summary_md: String::new(),
            summary_html: String::new(),
            body_html: String::new(),
            file_path: format!("{}.md", slug).into(),
            asset_dir: None,
        }
    }

    fn slugs(month: &ArchiveMonth) -> Vec<String> {
        month.posts.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn test_grouping_order() {
        let logs = vec![
            log("a", "2023-03-02 10:00:00"),
            log("b", "2024-01-20 10:00:00"),
            log("c", "2023-03-28 10:00:00"),
            log("d", "2023-11-05 10:00:00"),
            log("e", "2024-01-02 10:00:00"),
        ];
        let refs: Vec<&DataLog> = logs.iter().collect();
        let archive = build_archive(&refs);

        assert_eq!(archive.iter().map(|y| y.year).collect::<Vec<_>>(), [2024, 2023]);
        assert_eq!(archive[0].count(), 2);
        assert_eq!(archive[1].count(), 3);
        assert_eq!(archive[1].months.iter().map(|m| m.month).collect::<Vec<_>>(), [11, 3]);
        assert_eq!(slugs(&archive[1].months[1]), ["c", "a"]);
        assert_eq!(slugs(&archive[0].months[0]), ["b", "e"]);
    }

    #[test]
    fn test_empty() {
        assert!(build_archive(&[]).is_empty());
    }

    #[test]
    fn test_filter() {
        let logs = vec![
            log("a", "2023-03-02"),
            log("b", "2024-01-20"),
            log("d", "2023-11-05"),
        ];
        let refs: Vec<&DataLog> = logs.iter().collect();

        let only_2023 = filter_archive(build_archive(&refs), Some(2023), None);
        assert_eq!(only_2023.len(), 1);
        assert_eq!(only_2023[0].count(), 2);

        let nov = filter_archive(build_archive(&refs), Some(2023), Some(11));
        assert_eq!(nov.len(), 1);
        assert_eq!(slugs(&nov[0].months[0]), ["d"]);

        assert!(filter_archive(build_archive(&refs), Some(2023), Some(12)).is_empty());
        assert!(filter_archive(build_archive(&refs), Some(1999), None).is_empty());
        assert_eq!(filter_archive(build_archive(&refs), None, None).len(), 2);
    }
}
