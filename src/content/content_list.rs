use std::{fs, io};
use std::path::{Path, PathBuf};

use crate::content::content_file::ContentFile;

/// Link (url segment) and location of one content entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentLink {
    pub link: String,
    pub path: PathBuf,
}

/// Content lives either in `<root>/<link>.md` or in `<root>/<link>/<index_base_name>.md`.
/// The directory form lets an entry carry its own images.
pub struct ContentList {
    pub root_dir: PathBuf,
    pub index_base_name: String,
}

impl ContentList {
    pub fn new(root_dir: &Path, index_base_name: &str) -> Self {
        ContentList {
            root_dir: root_dir.to_path_buf(),
            index_base_name: index_base_name.to_string(),
        }
    }

    /// Every entry, sorted by link so loading order does not depend on the file system.
    pub fn retrieve(&self) -> io::Result<Vec<ContentLink>> {
        let mut links = vec![];
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_file() && ContentFile::is_markdown(&path) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    links.push(ContentLink {
                        link: stem.to_string(),
                        path,
                    });
                }
            } else if file_type.is_dir() {
                let index_file = path.join(format!("{}.md", self.index_base_name));
                if !index_file.is_file() {
                    continue;
                }
                if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
                    links.push(ContentLink {
                        link: dir_name.to_string(),
                        path: index_file,
                    });
                }
            }
        }

        links.sort_by(|a, b| a.link.cmp(&b.link));
        Ok(links)
    }

    /// Opens one entry by link, trying the directory form first.
    pub fn find(&self, link: &str) -> Option<ContentLink> {
        if link.is_empty() || link.contains("..") || link.contains('/') {
            return None;
        }

        let dir_file = self.root_dir.join(link).join(format!("{}.md", self.index_base_name));
        if dir_file.is_file() {
            return Some(ContentLink { link: link.to_string(), path: dir_file });
        }

        let file = self.root_dir.join(format!("{}.md", link));
        if file.is_file() {
            return Some(ContentLink { link: link.to_string(), path: file });
        }

        None
    }
}
