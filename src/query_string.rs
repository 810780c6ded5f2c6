use std::collections::HashMap;

#[derive(PartialEq, Debug, Default)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_default();
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn from_opt(buf: Option<&str>) -> Self {
        buf.map(Self::from).unwrap_or_default()
    }

    pub fn get_page(&self) -> u32 {
        match self.items.get("page").and_then(|v| v.trim().parse::<u32>().ok()) {
            Some(0) | None => 1,
            Some(page) => page,
        }
    }

    /// Non empty, trimmed value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }
}
