pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: u32,
    page_count: u32,
}

/// One page of a list, with what the templates need to draw the page links.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub number: u32,
    pub page_count: u32,
}

impl<'a, T> Page<'a, T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.page_count
    }
}

impl<'a, T> Paginator<'a, T> {
    pub fn from(items: &'a [T], page_size: u32) -> Self {
        let page_size = page_size.max(1);
        if items.is_empty() {
            return Paginator {
                items,
                page_size,
                page_count: 0,
            };
        }
        let upper_bound = (items.len() - 1) as u32;
        let page_count = (upper_bound / page_size) + 1;

        Paginator {
            items,
            page_size,
            page_count,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn get_page(&self, page: u32) -> Result<&'a [T], String> {
        match page {
            0 => return Err("Page has to be greater than 0".to_string()),
            x if x > self.page_count => return Err(format!("Page has to be less than page_count ({})", self.page_count)),
            _ => {}
        };

        let start = ((page - 1) * self.page_size) as usize;
        let end = (start + self.page_size as usize).min(self.items.len());
        Ok(&self.items[start..end])
    }

    /// Same as `get_page`, but out of range requests land on the first page.
    /// An empty list gives an empty first page.
    pub fn page_or_first(&self, page: u32) -> Page<'a, T> {
        let number = match page {
            0 => 1,
            x if x > self.page_count => 1,
            x => x,
        };
        let items = self.get_page(number).unwrap_or(&[]);
        Page {
            items,
            number,
            page_count: self.page_count,
        }
    }
}
