use serde::{Deserialize, Serialize};

/// Page selection for list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
    /// Skip the total count query; `total_items`/`total_pages` come back as -1.
    pub skip_total: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 30,
            skip_total: false,
        }
    }
}

impl Page {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            skip_total: false,
        }
    }

    pub(crate) fn to_query_pairs(self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("perPage", self.per_page.to_string()),
        ];
        if self.skip_total {
            pairs.push(("skipTotal", "1".to_string()));
        }
        pairs
    }
}

/// One page of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ListResult<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_items: i64,
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default)]
    pub items: Vec<T>,
}

impl<T> ListResult<T> {
    /// Whether a following page may exist.
    ///
    /// Without totals (`skipTotal`) a full page is taken to mean "maybe more".
    pub fn has_next_page(&self) -> bool {
        if self.total_pages >= 0 {
            i64::from(self.page) < self.total_pages
        } else {
            self.per_page > 0 && self.items.len() as u32 >= self.per_page
        }
    }
}
