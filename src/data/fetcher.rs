//! Page fetching and stat table extraction
//!
//! A [`PageSource`] turns a URL into HTML. [`fetch_page`] layers the nfl.com
//! table conventions on top: one `<table>`, player links inside it, and an
//! optional pagination link.

use crate::{Result, ScrapeConfig, StatsError};
use scraper::{ElementRef, Html, Selector};
use std::cell::RefCell;
use std::collections::HashMap;

const PLAYER_LINK: &str = "a.d3-o-player-fullname.nfl-o-cta--link[href]";
const NEXT_PAGE_LINK: &str = "a.nfl-o-table-pagination__next[href]";

/// Anything that can hand back the HTML behind a URL
pub trait PageSource {
    /// Fetch the page at `url`. Non-success responses are errors.
    fn get_html(&self, url: &str) -> Result<String>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn get_html(&self, url: &str) -> Result<String> {
        (**self).get_html(url)
    }
}

/// Blocking HTTP page source
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(HttpSource { client })
    }
}

impl PageSource for HttpSource {
    fn get_html(&self, url: &str) -> Result<String> {
        log::debug!("Fetching {}", url);

        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(StatsError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        Ok(response.text()?)
    }
}

/// In-memory page source for replaying saved pages
///
/// Every request is recorded, hit or miss, so callers can check what was
/// fetched and how often.
#[derive(Debug, Default)]
pub struct MemorySource {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the HTML served for `url`
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.insert(url, html);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.insert(url.into(), html.into());
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// How many times `url` was requested
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }
}

impl PageSource for MemorySource {
    fn get_html(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());

        self.pages.get(url).cloned().ok_or_else(|| StatsError::Fetch {
            url: url.to_string(),
            reason: "HTTP 404 Not Found".to_string(),
        })
    }
}

/// A player link found in a stats table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReference {
    pub name: String,
    /// Site-relative detail path, e.g. `/players/patrick-mahomes/`
    pub href: String,
}

impl EntityReference {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        EntityReference {
            name: name.into(),
            href: href.into(),
        }
    }

    /// Stable identifier: the third `/`-separated segment of the href
    pub fn identifier(&self) -> Option<&str> {
        self.href.split('/').nth(2).filter(|s| !s.is_empty())
    }

    pub fn detail_url(&self, root_url: &str) -> String {
        absolute_url(root_url, &self.href)
    }

    /// Recent game log page for this player
    pub fn stats_url(&self, root_url: &str) -> String {
        format!("{}/stats/", self.detail_url(root_url).trim_end_matches('/'))
    }
}

/// Header row plus data rows, cell text only
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One fetched page of a stats listing
#[derive(Debug, Clone)]
pub struct PageResult {
    pub table: Table,
    pub references: Vec<EntityReference>,
    /// Absolute URL of the following page, if any
    pub next_page: Option<String>,
}

/// Fetch `url` and extract its stats table
pub fn fetch_page<S: PageSource + ?Sized>(
    source: &S,
    url: &str,
    root_url: &str,
) -> Result<PageResult> {
    let html = source.get_html(url)?;
    let document = Html::parse_document(&html);

    parse_page(&document, root_url).ok_or_else(|| StatsError::Fetch {
        url: url.to_string(),
        reason: "page has no table".to_string(),
    })
}

/// Parse a listing page; `None` when it has no table
pub fn parse_page(document: &Html, root_url: &str) -> Option<PageResult> {
    let table_selector = selector("table");
    let link_selector = selector(PLAYER_LINK);
    let next_selector = selector(NEXT_PAGE_LINK);

    let table_el = document.select(&table_selector).next()?;

    let references = table_el
        .select(&link_selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            Some(EntityReference::new(element_text(&a), href))
        })
        .collect();

    let next_page = document
        .select(&next_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolute_url(root_url, href));

    Some(PageResult {
        table: parse_table(&table_el),
        references,
        next_page,
    })
}

/// Extract header and body rows from a `<table>` element
pub fn parse_table(table: &ElementRef) -> Table {
    let head_selector = selector("thead th");
    let row_selector = selector("tr");
    let header_cell_selector = selector("th");
    let cell_selector = selector("td, th");
    let data_cell_selector = selector("td");

    let mut header: Vec<String> = table
        .select(&head_selector)
        .map(|th| element_text(&th))
        .collect();

    let mut rows = Vec::new();
    for row in table.select(&row_selector) {
        if row.select(&data_cell_selector).next().is_none() {
            // Header-only row outside <thead>
            if header.is_empty() {
                header = row
                    .select(&header_cell_selector)
                    .map(|th| element_text(&th))
                    .collect();
            }
            continue;
        }

        rows.push(
            row.select(&cell_selector)
                .map(|cell| element_text(&cell))
                .collect(),
        );
    }

    Table { header, rows }
}

/// Text content with whitespace runs collapsed
pub fn element_text(element: &ElementRef) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {:?}: {}", css, e))
}

fn absolute_url(root_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!(
            "{}/{}",
            root_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}
