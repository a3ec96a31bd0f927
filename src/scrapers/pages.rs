//! Page discovery for paginated search results.
//!
//! Search-result URLs carry their page index as a `page-<N>` path segment,
//! e.g. `/b-appartement-condo/ville-de-montreal/page-3/c37l1700281`. The
//! site exposes no result count, but it clamps an out-of-range page request
//! to its real last page and redirects there. [`PageLocator`] asks for a
//! deliberately huge page and reads the clamped number back out of the URL
//! the browser lands on.

use tracing::{debug, info};
use url::{Position, Url};

use super::error::{Result, ScrapeError};
use super::traits::Navigator;
use super::types::DEFAULT_PROBE_CEILING;

const PAGE_PREFIX: &str = "page-";

/// Page number encoded in `url`, or 0 when it has no page segment.
pub fn page_number(url: &str) -> Result<u32> {
    let parsed = parse(url)?;
    let segments = segments(&parsed, url)?;
    match find_page_segment(&segments, url)? {
        Some((_, page)) => Ok(page),
        None => Ok(0),
    }
}

/// Returns `url` with a `page-1` segment inserted before its final path
/// segment, or unchanged if it already names a page.
pub fn normalize_first_page(url: &str) -> Result<String> {
    Ok(PageTemplate::new(url)?.at(1))
}

/// A search URL split around its page segment, so any page of the same
/// search can be rendered without re-parsing.
#[derive(Debug, Clone, PartialEq)]
struct PageTemplate {
    head: String,
    segments: Vec<String>,
    index: usize,
    tail: String,
}

impl PageTemplate {
    fn new(url: &str) -> Result<Self> {
        let parsed = parse(url)?;
        let mut segments = segments(&parsed, url)?;

        let index = match find_page_segment(&segments, url)? {
            Some((index, _)) => index,
            None => {
                // Ignore the empty segment left by a trailing slash
                let last = segments
                    .iter()
                    .rposition(|s| !s.is_empty())
                    .filter(|&i| i >= 1)
                    .ok_or_else(|| {
                        ScrapeError::invalid_url(url, "expected at least two path segments")
                    })?;
                segments.insert(last, format!("{PAGE_PREFIX}1"));
                last
            }
        };

        Ok(Self {
            head: parsed[..Position::BeforePath].to_string(),
            segments,
            index,
            tail: parsed[Position::AfterPath..].to_string(),
        })
    }

    fn at(&self, page: u32) -> String {
        let path = self
            .segments
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if i == self.index {
                    format!("{PAGE_PREFIX}{page}")
                } else {
                    s.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}{}", self.head, path, self.tail)
    }
}

fn parse(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ScrapeError::invalid_url(url, e.to_string()))
}

fn segments(parsed: &Url, url: &str) -> Result<Vec<String>> {
    parsed
        .path_segments()
        .map(|segs| segs.map(str::to_string).collect())
        .ok_or_else(|| ScrapeError::invalid_url(url, "url has no path"))
}

/// Position and value of the single `page-<N>` segment, if any.
fn find_page_segment(segments: &[String], url: &str) -> Result<Option<(usize, u32)>> {
    let mut found = None;
    for (i, segment) in segments.iter().enumerate() {
        let Some(number) = segment.strip_prefix(PAGE_PREFIX) else {
            continue;
        };
        if found.is_some() {
            return Err(ScrapeError::invalid_url(url, "more than one page segment"));
        }
        let page = number.parse::<u32>().map_err(|_| {
            ScrapeError::invalid_url(url, format!("page segment {segment:?} is not a number"))
        })?;
        found = Some((i, page));
    }
    Ok(found)
}

/// Locates the pages of one search.
///
/// The last page is resolved once, at construction, through a
/// [`Navigator`]; it never changes afterwards.
#[derive(Debug, Clone)]
pub struct PageLocator {
    url: String,
    page: u32,
    max_page: u32,
    template: PageTemplate,
}

impl PageLocator {
    /// Locate pages probing with [`DEFAULT_PROBE_CEILING`].
    pub fn new(url: &str, navigator: &dyn Navigator) -> Result<Self> {
        Self::with_probe_ceiling(url, DEFAULT_PROBE_CEILING, navigator)
    }

    pub fn with_probe_ceiling(url: &str, ceiling: u32, navigator: &dyn Navigator) -> Result<Self> {
        let page = page_number(url)?;
        let template = PageTemplate::new(url)?;
        let max_page = resolve_max_page(&template, ceiling, navigator)?;

        info!("Search has {} pages", max_page);

        Ok(Self {
            url: template.at(1),
            page,
            max_page,
            template,
        })
    }

    /// The search URL, normalized to name page 1 when the caller's did not
    /// name a page.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Page named by the caller's URL; 0 when it named none.
    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn max_page(&self) -> u32 {
        self.max_page
    }

    /// URL of a given page of this search.
    pub fn page_url(&self, page: u32) -> String {
        self.template.at(page)
    }

    /// Iterate over every page URL, 1 through [`max_page`](Self::max_page).
    pub fn pages(&self) -> Pages<'_> {
        Pages {
            locator: self,
            page: 0,
        }
    }
}

impl<'a> IntoIterator for &'a PageLocator {
    type Item = String;
    type IntoIter = Pages<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages()
    }
}

fn resolve_max_page(template: &PageTemplate, ceiling: u32, navigator: &dyn Navigator) -> Result<u32> {
    let probe = template.at(ceiling);
    debug!("Probing last page with {}", probe);

    let landed = navigator.resolve(&probe)?;
    // The site drops the page segment when it clamps to the first page
    let max_page = page_number(&landed)?.max(1);

    if max_page >= ceiling {
        debug!(
            "Probe page {} was not clamped; the search may have more pages",
            ceiling
        );
    }
    Ok(max_page)
}

/// Page URLs in ascending order.
///
/// Running off the end resets the counter, so the next call to `next`
/// starts over from page 1.
#[derive(Debug, Clone)]
pub struct Pages<'a> {
    locator: &'a PageLocator,
    page: u32,
}

impl Pages<'_> {
    /// Page most recently yielded; 0 before the first.
    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }
}

impl Iterator for Pages<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.page < self.locator.max_page {
            self.page += 1;
            Some(self.locator.page_url(self.page))
        } else {
            self.reset();
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.locator.max_page - self.page) as usize;
        (remaining, Some(remaining))
    }
}
