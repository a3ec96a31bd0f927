//! Feed documents: the machine-readable twin of a search-results page.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

use super::error::{Result, ScrapeError};

/// Path prefix of an HTML search-results category, e.g. `b-appartement-condo`
pub const LISTING_MARKER: &str = "b-";
/// Prefix of the same category served as a feed, e.g. `rss-srp-appartement-condo`
pub const FEED_MARKER: &str = "rss-srp-";

const ENTRY_TAG: &str = "item";

/// Derive the feed URL of a search-results page by swapping the category
/// prefix of its first path segment. Already-derived URLs come back as is.
pub fn feed_url(page_url: &str) -> Result<String> {
    let mut parsed = url::Url::parse(page_url)
        .map_err(|e| ScrapeError::invalid_url(page_url, e.to_string()))?;
    // Segments stay percent-encoded, so they can be put back verbatim
    let mut segments: Vec<String> = parsed
        .path_segments()
        .map(|segs| segs.map(str::to_string).collect())
        .unwrap_or_default();

    let Some(category) = segments.first_mut() else {
        return Err(ScrapeError::invalid_url(page_url, "url has no path"));
    };
    if category.starts_with(FEED_MARKER) {
        return Ok(parsed.into());
    }
    let Some(rest) = category.strip_prefix(LISTING_MARKER) else {
        return Err(ScrapeError::invalid_url(
            page_url,
            format!("no {LISTING_MARKER:?} category segment"),
        ));
    };
    *category = format!("{FEED_MARKER}{rest}");

    parsed.set_path(&format!("/{}", segments.join("/")));
    Ok(parsed.into())
}

/// One child element of a feed entry
#[derive(Debug, Clone, PartialEq)]
pub struct EntryField {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl EntryField {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A raw `<item>` of a feed document, kept as its direct child elements in
/// document order. Nothing is interpreted until asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    fields: Vec<EntryField>,
}

impl FeedEntry {
    /// First child named `name`; tag names compare case-insensitively.
    pub fn field(&self, name: &str) -> Option<&EntryField> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Text of the first child named `name`
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).map(|f| f.text.as_str())
    }

    pub fn fields(&self) -> &[EntryField] {
        &self.fields
    }
}

/// Collect every entry of a feed document.
///
/// Tag nesting is tracked by depth only, so stray unclosed markup does not
/// abort the parse. Markup nested inside a field contributes its text. A
/// document without entries yields an empty list.
pub fn parse_entries(xml: &str) -> Result<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.check_end_names(false);

    let mut entries = Vec::new();
    let mut depth = 0usize;
    // Depth of the open <item>, and the child currently being read
    let mut entry: Option<(usize, FeedEntry)> = None;
    let mut field: Option<EntryField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                match entry_depth(&entry) {
                    None if is_entry(&e) => entry = Some((depth, FeedEntry::default())),
                    Some(d) if depth == d + 1 => field = Some(start_field(&e)?),
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some((d, current)) = &mut entry {
                    if depth == *d {
                        current.fields.push(start_field(&e)?);
                    }
                }
            }
            Ok(Event::End(_)) => {
                match entry_depth(&entry) {
                    Some(d) if depth == d + 1 => {
                        if let (Some((_, current)), Some(mut done)) = (&mut entry, field.take()) {
                            done.text = done.text.trim().to_string();
                            current.fields.push(done);
                        }
                    }
                    Some(d) if depth == d => {
                        if let Some((_, done)) = entry.take() {
                            entries.push(done);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(t)) => {
                if let Some(open) = &mut field {
                    let text = t
                        .unescape()
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned().into());
                    open.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(open) = &mut field {
                    open.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ScrapeError::Feed(format!(
                    "{} at byte {}",
                    e,
                    reader.buffer_position()
                )))
            }
        }
    }

    Ok(entries)
}

fn entry_depth(entry: &Option<(usize, FeedEntry)>) -> Option<usize> {
    entry.as_ref().map(|(d, _)| *d)
}

fn is_entry(e: &BytesStart) -> bool {
    e.name().as_ref().eq_ignore_ascii_case(ENTRY_TAG.as_bytes())
}

fn start_field(e: &BytesStart) -> Result<EntryField> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ScrapeError::Feed(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value: Cow<str> = attr
            .unescape_value()
            .map_err(|err| ScrapeError::Feed(err.to_string()))?;
        attributes.push((key, value.into_owned()));
    }
    Ok(EntryField {
        name,
        attributes,
        text: String::new(),
    })
}
