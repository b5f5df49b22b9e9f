use crate::feed::{FeedChannel, FeedItem};
use crate::format::{format_date, format_duration, normalize_guid, parse_keywords};
use crate::store::LinkIndex;
use crate::utils::sanitize::sanitize_html;

/// Placeholder title for entries that arrive without one.
pub const FALLBACK_EPISODE_TITLE: &str = "未命名集數";
/// Placeholder show title.
pub const FALLBACK_SHOW_TITLE: &str = "科學好好聽";
/// Locale tag used when the feed does not declare one.
pub const DEFAULT_LANGUAGE: &str = "zh-Hant";

/// One episode, normalized for rendering. Missing source fields become
/// empty values, never errors.
#[derive(Debug, Clone)]
pub struct Episode {
    pub title: String,
    pub pub_date: String,
    pub duration: String,
    pub description_html: String,
    pub summary: String,
    pub keywords: Vec<String>,
    pub cover: String,
    /// Store deep link resolved via the identifier join; empty when the
    /// identifier has no match.
    pub link: String,
    pub guid: String,
}

impl Episode {
    pub fn from_item(item: &FeedItem, links: &LinkIndex) -> Self {
        let title = item
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(FALLBACK_EPISODE_TITLE)
            .to_string();

        // Prefer the richer encoded content over the plain description.
        let raw_description = item
            .content_encoded
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(item.description.as_deref())
            .unwrap_or("");

        let guid = normalize_guid(item.guid.as_deref().unwrap_or(""));
        let link = links.get(&guid).cloned().unwrap_or_default();

        Episode {
            title,
            pub_date: format_date(item.pub_date.as_deref().unwrap_or("")),
            duration: format_duration(item.duration.as_deref().unwrap_or("")),
            description_html: sanitize_html(raw_description),
            summary: item.summary.as_deref().unwrap_or("").trim().to_string(),
            keywords: parse_keywords(item.keywords.as_deref().unwrap_or("")),
            cover: item.image.clone().unwrap_or_default(),
            link,
            guid,
        }
    }
}

/// Channel-level presentation fields.
#[derive(Debug, Clone)]
pub struct Show {
    pub title: String,
    /// Unsanitized description, kept for the structured-data block.
    pub description_raw: String,
    pub description_html: String,
    pub author: String,
    pub image: String,
    pub link: String,
    pub language: String,
    pub summary: String,
}

impl Show {
    pub fn from_channel(channel: &FeedChannel) -> Self {
        let description_raw = channel.description.clone().unwrap_or_default();
        let summary = channel
            .summary
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| description_raw.clone());

        Show {
            title: trimmed_or(channel.title.as_deref(), FALLBACK_SHOW_TITLE),
            description_html: sanitize_html(&description_raw),
            description_raw,
            author: channel.author.as_deref().unwrap_or("").trim().to_string(),
            image: channel
                .itunes_image
                .clone()
                .or_else(|| channel.image_url.clone())
                .unwrap_or_default(),
            link: channel.link.as_deref().unwrap_or("").trim().to_string(),
            language: trimmed_or(channel.language.as_deref(), DEFAULT_LANGUAGE),
            summary,
        }
    }

    /// Description used for structured data: the summary field, which
    /// already falls back to the raw channel description.
    pub fn structured_description(&self) -> &str {
        self.summary.trim()
    }
}

fn trimmed_or(value: Option<&str>, fallback: &str) -> String {
    let trimmed = value.unwrap_or("").trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
