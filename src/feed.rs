use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use tracing::debug;

/// Channel-level feed fields, kept verbatim so downstream formatters can
/// apply their own fallback rules.
#[derive(Debug, Clone, Default)]
pub struct FeedChannel {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub language: Option<String>,
    pub author: Option<String>,
    /// `<image><url>` child of the channel.
    pub image_url: Option<String>,
    /// `href` of the channel-level `<itunes:image>`; wins over `image_url`.
    pub itunes_image: Option<String>,
    pub summary: Option<String>,
    pub items: Vec<FeedItem>,
}

/// Raw per-entry feed fields.
#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    pub title: Option<String>,
    pub pub_date: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub content_encoded: Option<String>,
    pub summary: Option<String>,
    pub keywords: Option<String>,
    pub image: Option<String>,
    pub guid: Option<String>,
}

/// Parse a podcast RSS document into the raw feed model.
///
/// Namespaced podcast fields are matched by their conventional qualified
/// names (`itunes:*`, `content:encoded`). A document without a `<channel>`
/// element is invalid.
pub fn parse_feed(content: &str) -> Result<FeedChannel> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut channel = FeedChannel::default();
    let mut saw_channel = false;
    let mut item: Option<FeedItem> = None;
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = name_of(e.name());
                match name.as_str() {
                    "channel" => saw_channel = true,
                    "item" => {
                        if path.last().map(String::as_str) == Some("channel") {
                            item = Some(FeedItem::default());
                        }
                    }
                    "itunes:image" => capture_image(&e, &mut channel, &mut item, &path),
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                if name_of(e.name()) == "itunes:image" {
                    capture_image(&e, &mut channel, &mut item, &path);
                }
            }
            Ok(Event::Text(e)) => {
                // Feeds occasionally carry HTML entities the XML unescaper
                // does not know; keep such text verbatim.
                let text = e
                    .unescape()
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(e.as_ref()).into_owned());
                assign_text(&mut channel, &mut item, &path, &text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                assign_text(&mut channel, &mut item, &path, &text);
            }
            Ok(Event::End(e)) => {
                if name_of(e.name()) == "item" {
                    if let Some(done) = item.take() {
                        channel.items.push(done);
                    }
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::FeedParse(format!("Failed to parse feed XML: {e}")));
            }
            _ => {}
        }
    }

    if !saw_channel {
        return Err(Error::FeedParse("missing channel element".to_string()));
    }

    debug!(
        "Parsed feed: {} ({} items)",
        channel.title.as_deref().unwrap_or("Untitled"),
        channel.items.len()
    );
    Ok(channel)
}

fn name_of(name: QName) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Record an `<itunes:image href="…">`, item-level when inside an item,
/// channel-level otherwise. The first occurrence wins.
fn capture_image(
    e: &BytesStart,
    channel: &mut FeedChannel,
    item: &mut Option<FeedItem>,
    path: &[String],
) {
    let Some(href) = attr_value(e, b"href") else {
        return;
    };
    if let Some(it) = item.as_mut() {
        if path.last().map(String::as_str) == Some("item") && it.image.is_none() {
            it.image = Some(href);
        }
    } else if path.last().map(String::as_str) == Some("channel") && channel.itunes_image.is_none() {
        channel.itunes_image = Some(href);
    }
}

/// Route a text or CDATA chunk into the field addressed by the current
/// element path. Chunks for the same element accumulate, so mixed
/// text/CDATA content is concatenated.
fn assign_text(
    channel: &mut FeedChannel,
    item: &mut Option<FeedItem>,
    path: &[String],
    text: &str,
) {
    let Some(leaf) = path.last().map(String::as_str) else {
        return;
    };
    let parent = path
        .len()
        .checked_sub(2)
        .and_then(|i| path.get(i))
        .map(String::as_str);

    if let Some(it) = item.as_mut() {
        if parent != Some("item") {
            return;
        }
        let slot = match leaf {
            "title" => &mut it.title,
            "pubDate" => &mut it.pub_date,
            "itunes:duration" => &mut it.duration,
            "description" => &mut it.description,
            "content:encoded" => &mut it.content_encoded,
            "itunes:summary" => &mut it.summary,
            "itunes:keywords" => &mut it.keywords,
            "guid" => &mut it.guid,
            _ => return,
        };
        append(slot, text);
        return;
    }

    match (parent, leaf) {
        (Some("channel"), "title") => append(&mut channel.title, text),
        (Some("channel"), "description") => append(&mut channel.description, text),
        (Some("channel"), "link") => append(&mut channel.link, text),
        (Some("channel"), "language") => append(&mut channel.language, text),
        (Some("channel"), "itunes:author") => append(&mut channel.author, text),
        (Some("channel"), "itunes:summary") => append(&mut channel.summary, text),
        (Some("image"), "url") => {
            if path.len() >= 3 && path[path.len() - 3] == "channel" {
                append(&mut channel.image_url, text);
            }
        }
        _ => {}
    }
}

fn append(slot: &mut Option<String>, text: &str) {
    match slot {
        Some(existing) => existing.push_str(text),
        None => *slot = Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>測試節目</title>
    <description><![CDATA[<p>每週更新</p>]]></description>
    <link>https://example.com/show</link>
    <language>zh-Hant</language>
    <itunes:author>主持人</itunes:author>
    <itunes:summary>節目摘要</itunes:summary>
    <image>
      <url>https://example.com/rss-cover.png</url>
      <title>測試節目</title>
      <link>https://example.com/show</link>
    </image>
    <itunes:image href="https://example.com/itunes-cover.jpg"/>
    <item>
      <title>第一集</title>
      <guid isPermaLink="false">EP-001</guid>
      <pubDate>Wed, 01 Jan 2025 00:00:00 +0000</pubDate>
      <itunes:duration>125</itunes:duration>
      <itunes:keywords>太空, 火箭</itunes:keywords>
      <itunes:summary>摘要一</itunes:summary>
      <content:encoded><![CDATA[<p>完整<b>介紹</b></p>]]></content:encoded>
      <description>純文字介紹</description>
      <itunes:image href="https://example.com/ep1.jpg"/>
    </item>
    <item>
      <title>第二集</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_channel_fields() {
        let channel = parse_feed(SAMPLE).unwrap();
        assert_eq!(channel.title.as_deref(), Some("測試節目"));
        assert_eq!(channel.description.as_deref(), Some("<p>每週更新</p>"));
        assert_eq!(channel.link.as_deref(), Some("https://example.com/show"));
        assert_eq!(channel.language.as_deref(), Some("zh-Hant"));
        assert_eq!(channel.author.as_deref(), Some("主持人"));
        assert_eq!(channel.summary.as_deref(), Some("節目摘要"));
        assert_eq!(
            channel.image_url.as_deref(),
            Some("https://example.com/rss-cover.png")
        );
        assert_eq!(
            channel.itunes_image.as_deref(),
            Some("https://example.com/itunes-cover.jpg")
        );
    }

    #[test]
    fn test_parse_item_fields() {
        let channel = parse_feed(SAMPLE).unwrap();
        assert_eq!(channel.items.len(), 2);

        let item = &channel.items[0];
        assert_eq!(item.title.as_deref(), Some("第一集"));
        assert_eq!(item.guid.as_deref(), Some("EP-001"));
        assert_eq!(
            item.pub_date.as_deref(),
            Some("Wed, 01 Jan 2025 00:00:00 +0000")
        );
        assert_eq!(item.duration.as_deref(), Some("125"));
        assert_eq!(item.keywords.as_deref(), Some("太空, 火箭"));
        assert_eq!(item.summary.as_deref(), Some("摘要一"));
        assert_eq!(
            item.content_encoded.as_deref(),
            Some("<p>完整<b>介紹</b></p>")
        );
        assert_eq!(item.description.as_deref(), Some("純文字介紹"));
        assert_eq!(item.image.as_deref(), Some("https://example.com/ep1.jpg"));

        let bare = &channel.items[1];
        assert_eq!(bare.title.as_deref(), Some("第二集"));
        assert!(bare.guid.is_none());
        assert!(bare.duration.is_none());
    }

    #[test]
    fn test_missing_channel_is_fatal() {
        let result = parse_feed("<rss version=\"2.0\"></rss>");
        assert!(matches!(result, Err(Error::FeedParse(_))));
    }

    #[test]
    fn test_malformed_xml_is_fatal() {
        assert!(parse_feed("<rss><channel><title>x</item></rss>").is_err());
    }
}
