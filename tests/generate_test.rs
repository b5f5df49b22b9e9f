// End-to-end generation tests driving the public pipeline.
use podpage::{compose, Settings};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="zh-Hant">
  <head>
    <meta charset="utf-8" />
    <title>測試</title>
    <script type="application/ld+json" id="structured-data">
    </script>
  </head>
  <body>
    <header>
      <a class="brand" href="#top">品牌</a>
    </header>
    <main>
      <section>
        <h1 id="show-title">節目名稱</h1>
        <p id="show-description">
          預設介紹
        </p>
        <div class="host-info" id="show-author"></div>
        <img id="show-cover" src="placeholder.png" alt="封面" />
      </section>
      <section>
        <div class="tag-search" id="tag-search" hidden>
          <div id="selected-tags"></div>
          <input id="tag-input" placeholder="輸入關鍵字" />
          <ul id="tag-suggestions" hidden></ul>
        </div>
        <p id="no-results" hidden>沒有符合的集數</p>
        <div id="episodes" class="episode-list">
          舊內容
        </div>
      </section>
    </main>
    <footer>
      <a href="https://placeholder.example" target="_blank">前往節目頁</a>
      <span>© <span id="copyright-year">2024</span></span>
    </footer>
    <script>
      const structuredDataEl = document.getElementById('structured-data');
      console.log(structuredDataEl);
    </script>
  </body>
</html>
"##;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>測試節目</title>
    <description><![CDATA[<p>每週更新的科學節目</p>]]></description>
    <link>https://example.com/show</link>
    <language>zh-Hant</language>
    <itunes:author>主持人</itunes:author>
    <itunes:summary>節目摘要</itunes:summary>
    <itunes:image href="https://example.com/cover.jpg"/>
    <item>
      <title>Ep1</title>
      <guid isPermaLink="false">EP-001</guid>
      <pubDate>Wed, 01 Jan 2025 00:00:00 +0000</pubDate>
      <itunes:duration>125</itunes:duration>
      <itunes:keywords>x, y</itunes:keywords>
      <description><![CDATA[<p>第一集介紹</p>]]></description>
      <itunes:image href="https://example.com/ep1.jpg"/>
    </item>
    <item>
      <title>Ep2</title>
      <guid>ep-002</guid>
      <itunes:summary>第二集摘要</itunes:summary>
    </item>
  </channel>
</rss>
"#;

const STORE: &str = r#"{
  "resultCount": 2,
  "results": [
    {"episodeGuid": "ep-001", "trackViewUrl": "https://podcasts.apple.com/tw/ep1"},
    {"collectionName": "noise"}
  ]
}
"#;

fn write_inputs(dir: &Path) -> Settings {
    let settings = Settings {
        feed_path: dir.join("soundon.xml"),
        store_path: dir.join("apple.json"),
        template_path: dir.join("index_template.html"),
        output_path: dir.join("index.html"),
    };
    fs::write(&settings.feed_path, FEED).unwrap();
    fs::write(&settings.store_path, STORE).unwrap();
    fs::write(&settings.template_path, TEMPLATE).unwrap();
    settings
}

#[test]
fn test_generate_full_page() {
    let dir = TempDir::new().unwrap();
    let settings = write_inputs(dir.path());
    settings.validate().unwrap();

    compose::generate(&settings).unwrap();
    let page = fs::read_to_string(&settings.output_path).unwrap();

    // Show-level anchors.
    assert!(page.contains(r##"<a class="brand" href="#top">測試節目</a>"##));
    assert!(page.contains(r#"<h1 id="show-title">測試節目</h1>"#));
    assert!(page.contains("<p>每週更新的科學節目</p>"));
    assert!(page.contains("主持：主持人"));
    assert!(page.contains(
        r#"<img id="show-cover" src="https://example.com/cover.jpg" alt="測試節目 封面" />"#
    ));
    assert!(page.contains(r#"<a href="https://example.com/show" target="_blank">"#));
    assert!(!page.contains("copyright-year"));

    // Structured data.
    assert!(page.contains("\"@type\": \"PodcastSeries\""));
    assert!(page.contains("\"name\": \"測試節目\""));
    assert!(page.contains("\"description\": \"節目摘要\""));

    // Episode card for the matched entry.
    assert!(page.contains("節目長度：2 分"));
    assert!(page.contains("2025年1月1日 週三"));
    assert!(page.contains("關鍵字：x、y"));
    assert!(page.contains(r#"href="https://podcasts.apple.com/tw/ep1""#));
    assert!(page.contains("在 Apple Podcasts 播放〈Ep1〉"));
    assert!(page.contains("<p>第一集介紹</p>"));

    // The unmatched entry renders without an action block.
    assert!(page.contains("Ep2"));
    assert_eq!(page.matches("episode-actions").count(), 1);
    assert_eq!(page.matches("<article").count(), 2);

    // Keywords exist, so the tag-search section is revealed.
    assert!(page.contains(r#"<div class="tag-search" id="tag-search">"#));
    assert!(!page.contains(r#"id="tag-search" hidden"#));

    // The development script was swapped for the filter bundle.
    assert!(!page.contains("structuredDataEl"));
    assert!(page.contains("const TAG_SUGGESTION_LIMIT = 100;"));
    assert!(page.contains("initializeEpisodes();"));
}

#[test]
fn test_generation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let settings = write_inputs(dir.path());

    compose::generate(&settings).unwrap();
    let first = fs::read(&settings.output_path).unwrap();

    compose::generate(&settings).unwrap();
    let second = fs::read(&settings.output_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_missing_channel_is_fatal_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let settings = write_inputs(dir.path());
    fs::write(&settings.feed_path, "<rss version=\"2.0\"></rss>").unwrap();

    assert!(compose::generate(&settings).is_err());
    assert!(!settings.output_path.exists());
}

#[test]
fn test_unreadable_store_is_fatal() {
    let dir = TempDir::new().unwrap();
    let settings = write_inputs(dir.path());
    fs::write(&settings.store_path, "not json").unwrap();

    assert!(compose::generate(&settings).is_err());
    assert!(!settings.output_path.exists());
}

#[test]
fn test_feed_without_keywords_keeps_tag_search_hidden() {
    let dir = TempDir::new().unwrap();
    let settings = write_inputs(dir.path());
    let feed = FEED.replace("<itunes:keywords>x, y</itunes:keywords>", "");
    fs::write(&settings.feed_path, feed).unwrap();

    compose::generate(&settings).unwrap();
    let page = fs::read_to_string(&settings.output_path).unwrap();

    assert!(page.contains(r#"<div class="tag-search" id="tag-search" hidden>"#));
    assert!(!page.contains("episode-keywords"));
}
