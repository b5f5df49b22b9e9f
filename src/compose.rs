//! Template composition and the generation pipeline.
//!
//! Each anchor region of the template is handled by its own substitution:
//! first occurrence only, no-op when the anchor is absent, independent of
//! the order the substitutions run in.

use crate::config::Settings;
use crate::episode::{Episode, Show};
use crate::error::Result;
use crate::feed;
use crate::format::taipei_offset;
use crate::render::card::render_episode_list;
use crate::render::schema::show_structured_data;
use crate::store::StoreCatalog;
use crate::utils::sanitize::{escape_attr, escape_text};
use chrono::{Datelike, Utc};
use regex::{Captures, Regex};
use std::fs;
use tracing::{debug, info};

/// Client-side keyword filter, spliced into the page verbatim.
const TAG_FILTER_JS: &str = include_str!("../assets/tag_filter.js");

/// Run the whole pipeline: read all inputs, build the page, write it once.
/// Every fallible read and parse happens before the output write, so a
/// failed run leaves no partial output behind.
pub fn generate(settings: &Settings) -> Result<()> {
    let template = fs::read_to_string(&settings.template_path)?;

    info!("Parsing feed {}", settings.feed_path.display());
    let xml = fs::read_to_string(&settings.feed_path)?;
    let channel = feed::parse_feed(&xml)?;

    let catalog = StoreCatalog::from_file(&settings.store_path)?;
    let links = catalog.link_index();
    debug!("Store metadata: {} deep links indexed", links.len());

    let show = Show::from_channel(&channel);
    let episodes: Vec<Episode> = channel
        .items
        .iter()
        .map(|item| Episode::from_item(item, &links))
        .collect();
    info!("Rendering {} episodes of {}", episodes.len(), show.title);

    let year = Utc::now().with_timezone(&taipei_offset()).year();
    let page = compose_page(&template, &show, &episodes, year);

    fs::write(&settings.output_path, &page)?;
    info!(
        "Wrote {} bytes to {}",
        page.len(),
        settings.output_path.display()
    );
    Ok(())
}

/// Apply every anchor substitution to the template.
pub fn compose_page(template: &str, show: &Show, episodes: &[Episode], year: i32) -> String {
    let mut page = substitute_brand(template, &show.title);
    page = substitute_heading(&page, &show.title);
    page = substitute_show_description(&page, &show.description_html);
    page = substitute_author(&page, &show.author);
    page = substitute_cover(&page, &show.title, &show.image);
    page = substitute_footer_link(&page, &show.link);
    page = substitute_copyright_year(&page, year);
    page = substitute_structured_data(&page, show);
    page = substitute_episode_list(&page, episodes);
    page = substitute_tag_search_state(&page, episodes);
    substitute_behavior_script(&page)
}

/// Replace the first match of `re`, building the replacement from its
/// capture groups. No match leaves the input untouched.
fn replace_once<F>(re: &Regex, input: &str, build: F) -> String
where
    F: FnOnce(&Captures) -> String,
{
    match re.captures(input) {
        Some(caps) => {
            let matched = caps.get(0).unwrap();
            let mut out = String::with_capacity(input.len());
            out.push_str(&input[..matched.start()]);
            out.push_str(&build(&caps));
            out.push_str(&input[matched.end()..]);
            out
        }
        None => input.to_string(),
    }
}

fn substitute_brand(template: &str, title: &str) -> String {
    let re = Regex::new(r##"(?s)(<a class="brand" href="#top">)(.*?)(</a>)"##).unwrap();
    replace_once(&re, template, |caps| {
        format!("{}{}{}", &caps[1], escape_text(title), &caps[3])
    })
}

fn substitute_heading(template: &str, title: &str) -> String {
    let re = Regex::new(r#"(?s)(<h1 id="show-title">)(.*?)(</h1>)"#).unwrap();
    replace_once(&re, template, |caps| {
        format!("{}{}{}", &caps[1], escape_text(title), &caps[3])
    })
}

fn substitute_show_description(template: &str, description_html: &str) -> String {
    let re = Regex::new(r#"(?s)(<p id="show-description">)(.*?)(</p>)"#).unwrap();
    replace_once(&re, template, |caps| {
        let indented = if description_html.is_empty() {
            "          ".to_string()
        } else {
            description_html
                .trim()
                .lines()
                .map(|line| format!("          {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!("{}\n{}\n        {}", &caps[1], indented, &caps[3])
    })
}

fn substitute_author(template: &str, author: &str) -> String {
    let re =
        Regex::new(r#"(?s)(<div class="host-info" id="show-author">)(.*?)(</div>)"#).unwrap();
    replace_once(&re, template, |caps| {
        let author_text = if author.is_empty() {
            String::new()
        } else {
            format!("主持：{author}")
        };
        format!("{}{}{}", &caps[1], escape_text(&author_text), &caps[3])
    })
}

fn substitute_cover(template: &str, title: &str, image: &str) -> String {
    let re = Regex::new(r#"<img id="show-cover"[^>]*?>"#).unwrap();
    replace_once(&re, template, |_| {
        format!(
            r#"<img id="show-cover" src="{}" alt="{}" />"#,
            escape_attr(image),
            escape_attr(&format!("{title} 封面"))
        )
    })
}

fn substitute_footer_link(template: &str, link: &str) -> String {
    if link.is_empty() {
        return template.to_string();
    }
    let re = Regex::new(r#"(?s)(<footer.*?<a href=")([^"]*)("[^>]*>)"#).unwrap();
    replace_once(&re, template, |caps| {
        format!("{}{}{}", &caps[1], escape_attr(link), &caps[3])
    })
}

fn substitute_copyright_year(template: &str, year: i32) -> String {
    let re = Regex::new(r#"(?s)©\s*<span id="copyright-year">.*?</span>"#).unwrap();
    replace_once(&re, template, |_| format!("© {year}"))
}

fn substitute_structured_data(template: &str, show: &Show) -> String {
    let re = Regex::new(
        r#"(?s)(<script type="application/ld\+json" id="structured-data">)(.*?)(</script>)"#,
    )
    .unwrap();
    replace_once(&re, template, |caps| {
        let value = show_structured_data(show);
        let block = format!("{value:#}")
            .lines()
            .map(|line| format!("      {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}\n{}\n    {}", &caps[1], block, &caps[3])
    })
}

fn substitute_episode_list(template: &str, episodes: &[Episode]) -> String {
    let re = Regex::new(r#"(?s)(<div id="episodes"[^>]*>)(.*?)(\n        </div>)"#).unwrap();
    replace_once(&re, template, |caps| {
        let markup = render_episode_list(episodes);
        if markup.is_empty() {
            format!("{}\n        {}", &caps[1], &caps[3])
        } else {
            format!("{}\n{}\n        {}", &caps[1], markup, &caps[3])
        }
    })
}

/// Reveal the keyword-search section when any episode carries keywords.
fn substitute_tag_search_state(template: &str, episodes: &[Episode]) -> String {
    if episodes.iter().any(|episode| !episode.keywords.is_empty()) {
        template.replacen(
            r#"<div class="tag-search" id="tag-search" hidden>"#,
            r#"<div class="tag-search" id="tag-search">"#,
            1,
        )
    } else {
        template.to_string()
    }
}

/// Swap the template's development script block (recognized by its
/// `const structuredDataEl` marker) for the embedded filter bundle.
fn substitute_behavior_script(template: &str) -> String {
    let re = Regex::new(r"(?s)\s*<script>\s*const structuredDataEl.*?</script>").unwrap();
    replace_once(&re, template, |_| {
        let indented = TAG_FILTER_JS
            .trim_matches('\n')
            .lines()
            .map(|line| {
                if line.trim().is_empty() {
                    line.to_string()
                } else {
                    format!("      {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n    <script>\n{indented}\n    </script>")
    })
}
