//! Episode card markup.

use crate::episode::Episode;
use crate::utils::sanitize::{escape_attr, escape_text};
use serde_json::json;

/// Indentation of an `<article>` inside the episode-list container.
const BASE_INDENT: &str = "          ";

/// Render every episode card, newline-separated, ready to splice into the
/// list container.
pub fn render_episode_list(episodes: &[Episode]) -> String {
    episodes
        .iter()
        .map(render_episode_card)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one episode as a self-contained card. The keyword list rides
/// along JSON-encoded in `data-keywords` for the client-side filter.
pub fn render_episode_card(episode: &Episode) -> String {
    let level1 = format!("{BASE_INDENT}  ");
    let level2 = format!("{level1}  ");
    let mut lines: Vec<String> = Vec::new();

    let dataset_title = escape_attr(&episode.title);
    let keywords_json = escape_attr(&json!(episode.keywords).to_string());
    lines.push(format!(
        "{BASE_INDENT}<article class=\"episode-card\" data-title=\"{dataset_title}\" data-keywords=\"{keywords_json}\">"
    ));

    if !episode.cover.is_empty() {
        let alt_text = escape_attr(&format!("{} 封面", episode.title));
        let cover_src = escape_attr(&episode.cover);
        lines.push(format!("{level1}<div class=\"episode-cover\">"));
        lines.push(format!(
            "{level2}<img src=\"{cover_src}\" alt=\"{alt_text}\" />"
        ));
        lines.push(format!("{level1}</div>"));
    }

    let mut meta_segments: Vec<String> = Vec::new();
    if !episode.pub_date.is_empty() {
        meta_segments.push(format!(
            "{level2}<span>{}</span>",
            escape_text(&episode.pub_date)
        ));
    }
    if !episode.duration.is_empty() {
        meta_segments.push(format!(
            "{level2}<span>節目長度：{}</span>",
            escape_text(&episode.duration)
        ));
    }
    if !meta_segments.is_empty() {
        lines.push(format!("{level1}<div class=\"episode-meta\">"));
        lines.extend(meta_segments);
        lines.push(format!("{level1}</div>"));
    }

    lines.push(format!(
        "{level1}<h3 class=\"episode-title\">{}</h3>",
        escape_text(&episode.title)
    ));
    lines.extend(render_description(
        &episode.description_html,
        &episode.summary,
        &level1,
    ));

    if !episode.link.is_empty() {
        let link_href = escape_attr(&episode.link);
        let label = format!("在 Apple Podcasts 播放〈{}〉", episode.title);
        lines.push(format!("{level1}<div class=\"episode-actions\">"));
        lines.push(format!(
            "{level2}<a class=\"episode-action\" href=\"{link_href}\" target=\"_blank\" rel=\"noopener noreferrer\" aria-label=\"{}\">",
            escape_attr(&label)
        ));
        lines.push(format!(
            "{level2}  <span class=\"icon\" aria-hidden=\"true\">▶️</span>"
        ));
        lines.push(format!(
            "{level2}  <span class=\"sr-only\">{}</span>",
            escape_text(&label)
        ));
        lines.push(format!("{level2}</a>"));
        lines.push(format!("{level1}</div>"));
    }

    if !episode.keywords.is_empty() {
        let keyword_text = escape_text(&episode.keywords.join("、"));
        lines.push(format!(
            "{level1}<div class=\"episode-keywords\">關鍵字：{keyword_text}</div>"
        ));
    }

    lines.push(format!("{BASE_INDENT}</article>"));
    lines.join("\n")
}

/// The description block: sanitized HTML when present, else the escaped
/// plain summary, else an empty placeholder.
fn render_description(description_html: &str, summary: &str, indent: &str) -> Vec<String> {
    let inner_indent = format!("{indent}  ");
    let mut lines = vec![format!("{indent}<div class=\"episode-description\">")];
    if !description_html.is_empty() {
        lines.extend(indent_lines(description_html.trim().lines(), &inner_indent));
    } else if !summary.is_empty() {
        lines.push(format!("{inner_indent}{}", escape_text(summary)));
    }
    lines.push(format!("{indent}</div>"));
    lines
}

fn indent_lines<'a>(content: impl Iterator<Item = &'a str>, indent: &str) -> Vec<String> {
    content
        .map(|line| {
            if line.is_empty() {
                indent.to_string()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect()
}
