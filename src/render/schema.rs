//! Schema.org JSON-LD generation for the show.

use crate::episode::Show;
use serde_json::{json, Value};

/// Build the `PodcastSeries` structured-data node embedded in the page
/// head.
pub fn show_structured_data(show: &Show) -> Value {
    let mut schema = json!({
        "@context": "https://schema.org/",
        "@type": "PodcastSeries",
        "name": show.title,
        "url": show.link,
        "image": show.image,
        "inLanguage": show.language,
        "description": show.structured_description(),
    });

    if !show.author.is_empty() {
        schema["author"] = json!({
            "@type": "Person",
            "name": show.author
        });
    }

    if !show.link.is_empty() {
        schema["potentialAction"] = json!([{
            "@type": "ListenAction",
            "target": [show.link]
        }]);
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show() -> Show {
        Show {
            title: "測試節目".to_string(),
            description_raw: "<p>每週更新</p>".to_string(),
            description_html: "<p>每週更新</p>".to_string(),
            author: "主持人".to_string(),
            image: "https://example.com/cover.jpg".to_string(),
            link: "https://example.com/show".to_string(),
            language: "zh-Hant".to_string(),
            summary: "節目摘要".to_string(),
        }
    }

    #[test]
    fn test_structured_data_fields() {
        let value = show_structured_data(&show());
        assert_eq!(value["@type"], "PodcastSeries");
        assert_eq!(value["name"], "測試節目");
        assert_eq!(value["inLanguage"], "zh-Hant");
        assert_eq!(value["description"], "節目摘要");
        assert_eq!(value["author"]["@type"], "Person");
        assert_eq!(value["author"]["name"], "主持人");
        assert_eq!(
            value["potentialAction"][0]["@type"],
            "ListenAction"
        );
        assert_eq!(
            value["potentialAction"][0]["target"][0],
            "https://example.com/show"
        );
    }

    #[test]
    fn test_optional_fields_omitted() {
        let mut anonymous = show();
        anonymous.author = String::new();
        anonymous.link = String::new();
        let value = show_structured_data(&anonymous);
        assert!(value.get("author").is_none());
        assert!(value.get("potentialAction").is_none());
    }
}
