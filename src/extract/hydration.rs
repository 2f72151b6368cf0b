//! Session identifier recovery from the page's hydration payload.
//!
//! Chart session identifiers never appear as DOM attributes; they live only
//! in the framework's client-rendering bootstrap stream (`self.__next_f`),
//! which interleaves fragments of unrelated data. The stream is read out of
//! the page in one piece and parsed structurally here: newline-delimited
//! candidate values, each prefixed with an opaque key up to the first colon,
//! of which we want the first parsed array carrying the requested category
//! marker.

use chromiumoxide::Page;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::SessionIdMap;

/// Concatenate the type-1 fragments of the hydration stream.
pub async fn flight_stream(page: &Page) -> Result<String> {
    let script = r#"
        (function() {
            const flight = self.__next_f;
            if (!Array.isArray(flight)) return '';
            return flight
                .filter(item => Array.isArray(item) && item[0] === 1)
                .map(item => item[1])
                .join('');
        })()
    "#;
    let stream: String = page.evaluate(script).await?.into_value()?;
    Ok(stream)
}

/// Parse section-title to session-identifier mappings out of a hydration
/// stream.
///
/// The wanted structure is the first JSON array with more than three
/// elements whose third element equals `category`; its fourth element holds
/// `category.sections`, and each requested section contributes the session
/// identifiers of its first benchmark graph. Absent or malformed structure
/// yields an empty or partial map, never an error - callers treat missing
/// identifiers per-section at fetch time.
pub fn parse_session_ids(stream: &str, titles: &[&str], category: &str) -> SessionIdMap {
    let mut map = SessionIdMap::new();

    let Some(payload) = find_category_payload(stream, category) else {
        debug!("No hydration payload found for category {}", category);
        return map;
    };

    let Some(sections) = payload
        .pointer("/category/sections")
        .and_then(Value::as_array)
    else {
        debug!("Hydration payload for {} has no sections", category);
        return map;
    };

    for title in titles {
        let ids = sections
            .iter()
            .find(|section| section.get("title").and_then(Value::as_str) == Some(*title))
            .and_then(|section| section.pointer("/content/benchmarkGraphs/0/sessionIds"))
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(String::from))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        if ids.is_empty() {
            debug!("No session IDs in hydration data for section {}", title);
        } else {
            map.insert((*title).to_string(), ids);
        }
    }

    map
}

fn find_category_payload(stream: &str, category: &str) -> Option<Value> {
    for line in stream.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Each line is "<key>:<json>"; the value may itself contain colons.
        let Some((_, value)) = line.split_once(':') else {
            continue;
        };
        let Ok(parsed) = serde_json::from_str::<Value>(value.trim()) else {
            continue;
        };
        let Some(array) = parsed.as_array() else {
            continue;
        };
        if array.len() > 3 && array[2].as_str() == Some(category) {
            return Some(array[3].clone());
        }
    }
    None
}

/// Read the hydration stream from the page and extract the identifiers for
/// the requested section titles.
pub async fn session_ids(page: &Page, titles: &[&str], category: &str) -> SessionIdMap {
    let stream = match flight_stream(page).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Could not read hydration stream: {}", e);
            return SessionIdMap::new();
        }
    };
    parse_session_ids(&stream, titles, category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_stream() -> String {
        let payload = serde_json::json!([
            "$",
            "div",
            "performance",
            {
                "category": {
                    "sections": [
                        {
                            "title": "Gaming Performance",
                            "layout": "chart",
                            "content": {
                                "benchmarkGraphs": [
                                    { "sessionIds": ["sess-aaa", "sess-bbb"], "graphType": "fps" }
                                ],
                                "metadataAttributes": []
                            }
                        },
                        {
                            "title": "Ray Tracing Performance",
                            "layout": "chart",
                            "content": {
                                "benchmarkGraphs": [
                                    { "sessionIds": ["sess-rt"], "graphType": "fps" }
                                ],
                                "metadataAttributes": []
                            }
                        },
                        {
                            "title": "Thermals",
                            "layout": "chart",
                            "content": { "benchmarkGraphs": [], "metadataAttributes": [] }
                        }
                    ]
                }
            }
        ]);

        format!(
            "3:{}\n4:not json at all\n5:{}\n",
            serde_json::json!({"unrelated": true}),
            payload
        )
    }

    #[test]
    fn test_parses_requested_sections() {
        let map = parse_session_ids(
            &fixture_stream(),
            &["Gaming Performance", "Ray Tracing Performance"],
            "performance",
        );

        assert_eq!(
            map.get("Gaming Performance").map(Vec::as_slice),
            Some(["sess-aaa".to_string(), "sess-bbb".to_string()].as_slice())
        );
        assert_eq!(
            map.get("Ray Tracing Performance").map(Vec::as_slice),
            Some(["sess-rt".to_string()].as_slice())
        );
    }

    #[test]
    fn test_section_without_graphs_is_omitted() {
        let map = parse_session_ids(&fixture_stream(), &["Thermals"], "performance");
        assert!(map.is_empty());
    }

    #[test]
    fn test_wrong_category_yields_empty_map() {
        let map = parse_session_ids(
            &fixture_stream(),
            &["Gaming Performance"],
            "productivity-and-efficiency",
        );
        assert!(map.is_empty());
    }

    #[test]
    fn test_malformed_stream_yields_empty_map() {
        assert!(parse_session_ids("", &["Gaming Performance"], "performance").is_empty());
        assert!(parse_session_ids(
            "no colons here\n7:[1,2]\n8:{\"not\":\"an array\"}",
            &["Gaming Performance"],
            "performance"
        )
        .is_empty());
    }

    #[test]
    fn test_value_containing_colons_survives_key_split() {
        let payload = serde_json::json!([
            "$", "div", "performance",
            {
                "category": {
                    "sections": [{
                        "title": "Gaming Performance",
                        "content": {
                            "benchmarkGraphs": [
                                { "sessionIds": ["https:colon:heavy:id"] }
                            ]
                        }
                    }]
                }
            }
        ]);
        let stream = format!("9:{}", payload);

        let map = parse_session_ids(&stream, &["Gaming Performance"], "performance");
        assert_eq!(
            map.get("Gaming Performance").map(Vec::as_slice),
            Some(["https:colon:heavy:id".to_string()].as_slice())
        );
    }
}
