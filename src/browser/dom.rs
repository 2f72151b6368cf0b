//! Read-only DOM helpers over a page.
//!
//! Each helper evaluates a small self-contained script and deserializes the
//! result. Selectors and flags are JSON-encoded into the script text rather
//! than captured - the page is a separate execution context, so everything
//! it needs is passed explicitly. The scripts return raw fragments; the
//! filtering and map-building live in pure Rust so they can be tested
//! without a browser.

use std::collections::BTreeMap;

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{GalleryImage, SpecsObject};

/// One label/value fragment as read from the page, before filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSpecsFragment {
    pub label: Option<String>,
    pub value: Option<String>,
}

/// One titled paragraph as read from the page, before filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTitledParagraph {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Evaluate a script and deserialize its JSON result.
async fn eval<T: DeserializeOwned>(page: &Page, script: String) -> Result<T> {
    let value = page.evaluate(script).await?.into_value::<T>()?;
    Ok(value)
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Whether any element matches the selector.
pub async fn element_exists(page: &Page, selector: &str) -> Result<bool> {
    let script = format!("!!document.querySelector({})", quote(selector));
    eval(page, script).await
}

/// Trimmed text content of the first match, if any.
pub async fn text_content(page: &Page, selector: &str) -> Result<Option<String>> {
    let script = format!(
        r#"(function(sel) {{
            const el = document.querySelector(sel);
            if (!el) return null;
            const text = (el.textContent || '').trim();
            return text || null;
        }})({})"#,
        quote(selector)
    );
    eval(page, script).await
}

/// Click the first match. Returns false when no element matched.
pub async fn click(page: &Page, selector: &str) -> Result<bool> {
    let script = format!(
        r#"(function(sel) {{
            const el = document.querySelector(sel);
            if (!el) return false;
            el.click();
            return true;
        }})({})"#,
        quote(selector)
    );
    eval(page, script).await
}

/// Scroll the first match into view. Returns false when no element matched.
pub async fn scroll_into_view(page: &Page, selector: &str) -> Result<bool> {
    let script = format!(
        r#"(function(sel) {{
            const el = document.querySelector(sel);
            if (!el) return false;
            el.scrollIntoView({{ block: 'center' }});
            return true;
        }})({})"#,
        quote(selector)
    );
    eval(page, script).await
}

/// Current document title.
pub async fn page_title(page: &Page) -> Result<String> {
    eval(page, "document.title".to_string()).await
}

/// Read repeated label/value fragments under a selector.
///
/// The label comes from the `div.font-semibold` child. The value comes from
/// a link's text when `contains_links` is set; otherwise from the fragment's
/// immediate text-node children, so text inside nested elements (including
/// the label itself) is excluded.
pub async fn specs_fragments(
    page: &Page,
    selector: &str,
    contains_links: bool,
) -> Result<Vec<RawSpecsFragment>> {
    let script = format!(
        r#"(function(sel, containsLinks) {{
            return Array.from(document.querySelectorAll(sel)).map(div => {{
                const keyNode = div.querySelector('div.font-semibold');
                const label = keyNode ? (keyNode.textContent || '').trim() : null;
                let value = null;
                if (containsLinks) {{
                    const link = div.querySelector('a');
                    value = link ? (link.textContent || '').trim() : null;
                }} else {{
                    let text = '';
                    div.childNodes.forEach(node => {{
                        if (node.nodeType === Node.TEXT_NODE) {{
                            text += (node.textContent || '').trim();
                        }}
                    }});
                    value = text;
                }}
                return {{ label: label, value: value }};
            }});
        }})({}, {})"#,
        quote(selector),
        contains_links
    );
    eval(page, script).await
}

/// Build a specs object from raw fragments.
///
/// A fragment contributes an entry only when both label and value are
/// present and non-empty. Duplicate labels are last-write-wins.
pub fn build_specs_object(fragments: Vec<RawSpecsFragment>) -> SpecsObject {
    let mut specs = SpecsObject::new();
    for fragment in fragments {
        let label = fragment.label.map(|l| l.trim().to_string());
        let value = fragment.value.map(|v| v.trim().to_string());
        if let (Some(label), Some(value)) = (label, value) {
            if !label.is_empty() && !value.is_empty() {
                specs.insert(label, value);
            }
        }
    }
    specs
}

/// Read a complete specs object from the page.
pub async fn specs_object(
    page: &Page,
    selector: &str,
    contains_links: bool,
) -> Result<SpecsObject> {
    let fragments = specs_fragments(page, selector, contains_links).await?;
    Ok(build_specs_object(fragments))
}

/// Read a plain list of non-empty item texts from `sel > div > div` rows.
pub async fn spec_list(page: &Page, selector: &str) -> Result<Option<Vec<String>>> {
    let script = format!(
        r#"(function(sel) {{
            return Array.from(document.querySelectorAll(sel + ' > div > div'))
                .map(div => (div.textContent || '').trim())
                .filter(text => text);
        }})({})"#,
        quote(selector)
    );
    let items: Vec<String> = eval(page, script).await?;
    Ok(if items.is_empty() { None } else { Some(items) })
}

/// Read gallery images from a section's slider, excluding the first and last
/// entries (navigation clones).
pub async fn gallery_images(page: &Page, section_selector: &str) -> Result<Vec<GalleryImage>> {
    let script = format!(
        r#"(function(sel) {{
            const slider = sel + ' div[class*="MetadataSection_asset"] ul.slider';
            const lis = document.querySelectorAll(
                slider + ' li:not(:first-child):not(:last-child)');
            return Array.from(lis).map(li => {{
                const img = li.querySelector('img');
                const span = li.querySelector('span');
                return {{
                    url: img ? img.src : null,
                    caption: span ? (span.textContent || '').trim() || null : null
                }};
            }});
        }})({})"#,
        quote(section_selector)
    );
    eval(page, script).await
}

/// Read raw titled paragraphs: title from `div.font-semibold` or
/// `div.inline-flex`, content concatenated from the spans of the second
/// child div.
pub async fn titled_paragraph_fragments(
    page: &Page,
    selector: &str,
) -> Result<Vec<RawTitledParagraph>> {
    let script = format!(
        r#"(function(sel) {{
            return Array.from(document.querySelectorAll(sel)).map(div => {{
                const titleDiv = div.querySelector('div.font-semibold')
                    || div.querySelector('div.inline-flex');
                const title = titleDiv ? (titleDiv.textContent || '').trim() : null;
                const contentDiv = div.querySelector('div:nth-child(2)');
                let content = '';
                if (contentDiv) {{
                    contentDiv.querySelectorAll('span').forEach(span => {{
                        content += (span.textContent || '').trim() + ' ';
                    }});
                }}
                return {{ title: title, content: content.trim() || null }};
            }});
        }})({})"#,
        quote(selector)
    );
    eval(page, script).await
}

/// Build the titled-paragraph map; `None` distinguishes "section empty" from
/// "section present with empty fields".
pub fn build_titled_paragraphs(
    fragments: Vec<RawTitledParagraph>,
) -> Option<BTreeMap<String, String>> {
    if fragments.is_empty() {
        return None;
    }
    let mut data = BTreeMap::new();
    for fragment in fragments {
        if let (Some(title), Some(content)) = (fragment.title, fragment.content) {
            if !title.is_empty() && !content.is_empty() {
                data.insert(title, content);
            }
        }
    }
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

/// Read titled paragraphs from the page.
pub async fn titled_paragraphs(
    page: &Page,
    selector: &str,
) -> Result<Option<BTreeMap<String, String>>> {
    let fragments = titled_paragraph_fragments(page, selector).await?;
    Ok(build_titled_paragraphs(fragments))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(label: Option<&str>, value: Option<&str>) -> RawSpecsFragment {
        RawSpecsFragment {
            label: label.map(String::from),
            value: value.map(String::from),
        }
    }

    #[test]
    fn test_specs_object_requires_label_and_value() {
        let specs = build_specs_object(vec![
            fragment(Some("GPU"), Some("AD103")),
            fragment(Some("Memory"), None),
            fragment(None, Some("orphan value")),
            fragment(Some("Bus"), Some("")),
            fragment(Some(""), Some("PCIe 4.0")),
        ]);

        assert_eq!(specs.len(), 1);
        assert_eq!(specs.get("GPU").map(String::as_str), Some("AD103"));
    }

    #[test]
    fn test_specs_object_duplicate_labels_last_write_wins() {
        let specs = build_specs_object(vec![
            fragment(Some("Boost Clock"), Some("2550 MHz")),
            fragment(Some("Boost Clock"), Some("2595 MHz")),
        ]);

        assert_eq!(
            specs.get("Boost Clock").map(String::as_str),
            Some("2595 MHz")
        );
    }

    #[test]
    fn test_specs_object_round_trips_through_json() {
        let specs = build_specs_object(vec![
            fragment(Some("GPU"), Some("AD103")),
            fragment(Some("Memory"), Some("16 GB GDDR6X")),
            fragment(Some("Bus Interface"), Some("PCIe 4.0 x16")),
        ]);

        let serialized = serde_json::to_string(&specs).unwrap();
        let restored: SpecsObject = serde_json::from_str(&serialized).unwrap();
        assert_eq!(specs, restored);
    }

    #[test]
    fn test_titled_paragraphs_empty_section_is_none() {
        assert!(build_titled_paragraphs(Vec::new()).is_none());

        // Present but all fields empty: also None, but reached via the
        // fragment path rather than the zero-match path.
        let none = build_titled_paragraphs(vec![RawTitledParagraph {
            title: Some("Driver".to_string()),
            content: None,
        }]);
        assert!(none.is_none());
    }

    #[test]
    fn test_titled_paragraphs_builds_map() {
        let data = build_titled_paragraphs(vec![
            RawTitledParagraph {
                title: Some("Resizable BAR".to_string()),
                content: Some("Enabled".to_string()),
            },
            RawTitledParagraph {
                title: None,
                content: Some("stray".to_string()),
            },
        ])
        .unwrap();

        assert_eq!(data.len(), 1);
        assert_eq!(data.get("Resizable BAR").map(String::as_str), Some("Enabled"));
    }
}
