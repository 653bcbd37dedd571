use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::listing::resolve_url;

/// `id`s of the `h2` that opens the section worth posting about.
pub const PROPERTY_HEADING_IDS: [&str; 3] = [
    "Healing-Properties",
    "Biological-Properties",
    "Disease-Symptom-Treatment",
];

/// Sub-headings scanned after the property heading.
pub const MAX_SUB_HEADINGS: usize = 10;

/// What one article page yielded. `blocks` is empty when the page has no
/// recognised property section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticlePage {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub blocks: Vec<String>,
}

impl ArticlePage {
    /// The blocks joined into one prompt-ready string, or `None` when nothing
    /// was extracted.
    pub fn content(&self) -> Option<String> {
        (!self.blocks.is_empty()).then(|| self.blocks.join("\n"))
    }
}

/// Parse an article page.
///
/// The title comes from `h1.article-title span`, the image from the first
/// `img[src]` (resolved against `page_url`). Footnotes are removed before the
/// property section is walked so their text never reaches the content.
pub fn parse_article(html: &str, page_url: &Url) -> ArticlePage {
    let mut document = Html::parse_document(html);

    let title = first_match(&document, "h1.article-title span")
        .map(element_text)
        .filter(|t| !t.is_empty());
    let image_url = first_match(&document, "img[src]")
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| resolve_url(src, page_url))
        .map(String::from);

    strip_footnotes(&mut document);
    let blocks = property_blocks(&document);

    ArticlePage {
        title,
        image_url,
        blocks,
    }
}

/// Detach every `section.footnotes` from the tree. Returns how many were removed.
pub fn strip_footnotes(document: &mut Html) -> usize {
    let Ok(selector) = Selector::parse("section.footnotes") else {
        return 0;
    };
    let ids: Vec<NodeId> = document.select(&selector).map(|el| el.id()).collect();
    for id in &ids {
        if let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
        }
    }
    ids.len()
}

fn property_blocks(document: &Html) -> Vec<String> {
    let Some(heading) = property_heading(document) else {
        return Vec::new();
    };

    let mut blocks = Vec::new();
    for sub_heading in sub_headings_after(document, heading.id()) {
        push_block(&mut blocks, element_text(sub_heading));
        for sibling in sub_heading.next_siblings() {
            // Bare text between elements is layout whitespace on this site.
            let Some(element) = ElementRef::wrap(sibling) else {
                continue;
            };
            if is_section_boundary(element) {
                break;
            }
            push_block(&mut blocks, element_text(element));
        }
    }
    blocks
}

fn property_heading(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("h2[id]").ok()?;
    document.select(&selector).find(|h2| {
        h2.value()
            .id()
            .is_some_and(|id| PROPERTY_HEADING_IDS.contains(&id))
    })
}

/// The first `MAX_SUB_HEADINGS` `h3` elements after `heading` in document order.
fn sub_headings_after(document: &Html, heading: NodeId) -> Vec<ElementRef<'_>> {
    document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != heading)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "h3")
        .take(MAX_SUB_HEADINGS)
        .collect()
}

fn is_section_boundary(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "h1" | "h2" | "h3")
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn push_block(blocks: &mut Vec<String>, text: String) {
    if !text.is_empty() {
        blocks.push(text);
    }
}
