use scraper::{Html, Selector};
use url::Url;

/// Anchor class the category timeline uses for article titles.
pub const ARTICLE_LINK_SELECTOR: &str = "a.timeline-article-title[href]";

/// Collect the absolute article URLs linked from a category listing page.
///
/// Links are resolved against `base`, fragments and scripting links are
/// dropped, and repeated links keep only their first position.
pub fn article_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(ARTICLE_LINK_SELECTOR) else {
        return Vec::new();
    };

    let mut links: Vec<String> = Vec::new();
    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(url) = resolve_url(href, base) {
            let url = String::from(url);
            if !links.contains(&url) {
                links.push(url);
            }
        }
    }
    links
}

/// Resolve `reference` against `base`, ignoring fragment-only, query-only and
/// `javascript:` references.
pub(crate) fn resolve_url(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.join(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://wikip.co").unwrap()
    }

    #[test]
    fn collects_only_timeline_titles() {
        let html = r##"
            <a class="timeline-article-title" href="/a/one">One</a>
            <a class="nav" href="/about">About</a>
            <a class="timeline-article-title" href="https://wikip.co/a/two">Two</a>
            <a class="timeline-article-title">No href</a>
            <a class="timeline-article-title" href="#top">Top</a>
        "##;
        assert_eq!(
            article_links(html, &base()),
            vec![
                "https://wikip.co/a/one".to_string(),
                "https://wikip.co/a/two".to_string()
            ]
        );
    }

    #[test]
    fn duplicate_links_collapse() {
        let html = r#"
            <a class="timeline-article-title" href="/a/one">One</a>
            <a class="timeline-article-title" href="/a/one">One again</a>
        "#;
        assert_eq!(article_links(html, &base()), vec!["https://wikip.co/a/one".to_string()]);
    }
}
