//! Character budgets and final post assembly.
//!
//! All lengths are counted in `char`s, which is what the target app counts
//! for plain text, and truncation never splits a code point.

/// Hard ceiling for a published post.
pub const POST_CEILING: usize = 280;
/// Room kept for the blank line between body and link, plus slack.
pub const URL_RESERVE: usize = 6;
/// The budget never drops below this, even for very long source URLs.
pub const BUDGET_FLOOR: usize = 120;
/// Appended when a final post has to be cut.
pub const TRUNCATION_MARKER: &str = "...";

/// How many characters the generated body may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterBudget {
    /// Ceiling minus the source URL and a reserve, never below `floor`.
    UrlAware {
        ceiling: usize,
        reserve: usize,
        floor: usize,
    },
    /// A fixed budget regardless of the URL.
    Fixed(usize),
}

impl Default for CharacterBudget {
    fn default() -> Self {
        CharacterBudget::UrlAware {
            ceiling: POST_CEILING,
            reserve: URL_RESERVE,
            floor: BUDGET_FLOOR,
        }
    }
}

impl CharacterBudget {
    pub fn for_url(&self, source_url: &str) -> usize {
        match *self {
            CharacterBudget::UrlAware {
                ceiling,
                reserve,
                floor,
            } => ceiling
                .saturating_sub(source_url.chars().count())
                .saturating_sub(reserve)
                .max(floor),
            CharacterBudget::Fixed(budget) => budget,
        }
    }
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// A post ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub body: String,
    pub source_url: Option<String>,
    /// Body and link combined, never longer than the ceiling it was built with.
    pub text: String,
}

impl Post {
    pub fn new(body: impl Into<String>, source_url: Option<&str>, ceiling: usize) -> Self {
        let body = body.into();
        let text = finalize_post(&body, source_url, ceiling);
        Self {
            body,
            source_url: source_url.map(str::to_string),
            text,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Join body and source link with a blank line and cap the result at
/// `ceiling` characters; an over-long result is cut to exactly `ceiling`
/// characters ending in [`TRUNCATION_MARKER`].
pub fn finalize_post(body: &str, source_url: Option<&str>, ceiling: usize) -> String {
    let combined = match source_url {
        Some(url) => format!("{body}\n\n{url}"),
        None => body.to_string(),
    };
    let combined = combined.trim();
    if combined.chars().count() <= ceiling {
        return combined.to_string();
    }
    let marker_len = TRUNCATION_MARKER.chars().count();
    if ceiling <= marker_len {
        return truncate_chars(TRUNCATION_MARKER, ceiling).to_string();
    }
    let kept = truncate_chars(combined, ceiling - marker_len);
    format!("{kept}{TRUNCATION_MARKER}")
}
