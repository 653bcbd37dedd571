use crate::DecodeError;

/// One scraped article, ready to be turned into a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: Option<String>,
    /// Extracted text blocks joined with `\n`.
    pub content: String,
    pub image_url: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

/// What the transport saw while fetching a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub requested_url: String,
    /// Where redirects ended up; relative links resolve against this.
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

impl FetchMetadata {
    pub fn redirected(&self) -> bool {
        self.requested_url != self.final_url
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Transport-level failure classes. None of them are retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureKind {
    #[error("invalid url")]
    InvalidUrl,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timed out")]
    Timeout,
    #[error("too many redirects")]
    RedirectLimitExceeded,
    #[error("response larger than {max_bytes} bytes")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("unsupported content type {content_type}")]
    UnsupportedContentType { content_type: String },
    #[error("network error")]
    Network,
}

/// Why a random-article fetch gave up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("could not decode page: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid site url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("no suitable article links found")]
    NoCandidates,
    #[error("gave up after {attempts} articles without extractable content")]
    AttemptLimit { attempts: usize },
}
