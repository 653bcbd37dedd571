//! Article fetcher: picks a random article from a category listing and
//! extracts the text worth posting about.
mod decode;
mod extract;
mod fetch;
mod listing;
mod source;
mod types;

pub use decode::{decode_page, DecodeError, DecodedPage};
pub use extract::{parse_article, strip_footnotes, ArticlePage, MAX_SUB_HEADINGS, PROPERTY_HEADING_IDS};
pub use fetch::{FetchSettings, PageFetcher, ReqwestFetcher};
pub use listing::{article_links, ARTICLE_LINK_SELECTOR};
pub use source::{ArticleSource, DEFAULT_CATEGORY_PATH, DEFAULT_MAX_ATTEMPTS, DEFAULT_SITE_URL};
pub use types::{Article, FailureKind, FetchError, FetchMetadata, FetchOutput, ScrapeError};
