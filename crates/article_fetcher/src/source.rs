use pipeline_logging::{pipeline_debug, pipeline_info, pipeline_warn};
use rand::seq::SliceRandom;
use rand::Rng;
use url::Url;

use crate::extract::{parse_article, ArticlePage};
use crate::listing::article_links;
use crate::{decode_page, Article, PageFetcher, ScrapeError};

pub const DEFAULT_SITE_URL: &str = "https://wikip.co";
pub const DEFAULT_CATEGORY_PATH: &str = "/categories/natural-healing/";
pub const DEFAULT_MAX_ATTEMPTS: usize = 25;

/// Picks random articles from one category listing of the content site.
pub struct ArticleSource<F> {
    fetcher: F,
    listing_url: Url,
    max_attempts: usize,
}

impl<F: PageFetcher> ArticleSource<F> {
    pub fn new(fetcher: F, site_url: &str, category_path: &str) -> Result<Self, ScrapeError> {
        let invalid = |err: url::ParseError| ScrapeError::InvalidBaseUrl {
            url: site_url.to_string(),
            message: err.to_string(),
        };
        let site = Url::parse(site_url).map_err(invalid)?;
        let listing_url = site.join(category_path).map_err(invalid)?;
        Ok(Self {
            fetcher,
            listing_url,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn listing_url(&self) -> &str {
        self.listing_url.as_str()
    }

    /// Fetch a random article that has a property section.
    ///
    /// Every article URL tried is appended to `attempted`, so a caller can see
    /// which picks were rejected. Articles without extractable content are not
    /// errors; another candidate is drawn until the listing runs out
    /// (`NoCandidates`) or `max_attempts` picks have been made. Transport
    /// failures end the call immediately.
    pub async fn fetch_random_article<R>(
        &self,
        attempted: &mut Vec<String>,
        rng: &mut R,
    ) -> Result<Article, ScrapeError>
    where
        R: Rng + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let candidates = self.fresh_candidates(attempted).await?;
            let Some(article_url) = candidates.choose(rng).cloned() else {
                pipeline_warn!(
                    "No untried article links left on {} after {} attempts",
                    self.listing_url,
                    attempted.len()
                );
                return Err(ScrapeError::NoCandidates);
            };
            attempted.push(article_url.clone());
            pipeline_info!(
                "Attempt {}: picked {} out of {} candidates",
                attempt,
                article_url,
                candidates.len()
            );

            let page = self.load_article(&article_url).await?;
            match page.content() {
                Some(content) => {
                    return Ok(Article {
                        title: page.title,
                        content,
                        image_url: page.image_url,
                        url: article_url,
                    });
                }
                None => {
                    pipeline_warn!("{} has no property section, trying another", article_url);
                }
            }
        }

        Err(ScrapeError::AttemptLimit {
            attempts: self.max_attempts,
        })
    }

    async fn fresh_candidates(&self, attempted: &[String]) -> Result<Vec<String>, ScrapeError> {
        let output = self.fetcher.fetch(self.listing_url.as_str()).await?;
        let decoded = decode_page(
            &output.bytes,
            output.metadata.content_type.as_deref(),
            &output.metadata.final_url,
        )?;
        let links = article_links(&decoded.html, &self.listing_url);
        let total = links.len();
        let fresh: Vec<String> = links
            .into_iter()
            .filter(|link| !attempted.contains(link))
            .collect();
        pipeline_debug!(
            "listing {} has {} article links, {} untried",
            self.listing_url,
            total,
            fresh.len()
        );
        Ok(fresh)
    }

    async fn load_article(&self, article_url: &str) -> Result<ArticlePage, ScrapeError> {
        let output = self.fetcher.fetch(article_url).await?;
        let decoded = decode_page(
            &output.bytes,
            output.metadata.content_type.as_deref(),
            &output.metadata.final_url,
        )?;
        let page_url = Url::parse(&output.metadata.final_url)
            .or_else(|_| Url::parse(article_url))
            .map_err(|err| ScrapeError::InvalidBaseUrl {
                url: article_url.to_string(),
                message: err.to_string(),
            })?;
        Ok(parse_article(&decoded.html, &page_url))
    }
}
