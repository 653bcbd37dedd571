use std::io::Write;

use anyhow::{Context, Result};
use article_fetcher::{Article, ArticleSource, FetchSettings, ReqwestFetcher};
use pipeline_logging::{pipeline_info, pipeline_warn};
use post_composer::{Post, PostComposer};
use publish_driver::{DeviceConnector, Publisher};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{AppConfig, Cli};

const RULE_WIDTH: usize = 60;

/// One pass of the pipeline: scrape an article, compose a post, publish it.
///
/// Progress and the dry-run report go to `out`. In dry-run mode `connector`
/// is never used.
pub async fn run<C, W>(config: &AppConfig, cli: &Cli, connector: C, out: &mut W) -> Result<()>
where
    C: DeviceConnector,
    W: Write,
{
    writeln!(out, "Scraping article...")?;
    let article = scrape(config).await?;
    writeln!(out, "Got article: {} ({})", title_or_untitled(&article), article.url)?;
    if let Some(image) = &article.image_url {
        writeln!(out, "Image URL: {image}")?;
    }
    if cli.dry_run {
        print_scraped(out, &article)?;
    }

    writeln!(out, "\nGenerating post...")?;
    let composer = PostComposer::new(config.composer_settings())?;
    let post = composer
        .compose(article.title.as_deref(), &article.content, &article.url)
        .await?;

    if cli.dry_run {
        print_generated(out, &post)?;
        writeln!(out, "\n[DRY RUN] Skipping Android posting")?;
        writeln!(out, "Done.")?;
        return Ok(());
    }

    writeln!(out, "\n--- Post preview ---")?;
    writeln!(out, "{}", post.text)?;
    writeln!(out, "--------------------\n")?;
    writeln!(out, "Posting via Android...")?;
    let report = Publisher::new(connector)
        .publish(&post.text, article.image_url.as_deref())
        .await?;
    pipeline_info!("Publish finished at {:?}", report.stage);
    writeln!(out, "Done.")?;
    Ok(())
}

async fn scrape(config: &AppConfig) -> Result<Article> {
    let fetcher = ReqwestFetcher::new(FetchSettings::default())?;
    let source = ArticleSource::new(fetcher, &config.site_url, &config.category_path)?;
    let mut attempted = Vec::new();
    let mut rng = StdRng::from_entropy();
    let article = source
        .fetch_random_article(&mut attempted, &mut rng)
        .await
        .with_context(|| format!("failed to scrape an article from {}", source.listing_url()))?;
    if attempted.len() > 1 {
        pipeline_warn!("Skipped {} articles without content", attempted.len() - 1);
    }
    Ok(article)
}

fn title_or_untitled(article: &Article) -> &str {
    article.title.as_deref().unwrap_or("(untitled)")
}

fn banner<W: Write>(out: &mut W, heading: &str) -> std::io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "{heading}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

fn print_scraped<W: Write>(out: &mut W, article: &Article) -> std::io::Result<()> {
    banner(out, "DRY RUN MODE - Web Scraped Content")?;
    writeln!(out, "\nTitle: {}", title_or_untitled(article))?;
    writeln!(out, "\nArticle URL: {}", article.url)?;
    writeln!(out, "\nImage URL: {}", article.image_url.as_deref().unwrap_or("None"))?;
    writeln!(out, "\nContent:\n{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "{}", article.content)?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

fn print_generated<W: Write>(out: &mut W, post: &Post) -> std::io::Result<()> {
    banner(out, "DRY RUN MODE - Model Generated Post")?;
    writeln!(out, "\nPost Body (length: {}):", post.body.chars().count())?;
    writeln!(out, "{}", post.body)?;
    writeln!(out, "\nFinal Post (length: {}):", post.char_count())?;
    writeln!(out, "{}", post.text)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}
