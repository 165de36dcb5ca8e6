//! Crawl command.

use console::style;

use acordaos::config::Config;
use acordaos::repository::RecordStore;
use acordaos::scrapers::Navigator;

/// Crawl pending records with a Chrome session.
#[cfg(feature = "browser")]
pub async fn cmd_crawl(
    config: &Config,
    query: Option<&str>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    use acordaos::scrapers::ChromeDriver;

    let store = RecordStore::open(&config.db)?;
    let driver = ChromeDriver::launch(&config.driver).await?;

    let summary = Navigator::new(driver, store, config.crawl_options())
        .run(query, limit)
        .await?;

    println!(
        "{} {} records crawled: {} updated, {} left pending ({} pages)",
        style("✓").green(),
        summary.records_seen,
        summary.records_updated,
        summary.records_skipped,
        summary.pages_visited
    );

    Ok(())
}

#[cfg(not(feature = "browser"))]
pub async fn cmd_crawl(
    _config: &Config,
    _query: Option<&str>,
    _limit: Option<usize>,
) -> anyhow::Result<()> {
    Err(anyhow::anyhow!(
        "Browser support not compiled. Rebuild with: cargo build --features browser"
    ))
}
