use anyhow::{bail, Context};
use kijiji_scout::{
    ChromeNavigator, HttpFetcher, Listing, ListingWalker, PageLocator, ScrapeConfig,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config_from_args(std::env::args().skip(1).collect())?;

    info!("🏠 Kijiji Scout - apartment listings");
    info!("Starting from {}", config.start_url);

    let output_path = config.output_path.clone();

    // The scrape is blocking end to end
    let listings = tokio::task::spawn_blocking(move || scrape(&config))
        .await
        .context("Scrape task panicked")??;

    info!("✅ Scraped {} listings", listings.len());

    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} ({})", i + 1, listing.title, listing.price);
        if let (Some(size), Some(bathrooms)) = (&listing.size, &listing.bathrooms) {
            println!("   {} pièces, {} salles de bain", size, bathrooms);
        }
        println!(
            "   {:.4}, {:.4}",
            listing.location.latitude, listing.location.longitude
        );
        println!("   URL: {}", listing.url);
        println!();
    }

    let json = serde_json::to_string_pretty(&listings)?;
    tokio::fs::write(&output_path, json)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    info!("💾 Saved all listings to {}", output_path.display());

    Ok(())
}

/// `kijiji-scout [SEARCH_URL]` or `kijiji-scout --config FILE`
fn config_from_args(args: Vec<String>) -> anyhow::Result<ScrapeConfig> {
    match args.as_slice() {
        [] => Ok(ScrapeConfig::default()),
        [flag, path] if flag == "--config" => {
            let path = PathBuf::from(path);
            ScrapeConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        [url] if !url.starts_with("--") => Ok(ScrapeConfig::default().with_start_url(url.as_str())),
        _ => bail!("usage: kijiji-scout [SEARCH_URL] | --config FILE"),
    }
}

fn scrape(config: &ScrapeConfig) -> anyhow::Result<Vec<Listing>> {
    let fetcher = HttpFetcher::new(config).context("Failed to create HTTP client")?;

    let locator = PageLocator::with_probe_ceiling(
        &config.start_url,
        config.probe_ceiling,
        &ChromeNavigator::new(),
    )
    .context("Failed to locate search pages")?;
    info!(
        "Search starts at page {} of {}",
        locator.current_page(),
        locator.max_page()
    );

    let page_limit = config.page_limit.unwrap_or(usize::MAX);
    let mut listings = Vec::new();

    for page_url in locator.pages().take(page_limit) {
        info!("📄 Scraping {}", page_url);

        let walker = ListingWalker::with_labels(&page_url, config.detail_labels.clone(), &fetcher)
            .with_context(|| format!("Failed to read feed for {}", page_url))?;

        let records = if config.full_detail {
            walker.iter(&fetcher)
        } else {
            walker.snippets()
        };

        for record in records {
            let listing = record.and_then(|r| r.to_listing())?;
            listings.push(listing);
        }
    }

    Ok(listings)
}
