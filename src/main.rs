// Copyright 2026 Crypto Tracker Contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crypto_tracker::{browser, export, extract, LISTING_URL, PAGE_READY_TIMEOUT};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🚀 Starting Cryptocurrency Price Tracker...\n");
    println!("🔄 Launching browser and loading CoinMarketCap...");

    let html =
        browser::fetch_listing_html(LISTING_URL, extract::ROW_SELECTOR, PAGE_READY_TIMEOUT).await?;
    let records = extract::parse_listing(&html);

    let path = export::write_workbook(&records, Path::new("."))?;
    let filename = path.file_name().unwrap_or(path.as_os_str());
    println!(
        "\n✅ Data saved successfully to {}\n",
        filename.to_string_lossy()
    );

    print!("{}", export::render_table(&records));
    println!("\n✅ Done! Top 10 cryptocurrency data saved to Excel file.");

    Ok(())
}
