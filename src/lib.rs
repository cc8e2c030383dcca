// Copyright 2026 Crypto Tracker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Crypto tracker library — scrape the top CoinMarketCap listings with
//! headless Chrome and export them to a timestamped Excel workbook.
//!
//! This library crate exposes the pipeline stages for integration testing:
//! [`browser`] drives the headless session, [`extract`] turns rendered
//! HTML into records, [`export`] writes the workbook.

use std::time::Duration;

pub mod browser;
pub mod error;
pub mod export;
pub mod extract;

/// The listing page this tool scrapes.
pub const LISTING_URL: &str = "https://coinmarketcap.com/";

/// Upper bound on the wait for listing rows to render.
pub const PAGE_READY_TIMEOUT: Duration = Duration::from_secs(20);
