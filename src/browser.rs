//! Headless browser session management.
//!
//! Wraps chromiumoxide: launch headless Chromium with a fixed flag set,
//! navigate to the listing page, wait for the row condition, and hand
//! back a rendered HTML snapshot. The session is closed on every exit
//! path, including navigation failures and page-ready timeouts.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::error::{Result, ScrapeError};

/// Poll interval of the page-ready wait.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Find a Chrome/Chromium binary on this machine.
///
/// PATH lookups first, then the standard macOS install location. `None`
/// leaves the choice to chromiumoxide's own detection.
pub fn find_chrome() -> Option<PathBuf> {
    let candidates = [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
    ];
    for name in candidates {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let app = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if app.exists() {
            return Some(app);
        }
    }

    None
}

/// A live headless browser with one open page.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
}

impl BrowserSession {
    /// Launch headless Chromium and open a blank page.
    ///
    /// The browser always runs with `--headless=new`, `--no-sandbox` and
    /// `--disable-dev-shm-usage`. If the page cannot be opened after a
    /// successful launch, the half-built browser is closed before the
    /// error is returned.
    pub async fn launch() -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
        if let Some(path) = find_chrome() {
            debug!("using chrome executable at {}", path.display());
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| ScrapeError::Launch(format!("failed to build browser config: {e}")))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        // Drain CDP events so the connection stays alive.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                return Err(ScrapeError::Launch(e.to_string()));
            }
        };

        Ok(Self { browser, page })
    }

    /// Navigate the session's page to `url`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("navigating to {url}");
        self.page
            .goto(url)
            .await
            .map_err(|e| ScrapeError::Navigation(e.to_string()))?;
        Ok(())
    }

    /// Block until at least one element matches `selector`, up to `timeout`.
    ///
    /// Polls `document.querySelector` every 100 ms. Script failures during
    /// a page load count as "not there yet" and are retried.
    pub async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let probe = format!("document.querySelector('{selector}') !== null");
        let start = Instant::now();
        loop {
            let found = match self.page.evaluate(probe.as_str()).await {
                Ok(result) => result.into_value::<bool>().unwrap_or(false),
                Err(e) => {
                    debug!("page-ready probe failed, retrying: {e}");
                    false
                }
            };
            if found {
                debug!("'{selector}' present after {:?}", start.elapsed());
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(ScrapeError::PageReadyTimeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Full HTML snapshot of the current document.
    pub async fn html(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| ScrapeError::Browser(format!("unexpected outerHTML result: {e}")))
    }

    /// Close the browser. Consumes the session.
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        Ok(())
    }
}

/// Launch a session, load `url`, wait for `ready_selector`, and return the
/// rendered HTML.
///
/// The session is closed before this returns, on success and on failure
/// alike. A teardown failure after a successful fetch is logged and
/// otherwise ignored; the snapshot is still returned.
pub async fn fetch_listing_html(
    url: &str,
    ready_selector: &str,
    timeout: Duration,
) -> Result<String> {
    let session = BrowserSession::launch().await?;
    let fetched = load_snapshot(&session, url, ready_selector, timeout).await;
    if let Err(e) = session.close().await {
        warn!("browser teardown failed: {e}");
    }
    fetched
}

async fn load_snapshot(
    session: &BrowserSession,
    url: &str,
    ready_selector: &str,
    timeout: Duration,
) -> Result<String> {
    session.goto(url).await?;
    session.wait_for_selector(ready_selector, timeout).await?;
    session.html().await
}
