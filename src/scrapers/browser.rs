use crate::error::FetchError;
use crate::scrapers::sites::USER_AGENT;
use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(25);
const SETTLE_DELAY: Duration = Duration::from_secs(5);
const AFTER_SCROLL_DOWN: Duration = Duration::from_secs(2);
const AFTER_SCROLL_UP: Duration = Duration::from_secs(1);

/// Browser-based fetcher for JavaScript-rendered search pages using headless Chrome
#[derive(Debug, Clone, Copy)]
pub struct BrowserFetcher {
    headless: bool,
}

impl BrowserFetcher {
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }

    fn launch(&self) -> Result<Browser> {
        info!("Launching headless Chrome...");

        let user_agent = format!("--user-agent={USER_AGENT}");
        let options = LaunchOptions::default_builder()
            .headless(self.headless)
            .sandbox(false)
            .window_size(Some((1400, 900)))
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new(user_agent.as_str()),
            ])
            .build()
            .context("Failed to build launch options")?;

        Browser::new(options).context("Failed to launch Chrome browser")
    }

    /// Load the page, scroll to the bottom and back to trigger lazy content,
    /// then return the rendered HTML. Blocking.
    fn render(&self, url: &str) -> Result<String> {
        let browser = self.launch()?;
        let tab = browser.new_tab()?;
        tab.set_default_timeout(PAGE_LOAD_TIMEOUT);

        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;

        debug!("Waiting for page to settle...");
        thread::sleep(SETTLE_DELAY);

        tab.evaluate("window.scrollTo(0, document.body.scrollHeight);", false)?;
        thread::sleep(AFTER_SCROLL_DOWN);
        tab.evaluate("window.scrollTo(0, 0);", false)?;
        thread::sleep(AFTER_SCROLL_UP);

        let html_result = tab.evaluate("document.documentElement.outerHTML", false)?;
        let html = match html_result.value {
            Some(value) => value.as_str().unwrap_or("").to_string(),
            None => {
                warn!("Could not get HTML from page");
                String::new()
            }
        };

        info!("Rendered {} ({} bytes)", url, html.len());
        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let fetcher = *self;
        let url = url.to_string();

        tokio::task::spawn_blocking(move || fetcher.render(&url))
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?
            .map_err(|e| FetchError::Browser(format!("{e:#}")))
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
