use anyhow::{Result, anyhow};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::checker::PageContent;
use crate::markup::{RATE_CONTROL_SELECTORS, SPLIT_DEC_SELECTOR, SPLIT_INT_SELECTOR};
use crate::config::FetchConfig;
use crate::rate_resolver::RateCandidate;

/// Scroll offsets walked after load to trigger lazily rendered rate grids.
const SCROLL_OFFSETS: [u32; 4] = [600, 1200, 1800, 2400];

/// Selectors worth waiting for before reading the page; one attaching is a
/// good sign the rate grid has rendered.
const RATE_ATTACH_SELECTORS: [&str; 3] = [
    r#"button[data-rate-plan-code="SAVER"]"#,
    r#"button[data-room-rate-type-name="Saver"]"#,
    r#"button[data-ratename*="Saver" i]"#,
];

const COOKIE_BANNER_XPATHS: [&str; 2] = [
    "//button[contains(., 'Accept all')]",
    "//button[contains(., 'Accept')]",
];

/// Loads booking pages in headless Chrome and hands the core its raw
/// material: visible text, full markup and live rate-control candidates.
pub struct PageFetcher {
    browser: Browser,
    config: FetchConfig,
}

impl PageFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .args(vec![
                std::ffi::OsStr::new("--no-sandbox"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--disable-gpu"),
                std::ffi::OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| anyhow!("Failed to create launch options: {}", e))?;

        if let Some(chrome_path) = &config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        let browser =
            Browser::new(launch_options).map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

        Ok(Self { browser, config })
    }

    pub fn load(&self, url: &str) -> Result<LoadedPage> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| anyhow!("Failed to create tab: {}", e))?;
        tab.set_default_timeout(Duration::from_millis(self.config.nav_timeout_ms));

        tab.navigate_to(url)
            .map_err(|e| anyhow!("Navigation failed: {}", e))?;
        tab.wait_until_navigated()
            .map_err(|e| anyhow!("Page load failed: {}", e))?;
        thread::sleep(Duration::from_millis(self.config.settle_ms));

        self.accept_cookie_banner(&tab);
        self.scroll_through(&tab);
        self.wait_for_rate_grid(&tab);

        Ok(LoadedPage { tab })
    }

    fn accept_cookie_banner(&self, tab: &Arc<Tab>) {
        for xpath in COOKIE_BANNER_XPATHS {
            let Ok(button) = tab.find_element_by_xpath(xpath) else {
                continue;
            };
            if button.click().is_ok() {
                debug!(xpath, "dismissed cookie banner");
                thread::sleep(Duration::from_millis(800));
                return;
            }
        }
    }

    fn scroll_through(&self, tab: &Arc<Tab>) {
        for offset in SCROLL_OFFSETS {
            let _ = tab.evaluate(&format!("window.scrollTo(0, {offset});"), false);
            thread::sleep(Duration::from_millis(self.config.scroll_pause_ms));
        }
    }

    fn wait_for_rate_grid(&self, tab: &Arc<Tab>) {
        let timeout = Duration::from_millis(self.config.rate_attach_timeout_ms);
        for selector in RATE_ATTACH_SELECTORS {
            if tab
                .wait_for_element_with_custom_timeout(selector, timeout)
                .is_ok()
            {
                return;
            }
        }
        debug!("no rate control attached before timeout");
    }
}

/// One loaded booking page. The tab stays open until this is dropped, so
/// candidates borrowed from it remain usable for the duration of a check.
pub struct LoadedPage {
    tab: Arc<Tab>,
}

impl LoadedPage {
    /// Read visible body text and full markup. Extraction failures degrade to
    /// empty strings; the core treats those as empty input.
    pub fn content(&self) -> PageContent {
        let text = self
            .tab
            .find_element("body")
            .and_then(|body| body.get_inner_text())
            .unwrap_or_else(|error| {
                warn!(%error, "failed to read body text");
                String::new()
            });
        let markup = self.tab.get_content().unwrap_or_else(|error| {
            warn!(%error, "failed to read page markup");
            String::new()
        });
        PageContent { text, markup }
    }

    /// Live rate-control candidates in selector-priority order: the first
    /// match of each selector, most specific selector first.
    pub fn rate_candidates(&self) -> Vec<ElementCandidate<'_>> {
        let mut candidates = Vec::new();
        for selector in RATE_CONTROL_SELECTORS {
            if let Ok(element) = self.tab.find_element(selector) {
                candidates.push(ElementCandidate { element });
            }
        }
        candidates
    }
}

impl Drop for LoadedPage {
    fn drop(&mut self) {
        let _ = self.tab.close(true);
    }
}

/// A live rate control in the open tab. Every read swallows its own CDP
/// errors; a detached or misbehaving element is simply a strategy that
/// yields nothing.
pub struct ElementCandidate<'a> {
    element: Element<'a>,
}

impl RateCandidate for ElementCandidate<'_> {
    fn split_parts(&self) -> Option<(String, String)> {
        let int_part = self
            .element
            .find_element(SPLIT_INT_SELECTOR)
            .and_then(|e| e.get_inner_text())
            .ok()?;
        let dec_part = self
            .element
            .find_element(SPLIT_DEC_SELECTOR)
            .and_then(|e| e.get_inner_text())
            .ok()?;
        Some((int_part, dec_part))
    }

    fn rendered_text(&self) -> Option<String> {
        self.element.get_inner_text().ok()
    }

    fn raw_markup(&self) -> Option<String> {
        // textContent keeps text that styling hides from innerText
        let result = self
            .element
            .call_js_fn("function() { return this.textContent || ''; }", vec![], false)
            .ok()?;
        result.value.and_then(|v| v.as_str().map(str::to_string))
    }
}
