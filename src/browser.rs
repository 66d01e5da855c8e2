use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::BrowserConfig;
use crate::models::{Locator, LocatorStrategy};

/// Failures reported by a browser session. Only [`BrowserError::ElementNotFound`]
/// is worth retrying; everything else is a fault of the page or the driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    #[error("Element not found: {locator}")]
    ElementNotFound { locator: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),
}

impl BrowserError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BrowserError::ElementNotFound { .. })
    }
}

/// One open browser page the availability pass drives.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load `url` and wait until navigation has settled.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Locate the first element matching `locator` and click it.
    async fn click(&self, locator: &Locator) -> Result<(), BrowserError>;

    /// Release the session. Called exactly once by the pass.
    async fn close(&self) -> Result<(), BrowserError>;
}

/// Opens browser sessions on demand so the pass can defer launching until the
/// inventory has been loaded.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

pub struct ChromeLauncher {
    config: BrowserConfig,
}

impl ChromeLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    fn launch_options(&self) -> Result<LaunchOptions<'static>, BrowserError> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(self.config.headless)
            .sandbox(false) // Often needed in containerized environments
            .idle_browser_timeout(Duration::from_secs(self.config.navigation_timeout_secs.max(30)))
            .args(vec![
                std::ffi::OsStr::new("--no-sandbox"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--disable-gpu"),
                std::ffi::OsStr::new("--disable-extensions"),
            ])
            .build()
            .map_err(|e| BrowserError::Launch(format!("invalid launch options: {}", e)))?;

        if let Some(chrome_path) = &self.config.chrome_path {
            launch_options.path = Some(std::path::PathBuf::from(chrome_path));
        }

        Ok(launch_options)
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let browser = Browser::new(self.launch_options()?)
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Launch(format!("failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(self.config.navigation_timeout_secs));

        debug!("Launched browser (headless: {})", self.config.headless);
        Ok(Box::new(ChromeSession {
            _browser: browser,
            tab,
        }))
    }
}

/// A single Chrome tab. The browser process exits when the session is dropped.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Script that clicks the first element matching the locator and reports
    /// whether one was found.
    fn click_script(locator: &Locator) -> Result<String, BrowserError> {
        let query = serde_json::to_string(&locator.query)
            .map_err(|e| BrowserError::Interaction(format!("invalid locator: {}", e)))?;

        let lookup = match locator.strategy {
            LocatorStrategy::XPath => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                query
            ),
            LocatorStrategy::Class => format!("document.getElementsByClassName({}).item(0)", query),
        };

        Ok(format!(
            r#"
            (function() {{
                const node = {};
                if (!node) {{
                    return false;
                }}
                node.click();
                return true;
            }})()
            "#,
            lookup
        ))
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let navigation_error = |message: String| BrowserError::Navigation {
            url: url.to_string(),
            message,
        };

        url::Url::parse(url).map_err(|e| navigation_error(format!("invalid URL: {}", e)))?;

        self.tab
            .navigate_to(url)
            .map_err(|e| navigation_error(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| navigation_error(format!("page load failed: {}", e)))?;

        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<(), BrowserError> {
        let script = Self::click_script(locator)?;
        let result = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| BrowserError::Interaction(format!("click on {} failed: {}", locator, e)))?;

        match result.value {
            Some(serde_json::Value::Bool(true)) => Ok(()),
            Some(serde_json::Value::Bool(false)) => Err(BrowserError::ElementNotFound {
                locator: locator.to_string(),
            }),
            other => Err(BrowserError::Interaction(format!(
                "unexpected click result for {}: {:?}",
                locator, other
            ))),
        }
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.tab
            .close(true)
            .map(|_| ())
            .map_err(|e| BrowserError::Interaction(format!("failed to close tab: {}", e)))
    }
}
