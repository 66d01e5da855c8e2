// Shared fakes for driving a full availability pass without Chrome or SMTP.


use async_trait::async_trait;
use availability_tracker::{
    AvailabilityChecker, AppError,
    browser::{BrowserError, BrowserLauncher, BrowserSession},
    checker::CheckTargets,
    config::ProbeConfig,
    notifiers::{AvailabilityNotice, Notifier, StaticRecipients},
    probe::AvailabilityProbe,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADD_TO_CART_CLASS: &str = "js-add-to-cart-button";

/// Everything the fake browser observed during a pass.
#[derive(Debug, Default)]
pub struct BrowserLog {
    pub launches: usize,
    pub closes: usize,
    pub navigations: Vec<String>,
    pub clicks: Vec<String>,
}

/// A fake storefront: pages listed in `in_stock` render an add-to-cart button,
/// pages listed in `broken` fail to load, no page shows a cookie banner.
/// Clicking a locator query listed in `faulty` raises an interaction error.
#[derive(Clone, Default)]
pub struct FakeShop {
    in_stock: Arc<HashSet<String>>,
    broken: Arc<HashSet<String>>,
    faulty: Arc<HashSet<String>>,
    fail_launch: bool,
    pub log: Arc<Mutex<BrowserLog>>,
}

impl FakeShop {
    pub fn with_stock(links: &[&str]) -> Self {
        Self {
            in_stock: Arc::new(links.iter().map(|l| l.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn with_broken_links(mut self, links: &[&str]) -> Self {
        self.broken = Arc::new(links.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn with_faulty_controls(mut self, queries: &[&str]) -> Self {
        self.faulty = Arc::new(queries.iter().map(|q| q.to_string()).collect());
        self
    }

    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, BrowserLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl BrowserLauncher for FakeShop {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Launch("chrome not installed".to_string()));
        }
        self.log().launches += 1;
        Ok(Box::new(FakeSession {
            shop: self.clone(),
            current: Mutex::new(None),
        }))
    }
}

pub struct FakeSession {
    shop: FakeShop,
    current: Mutex<Option<String>>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.shop.log().navigations.push(url.to_string());
        if self.shop.broken.contains(url) {
            *self.current.lock().unwrap() = None;
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn click(&self, locator: &availability_tracker::models::Locator) -> Result<(), BrowserError> {
        self.shop.log().clicks.push(locator.to_string());
        if self.shop.faulty.contains(&locator.query) {
            return Err(BrowserError::Interaction(format!(
                "{} is covered by another element",
                locator
            )));
        }
        let current = self.current.lock().unwrap().clone();
        let has_button = locator.query == ADD_TO_CART_CLASS
            && current.is_some_and(|url| self.shop.in_stock.contains(&url));
        if has_button {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound {
                locator: locator.to_string(),
            })
        }
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.shop.log().closes += 1;
        Ok(())
    }
}

/// Records every message instead of sending it; recipients in `failing` error out.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<(String, AvailabilityNotice)>>>,
    failing: Arc<HashSet<String>>,
}

impl RecordingNotifier {
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            failing: Arc::new(recipients.iter().map(|r| r.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, AvailabilityNotice)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, recipient: &str, notice: &AvailabilityNotice) -> availability_tracker::Result<()> {
        if self.failing.contains(recipient) {
            return Err(AppError::Validation(format!("mailbox {} unavailable", recipient)));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), notice.clone()));
        Ok(())
    }
}

pub fn write_inventory(dir: &Path, inventory: serde_json::Value) -> PathBuf {
    let path = dir.join("inventory.json");
    std::fs::write(&path, serde_json::to_string_pretty(&inventory).unwrap()).unwrap();
    path
}

pub fn read_inventory(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Build a checker with the default shop targets and no retry delay.
pub fn create_test_checker(
    inventory_path: &Path,
    shop: &FakeShop,
    notifier: &RecordingNotifier,
    recipients: &[&str],
) -> AvailabilityChecker {
    let probe_config = ProbeConfig::default();
    AvailabilityChecker::new(
        inventory_path,
        Box::new(shop.clone()),
        Box::new(notifier.clone()),
        Box::new(StaticRecipients::new(
            recipients.iter().map(|r| r.to_string()).collect(),
        )),
        AvailabilityProbe::new(Duration::ZERO),
        CheckTargets::new(&probe_config.cookie_consent, &probe_config.add_to_cart),
        "Nick",
    )
}
