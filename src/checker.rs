use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::config::{AppConfig, ProbeTarget};
use crate::models::{Inventory, Locator};
use crate::notifiers::{AvailabilityNotice, Notifier, RecipientSource};
use crate::probe::AvailabilityProbe;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct ProductCheckResult {
    pub name: String,
    pub link: String,
    pub available: bool,
    pub notified_counter: u32,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub products_checked: usize,
    pub products_available: usize,
    pub products_notified: usize,
    pub notifications_sent: usize,
    pub failed_recipients: Vec<String>,
    pub product_results: Vec<ProductCheckResult>,
    pub total_time_ms: u64,
}

/// Locators and attempt budgets for the two controls clicked on every page.
#[derive(Debug, Clone)]
pub struct CheckTargets {
    pub cookie_consent: Locator,
    pub cookie_consent_attempts: u32,
    pub add_to_cart: Locator,
    pub add_to_cart_attempts: u32,
}

impl CheckTargets {
    pub fn new(cookie_consent: &ProbeTarget, add_to_cart: &ProbeTarget) -> Self {
        Self {
            cookie_consent: cookie_consent.locator(),
            cookie_consent_attempts: cookie_consent.max_attempts,
            add_to_cart: add_to_cart.locator(),
            add_to_cart_attempts: add_to_cart.max_attempts,
        }
    }
}

/// Runs one availability pass: load the inventory, probe every product page,
/// persist the counters and mail the products that qualify.
pub struct AvailabilityChecker {
    inventory_path: PathBuf,
    launcher: Box<dyn BrowserLauncher>,
    notifier: Box<dyn Notifier>,
    recipients: Box<dyn RecipientSource>,
    probe: AvailabilityProbe,
    targets: CheckTargets,
    signature: String,
}

impl AvailabilityChecker {
    pub fn new(
        inventory_path: impl Into<PathBuf>,
        launcher: Box<dyn BrowserLauncher>,
        notifier: Box<dyn Notifier>,
        recipients: Box<dyn RecipientSource>,
        probe: AvailabilityProbe,
        targets: CheckTargets,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            inventory_path: inventory_path.into(),
            launcher,
            notifier,
            recipients,
            probe,
            targets,
            signature: signature.into(),
        }
    }

    pub fn from_config(
        config: &AppConfig,
        launcher: Box<dyn BrowserLauncher>,
        notifier: Box<dyn Notifier>,
        recipients: Box<dyn RecipientSource>,
    ) -> Self {
        Self::new(
            config.inventory.path.clone(),
            launcher,
            notifier,
            recipients,
            AvailabilityProbe::new(Duration::from_millis(config.probe.retry_delay_ms)),
            CheckTargets::new(&config.probe.cookie_consent, &config.probe.add_to_cart),
            config.mail.signature.clone(),
        )
    }

    pub async fn run(&self) -> Result<PassReport> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        let mut inventory = Inventory::load(&self.inventory_path)?;
        info!(
            "Checking {} products from {}",
            inventory.products.len(),
            self.inventory_path.display()
        );

        let session = self.launcher.launch().await?;
        let product_results = self.check_products(session.as_ref(), &mut inventory).await;
        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        drop(session);

        inventory.save(&self.inventory_path)?;

        let pending = inventory.pending_notifications();
        let products_notified = pending.len();
        let (notifications_sent, failed_recipients) =
            match AvailabilityNotice::compose(&pending, &self.signature) {
                Some(notice) => self.dispatch(&notice).await,
                None => {
                    info!("No products to notify about, skipping notification");
                    (0, Vec::new())
                }
            };

        let report = PassReport {
            started_at,
            products_checked: product_results.len(),
            products_available: inventory.available_count(),
            products_notified,
            notifications_sent,
            failed_recipients,
            product_results,
            total_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Pass finished: {}/{} available, {} notified, {} messages sent",
            report.products_available,
            report.products_checked,
            report.products_notified,
            report.notifications_sent
        );
        Ok(report)
    }

    async fn check_products(
        &self,
        session: &dyn BrowserSession,
        inventory: &mut Inventory,
    ) -> Vec<ProductCheckResult> {
        let mut results = Vec::with_capacity(inventory.products.len());

        for product in inventory.products.iter_mut() {
            let mut error = None;

            let available = match session.navigate(&product.link).await {
                Ok(()) => {
                    self.probe
                        .attempt(
                            session,
                            &self.targets.cookie_consent,
                            self.targets.cookie_consent_attempts,
                        )
                        .await;

                    let outcome = self
                        .probe
                        .attempt(
                            session,
                            &self.targets.add_to_cart,
                            self.targets.add_to_cart_attempts,
                        )
                        .await;
                    debug!(
                        "Add-to-cart on {} took {} attempt(s)",
                        product.name,
                        outcome.attempts()
                    );
                    outcome.is_activated()
                }
                Err(e) => {
                    warn!("Skipping {}: {}", product.name, e);
                    error = Some(e.to_string());
                    false
                }
            };

            product.record_availability(available);
            if available {
                info!("Product {} is available.", product.name);
            } else {
                info!("Product {} is not available.", product.name);
            }

            results.push(ProductCheckResult {
                name: product.name.clone(),
                link: product.link.clone(),
                available,
                notified_counter: product.notified_counter,
                error,
            });
        }

        results
    }

    /// Send `notice` to every recipient. A failed send is logged and the
    /// remaining recipients are still attempted.
    async fn dispatch(&self, notice: &AvailabilityNotice) -> (usize, Vec<String>) {
        let mut sent = 0;
        let mut failed = Vec::new();

        for recipient in self.recipients.recipients() {
            match self.notifier.send(&recipient, notice).await {
                Ok(()) => {
                    info!("Sent '{}' to {} via {}", notice.subject, recipient, self.notifier.name());
                    sent += 1;
                }
                Err(e) => {
                    warn!("Failed to notify {}: {}", recipient, e);
                    failed.push(recipient);
                }
            }
        }

        (sent, failed)
    }
}
