use async_trait::async_trait;

use crate::models::Product;
use crate::utils::error::Result;

pub mod email;
pub mod recipients;

pub use email::EmailNotifier;
pub use recipients::{RecipientSource, StaticRecipients};

/// Delivers one composed message to one recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, recipient: &str, notice: &AvailabilityNotice) -> Result<()>;
}

/// The single message announcing every product that qualified on this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityNotice {
    pub subject: String,
    pub body: String,
    pub product_count: usize,
}

impl AvailabilityNotice {
    /// Build the shared message, or `None` when nothing qualifies.
    pub fn compose(products: &[&Product], signature: &str) -> Option<Self> {
        if products.is_empty() {
            return None;
        }

        let plural = products.len() > 1;
        let subject = if plural {
            "Products are available!"
        } else {
            "Product is available!"
        };
        let intro = if plural {
            "Hi,\nThese products are available:"
        } else {
            "Hi,\nThis product is available:"
        };

        let mut body = String::new();
        body.push_str(intro);
        body.push_str("\n\n");
        for product in products {
            body.push_str(&format!("- {}: {}\n", product.name, product.link));
        }
        body.push_str(&format!("\nGr,\n{}\n", signature));

        Some(Self {
            subject: subject.to_string(),
            body,
            product_count: products.len(),
        })
    }
}
