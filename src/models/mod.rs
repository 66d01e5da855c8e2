use serde::{Deserialize, Serialize};
use std::fmt;

pub mod inventory;
pub mod product;

// Re-exports for convenience
pub use inventory::*;
pub use product::*;

/// How a locator query is interpreted when looking up an element on the page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocatorStrategy {
    /// Structural path query matching the first element anywhere in the document.
    #[serde(rename = "xpath")]
    XPath,
    /// Matches the first element carrying the given CSS class.
    #[serde(rename = "class")]
    Class,
}

impl LocatorStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorStrategy::XPath => "xpath",
            LocatorStrategy::Class => "class",
        }
    }
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Locator {
    pub query: String,
    pub strategy: LocatorStrategy,
}

impl Locator {
    pub fn xpath(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            strategy: LocatorStrategy::XPath,
        }
    }

    pub fn class(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            strategy: LocatorStrategy::Class,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy, self.query)
    }
}
