use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::models::{Locator, LocatorStrategy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub inventory: InventoryConfig,
    pub browser: BrowserConfig,
    pub probe: ProbeConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub chrome_path: Option<String>,
    pub navigation_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub retry_delay_ms: u64,
    pub cookie_consent: ProbeTarget,
    pub add_to_cart: ProbeTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeTarget {
    pub locator: String,
    pub strategy: LocatorStrategy,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_name: String,
    pub signature: String,
    pub recipients: Vec<String>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inventory.json"),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            navigation_timeout_secs: 30,
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 1000,
            cookie_consent: ProbeTarget {
                locator: "//button[@type='submit' and @name='accept_cookie']".to_string(),
                strategy: LocatorStrategy::XPath,
                max_attempts: 1,
            },
            add_to_cart: ProbeTarget {
                locator: "js-add-to-cart-button".to_string(),
                strategy: LocatorStrategy::Class,
                max_attempts: 2,
            },
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            use_tls: true,
            username: None,
            password: None,
            from_name: "Availability Tracker".to_string(),
            signature: "Availability Tracker".to_string(),
            recipients: Vec::new(),
        }
    }
}

impl ProbeTarget {
    pub fn locator(&self) -> Locator {
        Locator {
            query: self.locator.clone(),
            strategy: self.strategy,
        }
    }
}

impl AppConfig {
    /// Resolve configuration once at startup.
    ///
    /// Layers, later ones winning: built-in defaults, `config/default`,
    /// `config/local`, the explicit `file`, then `TRACKER__*` environment
    /// variables. `EMAIL_USER`/`EMAIL_PASSWORD` fill in missing SMTP credentials.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        // Seed every key so a layer may override a single nested field.
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false));

        if let Some(file) = file {
            builder = builder.add_source(File::from(file));
        }

        let s = builder
            .add_source(
                Environment::with_prefix("TRACKER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("mail.recipients"),
            )
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        if config.mail.username.is_none() {
            config.mail.username = env::var("EMAIL_USER").ok();
        }
        if config.mail.password.is_none() {
            config.mail.password = env::var("EMAIL_PASSWORD").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inventory.path.as_os_str().is_empty() {
            return Err(ConfigError::Message("Inventory path must not be empty".into()));
        }

        if self.browser.navigation_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Browser navigation_timeout_secs must be greater than 0".into(),
            ));
        }

        for (name, target) in [
            ("cookie_consent", &self.probe.cookie_consent),
            ("add_to_cart", &self.probe.add_to_cart),
        ] {
            if target.locator.trim().is_empty() {
                return Err(ConfigError::Message(format!("Probe {} locator must not be empty", name)));
            }
            if target.max_attempts == 0 {
                return Err(ConfigError::Message(format!(
                    "Probe {} max_attempts must be greater than 0",
                    name
                )));
            }
        }

        if self.mail.smtp_host.trim().is_empty() {
            return Err(ConfigError::Message("SMTP host must not be empty".into()));
        }

        if self.mail.smtp_port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        let username = self.mail.username.as_deref().unwrap_or_default();
        let password = self.mail.password.as_deref().unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(ConfigError::Message(
                "SMTP username and password are required (set EMAIL_USER and EMAIL_PASSWORD)".into(),
            ));
        }

        if username.parse::<lettre::Address>().is_err() {
            return Err(ConfigError::Message(format!(
                "SMTP username '{}' is not a valid sender address",
                username
            )));
        }

        for recipient in &self.mail.recipients {
            if recipient.parse::<lettre::Address>().is_err() {
                return Err(ConfigError::Message(format!(
                    "Invalid recipient address '{}'",
                    recipient
                )));
            }
        }

        Ok(())
    }
}
