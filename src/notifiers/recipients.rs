/// Where the list of notification addresses comes from.
pub trait RecipientSource: Send + Sync {
    fn recipients(&self) -> Vec<String>;
}

/// A fixed list, typically `mail.recipients` from the configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticRecipients {
    addresses: Vec<String>,
}

impl StaticRecipients {
    pub fn new(addresses: Vec<String>) -> Self {
        Self { addresses }
    }
}

impl RecipientSource for StaticRecipients {
    fn recipients(&self) -> Vec<String> {
        self.addresses.clone()
    }
}
