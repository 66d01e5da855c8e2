use serde::{Deserialize, Serialize};

/// One tracked product as stored in the inventory file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub name: String,
    pub link: String,
    /// Recomputed on every pass; stored on disk as `0`/`1`.
    #[serde(default, with = "availability_flag")]
    pub available: bool,
    #[serde(default)]
    pub notified_counter: u32,
    /// Fields we don't interpret, carried through a rewrite untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            available: false,
            notified_counter: 0,
            extra: serde_json::Map::new(),
        }
    }

    /// Apply the outcome of this pass's add-to-cart probe.
    pub fn record_availability(&mut self, available: bool) {
        self.available = available;
        if available {
            self.notified_counter = self.notified_counter.saturating_add(1);
        }
    }

    /// Whether this pass should announce the product.
    ///
    /// Called after [`Product::record_availability`], so the counter already
    /// includes this pass. A product whose counter was below the cap when the
    /// pass started is announced once more; the cap applies from the next pass.
    pub fn should_notify(&self, notified_max_counter: u32) -> bool {
        self.available && self.notified_counter <= notified_max_counter
    }
}

mod availability_flag {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(available: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*available))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("0, 1 or a boolean")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Unsigned(other), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Signed(other), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }
}
