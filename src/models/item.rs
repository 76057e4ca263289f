//! Monitored item data structure.

use serde::{Deserialize, Serialize};

/// A product page to monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Display name of the product
    pub name: String,

    /// Full URL of the product page
    pub url: String,
}

impl Item {
    /// Derive the status-store key for this item.
    ///
    /// The key is stable across restarts so the persisted record can be
    /// matched back to the configured item.
    pub fn key(&self) -> String {
        format!("{}_{}", self.name, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let item = Item {
            name: "Widget".to_string(),
            url: "https://example.com/widget".to_string(),
        };
        assert_eq!(item.key(), "Widget_https://example.com/widget");
    }

    #[test]
    fn test_key_is_deterministic() {
        let item = Item {
            name: "A".to_string(),
            url: "https://example.com/a".to_string(),
        };
        assert_eq!(item.key(), item.key());
    }
}
