// Loanable items offered at the desk
//
// The catalog is what the operator picks from. The ledger accepts any
// non-empty item name; the catalog is the source of truth shown to users.

use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEMS: &[&str] = &["우산", "충전기", "아답터", "무선 마우스", "HDMI 케이블"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ItemCatalog {
    items: Vec<String>,
}

impl ItemCatalog {
    /// Blank entries and repeats are dropped, order is kept
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = ItemCatalog { items: Vec::new() };
        for item in items {
            let item: String = item.into();
            let item = item.trim();
            if !item.is_empty() && !catalog.contains(item) {
                catalog.items.push(item.to_string());
            }
        }
        catalog
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|known| known == item.trim())
    }

    /// 1-based lookup, as shown in the shell's `items` listing
    pub fn by_number(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|index| self.items.get(index))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<String>> for ItemCatalog {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

impl From<ItemCatalog> for Vec<String> {
    fn from(catalog: ItemCatalog) -> Self {
        catalog.items
    }
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS.iter().copied())
    }
}
