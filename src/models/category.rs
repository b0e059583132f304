use std::collections::HashMap;

/// The permanent fallback category. It always exists, cannot be deleted or
/// renamed, and receives the expenses of any category that is deleted.
pub const SYSTEM_CATEGORY: &str = "Uncategorized";

/// Icon assigned when a category has none, or when its stored icon
/// identifier is not in [`ICON_SET`].
pub const DEFAULT_ICON: &str = "Tag";

/// Registry contents seeded into a fresh database.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    SYSTEM_CATEGORY,
    "Food",
    "Transport",
    "Housing",
    "Utilities",
    "Entertainment",
    "Health",
];

/// The fixed set of icon identifiers the UI understands.
pub const ICON_SET: &[&str] = &[
    "Tag",
    "Utensils",
    "Coffee",
    "Car",
    "Bus",
    "Home",
    "Zap",
    "Film",
    "Heart",
    "Cart",
    "Gift",
    "Book",
    "Plane",
    "Shirt",
    "Wrench",
];

/// The category registry: an ordered list of names plus a name→icon map.
/// Durable form is two key-value settings rows, each holding a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    pub categories: Vec<String>,
    pub icons: HashMap<String, String>,
}

impl Registry {
    /// Registry for a fresh database: the sentinel plus a starter set,
    /// all on the default icon.
    pub fn with_defaults() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            icons: HashMap::new(),
        }
    }

    /// Exact-match lookup; category names are case-sensitive.
    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// Icon identifier to display for `name`. Falls back to [`DEFAULT_ICON`]
    /// when the category has no icon or the stored identifier is unknown.
    pub fn icon_for(&self, name: &str) -> &str {
        match self.icons.get(name) {
            Some(icon) if ICON_SET.contains(&icon.as_str()) => icon,
            _ => DEFAULT_ICON,
        }
    }
}
