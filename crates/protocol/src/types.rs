use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque listing key assigned by the backend when a listing is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    /// Wraps a key previously returned by the backend.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Textual identity of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Listing classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    App,
    Game,
}

impl Category {
    /// Wire/text form (`"app"` / `"game"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Category::App => "app",
            Category::Game => "game",
        }
    }

    /// Human-readable badge label.
    pub fn label(self) -> &'static str {
        match self {
            Category::App => "App",
            Category::Game => "Game",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category string is neither `app` nor `game`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(Category::App),
            "game" => Ok(Category::Game),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// Metadata describing one downloadable package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub name: String,
    pub description: String,
    pub download_url: String,
    /// Size in bytes.
    pub file_size: u64,
    pub version: String,
    /// Display order; duplicates allowed.
    #[serde(default)]
    pub mod_features: Vec<String>,
    pub category: Category,
    /// Empty means "no icon".
    #[serde(default)]
    pub icon_url: String,
}

impl Listing {
    pub fn has_icon(&self) -> bool {
        !self.icon_url.is_empty()
    }

    /// The icon URL, or a generated avatar when the listing has none.
    pub fn icon_or_placeholder(&self) -> String {
        if self.has_icon() {
            self.icon_url.clone()
        } else {
            crate::display::placeholder_icon_url(&self.name)
        }
    }
}

/// A persisted listing together with its backend-assigned key.
///
/// Serialized as a two-element JSON array `[id, listing]`.
pub type ListingEntry = (ListingId, Listing);

/// Public profile of a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}

/// Caller role, assigned by a privileged caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Listing {
        Listing {
            name: "Pro Tool".into(),
            description: "A handy tool".into(),
            download_url: "https://example.com/pro.apk".into(),
            file_size: 5_242_880,
            version: "1.2.0".into(),
            mod_features: vec!["No Ads".into(), "Premium".into()],
            category: Category::App,
            icon_url: String::new(),
        }
    }

    #[test]
    fn listing_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["downloadUrl"], "https://example.com/pro.apk");
        assert_eq!(json["fileSize"], 5_242_880u64);
        assert_eq!(json["modFeatures"][1], "Premium");
        assert_eq!(json["category"], "app");
        assert_eq!(json["iconUrl"], "");
    }

    #[test]
    fn large_file_size_keeps_precision() {
        let json = r#"{"name":"Big","description":"","downloadUrl":"u","fileSize":9007199254740993,"version":"1","modFeatures":[],"category":"game","iconUrl":""}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.file_size, 9_007_199_254_740_993);
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"name":"A","description":"d","downloadUrl":"u","fileSize":1,"version":"1","category":"app"}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert!(listing.mod_features.is_empty());
        assert!(!listing.has_icon());
    }

    #[test]
    fn entry_serializes_as_pair() {
        let entry: ListingEntry = (ListingId::new("7"), sample());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json[0], "7");
        assert_eq!(json[1]["name"], "Pro Tool");
    }

    #[test]
    fn category_parse_and_display() {
        assert_eq!("game".parse::<Category>().unwrap(), Category::Game);
        assert_eq!("app".parse::<Category>().unwrap(), Category::App);
        assert!("Game".parse::<Category>().is_err());
        assert_eq!(Category::Game.to_string(), "game");
        assert_eq!(Category::App.label(), "App");
    }

    #[test]
    fn role_serialization() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        let role: UserRole = serde_json::from_str("\"guest\"").unwrap();
        assert_eq!(role, UserRole::Guest);
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }

    #[test]
    fn icon_placeholder_used_when_empty() {
        let mut listing = sample();
        assert!(
            listing
                .icon_or_placeholder()
                .starts_with("https://ui-avatars.com/api/?name=Pro%20Tool")
        );
        listing.icon_url = "https://cdn.example.com/i.png".into();
        assert_eq!(listing.icon_or_placeholder(), "https://cdn.example.com/i.png");
    }
}
