fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use apkstore_protocol::{
        Category, Listing, ListingEntry, UserProfile, UserRole, format_file_size,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture, re-serializes it, and compares the JSON values.
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  rust:    {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_listing() {
        let listing: Listing = roundtrip_test("listing.json");
        assert_eq!(listing.category, Category::Game);
        assert_eq!(listing.file_size, 79_167_488);
        assert_eq!(format_file_size(listing.file_size), "75.5 MB");
        assert_eq!(listing.mod_features.len(), 3);
        assert!(listing.has_icon());
    }

    #[test]
    fn fixture_listing_entries() {
        let entries: Vec<ListingEntry> = roundtrip_test("listing_entries.json");
        assert_eq!(entries.len(), 2);

        let (id, tool) = &entries[0];
        assert_eq!(id.as_str(), "1");
        assert_eq!(tool.category, Category::App);
        assert!(!tool.has_icon());
        assert!(
            tool.icon_or_placeholder()
                .starts_with("https://ui-avatars.com/api/?name=Pro%20Tool")
        );

        let (_, game) = &entries[1];
        assert_eq!(game.mod_features, ["No ads", "No ads"]);
        assert_eq!(format_file_size(game.file_size), "1.5 GB");
    }

    #[test]
    fn fixture_user_profile() {
        let profile: UserProfile = roundtrip_test("user_profile.json");
        assert_eq!(profile.name, "Alice");
    }

    #[test]
    fn fixture_user_roles() {
        let roles: Vec<UserRole> = roundtrip_test("user_roles.json");
        assert_eq!(roles, [UserRole::Admin, UserRole::User, UserRole::Guest]);
    }

    #[test]
    fn listing_field_names_are_camel_case() {
        let fixture = load_fixture("listing.json");
        let keys: Vec<&str> = fixture
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        for key in ["downloadUrl", "fileSize", "modFeatures", "iconUrl"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }

    #[test]
    fn listing_without_optional_fields() {
        let json = serde_json::json!({
            "name": "Bare",
            "description": "d",
            "downloadUrl": "https://example.com/bare.apk",
            "fileSize": 1,
            "version": "1",
            "category": "app"
        });
        let listing: Listing = serde_json::from_value(json).unwrap();
        assert!(listing.mod_features.is_empty());
        assert!(listing.icon_url.is_empty());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut json = load_fixture("listing.json");
        json["category"] = serde_json::json!("Game");
        assert!(serde_json::from_value::<Listing>(json).is_err());
    }
}
