//! GUID helpers
//!
//! Atlan distinguishes client-side placeholder GUIDs (any string, conventionally
//! a negative number such as `-8271`) from server-issued GUIDs, which are always
//! UUID-shaped. Only the string shape is inspected.

use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

fn uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
        )
        .expect("static UUID pattern is valid")
    })
}

/// True when the value has the shape of a server-issued GUID
pub fn is_resolved_guid(value: &str) -> bool {
    uuid_pattern().is_match(value)
}

/// Generate a placeholder GUID for an asset that has not been created yet
pub fn placeholder_guid() -> String {
    let n: u64 = rand::thread_rng().gen_range(1..10_000_000_000);
    format!("-{}", n)
}
