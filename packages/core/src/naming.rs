//! Name-defaulting helpers shared by the catalog and session layers.

/// Normalizes an empty database name to `"default"`, leaving any other name
/// untouched.
#[must_use]
pub fn default_database_name(database_name: &str) -> String {
    if database_name.is_empty() {
        "default".to_string()
    } else {
        database_name.to_string()
    }
}
