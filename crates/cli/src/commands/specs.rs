//! Print the compiled-in metafield specs.
//!
//! # Usage
//!
//! ```bash
//! prefs-cli specs
//! prefs-cli specs --json
//! ```

use preferences_core::{DEFAULT_SPECS, MetafieldAccess, MetafieldSpec};

/// Render one spec as a table row.
fn row(spec: &MetafieldSpec) -> String {
    format!(
        "{:<12} {:<10} {:<20} {:<26} {}",
        spec.key,
        spec.owner_type.as_str(),
        spec.namespace,
        spec.value_type.as_str(),
        spec.name
    )
}

/// Print every spec, in provisioning order.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
#[allow(clippy::print_stdout)]
pub fn print(json: bool) -> Result<(), serde_json::Error> {
    if json {
        let output = serde_json::json!({
            "specs": DEFAULT_SPECS,
            "access": MetafieldAccess::PREFERENCES,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{:<12} {:<10} {:<20} {:<26} NAME",
        "KEY", "OWNER", "NAMESPACE", "TYPE"
    );
    for spec in DEFAULT_SPECS {
        println!("{}", row(spec));
    }
    Ok(())
}
