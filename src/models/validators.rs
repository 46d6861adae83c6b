use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use validator::ValidationError;

/// Regex for validating URL-friendly keys (lowercase alphanumeric with hyphens).
/// Examples: "default-organization", "acme", "team-42"
pub static KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// Name of the virtual group containing every authenticated user.
pub const ANYONE: &str = "Anyone";

/// Whether `name` denotes the virtual "Anyone" group, ignoring case.
pub fn is_anyone(name: &str) -> bool {
    name.eq_ignore_ascii_case(ANYONE)
}

/// Reject the reserved group name, whatever its case.
pub fn validate_not_anyone(name: &str) -> Result<(), ValidationError> {
    if is_anyone(name) {
        let mut err = ValidationError::new("reserved_name");
        err.message = Some(Cow::Owned(format!(
            "Name '{}' is reserved (regardless of case)",
            name
        )));
        return Err(err);
    }
    Ok(())
}
