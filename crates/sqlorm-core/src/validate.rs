//! Identifier validation shared by column, table and database descriptors.

use std::sync::LazyLock;

use regex::Regex;

/// Pattern every table, column, index and relation name must match.
pub const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_$]{0,63}$";

static IDENTIFIER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(IDENTIFIER_PATTERN));

/// Check that `name` is a plain SQL identifier.
pub fn is_identifier(name: &str) -> bool {
    match &*IDENTIFIER {
        Ok(regex) => regex.is_match(name),
        Err(e) => {
            tracing::warn!(error = %e, "Identifier pattern failed to compile");
            false
        }
    }
}
