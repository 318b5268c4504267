//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use std::cell::RefCell;

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Bare `$VAR` syntax is only expanded alongside a braced reference; a
/// string without `${` is returned unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let unset = RefCell::new(Vec::new());
    let expanded = shellexpand::env_with_context_no_errors(value, |var| {
        let found = std::env::var(var).ok();
        if found.is_none() {
            unset.borrow_mut().push(var.to_owned());
        }
        found
    });

    // Unset variables without a default are left in place by the expander
    for var in unset.into_inner() {
        let reference = format!("${{{var}}}");
        if expanded.contains(&reference) {
            return Err(ConfigError::EnvVar {
                field: field.to_owned(),
                message: format!("{reference} not set"),
            });
        }
    }

    Ok(expanded.into_owned())
}
