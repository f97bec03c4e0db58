//! Required-field checks shared by the request types.

use crate::error::{SmResult, SystemModelError};

/// Fail if a required string field is empty.
pub(crate) fn require(value: &str, field: &str) -> SmResult<()> {
    if value.is_empty() {
        return Err(SystemModelError::invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Fail if the caller tried to choose an identifier the system assigns.
pub(crate) fn reject_supplied(value: &str, field: &str) -> SmResult<()> {
    if !value.is_empty() {
        return Err(SystemModelError::invalid(format!(
            "{field} must be empty, it is generated by the system model"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_empty() {
        assert!(require("", "name").is_err());
        assert!(require("x", "name").is_ok());
    }

    #[test]
    fn reject_supplied_accepts_only_empty() {
        assert!(reject_supplied("", "node_id").is_ok());
        let err = reject_supplied("n-1", "node_id").unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }
}
