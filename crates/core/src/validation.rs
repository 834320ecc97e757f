//! Required-field checks shared by the repositories.

use crate::error::CoreError;

/// Collect every missing field into a single validation error.
///
/// ```
/// use folio_core::validation::require_all;
///
/// assert!(require_all(&[("username", Some("alice")), ("email", Some("a@x.com"))]).is_ok());
/// let err = require_all(&[("username", None), ("email", Some(" "))]).unwrap_err();
/// assert!(err.to_string().contains("username, email"));
/// ```
pub fn require_all(fields: &[(&'static str, Option<&str>)]) -> Result<(), CoreError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn complete_input_passes() {
        assert!(require_all(&[("title", Some("Dune")), ("author", Some("Herbert"))]).is_ok());
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        assert_matches!(require_all(&[("title", None)]), Err(CoreError::Validation(_)));
        assert_matches!(require_all(&[("title", Some(""))]), Err(CoreError::Validation(_)));
        assert_matches!(require_all(&[("title", Some("   "))]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn require_all_names_only_the_missing_fields() {
        let err = require_all(&[("username", Some("")), ("comment", Some("text"))]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("username"));
        assert!(!msg.contains("comment"));
    }
}
