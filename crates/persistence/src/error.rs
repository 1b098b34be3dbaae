//! Mapping of database errors into domain errors.

use domain::DomainError;

/// Unique constraint guarding opportunity titles.
pub const TITLE_UNIQUE_CONSTRAINT: &str = "opportunity_title_key";

/// Converts a `sqlx` error raised by `operation` into a [`DomainError`].
///
/// A title uniqueness violation becomes a validation error; everything else
/// is logged and surfaced as a storage failure.
pub fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> DomainError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.constraint() == Some(TITLE_UNIQUE_CONSTRAINT) {
            return DomainError::Validation(
                "Opportunity with the specified name already exists".to_string(),
            );
        }
    }
    tracing::error!(operation, error = %err, "Database operation failed");
    DomainError::Storage(format!("{operation} failed"))
}

/// Shorthand for `map_err(|e| map_sqlx_error(op, e))`.
pub fn storage(operation: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |err| map_sqlx_error(operation, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_is_storage() {
        let err = map_sqlx_error("find_opportunity", sqlx::Error::RowNotFound);
        match err {
            DomainError::Storage(msg) => assert_eq!(msg, "find_opportunity failed"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_storage_closure() {
        let err = storage("ping")(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
