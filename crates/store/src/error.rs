//! sqlx → [`StoreError`] mapping.

use aladil_auth::StoreError;

/// Map a sqlx failure to a [`StoreError`], naming the failing operation.
pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::backend(operation, db_err.message().to_string())
        }
        sqlx::Error::PoolClosed => StoreError::PoolClosed(operation),
        other => StoreError::backend(operation, other.to_string()),
    }
}
