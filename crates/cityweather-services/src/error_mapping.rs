//! Conversion of store errors into the application error hierarchy.

use cityweather_core::{AppError, DatabaseError, RusqliteErrorExt};

use crate::city_store::StoreError;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => AppError::Database(e.into_database_error()),
            StoreError::Corrupt(e) => AppError::Database(DatabaseError::Corruption(e.to_string())),
            StoreError::Serialize(e) => {
                AppError::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            other @ (StoreError::DuplicateCity(_) | StoreError::Task(_)) => {
                AppError::Service(other.to_string())
            }
        }
    }
}
