//! Startup precondition checks on the target database's property schema.

use thiserror::Error;

use crate::config::Config;
use crate::notion::{DatabaseSchema, NotionApi};

/// Ways the database schema can be unusable for the completion sync.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Database does not have the required field '{field}'")]
    MissingDateField { field: String },

    #[error("Database field '{field}' is of type '{found}', expected a date")]
    DateFieldNotDate { field: String, found: String },

    #[error("Database does not have a '{field}' column")]
    MissingStatusField { field: String },

    #[error("Database field '{field}' is of type '{found}', expected a select")]
    StatusFieldNotSelect { field: String, found: String },

    #[error("Database column '{field}' is missing options {missing:?} (available: {available:?})")]
    MissingStatusOptions {
        field: String,
        missing: Vec<String>,
        available: Vec<String>,
    },
}

/// Check that `schema` has a date property named `datetime_field` and a
/// select property named `status_column` offering every value in
/// `complete_selects`.
pub fn check_schema(
    schema: &DatabaseSchema,
    datetime_field: &str,
    status_column: &str,
    complete_selects: &[String],
) -> Result<(), SchemaError> {
    let Some(date) = schema.properties.get(datetime_field) else {
        return Err(SchemaError::MissingDateField {
            field: datetime_field.to_string(),
        });
    };
    if date.kind != "date" {
        return Err(SchemaError::DateFieldNotDate {
            field: datetime_field.to_string(),
            found: date.kind.clone(),
        });
    }

    let Some(status) = schema.properties.get(status_column) else {
        return Err(SchemaError::MissingStatusField {
            field: status_column.to_string(),
        });
    };
    if status.kind != "select" {
        return Err(SchemaError::StatusFieldNotSelect {
            field: status_column.to_string(),
            found: status.kind.clone(),
        });
    }

    let available = status.option_names();
    let missing: Vec<String> = complete_selects
        .iter()
        .filter(|value| !available.contains(&value.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingStatusOptions {
            field: status_column.to_string(),
            missing,
            available: available.into_iter().map(str::to_string).collect(),
        });
    }

    Ok(())
}

/// Fetch the database schema once and verify it against `config`.
///
/// A 404 surfaces as [`crate::notion::NotionError::DatabaseNotFound`], whose
/// message tells the user to share the database with the integration.
pub async fn validate_database(api: &dyn NotionApi, config: &Config) -> anyhow::Result<()> {
    let schema = api.get_database(&config.database_id).await?;
    check_schema(
        &schema,
        &config.datetime_field,
        &config.status_column,
        &config.complete_selects,
    )?;
    tracing::info!(
        database_id = %config.database_id,
        "Database has '{}' (date) and '{}' (select) with options {:?}",
        config.datetime_field,
        config.status_column,
        config.complete_selects
    );
    Ok(())
}
