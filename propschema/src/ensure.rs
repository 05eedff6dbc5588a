//! Applying compiled validators and indexes to a database.
//!
//! The database itself is behind [`CollectionAdmin`]; a MongoDB client implements it with
//! `listCollections`, `create`, `collMod`, `dropIndexes` and `createIndexes`.

use serde_json::Value;

use crate::builder::IndexDescription;
use crate::errors::SchemaError;
use crate::model::Model;

/// Collection administration commands needed by [`ensure_validator`] and [`ensure_indexes`].
#[allow(async_fn_in_trait)]
pub trait CollectionAdmin {
    type Error: From<SchemaError>;

    async fn collection_exists(&mut self, collection: &str) -> Result<bool, Self::Error>;

    /// Create `collection` with `validator` attached.
    async fn create_collection(&mut self, collection: &str, validator: &Value) -> Result<(), Self::Error>;

    /// Validator currently attached to `collection`, if any.
    async fn collection_validator(&mut self, collection: &str) -> Result<Option<Value>, Self::Error>;

    async fn modify_validator(&mut self, collection: &str, validator: &Value) -> Result<(), Self::Error>;

    async fn drop_indexes(&mut self, collection: &str) -> Result<(), Self::Error>;

    async fn create_indexes(&mut self, collection: &str, indexes: &[IndexDescription]) -> Result<(), Self::Error>;
}

/// What [`ensure_validator`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorAction {
    /// The collection did not exist and was created with the validator.
    Created,
    /// The stored validator was missing or differed.
    Updated,
    Unchanged,
}

/// Make sure `collection` exists and carries exactly `validator`.
///
/// Stored and wanted validators are compared structurally, so key order does not matter.
pub async fn ensure_validator<A: CollectionAdmin>(
    admin: &mut A,
    collection: &str,
    validator: &Value,
) -> Result<ValidatorAction, A::Error> {
    if !admin.collection_exists(collection).await? {
        admin.create_collection(collection, validator).await?;
        log::info!("created collection {collection} with validator");
        return Ok(ValidatorAction::Created);
    }

    match admin.collection_validator(collection).await? {
        Some(current) if current == *validator => {
            log::debug!("validator for {collection} is up to date");
            Ok(ValidatorAction::Unchanged)
        }
        _ => {
            admin.modify_validator(collection, validator).await?;
            log::info!("updated validator for {collection}");
            Ok(ValidatorAction::Updated)
        }
    }
}

/// Create `indexes` on `collection`, dropping the existing ones first when asked.
pub async fn ensure_indexes<A: CollectionAdmin>(
    admin: &mut A,
    collection: &str,
    indexes: &[IndexDescription],
    drop_existing: bool,
) -> Result<(), A::Error> {
    if drop_existing {
        admin.drop_indexes(collection).await?;
        log::debug!("dropped indexes on {collection}");
    }
    // createIndexes rejects an empty list.
    if indexes.is_empty() {
        return Ok(());
    }
    admin.create_indexes(collection, indexes).await?;
    log::info!("ensured {} index(es) on {collection}", indexes.len());
    Ok(())
}

/// Apply a model's validator and indexes to `collection`.
pub async fn ensure_model<A: CollectionAdmin>(
    admin: &mut A,
    collection: &str,
    model: &Model,
    drop_existing_indexes: bool,
) -> Result<ValidatorAction, A::Error> {
    let validator = model.validator()?;
    let action = ensure_validator(admin, collection, &validator).await?;
    ensure_indexes(admin, collection, model.get_indexes(), drop_existing_indexes).await?;
    Ok(action)
}
