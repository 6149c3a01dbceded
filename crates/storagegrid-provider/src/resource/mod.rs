//! Managed resources.
//!
//! Each resource implements [`Resource`] over its own typed model. The
//! provider stores them behind [`ErasedResource`], which converts between the
//! typed model and the JSON attribute objects the host exchanges.

mod access_key;
mod bucket;
mod bucket_lifecycle;
mod bucket_object_lock;
mod bucket_versioning;
mod group;
mod user;

pub use access_key::{S3AccessKeyModel, S3AccessKeyResource};
use async_trait::async_trait;
pub use bucket::{BucketModel, BucketResource};
pub use bucket_lifecycle::{BucketLifecycleModel, BucketLifecycleResource};
pub use bucket_object_lock::{BucketObjectLockModel, BucketObjectLockResource};
pub use bucket_versioning::{BucketVersioningModel, BucketVersioningResource};
pub use group::{GroupModel, GroupResource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use storagegrid_client::StorageGridClient;
pub use user::{UserModel, UserResource};

use crate::diagnostics::{Diagnostic, Diagnostics};

/// Result of a resource operation. Errors are reported as diagnostics.
pub type ResourceResult<T> = Result<T, Diagnostics>;

/// Outcome of refreshing a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    /// The object exists; its refreshed state.
    Found(T),
    /// The object is gone and must be dropped from state.
    Removed(Diagnostics),
}

/// A resource type managed through the StorageGRID API.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Attribute model exchanged with the host.
    type Model: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Type name, e.g. `storagegrid_s3_bucket`.
    fn type_name(&self) -> &'static str;

    /// Attributes whose change forces the object to be replaced.
    fn requires_replace(&self) -> &'static [&'static str] {
        &[]
    }

    /// Adjusts the proposed model before it is shown to the user.
    fn plan(
        &self,
        proposed: Self::Model,
        _prior: Option<&Self::Model>,
    ) -> ResourceResult<Self::Model> {
        Ok(proposed)
    }

    async fn create(
        &self,
        client: &StorageGridClient,
        planned: Self::Model,
    ) -> ResourceResult<Self::Model>;

    async fn read(
        &self,
        client: &StorageGridClient,
        state: Self::Model,
    ) -> ResourceResult<ReadOutcome<Self::Model>>;

    async fn update(
        &self,
        client: &StorageGridClient,
        planned: Self::Model,
        prior: Self::Model,
    ) -> ResourceResult<Self::Model>;

    /// Deletes the object. Returned diagnostics are warnings.
    async fn delete(
        &self,
        client: &StorageGridClient,
        state: Self::Model,
    ) -> ResourceResult<Diagnostics>;

    /// Builds the full state of an existing object from its import id.
    async fn import(&self, client: &StorageGridClient, id: &str) -> ResourceResult<Self::Model>;
}

/// Type-erased [`Resource`] working on JSON attribute objects.
#[async_trait]
pub trait ErasedResource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn requires_replace(&self) -> &'static [&'static str];

    /// Returns the planned state and the replacement-forcing attributes that changed.
    fn plan(&self, proposed: Value, prior: Option<Value>) -> ResourceResult<(Value, Vec<String>)>;

    async fn create(&self, client: &StorageGridClient, planned: Value) -> ResourceResult<Value>;

    async fn read(
        &self,
        client: &StorageGridClient,
        state: Value,
    ) -> ResourceResult<ReadOutcome<Value>>;

    async fn update(
        &self,
        client: &StorageGridClient,
        planned: Value,
        prior: Value,
    ) -> ResourceResult<Value>;

    async fn delete(&self, client: &StorageGridClient, state: Value)
    -> ResourceResult<Diagnostics>;

    async fn import(&self, client: &StorageGridClient, id: &str) -> ResourceResult<Value>;
}

#[async_trait]
impl<R: Resource> ErasedResource for R {
    fn type_name(&self) -> &'static str {
        Resource::type_name(self)
    }

    fn requires_replace(&self) -> &'static [&'static str] {
        Resource::requires_replace(self)
    }

    fn plan(&self, proposed: Value, prior: Option<Value>) -> ResourceResult<(Value, Vec<String>)> {
        let prior_model = prior.clone().map(decode::<R::Model>).transpose()?;
        let planned = encode(Resource::plan(self, decode(proposed)?, prior_model.as_ref())?)?;

        let replace = match &prior {
            Some(prior) => Resource::requires_replace(self)
                .iter()
                .filter(|attribute| planned.get(**attribute) != prior.get(**attribute))
                .map(|attribute| (*attribute).to_owned())
                .collect(),
            None => Vec::new(),
        };
        Ok((planned, replace))
    }

    async fn create(&self, client: &StorageGridClient, planned: Value) -> ResourceResult<Value> {
        encode(Resource::create(self, client, decode(planned)?).await?)
    }

    async fn read(
        &self,
        client: &StorageGridClient,
        state: Value,
    ) -> ResourceResult<ReadOutcome<Value>> {
        match Resource::read(self, client, decode(state)?).await? {
            ReadOutcome::Found(model) => Ok(ReadOutcome::Found(encode(model)?)),
            ReadOutcome::Removed(warnings) => Ok(ReadOutcome::Removed(warnings)),
        }
    }

    async fn update(
        &self,
        client: &StorageGridClient,
        planned: Value,
        prior: Value,
    ) -> ResourceResult<Value> {
        let model = Resource::update(self, client, decode(planned)?, decode(prior)?).await?;
        encode(model)
    }

    async fn delete(
        &self,
        client: &StorageGridClient,
        state: Value,
    ) -> ResourceResult<Diagnostics> {
        Resource::delete(self, client, decode(state)?).await
    }

    async fn import(&self, client: &StorageGridClient, id: &str) -> ResourceResult<Value> {
        encode(Resource::import(self, client, id).await?)
    }
}

/// Decodes a host attribute object into a typed model.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> ResourceResult<T> {
    serde_json::from_value(value).map_err(|e| {
        Diagnostic::error(
            "Invalid Attribute Values",
            format!("The attribute values could not be decoded: {e}"),
        )
        .into()
    })
}

/// Encodes a typed model into a host attribute object.
pub(crate) fn encode<T: Serialize>(model: T) -> ResourceResult<Value> {
    serde_json::to_value(model).map_err(|e| {
        Diagnostic::error(
            "Invalid Resource State",
            format!("The resource state could not be encoded: {e}"),
        )
        .into()
    })
}
