//! Provider instance and request dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use storagegrid_client::{MinioConnector, S3Connector, StorageGridClient};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::data_source::{
    BucketDataSource, BucketLifecycleDataSource, BucketObjectLockDataSource,
    BucketVersioningDataSource, ErasedDataSource, GroupDataSource, UserDataSource,
};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::protocol::{Request, ResourceSchema, Response, Schema};
use crate::resource::{
    BucketLifecycleResource, BucketObjectLockResource, BucketResource, BucketVersioningResource,
    ErasedResource, GroupResource, ReadOutcome, S3AccessKeyResource, UserResource,
};
use crate::{TRACING_TARGET_DATA_SOURCE, TRACING_TARGET_PROVIDER};

/// StorageGRID provider.
///
/// Holds the environment defaults, the registered resource and data source
/// types, and the client built by the last successful `configure`.
pub struct Provider {
    defaults: ProviderConfig,
    connector: Arc<dyn S3Connector>,
    client: RwLock<Option<StorageGridClient>>,
    resources: BTreeMap<&'static str, Box<dyn ErasedResource>>,
    data_sources: BTreeMap<&'static str, Box<dyn ErasedDataSource>>,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("defaults", &self.defaults)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Provider {
    /// Creates a provider with every resource and data source registered.
    ///
    /// `defaults` fill in any value the host configuration leaves out.
    pub fn new(defaults: ProviderConfig) -> Self {
        let mut provider = Self {
            defaults,
            connector: Arc::new(MinioConnector),
            client: RwLock::new(None),
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
        };

        provider.register_resource(GroupResource);
        provider.register_resource(UserResource);
        provider.register_resource(S3AccessKeyResource);
        provider.register_resource(BucketResource);
        provider.register_resource(BucketVersioningResource);
        provider.register_resource(BucketObjectLockResource);
        provider.register_resource(BucketLifecycleResource);

        provider.register_data_source(GroupDataSource);
        provider.register_data_source(UserDataSource);
        provider.register_data_source(BucketDataSource);
        provider.register_data_source(BucketVersioningDataSource);
        provider.register_data_source(BucketObjectLockDataSource);
        provider.register_data_source(BucketLifecycleDataSource);
        provider
    }

    /// Uses `connector` for the S3 clients of subsequently built API clients.
    pub fn with_s3_connector(mut self, connector: Arc<dyn S3Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Installs an already connected client.
    pub async fn with_client(self, client: StorageGridClient) -> Self {
        *self.client.write().await = Some(client);
        self
    }

    fn register_resource(&mut self, resource: impl ErasedResource + 'static) {
        self.resources.insert(resource.type_name(), Box::new(resource));
    }

    fn register_data_source(&mut self, data_source: impl ErasedDataSource + 'static) {
        self.data_sources
            .insert(data_source.type_name(), Box::new(data_source));
    }

    /// Lists the registered types.
    pub fn schema(&self) -> Schema {
        Schema {
            resources: self
                .resources
                .values()
                .map(|resource| ResourceSchema {
                    type_name: resource.type_name().to_owned(),
                    requires_replace: resource
                        .requires_replace()
                        .iter()
                        .map(|attribute| (*attribute).to_owned())
                        .collect(),
                })
                .collect(),
            data_sources: self.data_sources.keys().map(|name| (*name).to_owned()).collect(),
        }
    }

    /// Builds the API client from the merged configuration.
    ///
    /// A previously configured client is cleaned up once the new one is in
    /// place. On failure the previous client is kept.
    #[instrument(skip_all, target = TRACING_TARGET_PROVIDER)]
    pub async fn configure(&self, config: ProviderConfig) -> Diagnostics {
        let config = match self.defaults.clone().merge(config).into_client_config() {
            Ok(config) => config,
            Err(diagnostics) => return diagnostics,
        };

        let client = match StorageGridClient::connect_with(config, self.connector.clone()).await {
            Ok(client) => client,
            Err(e) => {
                warn!(target: TRACING_TARGET_PROVIDER, error = %e, "Provider configuration failed");
                return Diagnostic::error(
                    "Unable to Create StorageGrid API Client",
                    format!(
                        "An unexpected error occurred when creating the StorageGrid API client: {e}"
                    ),
                )
                .into();
            }
        };

        let previous = self.client.write().await.replace(client);
        if let Some(previous) = previous {
            previous.cleanup().await;
        }

        info!(target: TRACING_TARGET_PROVIDER, "Provider configured");
        Diagnostics::new()
    }

    /// Revokes the temporary S3 credential of the current client.
    pub async fn cleanup(&self) {
        if let Some(client) = self.client.read().await.as_ref() {
            client.cleanup().await;
        }
    }

    /// Answers one host request.
    #[instrument(
        skip_all,
        target = TRACING_TARGET_PROVIDER,
        fields(operation = request.operation(), type_name = request.type_name())
    )]
    pub async fn handle(&self, request: Request) -> Response {
        debug!(target: TRACING_TARGET_PROVIDER, "Handling request");

        match request {
            Request::GetSchema => Response {
                schema: Some(self.schema()),
                ..Default::default()
            },
            Request::Configure { config } => Response::diagnostics(self.configure(config).await),
            Request::PlanResource {
                type_name,
                proposed,
                prior_state,
            } => {
                let resource = match self.resource(&type_name) {
                    Ok(resource) => resource,
                    Err(diagnostics) => return Response::diagnostics(diagnostics),
                };
                match resource.plan(proposed, prior_state) {
                    Ok((planned, requires_replace)) => Response {
                        state: Some(planned),
                        requires_replace,
                        ..Default::default()
                    },
                    Err(diagnostics) => Response::diagnostics(diagnostics),
                }
            }
            Request::CreateResource { type_name, planned } => {
                self.with_resource(&type_name, |resource, client| async move {
                    let state = resource.create(&client, planned).await?;
                    Ok::<_, Diagnostics>(Response::state(state, Diagnostics::new()))
                })
                .await
            }
            Request::ReadResource { type_name, state } => {
                self.with_resource(&type_name, |resource, client| async move {
                    match resource.read(&client, state).await? {
                        ReadOutcome::Found(state) => {
                            Ok::<_, Diagnostics>(Response::state(state, Diagnostics::new()))
                        }
                        ReadOutcome::Removed(warnings) => Ok(Response::removed(warnings)),
                    }
                })
                .await
            }
            Request::UpdateResource {
                type_name,
                planned,
                prior_state,
            } => {
                self.with_resource(&type_name, |resource, client| async move {
                    let state = resource.update(&client, planned, prior_state).await?;
                    Ok::<_, Diagnostics>(Response::state(state, Diagnostics::new()))
                })
                .await
            }
            Request::DeleteResource { type_name, state } => {
                self.with_resource(&type_name, |resource, client| async move {
                    let warnings = resource.delete(&client, state).await?;
                    Ok::<_, Diagnostics>(Response::diagnostics(warnings))
                })
                .await
            }
            Request::ImportResource { type_name, id } => {
                self.with_resource(&type_name, |resource, client| async move {
                    let state = resource.import(&client, &id).await?;
                    Ok::<_, Diagnostics>(Response::state(state, Diagnostics::new()))
                })
                .await
            }
            Request::ReadDataSource { type_name, config } => {
                self.read_data_source(&type_name, config).await
            }
        }
    }

    fn resource(&self, type_name: &str) -> Result<&dyn ErasedResource, Diagnostics> {
        self.resources
            .get(type_name)
            .map(|resource| resource.as_ref())
            .ok_or_else(|| unknown_type("resource", type_name))
    }

    async fn client(&self) -> Result<StorageGridClient, Diagnostics> {
        self.client.read().await.clone().ok_or_else(|| {
            Diagnostic::error(
                "Unconfigured Provider",
                "The provider must be configured before resources or data sources are used.",
            )
            .into()
        })
    }

    /// Resolves the resource and client, then runs `operation`.
    async fn with_resource<'a, F, Fut>(&'a self, type_name: &str, operation: F) -> Response
    where
        F: FnOnce(&'a dyn ErasedResource, StorageGridClient) -> Fut,
        Fut: Future<Output = Result<Response, Diagnostics>>,
    {
        let resource = match self.resource(type_name) {
            Ok(resource) => resource,
            Err(diagnostics) => return Response::diagnostics(diagnostics),
        };
        let client = match self.client().await {
            Ok(client) => client,
            Err(diagnostics) => return Response::diagnostics(diagnostics),
        };

        operation(resource, client)
            .await
            .unwrap_or_else(Response::diagnostics)
    }

    async fn read_data_source(&self, type_name: &str, config: Value) -> Response {
        let Some(data_source) = self.data_sources.get(type_name) else {
            return Response::diagnostics(unknown_type("data source", type_name));
        };
        let client = match self.client().await {
            Ok(client) => client,
            Err(diagnostics) => return Response::diagnostics(diagnostics),
        };

        match data_source.read(&client, config).await {
            Ok(state) => Response::state(state, Diagnostics::new()),
            Err(diagnostics) => {
                debug!(
                    target: TRACING_TARGET_DATA_SOURCE,
                    type_name = %type_name,
                    "Data source read failed"
                );
                Response::diagnostics(diagnostics)
            }
        }
    }
}

fn unknown_type(kind: &str, type_name: &str) -> Diagnostics {
    Diagnostic::error(
        "Unknown Resource Type",
        format!("The provider does not implement a {kind} named '{type_name}'."),
    )
    .into()
}
