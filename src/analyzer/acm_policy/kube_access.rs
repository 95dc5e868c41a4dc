//! Kubernetes-backed resource access for the hub cluster.
//!
//! Policies are custom resources, so objects are fetched as
//! `DynamicObject`s and handed to the diagnosis core as plain JSON.

use super::access::{AccessError, ResourceAccess, ResourceType};
use async_trait::async_trait;
use kube::{
    Client, Config,
    api::{Api, ApiResource, DynamicObject, ListParams},
};
use serde_json::Value;

/// Hub cluster client.
pub struct KubeResourceAccess {
    client: Client,
}

impl KubeResourceAccess {
    /// Create a client using the default kubeconfig or in-cluster config.
    pub async fn new() -> Result<Self, AccessError> {
        install_crypto_provider();
        let config = Config::infer().await?;
        let client = Client::try_from(config)?;
        Ok(Self { client })
    }

    /// Create a client for a specific kubeconfig context.
    pub async fn with_context(context: &str) -> Result<Self, AccessError> {
        install_crypto_provider();
        let kubeconfig = kube::config::Kubeconfig::read()?;
        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &kube::config::KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            },
        )
        .await?;
        let client = Client::try_from(config)?;
        Ok(Self { client })
    }

    fn api_resource(resource: &ResourceType) -> ApiResource {
        ApiResource {
            group: resource.group.to_string(),
            version: resource.version.to_string(),
            api_version: resource.api_version(),
            kind: resource.kind.to_string(),
            plural: resource.plural.to_string(),
        }
    }
}

// Required for TLS connections to the K8s API
fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn to_tree(object: DynamicObject) -> Result<Value, AccessError> {
    serde_json::to_value(object).map_err(|e| AccessError::Decode(e.to_string()))
}

#[async_trait]
impl ResourceAccess for KubeResourceAccess {
    async fn get(
        &self,
        resource: &ResourceType,
        name: &str,
        namespace: &str,
    ) -> Result<Value, AccessError> {
        let ar = Self::api_resource(resource);
        let api: Api<DynamicObject> = if namespace.is_empty() {
            Api::all_with(self.client.clone(), &ar)
        } else {
            Api::namespaced_with(self.client.clone(), namespace, &ar)
        };
        let object = api.get(name).await?;
        to_tree(object)
    }

    async fn list(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
    ) -> Result<Vec<Value>, AccessError> {
        let ar = Self::api_resource(resource);
        let api: Api<DynamicObject> = match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        };
        let list = api.list(&ListParams::default()).await?;

        list.items
            .into_iter()
            .map(|mut object| {
                // List items come back without apiVersion/kind
                if object.types.is_none() {
                    object.types = Some(kube::core::TypeMeta {
                        api_version: resource.api_version(),
                        kind: resource.kind.to_string(),
                    });
                }
                to_tree(object)
            })
            .collect()
    }
}
