//! Resource access seam.
//!
//! The diagnosis core only needs two read operations against the hub:
//! fetch one object and list objects of a type. `ResourceAccess` is the
//! trait the resolver and aggregator are handed at construction; the
//! production implementation lives in `kube_access`, and
//! `InMemoryResourceAccess` serves exported manifests and tests.

use super::accessor::ValueExt;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Error type for resource access operations.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Kubernetes API request failed: {0}")]
    Kube(#[from] kube::Error),

    #[error("Failed to infer Kubernetes config: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    #[error("Failed to read kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("{kind} {name:?} not found in namespace {namespace:?}")]
    NotFound {
        kind: String,
        name: String,
        namespace: String,
    },

    #[error("Failed to decode object: {0}")]
    Decode(String),
}

/// Group/version/kind coordinates of a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceType {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
}

impl ResourceType {
    /// `group/version`, or just `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Whether a raw object tree is an instance of this type.
    pub fn matches(&self, object: &Value) -> bool {
        object.nested_str(&["kind"]) == Some(self.kind)
            && object
                .nested_str(&["apiVersion"])
                .is_some_and(|v| v == self.api_version())
    }
}

/// ACM `Policy` (root and propagated copies share the type).
pub const POLICY: ResourceType = ResourceType {
    group: "policy.open-cluster-management.io",
    version: "v1",
    kind: "Policy",
    plural: "policies",
};

/// Read-only access to hub objects as untyped trees.
#[async_trait]
pub trait ResourceAccess: Send + Sync {
    /// Fetch a single object by name in a namespace.
    async fn get(
        &self,
        resource: &ResourceType,
        name: &str,
        namespace: &str,
    ) -> Result<Value, AccessError>;

    /// List objects in a namespace, or across all namespaces when `None`.
    async fn list(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
    ) -> Result<Vec<Value>, AccessError>;
}

/// `ResourceAccess` over a fixed set of objects.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceAccess {
    objects: Vec<Value>,
}

impl InMemoryResourceAccess {
    pub fn new(objects: Vec<Value>) -> Self {
        let mut access = Self::default();
        for object in objects {
            access.insert(object);
        }
        access
    }

    /// Add an object; `*List` wrappers are flattened into their items.
    pub fn insert(&mut self, object: Value) {
        let is_list = object
            .nested_str(&["kind"])
            .is_some_and(|k| k.ends_with("List"));
        match object {
            Value::Object(mut map) if is_list => {
                if let Some(Value::Array(items)) = map.remove("items") {
                    for item in items {
                        self.insert(item);
                    }
                }
            }
            Value::Object(_) => self.objects.push(object),
            _ => {}
        }
    }

    /// Load every document of a YAML (or JSON) file.
    pub fn load_file(&mut self, path: &Path) -> crate::error::Result<()> {
        let content = std::fs::read_to_string(path)?;
        for document in serde_yaml::Deserializer::from_str(&content) {
            let value = Value::deserialize(document)?;
            if !value.is_null() {
                self.insert(value);
            }
        }
        Ok(())
    }

    /// Build from a list of manifest files.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> crate::error::Result<Self> {
        let mut access = Self::default();
        for path in paths {
            access.load_file(path.as_ref())?;
            log::debug!("Loaded objects from {}", path.as_ref().display());
        }
        Ok(access)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ResourceAccess for InMemoryResourceAccess {
    async fn get(
        &self,
        resource: &ResourceType,
        name: &str,
        namespace: &str,
    ) -> Result<Value, AccessError> {
        self.objects
            .iter()
            .find(|o| {
                resource.matches(o) && o.object_name() == name && o.object_namespace() == namespace
            })
            .cloned()
            .ok_or_else(|| AccessError::NotFound {
                kind: resource.kind.to_string(),
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }

    async fn list(
        &self,
        resource: &ResourceType,
        namespace: Option<&str>,
    ) -> Result<Vec<Value>, AccessError> {
        Ok(self
            .objects
            .iter()
            .filter(|o| resource.matches(o))
            .filter(|o| namespace.is_none_or(|ns| o.object_namespace() == ns))
            .cloned()
            .collect())
    }
}
