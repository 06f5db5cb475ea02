//! Collaborator boundaries: HTTP transport, notifications and permissions.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ServiceError;

/// Backend response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub data: Value,
}

// == HTTP Client ==
/// REST transport. Paths are relative to the backend's base URL.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ServiceError>;

    async fn get(&self, path: &str) -> Result<ApiResponse, ServiceError> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, ServiceError> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, ServiceError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<ApiResponse, ServiceError> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, ServiceError> {
        self.request(Method::DELETE, path, None).await
    }
}

// == Notifications ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Success,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Destructive => warn!("{}: {}", toast.title, toast.description),
            _ => info!("{}: {}", toast.title, toast.description),
        }
    }
}

// == Permissions ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

pub trait PermissionOracle: Send + Sync {
    fn can_access(&self, resource: &str, action: Action) -> bool;
}

/// Fixed grants per resource.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    allow_all: bool,
    grants: HashMap<String, HashSet<Action>>,
}

impl StaticPermissions {
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            grants: HashMap::new(),
        }
    }

    pub fn grant(mut self, resource: impl Into<String>, actions: &[Action]) -> Self {
        self.grants
            .entry(resource.into())
            .or_default()
            .extend(actions.iter().copied());
        self
    }
}

impl PermissionOracle for StaticPermissions {
    fn can_access(&self, resource: &str, action: Action) -> bool {
        self.allow_all
            || self
                .grants
                .get(resource)
                .is_some_and(|actions| actions.contains(&action))
    }
}
