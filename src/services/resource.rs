//! Per-domain CRUD service over the REST backend.
//!
//! Reads go through the shared cache; writes invalidate every cached key
//! of the resource and report the outcome through the notifier.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::{KeyPattern, SharedCache};
use crate::error::ServiceError;
use crate::services::{Action, HttpClient, Notifier, PermissionOracle, Toast};

/// Shared collaborators every service is built from.
#[derive(Clone)]
pub struct ServiceContext {
    pub http: Arc<dyn HttpClient>,
    pub cache: SharedCache<Value>,
    pub notifier: Arc<dyn Notifier>,
    pub permissions: Arc<dyn PermissionOracle>,
}

#[derive(Clone)]
pub struct ResourceService {
    resource: String,
    label: String,
    ctx: ServiceContext,
}

impl ResourceService {
    /// `resource` is both the REST path segment and the cache key prefix;
    /// `label` is the singular name used in notifications.
    pub fn new(resource: impl Into<String>, label: impl Into<String>, ctx: ServiceContext) -> Self {
        Self {
            resource: resource.into(),
            label: label.into(),
            ctx,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    fn list_key(&self) -> String {
        format!("{}:list", self.resource)
    }

    fn item_key(&self, id: &str) -> String {
        format!("{}:{}", self.resource, id)
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.resource, id)
    }

    fn authorize(&self, action: Action) -> Result<(), ServiceError> {
        if self.ctx.permissions.can_access(&self.resource, action) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied {
                resource: self.resource.clone(),
                action: action.as_str().to_string(),
            })
        }
    }

    // == Reads ==
    /// Every record of the resource. A non-array payload is looked up under
    /// `items`, else treated as empty.
    pub async fn list(&self) -> Result<Vec<Value>, ServiceError> {
        self.authorize(Action::Read)?;
        let path = self.resource.clone();
        let data = self
            .ctx
            .cache
            .get_or_set(
                &self.list_key(),
                || async { self.ctx.http.get(&path).await.map(|r| r.data) },
                None,
            )
            .await?;

        Ok(match data {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        })
    }

    pub async fn fetch(&self, id: &str) -> Result<Value, ServiceError> {
        self.authorize(Action::Read)?;
        let path = self.item_path(id);
        self.ctx
            .cache
            .get_or_set(
                &self.item_key(id),
                || async { self.ctx.http.get(&path).await.map(|r| r.data) },
                None,
            )
            .await
    }

    // == Writes ==
    pub async fn create(&self, body: &Value) -> Result<Value, ServiceError> {
        self.authorize(Action::Create)?;
        let result = self.ctx.http.post(&self.resource, body).await;
        self.finish_write(result.map(|r| r.data), "created").await
    }

    pub async fn update(&self, id: &str, body: &Value) -> Result<Value, ServiceError> {
        self.authorize(Action::Update)?;
        let result = self.ctx.http.put(&self.item_path(id), body).await;
        self.finish_write(result.map(|r| r.data), "updated").await
    }

    /// Partial update.
    pub async fn patch(&self, id: &str, body: &Value) -> Result<Value, ServiceError> {
        self.authorize(Action::Update)?;
        let result = self.ctx.http.patch(&self.item_path(id), body).await;
        self.finish_write(result.map(|r| r.data), "updated").await
    }

    pub async fn remove(&self, id: &str) -> Result<(), ServiceError> {
        self.authorize(Action::Delete)?;
        let result = self.ctx.http.delete(&self.item_path(id)).await;
        self.finish_write(result.map(|r| r.data), "deleted")
            .await
            .map(|_| ())
    }

    async fn finish_write(
        &self,
        result: Result<Value, ServiceError>,
        verb: &str,
    ) -> Result<Value, ServiceError> {
        match result {
            Ok(data) => {
                let dropped = self.invalidate().await;
                debug!("{} {}, {} cache keys invalidated", self.label, verb, dropped);
                self.ctx.notifier.notify(Toast::success(
                    "Success",
                    format!("{} {} successfully", self.label, verb),
                ));
                Ok(data)
            }
            Err(err) => {
                self.ctx.notifier.notify(Toast::error(
                    "Error",
                    format!("{} could not be {}: {}", self.label, verb, err),
                ));
                Err(err)
            }
        }
    }

    /// Drops every cached key under this resource's prefix.
    pub async fn invalidate(&self) -> usize {
        let prefix = format!("^{}:", regex::escape(&self.resource));
        match KeyPattern::regex(&prefix) {
            Ok(pattern) => self.ctx.cache.invalidate_pattern(pattern).await,
            Err(_) => 0,
        }
    }
}
