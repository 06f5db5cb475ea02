//! Analytics reads, decoded into typed reports.

use serde_json::Value;
use tracing::warn;

use crate::domain::{AnalyticsCategory, AnalyticsReport};
use crate::error::ServiceError;
use crate::services::{Action, ServiceContext};

const RESOURCE: &str = "analytics";

#[derive(Clone)]
pub struct AnalyticsService {
    ctx: ServiceContext,
}

impl AnalyticsService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Report for one category. Transport failures and unusable payloads
    /// yield the category's unavailable report.
    pub async fn report(
        &self,
        category: AnalyticsCategory,
    ) -> Result<AnalyticsReport, ServiceError> {
        if !self.ctx.permissions.can_access(RESOURCE, Action::Read) {
            return Err(ServiceError::PermissionDenied {
                resource: RESOURCE.to_string(),
                action: Action::Read.as_str().to_string(),
            });
        }

        let key = format!("{RESOURCE}:{category}");
        let path = format!("{RESOURCE}/{category}");
        let payload: Result<Value, ServiceError> = self
            .ctx
            .cache
            .get_or_set(&key, || async { self.ctx.http.get(&path).await.map(|r| r.data) }, None)
            .await;

        Ok(match payload {
            Ok(payload) => AnalyticsReport::decode(category, &payload),
            Err(e) => {
                warn!("Analytics {} unavailable: {}", category, e);
                AnalyticsReport::unavailable(category)
            }
        })
    }

    /// Every category, in a fixed order.
    pub async fn overview(&self) -> Result<Vec<AnalyticsReport>, ServiceError> {
        let mut reports = Vec::with_capacity(AnalyticsCategory::ALL.len());
        for category in AnalyticsCategory::ALL {
            reports.push(self.report(category).await?);
        }
        Ok(reports)
    }
}
