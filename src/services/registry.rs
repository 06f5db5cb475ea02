//! Explicit composition of the per-domain services.

use crate::services::{AnalyticsService, ResourceService, ServiceContext};

/// One service per dashboard domain, all sharing one context.
#[derive(Clone)]
pub struct ServiceRegistry {
    pub users: ResourceService,
    pub properties: ResourceService,
    pub blogs: ResourceService,
    pub contacts: ResourceService,
    pub subscribers: ResourceService,
    pub agents: ResourceService,
    pub emails: ResourceService,
    pub analytics: AnalyticsService,
}

impl ServiceRegistry {
    pub fn new(ctx: ServiceContext) -> Self {
        let service =
            |resource: &str, label: &str| ResourceService::new(resource, label, ctx.clone());
        Self {
            users: service("users", "User"),
            properties: service("properties", "Property"),
            blogs: service("blogs", "Blog post"),
            contacts: service("contacts", "Contact"),
            subscribers: service("subscribers", "Subscriber"),
            agents: service("agents", "Agent"),
            emails: service("emails", "Email campaign"),
            analytics: AnalyticsService::new(ctx.clone()),
        }
    }

    pub fn resources(&self) -> [&ResourceService; 7] {
        [
            &self.users,
            &self.properties,
            &self.blogs,
            &self.contacts,
            &self.subscribers,
            &self.agents,
            &self.emails,
        ]
    }
}
