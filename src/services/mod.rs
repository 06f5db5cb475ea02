//! Services Module
//!
//! REST-backed domain services and the collaborator traits they are built
//! on. Everything is constructed explicitly and passed in; nothing is
//! global.

mod analytics;
mod collab;
mod http;
pub(crate) mod resource;
mod registry;
mod session;

pub use analytics::AnalyticsService;
pub use collab::{
    Action, ApiResponse, HttpClient, Notifier, PermissionOracle, StaticPermissions, Toast,
    ToastVariant, TracingNotifier,
};
pub use http::ReqwestClient;
pub use registry::ServiceRegistry;
pub use resource::{ResourceService, ServiceContext};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
