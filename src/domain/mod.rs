//! Domain Module
//!
//! Typed shapes for the dashboard's analytics payloads and property
//! listings.

mod analytics;
mod listing;

pub use analytics::{
    AnalyticsCategory, AnalyticsReport, ContentStats, EngagementStats, ListingStats, PageCount,
    TrafficStats,
};
pub use listing::{
    CommercialDetails, LandDetails, ListingStatus, PropertyKind, PropertyListing,
    RentalDetails, ResidentialDetails,
};
