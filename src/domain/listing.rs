//! Property listings.
//!
//! Each property type carries exactly its own fields; details of one type
//! are rejected when submitted under another.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::grid::{CellValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Available,
    Pending,
    Sold,
    Rented,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResidentialDetails {
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area_sqft: u32,
    #[serde(default)]
    pub has_garage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommercialDetails {
    pub floor_area_sqft: u32,
    pub zoning: String,
    #[serde(default)]
    pub parking_spaces: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LandDetails {
    pub acreage: f64,
    pub zoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RentalDetails {
    pub monthly_rent: f64,
    pub lease_months: u32,
    pub bedrooms: u32,
    #[serde(default)]
    pub furnished: bool,
}

// == Property Kind ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "propertyType", content = "details", rename_all = "lowercase")]
pub enum PropertyKind {
    Residential(ResidentialDetails),
    Commercial(CommercialDetails),
    Land(LandDetails),
    Rental(RentalDetails),
}

impl PropertyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyKind::Residential(_) => "residential",
            PropertyKind::Commercial(_) => "commercial",
            PropertyKind::Land(_) => "land",
            PropertyKind::Rental(_) => "rental",
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            PropertyKind::Residential(d) => {
                if d.area_sqft == 0 {
                    return Err(ValidationError::new("areaSqft", "must be greater than zero"));
                }
                if d.bathrooms == 0 {
                    return Err(ValidationError::new("bathrooms", "at least one required"));
                }
            }
            PropertyKind::Commercial(d) => {
                if d.floor_area_sqft == 0 {
                    return Err(ValidationError::new(
                        "floorAreaSqft",
                        "must be greater than zero",
                    ));
                }
                require_text("zoning", &d.zoning)?;
            }
            PropertyKind::Land(d) => {
                if !(d.acreage.is_finite() && d.acreage > 0.0) {
                    return Err(ValidationError::new("acreage", "must be a positive number"));
                }
                require_text("zoning", &d.zoning)?;
            }
            PropertyKind::Rental(d) => {
                if !(d.monthly_rent.is_finite() && d.monthly_rent > 0.0) {
                    return Err(ValidationError::new("monthlyRent", "must be a positive number"));
                }
                if !(1..=60).contains(&d.lease_months) {
                    return Err(ValidationError::new("leaseMonths", "must be between 1 and 60"));
                }
            }
        }
        Ok(())
    }
}

// == Property Listing ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub city: String,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub property: PropertyKind,
}

impl PropertyListing {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("city", &self.city)?;
        if !(self.price.is_finite() && self.price >= 0.0) {
            return Err(ValidationError::new("price", "must be zero or more"));
        }
        if let (ListingStatus::Rented, PropertyKind::Land(_)) = (self.status, &self.property) {
            return Err(ValidationError::new("status", "land cannot be rented"));
        }
        self.property.validate()
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, "cannot be empty"))
    } else {
        Ok(())
    }
}

/// Top-level fields read directly; `propertyType` and detail fields
/// (`property.details.bedrooms`) go through the JSON shape.
impl Record for PropertyListing {
    fn field(&self, path: &str) -> CellValue {
        match path {
            "id" => CellValue::text(&self.id),
            "title" => CellValue::text(&self.title),
            "price" => CellValue::Float(self.price),
            "city" => CellValue::text(&self.city),
            "agent" => self.agent.clone().into(),
            "featured" => CellValue::Bool(self.featured),
            "propertyType" => CellValue::text(self.property.name()),
            _ => serde_json::to_value(self)
                .map(|value| Value::field(&value, path))
                .unwrap_or_default(),
        }
    }
}
