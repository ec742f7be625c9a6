use chrono::{DateTime, Utc};

use crate::domain::{
    errors::{PackageError, PackageResult, ValidationError},
    value_objects::{PackageCode, PackageTitle},
};

/// A tracked shipment and its status history
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub code: PackageCode,
    pub title: String,
    pub weight: f64,
    pub delivered: bool,
    pub posted_at: DateTime<Utc>,
    pub updates: Vec<PackageUpdate>,
    /// Optimistic concurrency stamp, bumped by the store on every update
    pub version: u64,
}

/// A status entry appended to a package's history
#[derive(Debug, Clone, PartialEq)]
pub struct PackageUpdate {
    pub package_code: PackageCode,
    pub id: u32,
    pub status: String,
    pub update_date: DateTime<Utc>,
}

/// Request to register a new package
#[derive(Debug, Clone)]
pub struct CreatePackageRequest {
    pub title: String,
    pub weight: f64,
    pub sender_name: String,
    pub sender_email: String,
}

/// Request to append a status update to a package
#[derive(Debug, Clone)]
pub struct AddUpdateRequest {
    pub status: String,
    pub delivered: bool,
}

impl Package {
    /// Create a package with a freshly generated code, posted now
    pub fn new(title: PackageTitle, weight: f64) -> Result<Self, ValidationError> {
        Self::with_code(PackageCode::generate(), title, weight, Utc::now())
    }

    pub fn with_code(
        code: PackageCode,
        title: PackageTitle,
        weight: f64,
        posted_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ValidationError::InvalidWeight(weight));
        }

        Ok(Self {
            code,
            title: title.into_inner(),
            weight,
            delivered: false,
            posted_at,
            updates: Vec::new(),
            version: 0,
        })
    }

    /// Append a status update; a delivered package accepts no further updates
    pub fn add_update(
        &mut self,
        status: String,
        delivered: bool,
        at: DateTime<Utc>,
    ) -> PackageResult<&PackageUpdate> {
        if self.delivered {
            return Err(PackageError::AlreadyDelivered {
                code: self.code.clone(),
            });
        }

        if status.trim().is_empty() {
            return Err(ValidationError::BlankStatus.into());
        }

        let id = self.updates.last().map_or(1, |last| last.id + 1);

        // Clock skew must not place an update before the package was posted
        let update_date = at.max(self.posted_at);

        self.updates.push(PackageUpdate {
            package_code: self.code.clone(),
            id,
            status,
            update_date,
        });
        self.delivered = delivered;

        Ok(&self.updates[self.updates.len() - 1])
    }
}
