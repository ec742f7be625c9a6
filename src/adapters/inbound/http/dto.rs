use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{
    errors::PackageError,
    models::{AddUpdateRequest, CreatePackageRequest, Package, PackageUpdate},
};

/// DTO for a package as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDto {
    pub code: String,
    pub title: String,
    pub weight: f64,
    pub delivered: bool,
    pub posted_at: DateTime<Utc>,
    pub updates: Vec<PackageUpdateDto>,
}

/// DTO for one entry of a package's history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageUpdateDto {
    /// Code of the owning package
    pub package_id: String,
    pub id: u32,
    pub status: String,
    pub update_date: DateTime<Utc>,
}

/// DTO for registering a package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPackageDto {
    pub title: String,
    pub weight: f64,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub sender_email: String,
}

/// DTO for appending a status update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPackageUpdateDto {
    pub status: String,
    #[serde(default)]
    pub delivered: bool,
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    pub timestamp: DateTime<Utc>,
}

/// DTO for success responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponseDto {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

// Conversion implementations

impl From<PackageUpdate> for PackageUpdateDto {
    fn from(update: PackageUpdate) -> Self {
        PackageUpdateDto {
            package_id: update.package_code.as_str().to_string(),
            id: update.id,
            status: update.status,
            update_date: update.update_date,
        }
    }
}

impl From<Package> for PackageDto {
    fn from(package: Package) -> Self {
        PackageDto {
            code: package.code.as_str().to_string(),
            title: package.title,
            weight: package.weight,
            delivered: package.delivered,
            posted_at: package.posted_at,
            updates: package.updates.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<AddPackageDto> for CreatePackageRequest {
    fn from(dto: AddPackageDto) -> Self {
        CreatePackageRequest {
            title: dto.title,
            weight: dto.weight,
            sender_name: dto.sender_name,
            sender_email: dto.sender_email,
        }
    }
}

impl From<AddPackageUpdateDto> for AddUpdateRequest {
    fn from(dto: AddPackageUpdateDto) -> Self {
        AddUpdateRequest {
            status: dto.status,
            delivered: dto.delivered,
        }
    }
}

impl From<&PackageError> for StatusCode {
    fn from(error: &PackageError) -> Self {
        match error {
            PackageError::Validation(_) => StatusCode::BAD_REQUEST,
            PackageError::NotFound { .. } => StatusCode::NOT_FOUND,
            PackageError::AlreadyDelivered { .. } | PackageError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            PackageError::Repository { .. } => StatusCode::SERVICE_UNAVAILABLE,
            PackageError::DuplicateCode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Error response helpers

impl ErrorResponseDto {
    pub fn from_package_error(error: &PackageError) -> Self {
        let mut details = HashMap::new();

        let kind = match error {
            PackageError::Validation(e) => {
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(e.field().to_string()),
                );
                "ValidationError"
            }
            PackageError::NotFound { code } => return Self::not_found(code.as_str()),
            PackageError::AlreadyDelivered { code } => {
                details.insert(
                    "code".to_string(),
                    serde_json::Value::String(code.as_str().to_string()),
                );
                "AlreadyDelivered"
            }
            PackageError::Conflict { code, .. } => {
                details.insert(
                    "code".to_string(),
                    serde_json::Value::String(code.as_str().to_string()),
                );
                "Conflict"
            }
            PackageError::Repository { .. } => "ServiceUnavailable",
            PackageError::DuplicateCode { .. } => "InternalServerError",
        };

        // Store internals are logged by the handler, not returned
        let message = match error {
            PackageError::Repository { .. } => "Package store is unavailable".to_string(),
            PackageError::DuplicateCode { .. } => "Could not allocate a package code".to_string(),
            other => other.to_string(),
        };

        ErrorResponseDto {
            error: kind.to_string(),
            message,
            details: if details.is_empty() {
                None
            } else {
                Some(details)
            },
            timestamp: Utc::now(),
        }
    }

    /// 404 body for a code, whether or not the code is well formed
    pub fn not_found(code: &str) -> Self {
        let mut details = HashMap::new();
        details.insert(
            "code".to_string(),
            serde_json::Value::String(code.to_string()),
        );

        ErrorResponseDto {
            error: "NotFound".to_string(),
            message: format!("Package not found: {}", code),
            details: Some(details),
            timestamp: Utc::now(),
        }
    }
}

impl SuccessResponseDto {
    pub fn new(message: &str) -> Self {
        SuccessResponseDto {
            message: message.to_string(),
            data: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_data(message: &str, data: serde_json::Value) -> Self {
        SuccessResponseDto {
            message: message.to_string(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }
}
