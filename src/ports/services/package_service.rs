use crate::domain::{
    errors::PackageResult,
    models::{AddUpdateRequest, CreatePackageRequest, Package},
    value_objects::PackageCode,
};
use async_trait::async_trait;

/// Service port for the package lifecycle
#[async_trait]
pub trait PackageService: Send + Sync + 'static {
    /// List all packages
    async fn list_packages(&self) -> PackageResult<Vec<Package>>;

    /// Get a package by its code
    async fn get_package(&self, code: &PackageCode) -> PackageResult<Package>;

    /// Register a package and queue the dispatch notification
    async fn create_package(&self, request: CreatePackageRequest) -> PackageResult<Package>;

    /// Append a status update to a package
    async fn add_update(&self, code: &PackageCode, request: AddUpdateRequest)
    -> PackageResult<()>;

    /// Delete a package and its history
    async fn delete_package(&self, code: &PackageCode) -> PackageResult<()>;
}
