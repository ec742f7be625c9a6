use crate::domain::{errors::PackageResult, models::Package, value_objects::PackageCode};
use async_trait::async_trait;

/// Repository for packages and their update history
#[async_trait]
pub trait PackageRepository: Send + Sync + 'static {
    /// List every stored package, oldest first
    async fn list(&self) -> PackageResult<Vec<Package>>;

    /// Fetch a package by its code
    async fn get_by_code(&self, code: &PackageCode) -> PackageResult<Option<Package>>;

    /// Store a new package. Fails with `DuplicateCode` if the code is taken.
    async fn add(&self, package: &Package) -> PackageResult<()>;

    /// Replace the stored state of an existing package.
    ///
    /// `package.version` must match the stored version, otherwise the call fails
    /// with `Conflict` and nothing is written. The stored version is incremented
    /// on success.
    async fn update(&self, package: &Package) -> PackageResult<()>;

    /// Remove a package and its updates, returning whether anything was removed
    async fn remove(&self, code: &PackageCode) -> PackageResult<bool>;
}
