use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{PackageError, PackageResult},
        models::Package,
        value_objects::PackageCode,
    },
    ports::repositories::PackageRepository,
};

/// In-memory implementation of PackageRepository for testing and development
#[derive(Clone, Default)]
pub struct InMemoryPackageRepository {
    packages: Arc<RwLock<HashMap<PackageCode, Package>>>,
}

impl InMemoryPackageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PackageRepository for InMemoryPackageRepository {
    async fn list(&self) -> PackageResult<Vec<Package>> {
        let packages = self.packages.read().await;

        let mut all: Vec<Package> = packages.values().cloned().collect();
        all.sort_by(|a, b| a.posted_at.cmp(&b.posted_at).then_with(|| a.code.cmp(&b.code)));

        Ok(all)
    }

    async fn get_by_code(&self, code: &PackageCode) -> PackageResult<Option<Package>> {
        let packages = self.packages.read().await;
        Ok(packages.get(code).cloned())
    }

    async fn add(&self, package: &Package) -> PackageResult<()> {
        let mut packages = self.packages.write().await;

        if packages.contains_key(&package.code) {
            return Err(PackageError::DuplicateCode {
                code: package.code.clone(),
            });
        }

        packages.insert(package.code.clone(), package.clone());
        Ok(())
    }

    async fn update(&self, package: &Package) -> PackageResult<()> {
        let mut packages = self.packages.write().await;

        let stored = packages
            .get_mut(&package.code)
            .ok_or_else(|| PackageError::NotFound {
                code: package.code.clone(),
            })?;

        if stored.version != package.version {
            return Err(PackageError::Conflict {
                code: package.code.clone(),
                expected_version: package.version,
                actual_version: stored.version,
            });
        }

        *stored = Package {
            version: package.version + 1,
            ..package.clone()
        };
        Ok(())
    }

    async fn remove(&self, code: &PackageCode) -> PackageResult<bool> {
        let mut packages = self.packages.write().await;
        Ok(packages.remove(code).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::PackageTitle;
    use chrono::Utc;

    fn sample_package() -> Package {
        let title = PackageTitle::new("Playstation 5 Pro".to_string()).unwrap();
        Package::new(title, 5.0).unwrap()
    }

    #[tokio::test]
    async fn test_add_and_get_package() {
        let repo = InMemoryPackageRepository::new();
        let package = sample_package();

        repo.add(&package).await.unwrap();

        let retrieved = repo.get_by_code(&package.code).await.unwrap();
        assert_eq!(retrieved, Some(package));
    }

    #[tokio::test]
    async fn test_add_duplicate_code() {
        let repo = InMemoryPackageRepository::new();
        let package = sample_package();

        repo.add(&package).await.unwrap();
        let result = repo.add(&package).await;

        assert!(matches!(result, Err(PackageError::DuplicateCode { .. })));
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let repo = InMemoryPackageRepository::new();
        let mut package = sample_package();
        repo.add(&package).await.unwrap();

        package
            .add_update("In transit".to_string(), false, Utc::now())
            .unwrap();
        repo.update(&package).await.unwrap();

        let stored = repo.get_by_code(&package.code).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.updates.len(), 1);
    }

    #[tokio::test]
    async fn test_update_stale_version_conflicts() {
        let repo = InMemoryPackageRepository::new();
        let package = sample_package();
        repo.add(&package).await.unwrap();

        let mut first = package.clone();
        let mut second = package.clone();
        first
            .add_update("Sorting".to_string(), false, Utc::now())
            .unwrap();
        second
            .add_update("Loaded".to_string(), false, Utc::now())
            .unwrap();

        repo.update(&first).await.unwrap();
        let result = repo.update(&second).await;

        assert!(matches!(
            result,
            Err(PackageError::Conflict {
                expected_version: 0,
                actual_version: 1,
                ..
            })
        ));
        let stored = repo.get_by_code(&package.code).await.unwrap().unwrap();
        assert_eq!(stored.updates[0].status, "Sorting");
    }

    #[tokio::test]
    async fn test_update_missing_package() {
        let repo = InMemoryPackageRepository::new();
        let package = sample_package();

        let result = repo.update(&package).await;
        assert!(matches!(result, Err(PackageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_remove() {
        let repo = InMemoryPackageRepository::new();
        let package = sample_package();
        repo.add(&package).await.unwrap();

        assert!(repo.remove(&package.code).await.unwrap());
        assert!(!repo.remove(&package.code).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
