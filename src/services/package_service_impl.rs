use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        errors::{PackageError, PackageResult},
        models::{AddUpdateRequest, CreatePackageRequest, EmailMessage, Package},
        value_objects::{PackageCode, PackageTitle},
    },
    ports::{repositories::PackageRepository, services::PackageService},
    services::NotificationDispatcher,
};

const MAX_CODE_ATTEMPTS: usize = 3;
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Implementation of the PackageService
#[derive(Clone)]
pub struct PackageServiceImpl {
    repository: Arc<dyn PackageRepository>,
    notifier: NotificationDispatcher,
}

impl PackageServiceImpl {
    pub fn new(repository: Arc<dyn PackageRepository>, notifier: NotificationDispatcher) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Persist a new package, regenerating the code if the store reports a collision
    async fn insert_new_package(&self, title: PackageTitle, weight: f64) -> PackageResult<Package> {
        let mut attempt = 1;

        loop {
            let package = Package::new(title.clone(), weight)?;

            match self.repository.add(&package).await {
                Ok(()) => return Ok(package),
                Err(PackageError::DuplicateCode { code }) if attempt < MAX_CODE_ATTEMPTS => {
                    warn!(code = %code, attempt, "Package code collision, regenerating");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Queue the dispatch email. Failures are logged and never reach the caller.
    fn notify_dispatched(&self, package: &Package, sender_name: &str, sender_email: &str) {
        if sender_email.trim().is_empty() {
            debug!(code = %package.code, "No sender email given, skipping notification");
            return;
        }

        let message = EmailMessage::package_dispatched(&package.code, sender_email, sender_name);
        if let Err(e) = self.notifier.enqueue(message) {
            warn!(code = %package.code, error = %e, "Failed to queue dispatch notification");
        }
    }
}

#[async_trait]
impl PackageService for PackageServiceImpl {
    async fn list_packages(&self) -> PackageResult<Vec<Package>> {
        self.repository.list().await
    }

    async fn get_package(&self, code: &PackageCode) -> PackageResult<Package> {
        self.repository
            .get_by_code(code)
            .await?
            .ok_or_else(|| PackageError::NotFound { code: code.clone() })
    }

    async fn create_package(&self, request: CreatePackageRequest) -> PackageResult<Package> {
        let CreatePackageRequest {
            title,
            weight,
            sender_name,
            sender_email,
        } = request;

        let title = PackageTitle::new(title)?;
        let package = self.insert_new_package(title, weight).await?;

        info!(code = %package.code, title = %package.title, "Package created");

        self.notify_dispatched(&package, &sender_name, &sender_email);

        Ok(package)
    }

    async fn add_update(
        &self,
        code: &PackageCode,
        request: AddUpdateRequest,
    ) -> PackageResult<()> {
        let mut attempt = 1;

        loop {
            let mut package = self.get_package(code).await?;
            package.add_update(request.status.clone(), request.delivered, Utc::now())?;

            match self.repository.update(&package).await {
                Ok(()) => {
                    info!(
                        code = %code,
                        status = %request.status,
                        delivered = request.delivered,
                        "Package update added"
                    );
                    return Ok(());
                }
                Err(PackageError::Conflict { .. }) if attempt < MAX_UPDATE_ATTEMPTS => {
                    debug!(code = %code, attempt, "Concurrent package update, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn delete_package(&self, code: &PackageCode) -> PackageResult<()> {
        if !self.repository.remove(code).await? {
            return Err(PackageError::NotFound { code: code.clone() });
        }

        info!(code = %code, "Package deleted");
        Ok(())
    }
}
