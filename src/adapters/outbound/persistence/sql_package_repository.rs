use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::HashMap;
use std::str::FromStr;

use crate::{
    domain::{
        errors::{PackageError, PackageResult},
        models::{Package, PackageUpdate},
        value_objects::PackageCode,
    },
    ports::repositories::PackageRepository,
};

/// SQL-based implementation of PackageRepository using SQLite
#[derive(Clone)]
pub struct SqlPackageRepository {
    pool: SqlitePool,
}

impl SqlPackageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url`, creating the database file if needed
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own empty database,
        // so keep exactly one and never recycle it
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        Ok(Self::new(pool))
    }

    /// Initialize database tables
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS packages (
                code TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                weight REAL NOT NULL,
                delivered BOOLEAN NOT NULL DEFAULT FALSE,
                posted_at TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 0
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS package_updates (
                package_code TEXT NOT NULL REFERENCES packages(code) ON DELETE CASCADE,
                id INTEGER NOT NULL,
                status TEXT NOT NULL,
                update_date TEXT NOT NULL,
                PRIMARY KEY (package_code, id)
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_packages_posted_at ON packages(posted_at)",
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        Ok(())
    }

    async fn fetch_updates(&self, code: &PackageCode) -> PackageResult<Vec<PackageUpdate>> {
        let rows = sqlx::query(
            r#"
            SELECT package_code, id, status, update_date
            FROM package_updates
            WHERE package_code = ?
            ORDER BY id
            "#,
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("retrieving package updates", e))?;

        rows.iter().map(update_from_row).collect()
    }
}

fn db_error(action: &str, e: sqlx::Error) -> PackageError {
    PackageError::Repository {
        message: format!("Database error {}: {}", action, e),
    }
}

fn corrupt_row(e: impl std::fmt::Display) -> PackageError {
    PackageError::Repository {
        message: format!("Invalid stored package row: {}", e),
    }
}

fn update_from_row(row: &SqliteRow) -> PackageResult<PackageUpdate> {
    let package_code: String = row.try_get("package_code").map_err(corrupt_row)?;
    let id: i64 = row.try_get("id").map_err(corrupt_row)?;

    Ok(PackageUpdate {
        package_code: PackageCode::new(package_code).map_err(corrupt_row)?,
        id: u32::try_from(id).map_err(corrupt_row)?,
        status: row.try_get("status").map_err(corrupt_row)?,
        update_date: row.try_get::<DateTime<Utc>, _>("update_date").map_err(corrupt_row)?,
    })
}

fn package_from_row(row: &SqliteRow, updates: Vec<PackageUpdate>) -> PackageResult<Package> {
    let code: String = row.try_get("code").map_err(corrupt_row)?;
    let version: i64 = row.try_get("version").map_err(corrupt_row)?;

    Ok(Package {
        code: PackageCode::new(code).map_err(corrupt_row)?,
        title: row.try_get("title").map_err(corrupt_row)?,
        weight: row.try_get("weight").map_err(corrupt_row)?,
        delivered: row.try_get("delivered").map_err(corrupt_row)?,
        posted_at: row.try_get::<DateTime<Utc>, _>("posted_at").map_err(corrupt_row)?,
        updates,
        version: u64::try_from(version).map_err(corrupt_row)?,
    })
}

#[async_trait]
impl PackageRepository for SqlPackageRepository {
    async fn list(&self) -> PackageResult<Vec<Package>> {
        let package_rows = sqlx::query(
            r#"
            SELECT code, title, weight, delivered, posted_at, version
            FROM packages
            ORDER BY posted_at, code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing packages", e))?;

        let update_rows = sqlx::query(
            r#"
            SELECT package_code, id, status, update_date
            FROM package_updates
            ORDER BY package_code, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing package updates", e))?;

        let mut updates_by_code: HashMap<PackageCode, Vec<PackageUpdate>> = HashMap::new();
        for row in &update_rows {
            let update = update_from_row(row)?;
            updates_by_code
                .entry(update.package_code.clone())
                .or_default()
                .push(update);
        }

        package_rows
            .iter()
            .map(|row| {
                let code: String = row.try_get("code").map_err(corrupt_row)?;
                let code = PackageCode::new(code).map_err(corrupt_row)?;
                let updates = updates_by_code.remove(&code).unwrap_or_default();
                package_from_row(row, updates)
            })
            .collect()
    }

    async fn get_by_code(&self, code: &PackageCode) -> PackageResult<Option<Package>> {
        let row = sqlx::query(
            r#"
            SELECT code, title, weight, delivered, posted_at, version
            FROM packages
            WHERE code = ?
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("retrieving package", e))?;

        match row {
            Some(row) => {
                let updates = self.fetch_updates(code).await?;
                Ok(Some(package_from_row(&row, updates)?))
            }
            None => Ok(None),
        }
    }

    async fn add(&self, package: &Package) -> PackageResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO packages (code, title, weight, delivered, posted_at, version)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(package.code.as_str())
        .bind(&package.title)
        .bind(package.weight)
        .bind(package.delivered)
        .bind(package.posted_at)
        .bind(package.version as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .map_or(false, |db| db.is_unique_violation());
            if duplicate {
                PackageError::DuplicateCode {
                    code: package.code.clone(),
                }
            } else {
                db_error("storing package", e)
            }
        })?;

        for update in &package.updates {
            sqlx::query(
                r#"
                INSERT INTO package_updates (package_code, id, status, update_date)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(package.code.as_str())
            .bind(i64::from(update.id))
            .bind(&update.status)
            .bind(update.update_date)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("storing package update", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("committing package", e))
    }

    async fn update(&self, package: &Package) -> PackageResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE packages
            SET title = ?, weight = ?, delivered = ?, version = version + 1
            WHERE code = ? AND version = ?
            "#,
        )
        .bind(&package.title)
        .bind(package.weight)
        .bind(package.delivered)
        .bind(package.code.as_str())
        .bind(package.version as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("updating package", e))?;

        if result.rows_affected() == 0 {
            let current: Option<i64> =
                sqlx::query_scalar("SELECT version FROM packages WHERE code = ?")
                    .bind(package.code.as_str())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| db_error("checking package version", e))?;

            return Err(match current {
                None => PackageError::NotFound {
                    code: package.code.clone(),
                },
                Some(actual) => PackageError::Conflict {
                    code: package.code.clone(),
                    expected_version: package.version,
                    actual_version: actual.max(0) as u64,
                },
            });
        }

        // Updates are append-only: stored rows are a prefix of `package.updates`
        let stored: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM package_updates WHERE package_code = ?")
                .bind(package.code.as_str())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| db_error("counting package updates", e))?;

        for update in package.updates.iter().skip(stored.max(0) as usize) {
            sqlx::query(
                r#"
                INSERT INTO package_updates (package_code, id, status, update_date)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(package.code.as_str())
            .bind(i64::from(update.id))
            .bind(&update.status)
            .bind(update.update_date)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("storing package update", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("committing package update", e))
    }

    async fn remove(&self, code: &PackageCode) -> PackageResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting transaction", e))?;

        sqlx::query("DELETE FROM package_updates WHERE package_code = ?")
            .bind(code.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("deleting package updates", e))?;

        let result = sqlx::query("DELETE FROM packages WHERE code = ?")
            .bind(code.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("deleting package", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("committing package deletion", e))?;

        Ok(result.rows_affected() > 0)
    }
}
