mod in_memory_package_repository;
mod sql_package_repository;

pub use in_memory_package_repository::InMemoryPackageRepository;
pub use sql_package_repository::SqlPackageRepository;
