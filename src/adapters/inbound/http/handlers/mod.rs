pub mod package_handlers;

pub use package_handlers::*;
