mod notification_errors;
mod package_errors;
mod validation_errors;

pub use notification_errors::*;
pub use package_errors::*;
pub use validation_errors::*;
