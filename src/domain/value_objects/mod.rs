mod package_code;
mod package_title;

pub use package_code::PackageCode;
pub use package_title::PackageTitle;
