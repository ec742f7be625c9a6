pub mod notification;
pub mod package;

pub use notification::{DeliveryAck, EmailMessage};
pub use package::{AddUpdateRequest, CreatePackageRequest, Package, PackageUpdate};
