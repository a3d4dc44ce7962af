//! Local project discovery: walk configured roots for version-control
//! checkouts, derive metadata for each one and merge the results into a
//! [`devdeck_registry::Registry`].

pub mod clone;
pub mod detect;
pub mod error;
pub mod extract;
pub mod fs;
pub mod scan;
pub mod summary;

pub use detect::detect_repositories;
pub use error::ScanError;
pub use extract::extract_project;
pub use fs::LocalFs;
pub use fs::StorageRoot;
pub use scan::ScanReport;
