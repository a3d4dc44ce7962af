//! Project registry for devdeck: the project data model, the merge policy
//! that keeps user-owned fields across re-imports, and persistence of the
//! dashboard state.

pub mod error;
pub mod factory;
pub mod migrate;
pub mod registry;
pub mod store;
pub mod types;
pub mod views;

pub use error::RegistryError;
pub use registry::MergeOutcome;
pub use registry::Registry;
pub use store::PersistedState;
pub use store::StateStore;
pub use types::DedupKey;
pub use types::LocalProject;
pub use types::Project;
pub use types::ProjectId;
pub use types::ProjectUpdate;
pub use types::RemoteProject;
pub use types::Screenshot;
