//! Wire types shared by the ona ingest client and the archive-management API.

pub mod constants;
pub mod messages;
pub mod package;
pub mod types;

// Re-export primary types for convenience.
pub use constants::Head;
pub use messages::{Id, ObjectInstance, ObjectInstances, ObjectRef, Objects, SizeAndId};
pub use package::{MetadataDocument, PackageError, PackageMetadata};
pub use types::{ArchivingStatus, File, Object, Status};
