//! Core building blocks for the Stratum multi-tenant access layer.
//!
//! A *partition* is an isolated customer environment identified by a short
//! string id; each has independent connection endpoints and credentials.
//! This crate provides:
//!
//! - **Partition model** - [`PartitionInfo`] property bag with a
//!   sensitive-value marker
//! - **Partition directory** - the [`PartitionDirectory`] lookup trait plus
//!   an in-memory implementation for tests and local development
//! - **Validation** - fail-fast argument checks shared by every public
//!   cache and facade operation
//!
//! # Quick Start
//!
//! ```
//! use stratum_core::{InMemoryPartitionDirectory, PartitionDirectory, PartitionInfo};
//!
//! # async fn example() -> Result<(), stratum_core::PartitionError> {
//! let directory = InMemoryPartitionDirectory::new();
//! directory
//!     .insert(
//!         PartitionInfo::new("acme")
//!             .with_property("storage-endpoint", "https://acme.storage.example")
//!             .with_sensitive_property("storage-key", "key-ref"),
//!     )
//!     .await;
//!
//! let partition = directory.get_partition("acme").await?;
//! assert_eq!(partition.str_property("storage-endpoint")?, "https://acme.storage.example");
//! # Ok(())
//! # }
//! ```

pub mod partition;
pub mod validation;

pub use partition::{
    InMemoryPartitionDirectory, PartitionDirectory, PartitionError, PartitionInfo, Property,
};
pub use validation::{
    ValidationError, require_allowed_characters, require_non_empty, require_present,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::partition::{
        InMemoryPartitionDirectory, PartitionDirectory, PartitionError, PartitionInfo, Property,
    };
    pub use crate::validation::{
        ValidationError, require_allowed_characters, require_non_empty, require_present,
    };
}
