// Stratum - a multi-tenant cloud-resource access layer
//
// This library resolves partition-specific connection settings and hands out
// cached, reusable client handles, with expiry-aware credential caching and
// context-propagating task execution around them.

// Re-export core functionality
pub use stratum_core::*;

// Re-export optional crates
#[cfg(feature = "cache")]
pub use stratum_cache;

#[cfg(feature = "context")]
pub use stratum_context;

#[cfg(feature = "publish")]
pub use stratum_publish;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        InMemoryPartitionDirectory,
        PartitionDirectory,
        PartitionError,
        PartitionInfo,
        Property,
        ValidationError,
        require_allowed_characters,
        require_non_empty,
        require_present,
    };

    #[cfg(feature = "cache")]
    pub use stratum_cache::prelude::*;

    #[cfg(feature = "context")]
    pub use stratum_context::prelude::*;

    #[cfg(feature = "publish")]
    pub use stratum_publish::prelude::*;
}
