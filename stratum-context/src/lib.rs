//! Ambient context propagation for the Stratum platform.
//!
//! Diagnostic metadata (correlation ids, partition ids, caller identity)
//! travels with a request implicitly rather than as an explicit argument.
//! Handing work to a task pool would normally lose it; this crate keeps it
//! attached:
//!
//! - **[`AmbientContext`]** - immutable snapshot of the diagnostic map and
//!   request-attribute bag
//! - **[`context`]** - the task-local snapshot API (`capture`, `scope`,
//!   `current`, `clear_current`); the task-local mechanism lives behind this
//!   one module and nothing else touches it directly
//! - **[`ContextPropagatingExecutor`]** - fixed worker pool that installs
//!   the submitter's context around every task and clears it afterwards on
//!   all exit paths
//!
//! # Quick Start
//!
//! ```
//! use stratum_context::{AmbientContext, ContextPropagatingExecutor, ExecutorConfig, context};
//!
//! # async fn example() {
//! let executor = ContextPropagatingExecutor::new(ExecutorConfig::default());
//!
//! let ambient = AmbientContext::new().with_diagnostic("correlation-id", "abc-123");
//! let handle = context::scope(ambient, async {
//!     // the submitted task observes the submitter's diagnostic map
//!     executor.submit(async {
//!         context::current().diagnostic("correlation-id").map(str::to_string)
//!     })
//! })
//! .await;
//!
//! assert_eq!(handle.join().await.unwrap(), Some("abc-123".to_string()));
//! # }
//! ```

pub mod context;
pub mod executor;

pub use context::AmbientContext;
pub use executor::{ContextPropagatingExecutor, ExecutorConfig, ExecutorError, TaskHandle};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{self, AmbientContext};
    pub use crate::executor::{
        ContextPropagatingExecutor, ExecutorConfig, ExecutorError, TaskHandle,
    };
}
