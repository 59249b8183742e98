//! Publish fan-out for the Stratum platform.
//!
//! A record-change event is fanned out to zero, one, or two broker
//! backends - a message-bus topic and an event-grid endpoint - based on
//! independent configuration flags. Backend clients are opaque SDK handles
//! supplied by the embedding application through [`SinkFactory`] and cached
//! per partition.
//!
//! Failure policy: every enabled backend is attempted on every publish; a
//! failure on one never suppresses the attempt on the other, every failure
//! is logged, and the first failure is returned to the caller once all
//! attempts have completed. A record-change notification that silently
//! fails to send is a correctness bug, so nothing is swallowed.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stratum_publish::{PublishInfo, PublisherConfig, PublisherFacade};
//!
//! let config = PublisherConfig::from_env();
//! let publisher = PublisherFacade::new(config, directory, bus_factory, grid_factory);
//!
//! let info = PublishInfo::new("recordstopic", "recordChanged", "1.0")
//!     .with_bus_topic("recordstopic")
//!     .with_grid_topic("recordstopic")
//!     .with_message(serde_json::json!({ "id": "rec-1", "op": "update" }));
//!
//! publisher.publish("acme", &info).await?;
//! ```

pub mod config;
pub mod error;
pub mod facade;
pub mod message;
pub mod traits;

pub use config::PublisherConfig;
pub use error::PublishError;
pub use facade::PublisherFacade;
pub use message::PublishInfo;
pub use traits::{MessageSink, SinkFactory};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::PublisherConfig;
    pub use crate::error::PublishError;
    pub use crate::facade::PublisherFacade;
    pub use crate::message::PublishInfo;
    pub use crate::traits::{MessageSink, SinkFactory};
}
