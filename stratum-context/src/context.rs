//! Ambient request context.
//!
//! An [`AmbientContext`] is an immutable snapshot of the diagnostic
//! key/value map and the request-scoped attribute bag. Snapshots are
//! explicit values everywhere in the platform; the task-local storage that
//! makes one "ambient" is confined to this module, behind `capture`,
//! `scope`, `current`, and `clear_current`.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;

/// Immutable snapshot of per-request diagnostic and attribute state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientContext {
    /// Diagnostic key/value map attached to log output
    #[serde(default)]
    diagnostics: HashMap<String, String>,

    /// Request-scoped attribute bag (caller identity, partition id, ...)
    #[serde(default)]
    attributes: HashMap<String, String>,
}

impl AmbientContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic entry
    pub fn with_diagnostic(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.diagnostics.insert(key.into(), value.into());
        self
    }

    /// Add a request attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get a diagnostic entry
    pub fn diagnostic(&self, key: &str) -> Option<&str> {
        self.diagnostics.get(key).map(String::as_str)
    }

    /// Get a request attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The full diagnostic map
    pub fn diagnostics(&self) -> &HashMap<String, String> {
        &self.diagnostics
    }

    /// The full attribute bag
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Whether both the diagnostic map and attribute bag are empty
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty() && self.attributes.is_empty()
    }
}

tokio::task_local! {
    static CURRENT: RefCell<AmbientContext>;
}

/// Snapshot the ambient context of the current task, if one is installed.
pub fn capture() -> Option<AmbientContext> {
    CURRENT.try_with(|current| current.borrow().clone()).ok()
}

/// The ambient context of the current task, or an empty one.
pub fn current() -> AmbientContext {
    capture().unwrap_or_default()
}

/// Run `future` with `context` installed as the ambient context.
///
/// The installed context replaces whatever was ambient before and is torn
/// down when the future finishes, on every exit path - completion, an error
/// value, or a panic unwinding through the scope.
pub async fn scope<F: Future>(context: AmbientContext, future: F) -> F::Output {
    CURRENT.scope(RefCell::new(context), future).await
}

/// Reset the current task's ambient context to empty.
///
/// No-op outside a [`scope`].
pub fn clear_current() {
    let _ = CURRENT.try_with(|current| {
        *current.borrow_mut() = AmbientContext::default();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_outside_scope_is_none() {
        assert!(capture().is_none());
        assert!(current().is_empty());
    }

    #[tokio::test]
    async fn test_scope_installs_and_removes() {
        let ambient = AmbientContext::new()
            .with_diagnostic("correlation-id", "abc")
            .with_attribute("partition-id", "acme");

        let observed = scope(ambient.clone(), async { capture() }).await;
        assert_eq!(observed, Some(ambient));

        // back outside the scope nothing is ambient
        assert!(capture().is_none());
    }

    #[tokio::test]
    async fn test_nested_scope_shadows_outer() {
        let outer = AmbientContext::new().with_diagnostic("correlation-id", "outer");
        let inner = AmbientContext::new().with_diagnostic("correlation-id", "inner");

        let (inside, after) = scope(outer, async {
            let inside = scope(inner, async { current() }).await;
            (inside, current())
        })
        .await;

        assert_eq!(inside.diagnostic("correlation-id"), Some("inner"));
        assert_eq!(after.diagnostic("correlation-id"), Some("outer"));
    }

    #[tokio::test]
    async fn test_clear_current_empties_installed_context() {
        let ambient = AmbientContext::new().with_diagnostic("correlation-id", "abc");

        let observed = scope(ambient, async {
            clear_current();
            current()
        })
        .await;

        assert!(observed.is_empty());
    }

    #[tokio::test]
    async fn test_clear_current_outside_scope_is_noop() {
        clear_current();
        assert!(capture().is_none());
    }

    #[test]
    fn test_context_serde_round_trip() {
        let ambient = AmbientContext::new()
            .with_diagnostic("correlation-id", "abc")
            .with_attribute("caller", "svc-ingest");

        let json = serde_json::to_string(&ambient).unwrap();
        let decoded: AmbientContext = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, ambient);
    }
}
