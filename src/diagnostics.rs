//! Recoverable malformed-input diagnostics.
//!
//! Every malformation the structure reader recovers from is logged through
//! the `log` facade and, when enabled, remembered on the owning document.

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// Category of a recovered malformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// A bare marked-content id or reference had no page to belong to
    MissingPage,
    /// `/MCID` missing, not an integer, or negative
    InvalidMcid,
    /// `/Pg` is not an indirect reference
    InvalidPageRef,
    /// `/Pg` does not name a page of the document
    PageNotFound,
    /// `/Obj` missing, not an indirect reference, or pointing at the wrong shape
    InvalidObjectRef,
    /// `/Stm` does not reference a content stream
    InvalidStream,
    /// A `/K` entry of an unrecognized shape
    UnrecognizedKid,
    /// A shape forbidden directly under the structure tree root
    IrregularRoot,
    /// An indirect reference could not be resolved
    Unresolved,
    /// A `/BBox` or `/Rect` entry is not a rectangle
    MalformedRect,
    /// A `/P` entry is not a dictionary
    MalformedParent,
    /// A `/RoleMap` entry is not a name or string
    MalformedRoleMap,
    /// A number tree node is malformed or cyclic
    MalformedNumberTree,
    /// A page tree node is malformed or cyclic
    MalformedPageTree,
    /// A structure element contains itself
    CyclicStructure,
    /// A structure element has no `/S` name
    MissingStructType,
    /// Content interpretation failed
    Interpretation,
}

/// A single recovered malformation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Category
    pub kind: DiagnosticKind,
    /// Human-readable description
    pub message: String,
    /// Debug rendering of the offending raw value
    pub value: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.value)
    }
}

/// Bounded, thread-safe diagnostic log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
    enabled: bool,
    limit: usize,
}

impl Diagnostics {
    /// Create a log keeping at most `limit` entries (0 = unlimited).
    pub fn new(enabled: bool, limit: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            enabled,
            limit,
        }
    }

    /// Log and record a malformation.
    pub fn report(&self, kind: DiagnosticKind, message: &str, value: &dyn fmt::Debug) {
        log::warn!("{}: {:?}", message, value);
        if !self.enabled {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if self.limit == 0 || entries.len() < self.limit {
            entries.push(Diagnostic {
                kind,
                message: message.to_string(),
                value: format!("{:?}", value),
            });
        }
    }

    /// Snapshot of the recorded entries.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget all recorded entries.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

/// Log a malformation when no document is reachable to record it on.
pub(crate) fn report_detached(message: &str, value: &dyn fmt::Debug) {
    log::warn!("{}: {:?}", message, value);
}
