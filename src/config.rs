/// Reader options controlling resolution limits and diagnostic recording.
///
/// The structure reader always recovers from malformed input; these options
/// only bound how much work it does on hostile documents and how much of
/// what it recovers from is remembered.
///
/// # Example
///
/// ```
/// use pdf_structure::config::ReaderOptions;
///
/// let lenient = ReaderOptions::lenient();
/// assert!(lenient.record_diagnostics);
///
/// let custom = ReaderOptions {
///     max_resolve_depth: 8,
///     ..ReaderOptions::default()
/// };
/// assert_eq!(custom.max_resolve_depth, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Maximum length of a chain of indirect references followed by
    /// a single resolution (`1 0 R` -> `2 0 R` -> ...).
    pub max_resolve_depth: u32,

    /// Maximum depth of `/Kids` nesting walked in number trees and the
    /// page tree.
    ///
    /// PDF Spec: ISO 32000-1:2008, Section H.1 - Implementation Limits
    pub max_tree_depth: usize,

    /// Keep malformed-input diagnostics on the document in addition to
    /// logging them.
    pub record_diagnostics: bool,

    /// Maximum number of diagnostics kept per document (0 = unlimited).
    pub max_diagnostics: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

impl ReaderOptions {
    /// Tight limits, diagnostics only logged.
    pub fn strict() -> Self {
        Self {
            max_resolve_depth: 16,
            max_tree_depth: 32,
            record_diagnostics: false,
            max_diagnostics: 0,
        }
    }

    /// Generous limits, diagnostics recorded on the document.
    pub fn lenient() -> Self {
        Self {
            max_resolve_depth: 100,
            max_tree_depth: 100,
            record_diagnostics: true,
            max_diagnostics: 10_000,
        }
    }
}
