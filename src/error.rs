//! Error types for rs-blockclip.
//!
//! Strategy-local failures (a fallback step producing nothing, a malformed
//! payload, an unparseable URL) are not represented here: they resolve to
//! `None`/"invalid" so the next strategy can run. Only failures that must
//! surface to the caller become an `Error`.

/// Error type for extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Proxy-URL unwrapping exceeded the configured recursion depth.
    ///
    /// A proxy chain nested deeper than the cap indicates a degenerate or
    /// adversarial input, so this surfaces instead of degrading silently.
    #[error("image proxy chain exceeded maximum unwrap depth of {0}")]
    ProxyDepthExceeded(usize),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
