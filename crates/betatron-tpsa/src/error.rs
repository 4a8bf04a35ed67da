//! Error taxonomy of the descriptor engine.
//!
//! Only construction-time and teardown failures surface as [`Error`];
//! lookup hot paths return `Option` sentinels instead (a monomial that is
//! truncated away is not a fault, and callers must check). Temporary-pool
//! exhaustion panics: it signals an unbalanced caller, not bad input.

use thiserror::Error;

/// Errors surfaced by descriptor construction and registry teardown.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Malformed construction parameters. Construction never yields a
    /// partially built descriptor.
    #[error("invalid descriptor specification: {0}")]
    InvalidSpec(String),

    /// A requested order exceeds what the descriptor was built for.
    #[error("order {order} exceeds maximum order {max}")]
    OrderRange {
        /// The offending order.
        order: u8,
        /// The descriptor's maximum order.
        max: u8,
    },

    /// A linear index outside `[0, nc)`.
    #[error("index {index} out of range for {nc} coefficients")]
    IndexRange {
        /// The offending index.
        index: usize,
        /// The descriptor's coefficient count.
        nc: usize,
    },

    /// Registry teardown was requested while a descriptor is still
    /// referenced outside the registry.
    #[error("descriptor {id} is still referenced at teardown")]
    DescriptorInUse {
        /// Id of the live descriptor.
        id: u32,
    },
}

/// Result alias for descriptor operations.
pub type Result<T> = std::result::Result<T, Error>;
