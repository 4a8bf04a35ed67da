//! # betatron-tpsa
//!
//! Truncated Power Series Algebra descriptor engine.
//!
//! A TPSA quantity is a multivariate polynomial truncated at a maximum
//! total order, its coefficients stored densely and indexed by a
//! precomputed linear index per admissible monomial. The **descriptor**
//! is the shared, immutable monomial universe behind that indexing:
//!
//! - the order-major view (contiguous blocks per total order) that
//!   defines the coefficient layout,
//! - the variable-major view and its rank matrix, giving O(nv) lookups,
//! - the multiplication pairing tables, so a product never searches for
//!   matching monomial pairs,
//! - the per-thread multiply schedule and temporary pools.
//!
//! Everything is built once, up front; after construction the descriptor
//! is read-only and freely shared across threads.
//!
//! ## Quick start
//!
//! ```
//! use betatron_tpsa::{DescSpec, Descriptor, Tpsa};
//! use betatron_mono::MonoRepr;
//!
//! let desc = Descriptor::build(&DescSpec::new(vec![2, 2], vec![2, 2]))?;
//! assert_eq!(desc.nc(), 6);
//!
//! let mut s = Tpsa::new(&desc, 2)?;
//! let i = s.set(&desc, &MonoRepr::Dense(&[1, 1]), 0.5).unwrap();
//! assert_eq!(s.coef(i), Some(&0.5));
//! # Ok::<(), betatron_tpsa::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod descriptor;
pub mod error;
pub mod mulidx;
pub mod pool;
pub mod registry;
pub mod series;

mod tables;

#[cfg(test)]
mod proptests;

pub use descriptor::{DescSignature, DescSpec, Descriptor, MAX_ORD, MAX_VAR};
pub use error::{Error, Result};
pub use mulidx::MulTriple;
pub use pool::TmpGuard;
pub use registry::Registry;
pub use series::{CTpsa, Series, Tpsa};
