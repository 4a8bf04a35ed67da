//! # Betatron
//!
//! Truncated Power Series Algebra (TPSA) for perturbative numerical
//! analysis, built around a shared immutable **descriptor**: the
//! monomial universe and index tables that every series operation
//! consumes instead of re-deriving combinatorics per call.
//!
//! ## Features
//!
//! - **Descriptor tables**: order-major and variable-major monomial
//!   orderings, mutual index maps, O(nv) lookups via a rank matrix
//! - **Multiplication pairing tables**: precomputed `(ia, ib, ic)`
//!   triples per order pair, with a squaring fast-path region
//! - **Per-thread resources**: multiply schedules and bounded scratch
//!   pools with scoped acquisition
//!
//! ## Quick Start
//!
//! ```rust
//! use betatron::prelude::*;
//!
//! let desc = Descriptor::build(&DescSpec::new(vec![2, 2], vec![2, 2]))?;
//! let mut s = Tpsa::new(&desc, 2)?;
//! let i = s.set(&desc, &MonoRepr::Dense(&[1, 1]), 0.5).unwrap();
//! assert_eq!(s.coef(i), Some(&0.5));
//! assert_eq!(desc.nc(), s.len());
//! # Ok::<(), betatron::tpsa::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use betatron_mono as mono;
pub use betatron_tpsa as tpsa;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use betatron_mono::{Mono, MonoRepr};
    pub use betatron_tpsa::{CTpsa, DescSpec, Descriptor, Registry, Series, Tpsa};
}
