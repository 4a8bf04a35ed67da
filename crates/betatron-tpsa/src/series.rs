//! Series objects allocated against a descriptor.
//!
//! A series is a dense coefficient array over the descriptor's
//! order-major monomials, truncated at its own working order. Series do
//! not back-reference the descriptor; operations that need the tables
//! take `&Descriptor` explicitly, with a debug-checked id, the same way
//! arena handles are resolved against their arena.

use num_complex::Complex64;
use num_traits::Zero;

use betatron_mono::MonoRepr;

use crate::descriptor::Descriptor;
use crate::error::{Error, Result};

/// A truncated power series: dense coefficients over a descriptor's
/// monomial universe.
#[derive(Clone, Debug, PartialEq)]
pub struct Series<T> {
    desc_id: u32,
    mo: u8,
    coefs: Vec<T>,
}

/// A real series.
pub type Tpsa = Series<f64>;

/// A complex series.
pub type CTpsa = Series<Complex64>;

impl<T: Zero + Clone> Series<T> {
    /// Allocates a zero series with the requested working order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderRange`] if `mo` exceeds the descriptor's
    /// maximum order.
    pub fn new(desc: &Descriptor, mo: u8) -> Result<Self> {
        if mo > desc.mo() {
            return Err(Error::OrderRange {
                order: mo,
                max: desc.mo(),
            });
        }
        Ok(Self::raw(desc.id(), mo, desc.coef_len(mo)))
    }

    /// Allocates without going through a descriptor; the pool uses this
    /// for its preallocated scratch.
    pub(crate) fn raw(desc_id: u32, mo: u8, len: usize) -> Self {
        Self {
            desc_id,
            mo,
            coefs: vec![T::zero(); len],
        }
    }

    /// Id of the descriptor this series was allocated against.
    #[must_use]
    pub fn descriptor_id(&self) -> u32 {
        self.desc_id
    }

    /// Working order.
    #[must_use]
    pub fn order(&self) -> u8 {
        self.mo
    }

    /// Number of coefficients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coefs.len()
    }

    /// True if the series stores no coefficients.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coefs.is_empty()
    }

    /// All coefficients, order-major.
    #[must_use]
    pub fn coefs(&self) -> &[T] {
        &self.coefs
    }

    /// Coefficient at linear index `i`, or `None` beyond the working
    /// order.
    #[must_use]
    pub fn coef(&self, i: usize) -> Option<&T> {
        self.coefs.get(i)
    }

    /// Mutable coefficient at linear index `i`.
    #[must_use]
    pub fn coef_mut(&mut self, i: usize) -> Option<&mut T> {
        self.coefs.get_mut(i)
    }

    /// Coefficient of a monomial, or `None` if it is outside the
    /// universe or beyond this series' working order.
    #[must_use]
    pub fn get(&self, desc: &Descriptor, m: &MonoRepr<'_>) -> Option<&T> {
        debug_assert_eq!(self.desc_id, desc.id(), "series used with a foreign descriptor");
        self.coefs.get(desc.idx(m)?)
    }

    /// Sets the coefficient of a monomial, returning its linear index,
    /// or `None` if it is outside the universe or beyond this series'
    /// working order.
    pub fn set(&mut self, desc: &Descriptor, m: &MonoRepr<'_>, value: T) -> Option<usize> {
        debug_assert_eq!(self.desc_id, desc.id(), "series used with a foreign descriptor");
        let i = desc.idx(m)?;
        let c = self.coefs.get_mut(i)?;
        *c = value;
        Some(i)
    }

    /// Resets every coefficient to zero.
    pub fn clear(&mut self) {
        for c in &mut self.coefs {
            *c = T::zero();
        }
    }
}
