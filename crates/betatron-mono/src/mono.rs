//! Dense exponent-vector monomials.
//!
//! Exponents are stored as one `u8` per variable, inline for up to 8
//! variables. Orders in this engine are small (the descriptor caps them
//! at 63), so `u8` exponents are never a restriction.

use smallvec::SmallVec;

/// A monomial: one exponent per variable.
///
/// The monomial `x0^2 * x2` over three variables is `[2, 0, 1]`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Mono {
    exps: SmallVec<[u8; 8]>,
}

impl Mono {
    /// Creates the constant monomial 1 (all exponents zero).
    #[must_use]
    pub fn zero(num_vars: usize) -> Self {
        Self {
            exps: SmallVec::from_elem(0, num_vars),
        }
    }

    /// Creates a monomial from explicit exponents.
    #[must_use]
    pub fn from_exps(exps: &[u8]) -> Self {
        Self {
            exps: SmallVec::from_slice(exps),
        }
    }

    /// Creates the monomial `x_i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= num_vars`.
    #[must_use]
    pub fn var(i: usize, num_vars: usize) -> Self {
        assert!(i < num_vars);
        let mut m = Self::zero(num_vars);
        m.exps[i] = 1;
        m
    }

    /// Returns the exponents as a slice.
    #[must_use]
    pub fn exps(&self) -> &[u8] {
        &self.exps
    }

    /// Returns the exponents as a mutable slice.
    pub fn exps_mut(&mut self) -> &mut [u8] {
        &mut self.exps
    }

    /// Returns the exponent of variable `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a variable of this monomial.
    #[must_use]
    pub fn exp(&self, i: usize) -> u8 {
        self.exps[i]
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.exps.len()
    }

    /// Computes the total order (sum of exponents).
    #[must_use]
    pub fn order(&self) -> u32 {
        self.exps.iter().map(|&e| u32::from(e)).sum()
    }

    /// Multiplies two monomials (adds exponents).
    ///
    /// # Panics
    ///
    /// Panics if the variable counts differ.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        assert_eq!(self.exps.len(), other.exps.len());
        Self {
            exps: self
                .exps
                .iter()
                .zip(&other.exps)
                .map(|(&a, &b)| a + b)
                .collect(),
        }
    }

    /// Divides by another monomial if every exponent stays non-negative.
    #[must_use]
    pub fn div(&self, other: &Self) -> Option<Self> {
        if self.exps.len() != other.exps.len() {
            return None;
        }
        let mut exps = SmallVec::with_capacity(self.exps.len());
        for (&a, &b) in self.exps.iter().zip(&other.exps) {
            exps.push(a.checked_sub(b)?);
        }
        Some(Self { exps })
    }

    /// Returns true if every exponent is within its per-variable bound.
    #[must_use]
    pub fn fits(&self, bounds: &[u8]) -> bool {
        self.exps.len() == bounds.len()
            && self.exps.iter().zip(bounds).all(|(&e, &b)| e <= b)
    }
}

impl std::fmt::Display for Mono {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (i, &e) in self.exps.iter().enumerate() {
            if e == 0 {
                continue;
            }
            if !first {
                write!(f, "*")?;
            }
            first = false;
            if e == 1 {
                write!(f, "x{i}")?;
            } else {
                write!(f, "x{i}^{e}")?;
            }
        }
        if first {
            write!(f, "1")?;
        }
        Ok(())
    }
}
