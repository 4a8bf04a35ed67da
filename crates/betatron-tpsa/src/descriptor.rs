//! Descriptor specification and construction.
//!
//! A descriptor is the shared, immutable monomial universe plus every
//! index table series arithmetic needs: the order-major and
//! variable-major views, their cross maps, the rank matrix, the
//! multiplication pairing tables, the per-thread multiply schedule, and
//! the per-thread temporary pools. It is built once, fully, before any
//! caller sees it, and is read-only afterwards, so it is shared across
//! threads without locking.

use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};

use num_complex::Complex64;

use betatron_mono::{Mono, MonoRepr};

use crate::error::{Error, Result};
use crate::mulidx::{build_schedule, MulTables, MulTriple};
use crate::pool::{TmpGuard, TmpPool};
use crate::tables::MonoTables;

/// Hard maximum for any order bound.
pub const MAX_ORD: u8 = 63;

/// Hard maximum for the total variable count.
pub const MAX_VAR: usize = 100_000;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Construction parameters for a [`Descriptor`].
///
/// Map variables are the core map's independent variables; knobs are
/// auxiliary parameters whose maximum bound (`ko`) travels with the
/// descriptor signature. The truncation order defaults to the maximum
/// map-variable bound.
///
/// ```
/// use betatron_tpsa::DescSpec;
///
/// let spec = DescSpec::new(vec![3, 3], vec![3, 3, 1]).trunc(2).threads(4);
/// assert_eq!(spec.to(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescSpec {
    mvar_ords: Vec<u8>,
    knob_ords: Vec<u8>,
    var_ords: Vec<u8>,
    trunc: Option<u8>,
    threads: usize,
}

impl DescSpec {
    /// Creates a specification from per-map-variable and per-variable
    /// order bounds.
    #[must_use]
    pub fn new(mvar_ords: impl Into<Vec<u8>>, var_ords: impl Into<Vec<u8>>) -> Self {
        Self {
            mvar_ords: mvar_ords.into(),
            knob_ords: Vec::new(),
            var_ords: var_ords.into(),
            trunc: None,
            threads: 1,
        }
    }

    /// Sets the knob order bounds.
    #[must_use]
    pub fn knobs(mut self, knob_ords: impl Into<Vec<u8>>) -> Self {
        self.knob_ords = knob_ords.into();
        self
    }

    /// Sets the truncation order (defaults to the maximum map-variable
    /// bound).
    #[must_use]
    pub fn trunc(mut self, to: u8) -> Self {
        self.trunc = Some(to);
        self
    }

    /// Sets the number of worker-thread slots (minimum 1).
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Number of map variables.
    #[must_use]
    pub fn nmv(&self) -> usize {
        self.mvar_ords.len()
    }

    /// Total number of variables.
    #[must_use]
    pub fn nv(&self) -> usize {
        self.var_ords.len()
    }

    /// Maximum order: the largest map-variable bound.
    #[must_use]
    pub fn mo(&self) -> u8 {
        self.mvar_ords.iter().copied().max().unwrap_or(0)
    }

    /// Knob order: the largest knob bound, 0 without knobs.
    #[must_use]
    pub fn ko(&self) -> u8 {
        self.knob_ords.iter().copied().max().unwrap_or(0)
    }

    /// Truncation order.
    #[must_use]
    pub fn to(&self) -> u8 {
        self.trunc.unwrap_or_else(|| self.mo())
    }

    /// The interning signature: everything that determines the tables.
    #[must_use]
    pub fn signature(&self) -> DescSignature {
        DescSignature {
            nmv: self.nmv(),
            nv: self.nv(),
            mo: self.mo(),
            ko: self.ko(),
            to: self.to(),
            mvar_ords: self.mvar_ords.clone(),
            knob_ords: self.knob_ords.clone(),
            var_ords: self.var_ords.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.mvar_ords.is_empty() {
            return Err(Error::InvalidSpec(
                "at least one map variable is required".into(),
            ));
        }
        if self.nmv() > self.nv() {
            return Err(Error::InvalidSpec(format!(
                "{} map variables exceed {} total variables",
                self.nmv(),
                self.nv()
            )));
        }
        if self.nv() > MAX_VAR {
            return Err(Error::InvalidSpec(format!(
                "{} variables exceed the maximum of {MAX_VAR}",
                self.nv()
            )));
        }
        if self.mvar_ords.iter().any(|&b| b == 0) {
            return Err(Error::InvalidSpec(
                "map-variable bounds must be at least 1".into(),
            ));
        }
        for (name, ords) in [
            ("map-variable", &self.mvar_ords),
            ("knob", &self.knob_ords),
            ("variable", &self.var_ords),
        ] {
            if let Some(&b) = ords.iter().find(|&&b| b > MAX_ORD) {
                return Err(Error::InvalidSpec(format!(
                    "{name} bound {b} exceeds the maximum order {MAX_ORD}"
                )));
            }
        }
        if self.to() > self.mo() {
            return Err(Error::InvalidSpec(format!(
                "truncation order {} exceeds maximum order {}",
                self.to(),
                self.mo()
            )));
        }
        Ok(())
    }
}

/// The interning key of a descriptor: `{nmv, nv, mo, ko, to, bounds}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DescSignature {
    /// Number of map variables.
    pub nmv: usize,
    /// Total number of variables.
    pub nv: usize,
    /// Maximum order.
    pub mo: u8,
    /// Knob order.
    pub ko: u8,
    /// Truncation order.
    pub to: u8,
    /// Per-map-variable bounds.
    pub mvar_ords: Vec<u8>,
    /// Knob bounds.
    pub knob_ords: Vec<u8>,
    /// Per-variable bounds.
    pub var_ords: Vec<u8>,
}

/// The shared, immutable monomial universe and its index tables.
///
/// Built once from a [`DescSpec`]; every series carries coefficients
/// indexed by this descriptor's order-major linear indices.
// Scalar header fields come first and keep their declared order; an
// embedding host reads them as a stable prefix.
#[derive(Debug)]
pub struct Descriptor {
    id: u32,
    nth: usize,
    nmv: usize,
    nv: usize,
    mo: u8,
    ko: u8,
    to: u8,
    nc: usize,
    mvar_ords: Vec<u8>,
    knob_ords: Vec<u8>,
    var_ords: Vec<u8>,
    tables: MonoTables,
    mul: MulTables,
    schedule: Vec<Vec<u8>>,
    tmps: TmpPool<f64>,
    ctmps: TmpPool<Complex64>,
}

impl Descriptor {
    /// Builds a descriptor, fully, or fails with
    /// [`Error::InvalidSpec`] without side effects.
    pub fn build(spec: &DescSpec) -> Result<Self> {
        spec.validate()?;
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let (mo, ko, to) = (spec.mo(), spec.ko(), spec.to());
        let nth = spec.threads;

        let tables = MonoTables::build(&spec.var_ords, to);
        let nc = tables.nc;
        let mul = MulTables::build(&tables, mo);
        let schedule = build_schedule(nth, to);
        let tmps = TmpPool::new(nth, id, mo, nc);
        let ctmps = TmpPool::new(nth, id, mo, nc);

        let desc = Self {
            id,
            nth,
            nmv: spec.nmv(),
            nv: spec.nv(),
            mo,
            ko,
            to,
            nc,
            mvar_ords: spec.mvar_ords.clone(),
            knob_ords: spec.knob_ords.clone(),
            var_ords: spec.var_ords.clone(),
            tables,
            mul,
            schedule,
            tmps,
            ctmps,
        };
        tracing::debug!(
            id,
            nc,
            triples = desc.mul.len(),
            bytes = desc.size_bytes(),
            "descriptor tables built"
        );
        Ok(desc)
    }

    /// Unique id of this descriptor.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of worker-thread slots.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.nth
    }

    /// Number of map variables.
    #[must_use]
    pub fn nmv(&self) -> usize {
        self.nmv
    }

    /// Total number of variables.
    #[must_use]
    pub fn nv(&self) -> usize {
        self.nv
    }

    /// Maximum order.
    #[must_use]
    pub fn mo(&self) -> u8 {
        self.mo
    }

    /// Knob order.
    #[must_use]
    pub fn ko(&self) -> u8 {
        self.ko
    }

    /// Truncation order.
    #[must_use]
    pub fn to(&self) -> u8 {
        self.to
    }

    /// Number of admissible monomials, the coefficient-array length of
    /// any full-order series built from this descriptor.
    #[must_use]
    pub fn nc(&self) -> usize {
        self.nc
    }

    /// Per-map-variable order bounds.
    #[must_use]
    pub fn mvar_ords(&self) -> &[u8] {
        &self.mvar_ords
    }

    /// Knob order bounds.
    #[must_use]
    pub fn knob_ords(&self) -> &[u8] {
        &self.knob_ords
    }

    /// Per-variable order bounds.
    #[must_use]
    pub fn var_ords(&self) -> &[u8] {
        &self.var_ords
    }

    /// The interning signature of this descriptor.
    #[must_use]
    pub fn signature(&self) -> DescSignature {
        DescSignature {
            nmv: self.nmv,
            nv: self.nv,
            mo: self.mo,
            ko: self.ko,
            to: self.to,
            mvar_ords: self.mvar_ords.clone(),
            knob_ords: self.knob_ords.clone(),
            var_ords: self.var_ords.clone(),
        }
    }

    /// Variables sorted by descending order bound: the significance
    /// permutation behind the variable-major ordering.
    #[must_use]
    pub fn sort_var(&self) -> &[usize] {
        &self.tables.sort_var
    }

    // === index resolver ===

    /// Exponent vector of order-major monomial `i`, or `None` outside
    /// `[0, nc)`.
    #[must_use]
    pub fn mono(&self, i: usize) -> Option<&[u8]> {
        self.tables.mono(i)
    }

    /// Total order of order-major monomial `i`, or `None` outside
    /// `[0, nc)`.
    #[must_use]
    pub fn mono_order(&self, i: usize) -> Option<u8> {
        self.tables.ords.get(i).copied()
    }

    /// The order-major index range of the order-`o` block, or `None`
    /// beyond the truncation order.
    #[must_use]
    pub fn order_span(&self, o: u8) -> Option<Range<usize>> {
        if o <= self.to {
            let o = usize::from(o);
            Some(self.tables.ord2idx[o]..self.tables.ord2idx[o + 1])
        } else {
            None
        }
    }

    /// Order-major index of a monomial in any encoding, or `None` when
    /// the encoding is malformed, a bound is violated, or the total
    /// order exceeds the truncation order.
    #[must_use]
    pub fn idx(&self, m: &MonoRepr<'_>) -> Option<usize> {
        let dense = m.to_dense(self.nv)?;
        self.tables.index_of(dense.exps())
    }

    /// Whether a monomial in any encoding lies inside the universe.
    ///
    /// Decoupled from [`idx`](Self::idx) so callers can validate before
    /// allocating.
    #[must_use]
    pub fn is_valid(&self, m: &MonoRepr<'_>) -> bool {
        m.to_dense(self.nv)
            .is_some_and(|d| self.tables.admissible(d.exps()))
    }

    /// Successor of a monomial in variable-major order, or `None` at
    /// exhaustion (or for a monomial outside the universe). Shorter
    /// dense inputs are zero-padded like every other lookup.
    #[must_use]
    pub fn next_by_var(&self, exps: &[u8]) -> Option<Mono> {
        let dense = MonoRepr::Dense(exps).to_dense(self.nv)?;
        self.tables.next_by_var(dense.exps())
    }

    // === multiplication tables ===

    /// The pairing list for operand orders `(oa, ob)`: every
    /// `(ia, ib, ic)` with `mono(ia) + mono(ib) = mono(ic)`.
    ///
    /// # Panics
    ///
    /// Panics if `oa` or `ob` exceeds the maximum order.
    #[must_use]
    pub fn mul_triples(&self, oa: u8, ob: u8) -> &[MulTriple] {
        self.mul.triples(oa, ob)
    }

    /// Length of the symmetric prefix of the `(oa, ob)` pairing list:
    /// the triples with `ia <= ib`, which a squaring kernel walks alone
    /// (doubling off-diagonal contributions) while a general multiply
    /// walks the whole list.
    ///
    /// # Panics
    ///
    /// Panics if `oa` or `ob` exceeds the maximum order.
    #[must_use]
    pub fn mul_split(&self, oa: u8, ob: u8) -> usize {
        self.mul.split(oa, ob)
    }

    /// The output orders thread `t` owns during a parallel multiply.
    ///
    /// # Panics
    ///
    /// Panics if `t` is not a thread slot of this descriptor.
    #[must_use]
    pub fn mul_schedule(&self, t: usize) -> &[u8] {
        &self.schedule[t]
    }

    // === series support ===

    /// Coefficient-array length of a series with working order `mo`.
    #[must_use]
    pub fn coef_len(&self, mo: u8) -> usize {
        self.tables.ord2idx[usize::from(mo.min(self.to)) + 1]
    }

    /// Acquires a real scratch series on thread slot `t`.
    ///
    /// The scratch contents are unspecified; callers initialize what
    /// they read. Released automatically when the guard drops.
    ///
    /// # Panics
    ///
    /// Panics if `t` is not a thread slot, or if the slot already has
    /// all 5 temporaries out (an unbalanced caller).
    #[must_use]
    pub fn tmp(&self, t: usize) -> TmpGuard<'_, f64> {
        self.tmps.acquire(t)
    }

    /// Acquires a complex scratch series on thread slot `t`.
    ///
    /// # Panics
    ///
    /// As [`tmp`](Self::tmp).
    #[must_use]
    pub fn ctmp(&self, t: usize) -> TmpGuard<'_, Complex64> {
        self.ctmps.acquire(t)
    }

    /// Approximate heap footprint of the tables in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.tables.size_bytes() + self.mul.size_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        // more map variables than variables
        let e = Descriptor::build(&DescSpec::new(vec![2, 2, 2], vec![2, 2]));
        assert!(matches!(e, Err(Error::InvalidSpec(_))));
        // bound above the hard maximum
        let e = Descriptor::build(&DescSpec::new(vec![64], vec![64]));
        assert!(matches!(e, Err(Error::InvalidSpec(_))));
        // truncation above the maximum order
        let e = Descriptor::build(&DescSpec::new(vec![2], vec![2]).trunc(3));
        assert!(matches!(e, Err(Error::InvalidSpec(_))));
        // no map variables
        let e = Descriptor::build(&DescSpec::new(vec![], vec![2]));
        assert!(matches!(e, Err(Error::InvalidSpec(_))));
    }

    #[test]
    fn test_spec_defaults() {
        let spec = DescSpec::new(vec![3, 2], vec![3, 2, 1]).knobs(vec![1]);
        assert_eq!(spec.mo(), 3);
        assert_eq!(spec.ko(), 1);
        assert_eq!(spec.to(), 3);
        assert_eq!(spec.threads, 1);
    }

    #[test]
    fn test_order_span() {
        let d = Descriptor::build(&DescSpec::new(vec![2, 2], vec![2, 2])).unwrap();
        assert_eq!(d.order_span(0), Some(0..1));
        assert_eq!(d.order_span(1), Some(1..3));
        assert_eq!(d.order_span(2), Some(3..6));
        assert_eq!(d.order_span(3), None);
    }

    #[test]
    fn test_resolver_encodings() {
        let d = Descriptor::build(&DescSpec::new(vec![2, 2], vec![2, 2])).unwrap();
        let i = d.idx(&MonoRepr::Dense(&[1, 1])).unwrap();
        assert_eq!(d.idx(&MonoRepr::Sparse(&[(0, 1), (1, 1)])), Some(i));
        assert_eq!(d.idx(&MonoRepr::Text("11")), Some(i));
        assert_eq!(d.mono(i), Some(&[1u8, 1][..]));
    }

    #[test]
    fn test_unique_ids() {
        let spec = DescSpec::new(vec![1], vec![1]);
        let a = Descriptor::build(&spec).unwrap();
        let b = Descriptor::build(&spec).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
