//! Monomial universe and its two sorted views.
//!
//! Everything here is built once per descriptor and read-only afterwards:
//! the flat monomial buffer (order-major, stride `nv`), the order table
//! (`ords`, `ord2idx`), the variable-major permutation (`to2tv`/`tv2to`
//! mutual inverses), and the rank matrix `H` that turns a monomial into
//! its variable-major position in O(nv).
//!
//! The universe is every exponent vector `e` with `e[v] <= bound[v]` and
//! total order `<= to`. Enumeration walks the variable-major order with
//! an odometer successor, so generation order *is* the `Tv` order and the
//! order-major view is a single stable sort away.

use betatron_mono::{cmp_order_major, cmp_var_major, Mono};

/// The monomial universe and its index tables.
///
/// Indices into the order-major view are the linear coefficient indices
/// of every series built from the owning descriptor.
#[derive(Debug)]
pub(crate) struct MonoTables {
    /// Total variable count.
    pub nv: usize,
    /// Truncation order.
    pub to: u8,
    /// Number of admissible monomials.
    pub nc: usize,
    /// Effective per-variable bounds: `min(bound, to)`.
    pub caps: Vec<u8>,
    /// Order-major flat monomial buffer, stride `nv`.
    pub monos: Vec<u8>,
    /// Total order of each order-major monomial.
    pub ords: Vec<u8>,
    /// `ord2idx[k]` = first order-major index of order `k`; `to + 2` entries.
    pub ord2idx: Vec<usize>,
    /// Variables sorted by descending bound; `sort_var[0]` is the most
    /// significant variable of the variable-major key.
    pub sort_var: Vec<usize>,
    /// Order-major index -> variable-major index.
    pub to2tv: Vec<usize>,
    /// Variable-major index -> order-major index.
    pub tv2to: Vec<usize>,
    /// Rank matrix over the variable-major ordering, `nv` rows of
    /// `to + 2` cumulative counts. Row `p` counts admissible suffixes at
    /// significance positions `> p`, prefix-summed over the order budget.
    h: Vec<usize>,
}

impl MonoTables {
    /// Builds all tables for the given per-variable bounds and
    /// truncation order.
    pub fn build(var_ords: &[u8], to: u8) -> Self {
        let nv = var_ords.len();
        let caps: Vec<u8> = var_ords.iter().map(|&b| b.min(to)).collect();
        let sort_var = build_sort_var(&caps);
        let (h, nc) = build_rank_matrix(&caps, &sort_var, to);

        // Enumerate the universe in variable-major order.
        let mut tv_monos = Vec::with_capacity(nc * nv);
        let mut exps = vec![0u8; nv];
        loop {
            tv_monos.extend_from_slice(&exps);
            if !advance(&mut exps, &caps, &sort_var, to) {
                break;
            }
        }
        debug_assert_eq!(tv_monos.len(), nc * nv);

        // Order-major view: stable sort of variable-major positions.
        let tv_mono = |j: usize| &tv_monos[j * nv..(j + 1) * nv];
        let mut to2tv: Vec<usize> = (0..nc).collect();
        to2tv.sort_by(|&a, &b| cmp_order_major(tv_mono(a), tv_mono(b)));

        let mut tv2to = vec![0usize; nc];
        let mut monos = vec![0u8; nc * nv];
        let mut ords = vec![0u8; nc];
        for (i, &j) in to2tv.iter().enumerate() {
            tv2to[j] = i;
            let m = tv_mono(j);
            monos[i * nv..(i + 1) * nv].copy_from_slice(m);
            ords[i] = m.iter().map(|&e| u32::from(e)).sum::<u32>() as u8;
        }

        let mut ord2idx = vec![0usize; to as usize + 2];
        for &o in &ords {
            ord2idx[o as usize + 1] += 1;
        }
        for k in 1..ord2idx.len() {
            ord2idx[k] += ord2idx[k - 1];
        }

        let tables = Self {
            nv,
            to,
            nc,
            caps,
            monos,
            ords,
            ord2idx,
            sort_var,
            to2tv,
            tv2to,
            h,
        };
        // Generation order must be the variable-major order and agree
        // with the rank matrix.
        debug_assert!((1..nc).all(|j| {
            cmp_var_major(tv_mono(j - 1), tv_mono(j), &tables.sort_var)
                == std::cmp::Ordering::Less
        }));
        debug_assert!((0..nc).all(|j| tables.rank(tv_mono(j)) == j));
        tables
    }

    /// Returns the exponent slice of order-major monomial `i`, or `None`
    /// outside `[0, nc)`.
    pub fn mono(&self, i: usize) -> Option<&[u8]> {
        if i < self.nc {
            Some(&self.monos[i * self.nv..(i + 1) * self.nv])
        } else {
            None
        }
    }

    /// Returns true if the exponent vector lies inside the universe.
    pub fn admissible(&self, exps: &[u8]) -> bool {
        exps.len() == self.nv
            && exps.iter().zip(&self.caps).all(|(&e, &c)| e <= c)
            && exps.iter().map(|&e| u32::from(e)).sum::<u32>() <= u32::from(self.to)
    }

    /// Variable-major position of an admissible monomial, in O(nv).
    ///
    /// Two `H` lookups per variable: the number of admissible monomials
    /// strictly below `m` that first differ at significance position `p`
    /// is a difference of cumulative suffix counts.
    pub fn rank(&self, exps: &[u8]) -> usize {
        debug_assert!(self.admissible(exps));
        let hcols = self.to as usize + 2;
        let mut budget = self.to as usize;
        let mut rank = 0;
        for (p, &v) in self.sort_var.iter().enumerate() {
            let e = exps[v] as usize;
            if e > 0 {
                let row = &self.h[p * hcols..(p + 1) * hcols];
                rank += row[budget + 1] - row[budget + 1 - e];
                budget -= e;
            }
        }
        rank
    }

    /// Order-major index of an admissible monomial, in O(nv).
    pub fn index_of(&self, exps: &[u8]) -> Option<usize> {
        if self.admissible(exps) {
            Some(self.tv2to[self.rank(exps)])
        } else {
            None
        }
    }

    /// Approximate heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        let idx_len = self.ord2idx.len()
            + self.sort_var.len()
            + self.to2tv.len()
            + self.tv2to.len()
            + self.h.len();
        self.monos.len() + self.ords.len() + self.caps.len()
            + idx_len * std::mem::size_of::<usize>()
    }

    /// Variable-major successor of an admissible monomial, or `None` at
    /// exhaustion (or on an inadmissible input).
    pub fn next_by_var(&self, exps: &[u8]) -> Option<Mono> {
        if !self.admissible(exps) {
            return None;
        }
        let mut next = exps.to_vec();
        if advance(&mut next, &self.caps, &self.sort_var, self.to) {
            Some(Mono::from_exps(&next))
        } else {
            None
        }
    }
}

/// Variables stably sorted by descending effective bound.
fn build_sort_var(caps: &[u8]) -> Vec<usize> {
    let mut vars: Vec<usize> = (0..caps.len()).collect();
    vars.sort_by(|&a, &b| caps[b].cmp(&caps[a]).then(a.cmp(&b)));
    vars
}

/// Builds the rank matrix and the universe size.
///
/// `cnt_le[p][k]` counts admissible assignments to the variables at
/// significance positions `>= p` with total order `<= k`; `nc` is
/// `cnt_le[0][to]`. Row `p` of `H` is the prefix sum over `k` of
/// `cnt_le[p + 1]`, shifted by one so `H[p][0] = 0`.
fn build_rank_matrix(caps: &[u8], sort_var: &[usize], to: u8) -> (Vec<usize>, usize) {
    let nv = caps.len();
    let cols = to as usize + 1;
    let mut cnt_le = vec![0usize; (nv + 1) * cols];
    cnt_le[nv * cols..].fill(1);
    for p in (0..nv).rev() {
        let cap = caps[sort_var[p]] as usize;
        for k in 0..cols {
            let mut sum = 0;
            for t in 0..=cap.min(k) {
                sum += cnt_le[(p + 1) * cols + (k - t)];
            }
            cnt_le[p * cols + k] = sum;
        }
    }
    let nc = cnt_le[cols - 1];

    let hcols = to as usize + 2;
    let mut h = vec![0usize; nv * hcols];
    for p in 0..nv {
        let mut acc = 0;
        for k in 0..cols {
            acc += cnt_le[(p + 1) * cols + k];
            h[p * hcols + k + 1] = acc;
        }
    }
    (h, nc)
}

/// Odometer successor in variable-major order.
///
/// Increments the least significant position that can grow without
/// leaving the universe, zeroing everything less significant. Returns
/// false when `exps` was the last monomial.
fn advance(exps: &mut [u8], caps: &[u8], sort_var: &[usize], to: u8) -> bool {
    let mut total: u32 = exps.iter().map(|&e| u32::from(e)).sum();
    for p in (0..sort_var.len()).rev() {
        let v = sort_var[p];
        if exps[v] < caps[v] && total < u32::from(to) {
            exps[v] += 1;
            return true;
        }
        total -= u32::from(exps[v]);
        exps[v] = 0;
    }
    false
}
