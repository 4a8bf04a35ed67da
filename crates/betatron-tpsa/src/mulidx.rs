//! Multiplication pairing tables.
//!
//! For a product `c = a * b`, the coefficient of a result monomial of
//! order `oc` sums over operand pairs whose monomials add up to it. The
//! tables here precompute, once per descriptor, every such pairing as an
//! `(ia, ib, ic)` index triple, bucketed by the ordered order pair
//! `(oa, ob)`, so a multiply kernel walks flat lists instead of
//! re-deriving combinatorics.
//!
//! Construction is output-sensitive: for each result monomial `mc` we
//! enumerate its splittings `ma + mb = mc` directly. The admissible set
//! is downward closed (any `ma <= mc` pointwise is itself admissible), so
//! every generated pair is valid and there is no candidate rejection.
//! Result orders build independently and fan out over rayon when the
//! universe is large enough to pay for it.

use rayon::prelude::*;

use crate::tables::MonoTables;

/// Universe size below which table construction stays sequential.
const PARALLEL_THRESHOLD: usize = 2048;

/// One precomputed multiplication pairing.
///
/// `ia` and `ib` are order-major indices of the operand monomials, `ic`
/// the order-major index of their product monomial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MulTriple {
    /// Order-major index of the first operand monomial.
    pub ia: u32,
    /// Order-major index of the second operand monomial.
    pub ib: u32,
    /// Order-major index of the result monomial.
    pub ic: u32,
}

/// A dense two-dimensional table indexed by an ordered order pair,
/// dimension `mo + 1` per axis.
#[derive(Clone, Debug)]
pub(crate) struct OrderPairTable<T> {
    dim: usize,
    cells: Vec<T>,
}

impl<T> OrderPairTable<T> {
    /// Returns the cell for `(oa, ob)`.
    ///
    /// # Panics
    ///
    /// Panics if either order is outside the table.
    pub fn get(&self, oa: u8, ob: u8) -> &T {
        assert!(
            usize::from(oa) < self.dim && usize::from(ob) < self.dim,
            "order pair ({oa}, {ob}) out of range for dimension {}",
            self.dim
        );
        &self.cells[usize::from(oa) * self.dim + usize::from(ob)]
    }
}

/// Sub-range bookkeeping for one `(oa, ob)` cell, offsets into the
/// shared triple arena. `[start, split)` holds the pairs with
/// `ia <= ib` (the squaring path region), `[split, end)` the mirrored
/// `ia > ib` pairs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TripleRange {
    start: usize,
    split: usize,
    end: usize,
}

/// All pairing lists of a descriptor: one flat arena plus per-cell
/// ranges.
#[derive(Debug)]
pub(crate) struct MulTables {
    triples: Vec<MulTriple>,
    ranges: OrderPairTable<TripleRange>,
}

impl MulTables {
    /// Builds the pairing tables over a finished monomial universe.
    pub fn build(t: &MonoTables, mo: u8) -> Self {
        let dim = usize::from(mo) + 1;
        let to = usize::from(t.to);

        let blocks: Vec<Vec<Vec<MulTriple>>> = if t.nc >= PARALLEL_THRESHOLD {
            (0..=to)
                .into_par_iter()
                .map(|oc| split_block(t, dim, oc))
                .collect()
        } else {
            (0..=to).map(|oc| split_block(t, dim, oc)).collect()
        };

        let mut cells: Vec<Vec<MulTriple>> = vec![Vec::new(); dim * dim];
        for block in blocks {
            for (cell, mut found) in cells.iter_mut().zip(block) {
                cell.append(&mut found);
            }
        }
        // Symmetric region first, then the mirrors; deterministic within
        // each region.
        for cell in &mut cells {
            cell.sort_unstable_by_key(|tr| (tr.ia > tr.ib, tr.ia, tr.ib));
        }

        let total = cells.iter().map(Vec::len).sum();
        let mut triples = Vec::with_capacity(total);
        let mut ranges = Vec::with_capacity(dim * dim);
        for cell in cells {
            let start = triples.len();
            let sym = cell.iter().take_while(|tr| tr.ia <= tr.ib).count();
            triples.extend(cell);
            ranges.push(TripleRange {
                start,
                split: start + sym,
                end: triples.len(),
            });
        }
        Self {
            triples,
            ranges: OrderPairTable { dim, cells: ranges },
        }
    }

    /// The full pairing list for `(oa, ob)`.
    pub fn triples(&self, oa: u8, ob: u8) -> &[MulTriple] {
        let r = self.ranges.get(oa, ob);
        &self.triples[r.start..r.end]
    }

    /// Length of the symmetric (`ia <= ib`) region of the `(oa, ob)`
    /// list.
    pub fn split(&self, oa: u8, ob: u8) -> usize {
        let r = self.ranges.get(oa, ob);
        r.split - r.start
    }

    /// Total number of stored triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Approximate heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.triples.len() * std::mem::size_of::<MulTriple>()
            + self.ranges.dim * self.ranges.dim * std::mem::size_of::<TripleRange>()
    }
}

/// Collects every splitting of every result monomial of order `oc`,
/// bucketed by the operand order pair.
fn split_block(t: &MonoTables, dim: usize, oc: usize) -> Vec<Vec<MulTriple>> {
    let nv = t.nv;
    let mut cells = vec![Vec::new(); dim * dim];
    let mut a = vec![0u8; nv];
    let mut b = vec![0u8; nv];
    for ic in t.ord2idx[oc]..t.ord2idx[oc + 1] {
        let mc = t.mono(ic).expect("result index inside universe");
        a.fill(0);
        loop {
            let mut oa = 0u32;
            for v in 0..nv {
                b[v] = mc[v] - a[v];
                oa += u32::from(a[v]);
            }
            let ob = oc as u32 - oa;
            let ia = t.tv2to[t.rank(&a)];
            let ib = t.tv2to[t.rank(&b)];
            cells[oa as usize * dim + ob as usize].push(MulTriple {
                ia: ia as u32,
                ib: ib as u32,
                ic: ic as u32,
            });
            // next divisor of mc, odometer in mixed base (mc[v] + 1)
            let mut v = 0;
            while v < nv {
                if a[v] < mc[v] {
                    a[v] += 1;
                    break;
                }
                a[v] = 0;
                v += 1;
            }
            if v == nv {
                break;
            }
        }
    }
    cells
}

/// Deals the output orders of a multiply across thread slots.
///
/// Orders `3..=to` are dealt round-robin in descending order for load
/// balance; orders 0..=2 are cheap and left to a kernel's serial
/// prologue.
pub(crate) fn build_schedule(nth: usize, to: u8) -> Vec<Vec<u8>> {
    let mut schedule = vec![Vec::new(); nth];
    if to >= 3 {
        let mut t = 0;
        for o in (3..=to).rev() {
            schedule[t].push(o);
            t = (t + 1) % nth;
        }
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing_two_vars() {
        let t = MonoTables::build(&[2, 2], 2);
        let m = MulTables::build(&t, 2);

        // order-major layout: 1, x0, x1, x0^2, x0*x1, x1^2
        assert_eq!(m.triples(0, 0), &[MulTriple { ia: 0, ib: 0, ic: 0 }]);

        let l11 = m.triples(1, 1);
        assert_eq!(
            l11,
            &[
                MulTriple { ia: 1, ib: 1, ic: 3 },
                MulTriple { ia: 1, ib: 2, ic: 4 },
                MulTriple { ia: 2, ib: 2, ic: 5 },
                MulTriple { ia: 2, ib: 1, ic: 4 },
            ]
        );
        assert_eq!(m.split(1, 1), 3);

        // oa + ob beyond the truncation order: empty
        assert!(m.triples(2, 2).is_empty());
        assert!(m.triples(2, 1).is_empty());
    }

    #[test]
    fn test_mirror_regions() {
        let t = MonoTables::build(&[2, 2], 2);
        let m = MulTables::build(&t, 2);
        // oa < ob: block oa precedes block ob, so ia < ib throughout
        assert_eq!(m.split(0, 1), m.triples(0, 1).len());
        // oa > ob: everything is a mirror
        assert_eq!(m.split(1, 0), 0);
        assert_eq!(m.triples(0, 1).len(), m.triples(1, 0).len());
    }

    #[test]
    fn test_sum_property() {
        let t = MonoTables::build(&[3, 2, 1], 3);
        let m = MulTables::build(&t, 3);
        for oa in 0..=3u8 {
            for ob in 0..=3u8 {
                for tr in m.triples(oa, ob) {
                    let ma = t.mono(tr.ia as usize).unwrap();
                    let mb = t.mono(tr.ib as usize).unwrap();
                    let mc = t.mono(tr.ic as usize).unwrap();
                    let sum: Vec<u8> =
                        ma.iter().zip(mb).map(|(&x, &y)| x + y).collect();
                    assert_eq!(sum, mc);
                    assert_eq!(t.ords[tr.ia as usize], oa);
                    assert_eq!(t.ords[tr.ib as usize], ob);
                    assert_eq!(t.ords[tr.ic as usize], oa + ob);
                }
            }
        }
    }

    #[test]
    fn test_schedule() {
        let s = build_schedule(2, 6);
        assert_eq!(s, vec![vec![6, 4], vec![5, 3]]);
        // below the parallel orders nothing is dealt
        assert_eq!(build_schedule(3, 2), vec![vec![], vec![], vec![]]);
    }
}
