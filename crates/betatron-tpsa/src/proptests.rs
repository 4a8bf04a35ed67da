//! Property-based tests for the descriptor tables.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use betatron_mono::MonoRepr;

    use crate::descriptor::{DescSpec, Descriptor};
    use crate::tests::{brute_pairs, brute_universe};

    // Strategy for small bound vectors plus an admissible truncation order
    fn small_spec() -> impl Strategy<Value = (Vec<u8>, u8)> {
        proptest::collection::vec(1u8..=3, 1..=4).prop_flat_map(|bounds| {
            let mo = *bounds.iter().max().unwrap();
            (Just(bounds), 0..=mo)
        })
    }

    fn build(bounds: &[u8], to: u8) -> Descriptor {
        Descriptor::build(&DescSpec::new(bounds.to_vec(), bounds.to_vec()).trunc(to)).unwrap()
    }

    proptest! {
        #[test]
        fn universe_count_matches_brute((bounds, to) in small_spec()) {
            let d = build(&bounds, to);
            prop_assert_eq!(d.nc(), brute_universe(&bounds, to).len());
        }

        #[test]
        fn mono_idx_round_trip((bounds, to) in small_spec()) {
            let d = build(&bounds, to);
            for i in 0..d.nc() {
                let m = d.mono(i).unwrap().to_vec();
                prop_assert_eq!(d.idx(&MonoRepr::Dense(&m)), Some(i));
            }
        }

        #[test]
        fn validity_agrees_with_lookup((bounds, to) in small_spec()) {
            let d = build(&bounds, to);
            // one past every bound to cover inadmissible vectors too
            let box_bounds: Vec<u8> = bounds.iter().map(|&b| b + 1).collect();
            for m in brute_universe(&box_bounds, 20) {
                let repr = MonoRepr::Dense(&m);
                prop_assert_eq!(d.is_valid(&repr), d.idx(&repr).is_some());
            }
        }

        #[test]
        fn order_blocks_are_exact((bounds, to) in small_spec()) {
            let d = build(&bounds, to);
            let mut covered = 0;
            for o in 0..=to {
                let span = d.order_span(o).unwrap();
                prop_assert_eq!(span.start, covered);
                for i in span.clone() {
                    prop_assert_eq!(d.mono_order(i), Some(o));
                }
                covered = span.end;
            }
            prop_assert_eq!(covered, d.nc());
        }

        #[test]
        fn next_by_var_is_a_permutation((bounds, to) in small_spec()) {
            let d = build(&bounds, to);
            let mut m = vec![0u8; d.nv()];
            let mut visited = vec![d.idx(&MonoRepr::Dense(&m)).unwrap()];
            while let Some(next) = d.next_by_var(&m) {
                m.copy_from_slice(next.exps());
                visited.push(d.idx(&MonoRepr::Dense(&m)).unwrap());
            }
            prop_assert_eq!(visited.len(), d.nc());
            visited.sort_unstable();
            visited.dedup();
            prop_assert_eq!(visited.len(), d.nc());
        }

        #[test]
        fn pairing_tables_match_oracle((bounds, to) in small_spec()) {
            let d = build(&bounds, to);
            let mut expected = brute_pairs(&d);
            expected.sort_unstable();

            let mut got = Vec::new();
            for oa in 0..=d.mo() {
                for ob in 0..=d.mo() {
                    for t in d.mul_triples(oa, ob) {
                        let ma = d.mono(t.ia as usize).unwrap();
                        let mb = d.mono(t.ib as usize).unwrap();
                        let mc = d.mono(t.ic as usize).unwrap();
                        let sum: Vec<u8> =
                            ma.iter().zip(mb).map(|(&a, &b)| a + b).collect();
                        prop_assert_eq!(&sum[..], mc);
                        got.push((t.ia, t.ib, t.ic));
                    }
                }
            }
            got.sort_unstable();
            prop_assert_eq!(got, expected);
        }
    }
}
