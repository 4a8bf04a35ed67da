//! Per-thread temporary pools.
//!
//! Each descriptor preallocates a small stock of scratch series per
//! thread slot so hot arithmetic paths never allocate. Acquisition hands
//! out an RAII guard; release happens on drop, so usage nests like any
//! scoped resource. Running a slot dry means a caller is holding guards
//! it should have dropped, which is a bug, not an input condition, and
//! panics.
//!
//! Slots are mutex-wrapped only so the descriptor stays `Sync`; under
//! the one-thread-per-slot discipline each lock is uncontended and held
//! for the take/put instant, never across a guard's lifetime.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use num_traits::Zero;

use crate::series::Series;

/// Scratch series per thread slot.
pub(crate) const MAX_TMP: usize = 5;

#[derive(Debug)]
struct TmpSlot<T> {
    tmps: Vec<Option<Series<T>>>,
}

/// Preallocated scratch series, one stock per thread slot.
#[derive(Debug)]
pub(crate) struct TmpPool<T> {
    slots: Vec<Mutex<TmpSlot<T>>>,
}

impl<T> TmpPool<T> {
    pub fn new(nth: usize, desc_id: u32, mo: u8, len: usize) -> Self
    where
        T: Zero + Clone,
    {
        let slots = (0..nth)
            .map(|_| {
                Mutex::new(TmpSlot {
                    tmps: (0..MAX_TMP)
                        .map(|_| Some(Series::raw(desc_id, mo, len)))
                        .collect(),
                })
            })
            .collect();
        Self { slots }
    }

    /// Takes an unused scratch series from slot `thread`.
    ///
    /// # Panics
    ///
    /// Panics if `thread` is not a slot, or if all temporaries of the
    /// slot are already out.
    pub fn acquire(&self, thread: usize) -> TmpGuard<'_, T> {
        assert!(
            thread < self.slots.len(),
            "thread index {thread} out of range for {} pool slots",
            self.slots.len()
        );
        let mut slot = self.slots[thread]
            .lock()
            .expect("temporary-pool mutex poisoned");
        for (index, entry) in slot.tmps.iter_mut().enumerate() {
            if let Some(series) = entry.take() {
                return TmpGuard {
                    pool: self,
                    thread,
                    index,
                    series: Some(series),
                };
            }
        }
        panic!("temporary pool exhausted: thread {thread} already holds {MAX_TMP} temporaries");
    }
}

/// An acquired scratch series; releases back to its pool on drop.
///
/// Dereferences to [`Series`]. Contents are whatever the previous user
/// left behind; initialize what you read.
#[derive(Debug)]
pub struct TmpGuard<'a, T> {
    pool: &'a TmpPool<T>,
    thread: usize,
    index: usize,
    series: Option<Series<T>>,
}

impl<T> Deref for TmpGuard<'_, T> {
    type Target = Series<T>;

    fn deref(&self) -> &Series<T> {
        self.series.as_ref().expect("scratch series present until drop")
    }
}

impl<T> DerefMut for TmpGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Series<T> {
        self.series.as_mut().expect("scratch series present until drop")
    }
}

impl<T> Drop for TmpGuard<'_, T> {
    fn drop(&mut self) {
        let mut slot = self.pool.slots[self.thread]
            .lock()
            .expect("temporary-pool mutex poisoned");
        slot.tmps[self.index] = self.series.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_recycles() {
        let pool: TmpPool<f64> = TmpPool::new(1, 0, 2, 6);
        {
            let mut a = pool.acquire(0);
            *a.coef_mut(0).unwrap() = 1.0;
            let b = pool.acquire(0);
            assert_eq!(b.len(), 6);
        }
        // all five fit once the guards are gone
        let guards: Vec<_> = (0..MAX_TMP).map(|_| pool.acquire(0)).collect();
        assert_eq!(guards.len(), MAX_TMP);
    }

    #[test]
    fn test_slots_are_independent() {
        let pool: TmpPool<f64> = TmpPool::new(2, 0, 1, 2);
        let _a: Vec<_> = (0..MAX_TMP).map(|_| pool.acquire(0)).collect();
        // slot 1 is unaffected by slot 0 being dry
        let _b = pool.acquire(1);
    }

    #[test]
    #[should_panic(expected = "temporary pool exhausted")]
    fn test_sixth_acquire_panics() {
        let pool: TmpPool<f64> = TmpPool::new(1, 0, 1, 2);
        let _guards: Vec<_> = (0..=MAX_TMP).map(|_| pool.acquire(0)).collect();
    }
}
