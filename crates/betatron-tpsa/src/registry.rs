//! Descriptor interning and teardown.
//!
//! Rebuilding the tables for an identical specification is pure waste,
//! so the host owns one [`Registry`] and asks it for descriptors. The
//! registry interns by the `{nmv, nv, mo, ko, to, bounds}` signature:
//! an identical signature returns the already-built descriptor. The
//! thread-slot count is not part of the signature; the first-built
//! descriptor's capacity wins.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::descriptor::{DescSignature, DescSpec, Descriptor};
use crate::error::{Error, Result};

/// An explicit, host-owned store of built descriptors.
#[derive(Debug, Default)]
pub struct Registry {
    map: HashMap<DescSignature, Arc<Descriptor>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the descriptor for `spec`, building it on first request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for malformed parameters; nothing
    /// is registered in that case.
    pub fn get_or_create(&mut self, spec: &DescSpec) -> Result<Arc<Descriptor>> {
        let sig = spec.signature();
        if let Some(desc) = self.map.get(&sig) {
            return Ok(Arc::clone(desc));
        }
        let desc = Arc::new(Descriptor::build(spec)?);
        self.map.insert(sig, Arc::clone(&desc));
        Ok(desc)
    }

    /// Number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Releases every registered descriptor and its temporary pools.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DescriptorInUse`] and leaves the registry
    /// untouched if any descriptor is still referenced outside the
    /// registry; teardown is only valid once no caller holds live
    /// series or descriptor handles.
    pub fn teardown(&mut self) -> Result<()> {
        if let Some(live) = self.map.values().find(|d| Arc::strong_count(d) > 1) {
            return Err(Error::DescriptorInUse { id: live.id() });
        }
        self.map.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let mut reg = Registry::new();
        let spec = DescSpec::new(vec![2, 2], vec![2, 2]);
        let a = reg.get_or_create(&spec).unwrap();
        let b = reg.get_or_create(&spec).unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(reg.len(), 1);

        let c = reg
            .get_or_create(&DescSpec::new(vec![2, 2], vec![2, 2]).trunc(1))
            .unwrap();
        assert_ne!(a.id(), c.id());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_invalid_spec_not_registered() {
        let mut reg = Registry::new();
        assert!(reg
            .get_or_create(&DescSpec::new(vec![2], vec![]))
            .is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_teardown_guard() {
        let mut reg = Registry::new();
        let spec = DescSpec::new(vec![1], vec![1]);
        let held = reg.get_or_create(&spec).unwrap();
        let id = held.id();
        assert_eq!(reg.teardown(), Err(Error::DescriptorInUse { id }));
        assert_eq!(reg.len(), 1);

        drop(held);
        assert_eq!(reg.teardown(), Ok(()));
        assert!(reg.is_empty());
    }
}
