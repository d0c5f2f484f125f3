//! Step registry
//!
//! Provides [`StepRegistry`], the ordered, gap-free table from target version
//! to [`Step`]. The built-in registry is constructed once per process and
//! never mutated afterwards.

use once_cell::sync::Lazy;

use crate::error::{MigrationError, RegistryError};
use crate::step::Step;
use crate::steps;

static BUILTIN: Lazy<StepRegistry> = Lazy::new(|| {
    StepRegistry::new(steps::builtin_steps())
        .unwrap_or_else(|err| panic!("built-in step table is invalid: {err}"))
});

/// Ordered table of steps covering versions `1..=latest` with no gaps
#[derive(Debug, Clone)]
pub struct StepRegistry {
    // steps[i].version == i + 1
    steps: Vec<Step>,
}

impl StepRegistry {
    /// Build a registry, checking that versions run `1, 2, ..., n`
    ///
    /// # Errors
    /// Returns error on an empty table, a table not starting at 1,
    /// duplicate versions or gaps
    pub fn new(mut steps: Vec<Step>) -> Result<Self, RegistryError> {
        steps.sort_by_key(|step| step.version);

        let first = steps.first().ok_or(RegistryError::Empty)?.version;
        if first != 1 {
            return Err(RegistryError::BadStart(first));
        }
        for pair in steps.windows(2) {
            let (after, next) = (pair[0].version, pair[1].version);
            if after == next {
                return Err(RegistryError::Duplicate(next));
            }
            if next != after + 1 {
                return Err(RegistryError::Gap { after, next });
            }
        }
        Ok(Self { steps })
    }

    /// The process-wide registry of built-in steps
    #[inline]
    #[must_use]
    pub fn builtin() -> &'static StepRegistry {
        &BUILTIN
    }

    /// Highest registered version
    #[inline]
    #[must_use]
    pub fn latest(&self) -> u32 {
        self.steps.last().map_or(0, |step| step.version)
    }

    /// Step bound to `version`
    #[inline]
    #[must_use]
    pub fn get(&self, version: u32) -> Option<&Step> {
        let index = usize::try_from(version).ok()?.checked_sub(1)?;
        self.steps.get(index)
    }

    /// Steps taking a document from `current` to `target`, in ascending order
    ///
    /// Empty when `current >= target`.
    ///
    /// # Errors
    /// Returns [`MigrationError::UnregisteredTarget`] if `target` is above
    /// the latest registered version
    pub fn path(&self, current: u32, target: u32) -> Result<&[Step], MigrationError> {
        let latest = self.latest();
        if target > latest {
            return Err(MigrationError::UnregisteredTarget { target, latest });
        }
        if current >= target {
            return Ok(&[]);
        }
        // versions are 1-based; current .. target as indices covers current+1 ..= target
        let start = usize::try_from(current).unwrap_or(usize::MAX);
        let end = usize::try_from(target).unwrap_or(usize::MAX);
        Ok(&self.steps[start..end])
    }

    /// Number of registered steps
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a constructed registry
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate steps in ascending version order
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noops(versions: &[u32]) -> Vec<Step> {
        versions.iter().map(|v| Step::noop(*v)).collect()
    }

    #[test]
    fn registry_rejects_empty() {
        assert_eq!(StepRegistry::new(Vec::new()).unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn registry_rejects_bad_start() {
        let err = StepRegistry::new(noops(&[2, 3])).unwrap_err();
        assert_eq!(err, RegistryError::BadStart(2));
    }

    #[test]
    fn registry_rejects_gap() {
        let err = StepRegistry::new(noops(&[1, 2, 4])).unwrap_err();
        assert_eq!(err, RegistryError::Gap { after: 2, next: 4 });
    }

    #[test]
    fn registry_rejects_duplicate() {
        let err = StepRegistry::new(noops(&[1, 2, 2, 3])).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate(2));
    }

    #[test]
    fn registry_sorts_input() {
        let registry = StepRegistry::new(noops(&[3, 1, 2])).unwrap();
        let versions: Vec<u32> = registry.iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(registry.latest(), 3);
    }

    #[test]
    fn get_by_version() {
        let registry = StepRegistry::new(noops(&[1, 2, 3])).unwrap();
        assert_eq!(registry.get(2).map(|s| s.version), Some(2));
        assert!(registry.get(0).is_none());
        assert!(registry.get(4).is_none());
    }

    #[test]
    fn path_is_exclusive_inclusive() {
        let registry = StepRegistry::new(noops(&[1, 2, 3, 4, 5])).unwrap();
        let versions: Vec<u32> = registry.path(2, 5).unwrap().iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![3, 4, 5]);

        let from_zero: Vec<u32> = registry.path(0, 2).unwrap().iter().map(|s| s.version).collect();
        assert_eq!(from_zero, vec![1, 2]);
    }

    #[test]
    fn path_empty_when_current() {
        let registry = StepRegistry::new(noops(&[1, 2, 3])).unwrap();
        assert!(registry.path(3, 3).unwrap().is_empty());
        assert!(registry.path(40, 3).unwrap().is_empty());
    }

    #[test]
    fn path_past_latest_is_configuration_error() {
        let registry = StepRegistry::new(noops(&[1, 2, 3])).unwrap();
        let err = registry.path(1, 4).unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(err.version(), 4);
    }

    #[test]
    fn builtin_registry_is_gap_free() {
        let registry = StepRegistry::builtin();
        assert_eq!(registry.latest(), steps::LATEST_VERSION);
        assert_eq!(registry.len(), steps::LATEST_VERSION as usize);
        for (index, step) in registry.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1);
        }
    }
}
