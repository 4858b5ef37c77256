use std::collections::HashMap;
use std::sync::Arc;

use crate::models::bbox::BoundingBox;

use super::MonthlyData;

/// Cache key: the bounding box (bit-exact) plus the deduplicated, sorted
/// month set of the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    bbox_bits: [u64; 4],
    months: Vec<u32>,
}

impl LoadKey {
    pub fn new(bbox: &BoundingBox, months: &[u32]) -> Self {
        let mut months = months.to_vec();
        months.sort_unstable();
        months.dedup();
        LoadKey {
            bbox_bits: [
                bbox.west.to_bits(),
                bbox.east.to_bits(),
                bbox.south.to_bits(),
                bbox.north.to_bits(),
            ],
            months,
        }
    }
}

/// Explicit, caller-owned cache of loaded month sets.
///
/// Lifetime and invalidation are up to the owner; nothing here is
/// process-global, and identical requests share one `Arc` to the data.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<LoadKey, Arc<MonthlyData>>,
}

impl LoadCache {
    pub fn new() -> Self {
        LoadCache::default()
    }

    /// Return the cached data for (bbox, months), loading it with `load` on
    /// a miss. A failing load caches nothing.
    pub fn get_or_load<F, E>(
        &mut self,
        bbox: &BoundingBox,
        months: &[u32],
        load: F,
    ) -> Result<Arc<MonthlyData>, E>
    where
        F: FnOnce() -> Result<MonthlyData, E>,
    {
        let key = LoadKey::new(bbox, months);
        if let Some(hit) = self.entries.get(&key) {
            return Ok(Arc::clone(hit));
        }
        let data = Arc::new(load()?);
        self.entries.insert(key, Arc::clone(&data));
        Ok(data)
    }

    /// Drop one cached entry; true when it was present.
    pub fn invalidate(&mut self, bbox: &BoundingBox, months: &[u32]) -> bool {
        self.entries.remove(&LoadKey::new(bbox, months)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox::washington()
    }

    #[test]
    fn month_order_does_not_change_the_key() {
        let a = LoadKey::new(&bbox(), &[10, 11, 12, 1]);
        let b = LoadKey::new(&bbox(), &[1, 12, 11, 10, 10]);
        assert_eq!(a, b);
    }

    #[test]
    fn hit_skips_the_loader() {
        let mut cache = LoadCache::new();
        let months = [10, 11];

        let first = cache
            .get_or_load(&bbox(), &months, || Ok::<_, ()>(MonthlyData::new()))
            .expect("should load");
        let second = cache
            .get_or_load(&bbox(), &months, || -> Result<MonthlyData, ()> {
                panic!("loader must not run on a hit")
            })
            .expect("should hit");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_load_caches_nothing() {
        let mut cache = LoadCache::new();
        let result = cache.get_or_load(&bbox(), &[10], || Err::<MonthlyData, _>("boom"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let mut cache = LoadCache::new();
        cache
            .get_or_load(&bbox(), &[10], || Ok::<_, ()>(MonthlyData::new()))
            .expect("should load");
        assert!(cache.invalidate(&bbox(), &[10]));
        assert!(!cache.invalidate(&bbox(), &[10]));
        assert!(cache.is_empty());
    }
}
