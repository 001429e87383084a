//! In-memory series store.

use std::collections::BTreeMap;

use ndarray::Array1;
use tessera_primitives::{AssetClass, Date, DateRange, SeriesError, SeriesKey, TimeSeries, Uid};
use tessera_traits::{SeriesStore, SeriesWriter, StoreError};

/// `BTreeMap`-backed store with the same contract as [`crate::SqliteStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    assets: BTreeMap<Uid, AssetClass>,
    series: BTreeMap<SeriesKey, BTreeMap<Date, f64>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asset class registered for `uid`.
    #[must_use]
    pub fn asset_class(&self, uid: &Uid) -> Option<AssetClass> {
        self.assets.get(uid).copied()
    }

    fn require_asset(&self, uid: &Uid) -> Result<(), StoreError> {
        if self.assets.contains_key(uid) { Ok(()) } else { Err(StoreError::UnknownAsset(uid.clone())) }
    }
}

fn observed(series: &TimeSeries) -> impl Iterator<Item = (Date, f64)> + '_ {
    series.iter().filter(|(_, v)| !v.is_nan())
}

impl SeriesStore for MemoryStore {
    fn fetch_series(&self, key: &SeriesKey) -> Result<TimeSeries, StoreError> {
        self.fetch_range(key, &DateRange::all())
    }

    fn fetch_range(&self, key: &SeriesKey, range: &DateRange) -> Result<TimeSeries, StoreError> {
        let points = self.series.get(key).ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let (dates, values): (Vec<Date>, Vec<f64>) =
            points.iter().filter(|(d, _)| range.contains(**d)).map(|(d, v)| (*d, *v)).unzip();
        Ok(TimeSeries::new(dates, Array1::from(values))?)
    }

    fn contains(&self, key: &SeriesKey) -> Result<bool, StoreError> {
        Ok(self.series.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<SeriesKey>, StoreError> {
        Ok(self.series.keys().cloned().collect())
    }
}

impl SeriesWriter for MemoryStore {
    fn register_asset(&mut self, uid: &Uid, class: AssetClass) -> Result<(), StoreError> {
        self.assets.insert(uid.clone(), class);
        Ok(())
    }

    fn write_series(&mut self, key: &SeriesKey, series: &TimeSeries) -> Result<usize, StoreError> {
        self.require_asset(&key.uid)?;
        let points: BTreeMap<Date, f64> = observed(series).collect();
        let written = points.len();
        if written == 0 {
            self.series.remove(key);
        } else {
            self.series.insert(key.clone(), points);
        }
        Ok(written)
    }

    fn append(&mut self, key: &SeriesKey, series: &TimeSeries) -> Result<usize, StoreError> {
        self.require_asset(&key.uid)?;
        let last = self.series.get(key).and_then(|p| p.keys().next_back().copied());
        if let (Some(last), Some(date)) = (last, series.first_date())
            && date <= last
        {
            return Err(SeriesError::NotAfterLast { date, last }.into());
        }
        let new: Vec<(Date, f64)> = observed(series).collect();
        let written = new.len();
        if written > 0 {
            self.series.entry(key.clone()).or_default().extend(new);
        }
        Ok(written)
    }

    fn correct(&mut self, key: &SeriesKey, date: Date, value: f64) -> Result<(), StoreError> {
        self.require_asset(&key.uid)?;
        let points = self
            .series
            .get_mut(key)
            .filter(|p| p.contains_key(&date))
            .ok_or(SeriesError::DateNotFound(date))?;
        if value.is_nan() {
            points.remove(&date);
            if points.is_empty() {
                self.series.remove(key);
            }
        } else {
            points.insert(date, value);
        }
        Ok(())
    }

    fn delete_series(&mut self, key: &SeriesKey) -> Result<usize, StoreError> {
        self.require_asset(&key.uid)?;
        Ok(self.series.remove(key).map_or(0, |p| p.len()))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn store() -> (MemoryStore, SeriesKey) {
        let mut store = MemoryStore::new();
        let key = SeriesKey::new("IDX_SPX", 1);
        store.register_asset(&key.uid, AssetClass::Index).unwrap();
        (store, key)
    }

    #[test]
    fn behaves_like_sqlite_store() {
        let (mut store, key) = store();
        let series =
            TimeSeries::new(vec![d(2), d(3), d(4)], array![1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(store.write_series(&key, &series).unwrap(), 2);
        assert_eq!(store.fetch_series(&key).unwrap().dates(), &[d(2), d(4)]);
        assert!(store.fetch_range(&key, &DateRange::from(d(5))).unwrap().is_empty());
        assert_eq!(store.asset_class(&key.uid), Some(AssetClass::Index));

        let stale = TimeSeries::new(vec![d(4)], array![0.0]).unwrap();
        assert!(matches!(
            store.append(&key, &stale),
            Err(StoreError::Series(SeriesError::NotAfterLast { .. }))
        ));

        store.correct(&key, d(2), 10.0).unwrap();
        assert_eq!(store.fetch_series(&key).unwrap().get(d(2)), Some(10.0));
        assert!(store.correct(&key, d(3), 1.0).is_err());

        assert_eq!(store.keys().unwrap(), vec![key.clone()]);
        assert_eq!(store.delete_series(&key).unwrap(), 2);
        assert!(matches!(store.fetch_series(&key), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn reclassification_keeps_series() {
        let (mut store, key) = store();
        let series = TimeSeries::new(vec![d(2), d(3)], array![1.0, 2.0]).unwrap();
        store.write_series(&key, &series).unwrap();

        store.register_asset(&key.uid, AssetClass::Equity).unwrap();
        assert_eq!(store.asset_class(&key.uid), Some(AssetClass::Equity));
        assert_eq!(store.fetch_series(&key).unwrap(), series);
        assert_eq!(store.keys().unwrap(), vec![key.clone()]);

        let tail = TimeSeries::new(vec![d(4)], array![3.0]).unwrap();
        assert_eq!(store.append(&key, &tail).unwrap(), 1);
        assert_eq!(store.fetch_series(&key).unwrap().len(), 3);
    }

    #[test]
    fn unknown_asset_is_rejected() {
        let mut store = MemoryStore::new();
        let err = store.write_series(&SeriesKey::new("X", 1), &TimeSeries::empty()).unwrap_err();
        assert!(matches!(err, StoreError::UnknownAsset(_)));
    }
}
