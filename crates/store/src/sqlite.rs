//! SQLite-backed series store.

use std::path::Path;

use ndarray::Array1;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tessera_primitives::{
    AssetClass, DatatypeMap, Date, DateRange, DtypeCode, SeriesError, SeriesKey, TimeSeries, Uid,
};
use tessera_traits::{SeriesStore, SeriesWriter, StoreError};

use crate::schema;

fn backend(err: rusqlite::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn class_of(conn: &Connection, uid: &Uid) -> Result<Option<AssetClass>, StoreError> {
    let name: Option<String> = conn
        .query_row("SELECT asset_class FROM Assets WHERE uid = ?1", params![uid.as_str()], |row| {
            row.get(0)
        })
        .optional()
        .map_err(backend)?;
    name.map(|n| n.parse::<AssetClass>().map_err(|e| StoreError::Backend(e.to_string())))
        .transpose()
}

/// Series store persisted in a SQLite database.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns `StoreError::Backend` if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref()).map_err(backend)?;
        tracing::debug!(path = %path.as_ref().display(), "opened series database");
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    /// Returns `StoreError::Backend` if the schema cannot be created.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(schema::ASSETS_TABLE, []).map_err(backend)?;
        self.conn.execute(schema::DATATYPE_TABLE, []).map_err(backend)?;
        for class in AssetClass::ALL {
            self.conn.execute(&schema::ts_table(class), []).map_err(backend)?;
        }
        Ok(())
    }

    /// Asset class registered for `uid`, if any.
    ///
    /// # Errors
    /// Returns `StoreError::Backend` if the lookup fails or the stored class
    /// is unreadable.
    pub fn asset_class(&self, uid: &Uid) -> Result<Option<AssetClass>, StoreError> {
        class_of(&self.conn, uid)
    }

    fn require_class(&self, uid: &Uid) -> Result<AssetClass, StoreError> {
        self.asset_class(uid)?.ok_or_else(|| StoreError::UnknownAsset(uid.clone()))
    }

    /// Register a datatype label under `code`.
    ///
    /// Returns `false` without changes if the label or the code is taken.
    ///
    /// # Errors
    /// Returns `StoreError::Backend` if the insert fails.
    pub fn register_datatype(&mut self, label: &str, code: DtypeCode) -> Result<bool, StoreError> {
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO DecDatatype (datatype, encoding) VALUES (?1, ?2)",
                params![label, code.0],
            )
            .map_err(backend)?;
        tracing::debug!(label, code = code.0, inserted = inserted > 0, "register datatype");
        Ok(inserted > 0)
    }

    /// Code registered for a datatype label.
    ///
    /// # Errors
    /// Returns `StoreError::UnknownDatatype` if the label is not registered.
    pub fn datatype_code(&self, label: &str) -> Result<DtypeCode, StoreError> {
        self.conn
            .query_row("SELECT encoding FROM DecDatatype WHERE datatype = ?1", params![label], |row| {
                row.get::<_, i64>(0)
            })
            .optional()
            .map_err(backend)?
            .map(DtypeCode)
            .ok_or_else(|| StoreError::UnknownDatatype(label.to_string()))
    }

    /// Full datatype map.
    ///
    /// # Errors
    /// Returns `StoreError::Backend` if the query fails.
    pub fn datatypes(&self) -> Result<DatatypeMap, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT datatype, encoding FROM DecDatatype ORDER BY encoding")
            .map_err(backend)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(backend)?;
        let mut map = DatatypeMap::new();
        for row in rows {
            let (label, code) = row.map_err(backend)?;
            map.insert(label, DtypeCode(code));
        }
        Ok(map)
    }

    fn exists(&self, table: &str, key: &SeriesKey) -> Result<bool, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT 1 FROM {table} WHERE uid = ?1 AND dtype = ?2 LIMIT 1"),
                params![key.uid.as_str(), key.dtype.0],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(backend)
    }

    fn read(&self, key: &SeriesKey, range: &DateRange) -> Result<TimeSeries, StoreError> {
        let class = self.asset_class(&key.uid)?.ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let table = class.ts_table();

        let mut stmt = self
            .conn
            .prepare_cached(&format!(
                "SELECT date, value FROM {table}
                 WHERE uid = ?1 AND dtype = ?2
                   AND (?3 IS NULL OR date >= ?3)
                   AND (?4 IS NULL OR date <= ?4)
                 ORDER BY date ASC"
            ))
            .map_err(backend)?;
        let rows = stmt
            .query_map(params![key.uid.as_str(), key.dtype.0, range.start, range.end], |row| {
                Ok((row.get::<_, Date>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(backend)?;

        let mut dates = Vec::new();
        let mut values = Vec::new();
        for row in rows {
            let (date, value) = row.map_err(backend)?;
            dates.push(date);
            values.push(value);
        }

        if dates.is_empty() && !self.exists(table, key)? {
            return Err(StoreError::NotFound(key.clone()));
        }
        tracing::debug!(uid = %key.uid, dtype = key.dtype.0, rows = dates.len(), "read series");
        Ok(TimeSeries::new(dates, Array1::from(values))?)
    }

    fn last_date(&self, table: &str, key: &SeriesKey) -> Result<Option<Date>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT MAX(date) FROM {table} WHERE uid = ?1 AND dtype = ?2"),
                params![key.uid.as_str(), key.dtype.0],
                |row| row.get::<_, Option<Date>>(0),
            )
            .map_err(backend)
    }
}

fn insert_points(
    tx: &Transaction<'_>,
    table: &str,
    key: &SeriesKey,
    series: &TimeSeries,
) -> Result<usize, StoreError> {
    let mut stmt = tx
        .prepare_cached(&format!(
            "INSERT INTO {table} (uid, dtype, date, value) VALUES (?1, ?2, ?3, ?4)"
        ))
        .map_err(backend)?;
    let mut written = 0;
    for (date, value) in series.iter().filter(|(_, v)| !v.is_nan()) {
        written += stmt.execute(params![key.uid.as_str(), key.dtype.0, date, value]).map_err(backend)?;
    }
    Ok(written)
}

impl SeriesStore for SqliteStore {
    fn fetch_series(&self, key: &SeriesKey) -> Result<TimeSeries, StoreError> {
        self.read(key, &DateRange::all())
    }

    fn fetch_range(&self, key: &SeriesKey, range: &DateRange) -> Result<TimeSeries, StoreError> {
        self.read(key, range)
    }

    fn contains(&self, key: &SeriesKey) -> Result<bool, StoreError> {
        match self.asset_class(&key.uid)? {
            Some(class) => self.exists(class.ts_table(), key),
            None => Ok(false),
        }
    }

    fn keys(&self) -> Result<Vec<SeriesKey>, StoreError> {
        let mut keys = Vec::new();
        for class in AssetClass::ALL {
            let mut stmt = self
                .conn
                .prepare(&format!("SELECT DISTINCT uid, dtype FROM {}", class.ts_table()))
                .map_err(backend)?;
            let rows = stmt
                .query_map([], |row| Ok(SeriesKey::new(row.get::<_, String>(0)?, row.get(1)?)))
                .map_err(backend)?;
            for row in rows {
                keys.push(row.map_err(backend)?);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl SeriesWriter for SqliteStore {
    fn register_asset(&mut self, uid: &Uid, class: AssetClass) -> Result<(), StoreError> {
        let tx = self.conn.transaction().map_err(backend)?;
        // Reclassification carries the stored rows over to the new class table.
        if let Some(previous) = class_of(&tx, uid)?
            && previous != class
        {
            let (from, to) = (previous.ts_table(), class.ts_table());
            let moved = tx
                .execute(
                    &format!(
                        "INSERT OR REPLACE INTO {to} (uid, dtype, date, value)
                         SELECT uid, dtype, date, value FROM {from} WHERE uid = ?1"
                    ),
                    params![uid.as_str()],
                )
                .map_err(backend)?;
            tx.execute(&format!("DELETE FROM {from} WHERE uid = ?1"), params![uid.as_str()])
                .map_err(backend)?;
            tracing::info!(uid = %uid, from = %previous, to = %class, moved, "reclassified asset");
        }
        tx.execute(
            "INSERT INTO Assets (uid, asset_class) VALUES (?1, ?2)
             ON CONFLICT(uid) DO UPDATE SET asset_class = excluded.asset_class",
            params![uid.as_str(), class.name()],
        )
        .map_err(backend)?;
        tx.commit().map_err(backend)?;
        tracing::debug!(uid = %uid, class = %class, "registered asset");
        Ok(())
    }

    fn write_series(&mut self, key: &SeriesKey, series: &TimeSeries) -> Result<usize, StoreError> {
        let table = self.require_class(&key.uid)?.ts_table();
        let tx = self.conn.transaction().map_err(backend)?;
        tx.execute(
            &format!("DELETE FROM {table} WHERE uid = ?1 AND dtype = ?2"),
            params![key.uid.as_str(), key.dtype.0],
        )
        .map_err(backend)?;
        let written = insert_points(&tx, table, key, series)?;
        tx.commit().map_err(backend)?;
        tracing::debug!(uid = %key.uid, dtype = key.dtype.0, written, "wrote series");
        Ok(written)
    }

    fn append(&mut self, key: &SeriesKey, series: &TimeSeries) -> Result<usize, StoreError> {
        let table = self.require_class(&key.uid)?.ts_table();
        if let (Some(last), Some(date)) = (self.last_date(table, key)?, series.first_date())
            && date <= last
        {
            return Err(SeriesError::NotAfterLast { date, last }.into());
        }
        let tx = self.conn.transaction().map_err(backend)?;
        let written = insert_points(&tx, table, key, series)?;
        tx.commit().map_err(backend)?;
        tracing::debug!(uid = %key.uid, dtype = key.dtype.0, written, "appended to series");
        Ok(written)
    }

    fn correct(&mut self, key: &SeriesKey, date: Date, value: f64) -> Result<(), StoreError> {
        let table = self.require_class(&key.uid)?.ts_table();
        let changed = if value.is_nan() {
            self.conn.execute(
                &format!("DELETE FROM {table} WHERE uid = ?1 AND dtype = ?2 AND date = ?3"),
                params![key.uid.as_str(), key.dtype.0, date],
            )
        } else {
            self.conn.execute(
                &format!("UPDATE {table} SET value = ?4 WHERE uid = ?1 AND dtype = ?2 AND date = ?3"),
                params![key.uid.as_str(), key.dtype.0, date, value],
            )
        }
        .map_err(backend)?;
        if changed == 0 {
            return Err(SeriesError::DateNotFound(date).into());
        }
        tracing::debug!(uid = %key.uid, dtype = key.dtype.0, %date, value, "corrected observation");
        Ok(())
    }

    fn delete_series(&mut self, key: &SeriesKey) -> Result<usize, StoreError> {
        let table = self.require_class(&key.uid)?.ts_table();
        let removed = self
            .conn
            .execute(
                &format!("DELETE FROM {table} WHERE uid = ?1 AND dtype = ?2"),
                params![key.uid.as_str(), key.dtype.0],
            )
            .map_err(backend)?;
        tracing::debug!(uid = %key.uid, dtype = key.dtype.0, removed, "deleted series");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn store() -> SqliteStore {
        let mut store = SqliteStore::in_memory().unwrap();
        store.register_asset(&Uid::new("EQ_ACME"), AssetClass::Equity).unwrap();
        store.register_asset(&Uid::new("FX_EURUSD"), AssetClass::Fx).unwrap();
        store
    }

    fn series() -> TimeSeries {
        TimeSeries::new(vec![d(2), d(3), d(4), d(5)], array![1.0, f64::NAN, 3.0, 4.0]).unwrap()
    }

    #[test]
    fn write_skips_missing_and_reads_back() {
        let mut store = store();
        let key = SeriesKey::new("EQ_ACME", 1);
        assert_eq!(store.write_series(&key, &series()).unwrap(), 3);

        let back = store.fetch_series(&key).unwrap();
        assert_eq!(back.dates(), &[d(2), d(4), d(5)]);
        assert_eq!(back.values(), &array![1.0, 3.0, 4.0]);
    }

    #[test]
    fn range_is_inclusive() {
        let mut store = store();
        let key = SeriesKey::new("EQ_ACME", 1);
        store.write_series(&key, &series()).unwrap();

        let cut = store.fetch_range(&key, &DateRange::between(d(3), d(4))).unwrap();
        assert_eq!(cut.dates(), &[d(4)]);
        let cut = store.fetch_range(&key, &DateRange::from(d(10))).unwrap();
        assert!(cut.is_empty());
    }

    #[test]
    fn missing_series_is_not_found() {
        let store = store();
        let key = SeriesKey::new("EQ_ACME", 9);
        assert!(matches!(store.fetch_series(&key), Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.fetch_range(&key, &DateRange::between(d(1), d(2))),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.fetch_series(&SeriesKey::new("NOPE", 1)),
            Err(StoreError::NotFound(_))
        ));
        assert!(!store.contains(&key).unwrap());
    }

    #[rstest]
    #[case(AssetClass::Bond, "BD_UST10")]
    #[case(AssetClass::Rate, "RT_EURIBOR3M")]
    #[case(AssetClass::Index, "IDX_SPX")]
    #[case(AssetClass::DerivedSeries, "DS_SPREAD")]
    #[case(AssetClass::CompanyFundamentals, "EQ_ACME_FUND")]
    fn every_class_has_a_table(#[case] class: AssetClass, #[case] uid: &str) {
        let mut store = store();
        store.register_asset(&Uid::new(uid), class).unwrap();
        let key = SeriesKey::new(uid, 3);
        assert_eq!(store.write_series(&key, &series()).unwrap(), 3);
        assert_eq!(store.asset_class(&key.uid).unwrap(), Some(class));
        assert_eq!(store.fetch_series(&key).unwrap().len(), 3);
    }

    #[test]
    fn reclassification_moves_rows() {
        let mut store = store();
        let key = SeriesKey::new("EQ_ACME", 1);
        let other = SeriesKey::new("EQ_ACME", 2);
        store.write_series(&key, &series()).unwrap();
        store.write_series(&other, &TimeSeries::new(vec![d(8)], array![8.0]).unwrap()).unwrap();

        store.register_asset(&key.uid, AssetClass::Index).unwrap();
        assert_eq!(store.asset_class(&key.uid).unwrap(), Some(AssetClass::Index));
        assert_eq!(store.fetch_series(&key).unwrap().dates(), &[d(2), d(4), d(5)]);
        assert_eq!(store.fetch_series(&other).unwrap().get(d(8)), Some(8.0));
        assert_eq!(store.keys().unwrap(), vec![key.clone(), other]);
        assert!(!store.exists(AssetClass::Equity.ts_table(), &key).unwrap());

        // Writes after the move land in the new table.
        let tail = TimeSeries::new(vec![d(9)], array![9.0]).unwrap();
        assert_eq!(store.append(&key, &tail).unwrap(), 1);
        assert_eq!(store.fetch_series(&key).unwrap().len(), 4);

        // Same class again is a no-op.
        store.register_asset(&key.uid, AssetClass::Index).unwrap();
        assert_eq!(store.fetch_series(&key).unwrap().len(), 4);
    }

    #[test]
    fn write_requires_registered_asset() {
        let mut store = store();
        let err = store.write_series(&SeriesKey::new("NOPE", 1), &series()).unwrap_err();
        assert!(matches!(err, StoreError::UnknownAsset(_)));
    }

    #[test]
    fn rewrite_replaces() {
        let mut store = store();
        let key = SeriesKey::new("FX_EURUSD", 1);
        store.write_series(&key, &series()).unwrap();
        let replacement = TimeSeries::new(vec![d(9)], array![1.1]).unwrap();
        store.write_series(&key, &replacement).unwrap();
        assert_eq!(store.fetch_series(&key).unwrap(), replacement);
    }

    #[test]
    fn append_after_tail_only() {
        let mut store = store();
        let key = SeriesKey::new("EQ_ACME", 1);
        store.write_series(&key, &series()).unwrap();

        let late = TimeSeries::new(vec![d(8), d(9)], array![8.0, 9.0]).unwrap();
        assert_eq!(store.append(&key, &late).unwrap(), 2);

        let stale = TimeSeries::new(vec![d(9)], array![0.0]).unwrap();
        let err = store.append(&key, &stale).unwrap_err();
        assert!(matches!(err, StoreError::Series(SeriesError::NotAfterLast { .. })));
        assert_eq!(store.fetch_series(&key).unwrap().len(), 5);
    }

    #[test]
    fn correct_and_delete() {
        let mut store = store();
        let key = SeriesKey::new("EQ_ACME", 1);
        store.write_series(&key, &series()).unwrap();

        store.correct(&key, d(4), 30.0).unwrap();
        assert_eq!(store.fetch_series(&key).unwrap().get(d(4)), Some(30.0));

        let err = store.correct(&key, d(3), 1.0).unwrap_err();
        assert!(matches!(err, StoreError::Series(SeriesError::DateNotFound(_))));

        assert_eq!(store.delete_series(&key).unwrap(), 3);
        assert!(!store.contains(&key).unwrap());
    }

    #[test]
    fn keys_span_tables() {
        let mut store = store();
        store.write_series(&SeriesKey::new("FX_EURUSD", 1), &series()).unwrap();
        store.write_series(&SeriesKey::new("EQ_ACME", 2), &series()).unwrap();
        store.write_series(&SeriesKey::new("EQ_ACME", 1), &series()).unwrap();
        assert_eq!(
            store.keys().unwrap(),
            vec![
                SeriesKey::new("EQ_ACME", 1),
                SeriesKey::new("EQ_ACME", 2),
                SeriesKey::new("FX_EURUSD", 1)
            ]
        );
    }

    #[test]
    fn datatypes_roundtrip() {
        let mut store = store();
        assert!(store.register_datatype("Price.Close", DtypeCode(1)).unwrap());
        assert!(store.register_datatype("Dividend", DtypeCode(2)).unwrap());
        assert!(!store.register_datatype("Price.Close", DtypeCode(3)).unwrap());
        assert!(!store.register_datatype("Other", DtypeCode(2)).unwrap());

        assert_eq!(store.datatype_code("Dividend").unwrap(), DtypeCode(2));
        assert!(matches!(store.datatype_code("Nope"), Err(StoreError::UnknownDatatype(_))));
        let map = store.datatypes().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.label(DtypeCode(1)), Some("Price.Close"));
    }

    #[test]
    fn reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.db");
        let key = SeriesKey::new("EQ_ACME", 1);
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.register_asset(&key.uid, AssetClass::Equity).unwrap();
            store.write_series(&key, &series()).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.asset_class(&key.uid).unwrap(), Some(AssetClass::Equity));
        assert_eq!(store.fetch_series(&key).unwrap().len(), 3);
    }
}
