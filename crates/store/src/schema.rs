//! Table layout of the SQLite backend.

use tessera_primitives::AssetClass;

pub(crate) const ASSETS_TABLE: &str = "CREATE TABLE IF NOT EXISTS Assets (
    uid TEXT PRIMARY KEY,
    asset_class TEXT NOT NULL
)";

pub(crate) const DATATYPE_TABLE: &str = "CREATE TABLE IF NOT EXISTS DecDatatype (
    datatype TEXT PRIMARY KEY,
    encoding INTEGER NOT NULL UNIQUE
)";

/// DDL for the time-series table of one asset class.
pub(crate) fn ts_table(class: AssetClass) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            uid TEXT NOT NULL,
            dtype INTEGER NOT NULL,
            date TEXT NOT NULL,
            value REAL NOT NULL,
            PRIMARY KEY (uid, dtype, date)
        ) WITHOUT ROWID",
        class.ts_table()
    )
}
