use rusqlite::Connection;

/// Columns added after the first schema, with their definitions.
const ADDED_COLUMNS: &[(&str, &str, &str)] = &[
    ("stocks", "full_name", "TEXT"),
    ("stocks", "currency", "TEXT NOT NULL DEFAULT 'USD'"),
    ("alerts", "target_price", "REAL"),
];

/// Alert type labels written by earlier versions, mapped to current tags.
const LEGACY_ALERT_TYPES: &[(&str, &str)] = &[
    ("Price Drops From Recent High", "drop_from_high"),
    ("Price Rises From Recent Low", "rise_from_low"),
    ("Price Rises Above", "rise_above"),
    ("Price Falls Below", "fall_below"),
];

/// Initialize the database schema, creating tables if they don't exist and
/// upgrading databases written by earlier versions.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS stocks (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            ticker          TEXT    NOT NULL UNIQUE,
            full_name       TEXT,
            shares          REAL    NOT NULL DEFAULT 0,
            purchase_price  REAL    NOT NULL DEFAULT 0,
            currency        TEXT    NOT NULL DEFAULT 'USD'
        );

        CREATE TABLE IF NOT EXISTS alerts (
            id                    INTEGER PRIMARY KEY AUTOINCREMENT,
            stock_id              INTEGER NOT NULL REFERENCES stocks(id) ON DELETE CASCADE,
            alert_type            TEXT    NOT NULL,
            threshold_percent     REAL,
            target_price          REAL,
            is_active             INTEGER NOT NULL DEFAULT 1,
            last_benchmark_price  REAL,
            current_state         TEXT
        );",
    )?;

    add_missing_columns(conn)?;
    rename_legacy_alert_types(conn)?;

    // Older databases may hold several alerts of one type per stock; keep the newest.
    conn.execute_batch(
        "DELETE FROM alerts WHERE id NOT IN (
            SELECT MAX(id) FROM alerts GROUP BY stock_id, alert_type
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_alerts_stock_type ON alerts(stock_id, alert_type);
        CREATE INDEX IF NOT EXISTS idx_alerts_active ON alerts(is_active);",
    )?;
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM pragma_table_info('{table}') WHERE name = ?1"),
        [column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn add_missing_columns(conn: &Connection) -> Result<(), rusqlite::Error> {
    for (table, column, definition) in ADDED_COLUMNS {
        if !has_column(conn, table, column)? {
            tracing::info!("Migrating database: adding {table}.{column}");
            conn.execute_batch(&format!(
                "ALTER TABLE {table} ADD COLUMN {column} {definition}"
            ))?;
        }
    }
    Ok(())
}

fn rename_legacy_alert_types(conn: &Connection) -> Result<(), rusqlite::Error> {
    for (legacy, tag) in LEGACY_ALERT_TYPES {
        let changed = conn.execute(
            "UPDATE alerts SET alert_type = ?1 WHERE alert_type = ?2",
            [tag, legacy],
        )?;
        if changed > 0 {
            tracing::info!("Migrating database: renamed {changed} '{legacy}' alert(s)");
        }
    }
    Ok(())
}
