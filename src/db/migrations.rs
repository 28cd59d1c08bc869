//! Database migrations
//!
//! Schema creation for the ingredient store.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    if current_version < SCHEMA_VERSION {
        tracing::debug!(from = current_version, to = SCHEMA_VERSION, "schema migrated");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- INGREDIENTS
        -- One row per FDC food item
        -- ============================================
        CREATE TABLE ingredients (
            fdc_id INTEGER PRIMARY KEY,
            fdc_date TEXT NOT NULL,              -- ISO date: "2020-01-02"
            title TEXT NOT NULL
        );

        CREATE INDEX idx_ingredients_title ON ingredients(title);

        -- ============================================
        -- NUTRITION
        -- Amounts per 100 g
        -- ============================================
        CREATE TABLE nutrition (
            fdc_id INTEGER PRIMARY KEY REFERENCES ingredients(fdc_id) ON DELETE CASCADE,

            energy_kcal REAL NOT NULL DEFAULT 0,
            cholesterol_mg REAL NOT NULL DEFAULT 0,

            protein_g REAL NOT NULL DEFAULT 0,
            carbs_total_g REAL NOT NULL DEFAULT 0,
            carbs_sugar_g REAL NOT NULL DEFAULT 0,
            carbs_fibre_g REAL NOT NULL DEFAULT 0,
            fat_total_g REAL NOT NULL DEFAULT 0,
            fat_mono_g REAL NOT NULL DEFAULT 0,
            fat_poly_g REAL NOT NULL DEFAULT 0,
            fat_sat_g REAL NOT NULL DEFAULT 0,
            fat_trans_g REAL NOT NULL DEFAULT 0,

            calcium_mg REAL NOT NULL DEFAULT 0,
            folate_ug REAL NOT NULL DEFAULT 0,
            iron_mg REAL NOT NULL DEFAULT 0,
            magnesium_mg REAL NOT NULL DEFAULT 0,
            niacin_mg REAL NOT NULL DEFAULT 0,
            potassium_mg REAL NOT NULL DEFAULT 0,
            riboflavin_mg REAL NOT NULL DEFAULT 0,
            selenium_ug REAL NOT NULL DEFAULT 0,
            sodium_mg REAL NOT NULL DEFAULT 0,
            thiamin_mg REAL NOT NULL DEFAULT 0,
            vitamin_a_ug REAL NOT NULL DEFAULT 0,
            vitamin_b12_ug REAL NOT NULL DEFAULT 0,
            vitamin_b6_mg REAL NOT NULL DEFAULT 0,
            vitamin_c_mg REAL NOT NULL DEFAULT 0,
            vitamin_d_ug REAL NOT NULL DEFAULT 0,
            vitamin_e_mg REAL NOT NULL DEFAULT 0,
            zinc_mg REAL NOT NULL DEFAULT 0
        );

        -- ============================================
        -- PORTIONS
        -- Named serving sizes
        -- ============================================
        CREATE TABLE portions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fdc_id INTEGER NOT NULL REFERENCES ingredients(fdc_id) ON DELETE CASCADE,
            title TEXT NOT NULL CHECK(length(title) > 0),
            grams REAL NOT NULL CHECK(grams > 0)
        );

        CREATE INDEX idx_portions_fdc_id ON portions(fdc_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Nutrition;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_nutrition_table_matches_model() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('nutrition')").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        let expected: Vec<&str> = std::iter::once("fdc_id")
            .chain(Nutrition::FIELDS.iter().map(|f| f.column_name()))
            .collect();
        assert_eq!(columns, expected);
    }

    #[test]
    fn test_portions_reject_invalid_rows() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO ingredients (fdc_id, fdc_date, title) VALUES (1, '2020-01-02', 'x')",
            [],
        )
        .unwrap();
        assert!(conn
            .execute("INSERT INTO portions (fdc_id, title, grams) VALUES (1, '', 10)", [])
            .is_err());
        assert!(conn
            .execute("INSERT INTO portions (fdc_id, title, grams) VALUES (1, 'cup', 0)", [])
            .is_err());
    }
}
