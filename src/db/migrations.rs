use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use super::schema::{CREATE_TABLES, INDEXES_V4, SCHEMA_VERSION, UNIFIED_TABLES_V2};

/// Kör alla nödvändiga migrationer
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_current_version(conn)?;

    if current_version == 0 {
        // Ny databas - skapa allt
        info!("Skapar ny databas med schema version {}", SCHEMA_VERSION);
        initial_setup(conn)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrerar databas från version {} till {}",
            current_version, SCHEMA_VERSION
        );
        migrate_from(conn, current_version)?;
    } else {
        info!("Databas är uppdaterad (version {})", current_version);
    }

    Ok(())
}

pub(crate) fn get_current_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_migrations')",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;

    Ok(version.unwrap_or(0))
}

fn initial_setup(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    conn.execute_batch(INDEXES_V4)?;

    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [SCHEMA_VERSION],
    )?;

    info!("Initial setup klar");
    Ok(())
}

fn migrate_from(conn: &Connection, from_version: i32) -> Result<()> {
    for version in (from_version + 1)..=SCHEMA_VERSION {
        match version {
            2 => migrate_v1_to_v2(conn)?,
            3 => migrate_v2_to_v3(conn)?,
            4 => migrate_v3_to_v4(conn)?,
            _ => {}
        }

        conn.execute(
            "INSERT INTO schema_migrations (version) VALUES (?)",
            [version],
        )?;

        info!("Migrerade till version {}", version);
    }

    Ok(())
}

/// Migration v1 -> v2: Enhetliga incheckningstabeller
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    info!("Migration v2: Skapar unified_checkin_configs och unified_checkins");
    conn.execute_batch(UNIFIED_TABLES_V2)?;
    Ok(())
}

/// Migration v2 -> v3: Koppla vanor till sin incheckningskonfiguration
fn migrate_v2_to_v3(conn: &Connection) -> Result<()> {
    info!("Migration v3: Lägger till unified_config_id i habits");

    conn.execute_batch(
        "ALTER TABLE habits ADD COLUMN unified_config_id INTEGER
             REFERENCES unified_checkin_configs(id) ON DELETE SET NULL;",
    )?;

    Ok(())
}

/// Migration v3 -> v4: Index för datumuppslag
fn migrate_v3_to_v4(conn: &Connection) -> Result<()> {
    info!("Migration v4: Skapar index");
    conn.execute_batch(INDEXES_V4)?;
    Ok(())
}
