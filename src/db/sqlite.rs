use std::path::Path;

use rusqlite::{params, Connection};

use super::DatabaseError;
use crate::auth;
use crate::models::Role;

/// Open a SQLite connection to the given path, run migrations, and seed the
/// default admin account on first run. Used once at process start.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    seed_default_admin(&conn)?;
    Ok(conn)
}

/// Per-request connection: pragmas only, no migrations.
pub fn open_connection(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    Ok(conn)
}

/// Open an in-memory database with the full schema (for testing).
/// Does not seed the admin account; tests call `seed_default_admin` when
/// they need it.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    // foreign_keys stays off: medical_records.patient_id is declarative
    // only, and orphaned records must survive patient deletion. Set
    // explicitly because the bundled SQLite is built with
    // SQLITE_DEFAULT_FOREIGN_KEYS=1.
    conn.execute_batch("PRAGMA foreign_keys=OFF; PRAGMA journal_mode=DELETE;")?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// First-run setup: when the users table is empty, create the default
/// admin account (admin / admin123).
pub fn seed_default_admin(conn: &Connection) -> Result<(), DatabaseError> {
    let user_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if user_count > 0 {
        return Ok(());
    }

    tracing::info!("Seeding default admin account");
    let password_hash = auth::hash_password("admin123");
    conn.execute(
        "INSERT INTO users (username, password_hash, role, full_name, email)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            "admin",
            password_hash,
            Role::Admin.as_str(),
            "System Administrator",
            "admin@hospital.com",
        ],
    )?;
    Ok(())
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}
