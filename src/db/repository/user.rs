//! Staff account persistence. Admin-only at the route layer; this module
//! only enforces store-level invariants (unique username, known roles).

use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::{Role, User};

/// Fields for a new or replaced account. The hash is produced by the
/// caller; plaintext passwords never reach this module.
#[derive(Debug)]
pub struct UserFields<'a> {
    pub username: &'a str,
    pub role: Role,
    pub full_name: &'a str,
    pub email: &'a str,
}

fn user_from_row(row: &Row<'_>) -> Result<User, DatabaseError> {
    let role_text: String = row.get(2)?;
    let role = role_text
        .parse::<Role>()
        .map_err(|_| DatabaseError::InvalidEnum {
            field: "role",
            value: role_text,
        })?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        role,
        full_name: row.get(3)?,
        email: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "id, username, role, full_name, email, created_at";

/// All accounts, newest first. Same-second inserts tie-break on id.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], |row| Ok(user_from_row(row)))?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row??);
    }
    Ok(users)
}

/// Insert a new account. A duplicate username surfaces as `Conflict` and
/// leaves the store unchanged.
pub fn insert_user(
    conn: &Connection,
    fields: &UserFields<'_>,
    password_hash: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO users (username, password_hash, role, full_name, email)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            fields.username,
            password_hash,
            fields.role.as_str(),
            fields.full_name,
            fields.email,
        ],
    )
    .map_err(|e| {
        if DatabaseError::is_constraint_violation(&e) {
            DatabaseError::Conflict(format!("username already exists: {}", fields.username))
        } else {
            DatabaseError::Sqlite(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user(conn: &Connection, id: i64) -> Result<User, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id], |row| Ok(user_from_row(row)))?;
    match rows.next() {
        Some(row) => row?,
        None => Err(DatabaseError::NotFound { entity: "user", id }),
    }
}

/// Replace username/role/full name/email. The password hash is rehashed
/// only when `new_password_hash` is supplied; otherwise the stored hash is
/// preserved untouched. Missing id is `NotFound`.
pub fn update_user(
    conn: &Connection,
    id: i64,
    fields: &UserFields<'_>,
    new_password_hash: Option<&str>,
) -> Result<(), DatabaseError> {
    let affected = match new_password_hash {
        Some(hash) => conn
            .execute(
                "UPDATE users SET username=?1, password_hash=?2, role=?3, full_name=?4, email=?5
                 WHERE id=?6",
                params![fields.username, hash, fields.role.as_str(), fields.full_name, fields.email, id],
            )
            .map_err(map_conflict(fields.username))?,
        None => conn
            .execute(
                "UPDATE users SET username=?1, role=?2, full_name=?3, email=?4 WHERE id=?5",
                params![fields.username, fields.role.as_str(), fields.full_name, fields.email, id],
            )
            .map_err(map_conflict(fields.username))?,
    };

    if affected == 0 {
        return Err(DatabaseError::NotFound { entity: "user", id });
    }
    Ok(())
}

fn map_conflict(username: &str) -> impl Fn(rusqlite::Error) -> DatabaseError + '_ {
    move |e| {
        if DatabaseError::is_constraint_violation(&e) {
            DatabaseError::Conflict(format!("username already exists: {username}"))
        } else {
            DatabaseError::Sqlite(e)
        }
    }
}

/// Unconditional delete; a missing id is not an error.
pub fn delete_user(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(())
}

/// Credential lookup for the session gate. Returns (user, stored hash).
pub fn get_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<(User, String)>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"
    ))?;
    let mut rows = stmt.query_map(params![username], |row| {
        let hash: String = row.get(6)?;
        Ok(user_from_row(row).map(|u| (u, hash)))
    })?;
    match rows.next() {
        Some(row) => Ok(Some(row??)),
        None => Ok(None),
    }
}
