use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::Patient;

#[derive(Debug)]
pub struct PatientFields<'a> {
    pub name: &'a str,
    pub age: i64,
    pub gender: &'a str,
    pub address: &'a str,
    pub phone: &'a str,
}

fn patient_from_row(row: &Row<'_>) -> Result<Patient, rusqlite::Error> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        address: row.get(4)?,
        phone: row.get(5)?,
    })
}

/// Pure insert; duplicates are permitted by design.
pub fn insert_patient(
    conn: &Connection,
    fields: &PatientFields<'_>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (name, age, gender, address, phone)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![fields.name, fields.age, fields.gender, fields.address, fields.phone],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Patients whose name OR phone contains the term (case-insensitive);
/// no term returns all. Ordered by name ascending.
pub fn list_patients(
    conn: &Connection,
    search: Option<&str>,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut patients = Vec::new();
    match search.filter(|s| !s.is_empty()) {
        Some(term) => {
            let pattern = format!("%{term}%");
            let mut stmt = conn.prepare(
                "SELECT id, name, age, gender, address, phone FROM patients
                 WHERE LOWER(name) LIKE LOWER(?1) OR LOWER(phone) LIKE LOWER(?1)
                 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![pattern], patient_from_row)?;
            for row in rows {
                patients.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, name, age, gender, address, phone FROM patients ORDER BY name",
            )?;
            let rows = stmt.query_map([], patient_from_row)?;
            for row in rows {
                patients.push(row?);
            }
        }
    }
    Ok(patients)
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Patient, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, age, gender, address, phone FROM patients WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], patient_from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(DatabaseError::NotFound { entity: "patient", id }),
    }
}

/// Full-row overwrite. Missing id is `NotFound`.
pub fn update_patient(
    conn: &Connection,
    id: i64,
    fields: &PatientFields<'_>,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE patients SET name=?1, age=?2, gender=?3, address=?4, phone=?5 WHERE id=?6",
        params![fields.name, fields.age, fields.gender, fields.address, fields.phone, id],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound { entity: "patient", id });
    }
    Ok(())
}

/// Unconditional delete. Does not cascade to medical records; those keep
/// referencing the missing id.
pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}
