//! Medical record persistence. Reads join to the patient registry: records
//! whose patient_id no longer resolves are silently excluded (inner join),
//! by design.

use rusqlite::{params, Connection, Row};

use crate::db::repository::patient;
use crate::db::DatabaseError;
use crate::models::{MedicalRecord, MedicalRecordWithPatient, Patient};

#[derive(Debug)]
pub struct MedicalRecordFields<'a> {
    pub patient_id: i64,
    pub doctor_name: &'a str,
    pub diagnosis: &'a str,
    pub treatment: &'a str,
    pub prescription: &'a str,
    pub notes: &'a str,
    pub visit_date: &'a str,
}

fn record_from_row(row: &Row<'_>) -> Result<MedicalRecord, rusqlite::Error> {
    Ok(MedicalRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_name: row.get(2)?,
        diagnosis: row.get(3)?,
        treatment: row.get(4)?,
        prescription: row.get(5)?,
        notes: row.get(6)?,
        visit_date: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn joined_from_row(row: &Row<'_>) -> Result<MedicalRecordWithPatient, rusqlite::Error> {
    Ok(MedicalRecordWithPatient {
        record: record_from_row(row)?,
        patient_name: row.get(9)?,
    })
}

const RECORD_COLUMNS: &str = "mr.id, mr.patient_id, mr.doctor_name, mr.diagnosis, \
     mr.treatment, mr.prescription, mr.notes, mr.visit_date, mr.created_at";

/// Insert a visit record. The patient id is not verified to exist here; a
/// dangling reference surfaces only when joined.
pub fn insert_record(
    conn: &Connection,
    fields: &MedicalRecordFields<'_>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medical_records
         (patient_id, doctor_name, diagnosis, treatment, prescription, notes, visit_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            fields.patient_id,
            fields.doctor_name,
            fields.diagnosis,
            fields.treatment,
            fields.prescription,
            fields.notes,
            fields.visit_date,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Records joined to patients, search over patient name OR doctor name OR
/// diagnosis, ordered by visit date descending.
pub fn list_records(
    conn: &Connection,
    search: Option<&str>,
) -> Result<Vec<MedicalRecordWithPatient>, DatabaseError> {
    let mut records = Vec::new();
    match search.filter(|s| !s.is_empty()) {
        Some(term) => {
            let pattern = format!("%{term}%");
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS}, p.name FROM medical_records mr
                 JOIN patients p ON mr.patient_id = p.id
                 WHERE LOWER(p.name) LIKE LOWER(?1)
                    OR LOWER(mr.doctor_name) LIKE LOWER(?1)
                    OR LOWER(mr.diagnosis) LIKE LOWER(?1)
                 ORDER BY mr.visit_date DESC"
            ))?;
            let rows = stmt.query_map(params![pattern], joined_from_row)?;
            for row in rows {
                records.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS}, p.name FROM medical_records mr
                 JOIN patients p ON mr.patient_id = p.id
                 ORDER BY mr.visit_date DESC"
            ))?;
            let rows = stmt.query_map([], joined_from_row)?;
            for row in rows {
                records.push(row?);
            }
        }
    }
    Ok(records)
}

/// One record with its patient name. An orphaned record (patient deleted)
/// does not resolve, same as the list view.
pub fn get_record(
    conn: &Connection,
    id: i64,
) -> Result<MedicalRecordWithPatient, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS}, p.name FROM medical_records mr
         JOIN patients p ON mr.patient_id = p.id
         WHERE mr.id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id], joined_from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(DatabaseError::NotFound { entity: "medical record", id }),
    }
}

/// The raw row without the join, for edit-form prefill.
pub fn get_record_raw(conn: &Connection, id: i64) -> Result<MedicalRecord, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records mr WHERE mr.id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id], record_from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(DatabaseError::NotFound { entity: "medical record", id }),
    }
}

/// Full-row overwrite. Missing id is `NotFound`.
pub fn update_record(
    conn: &Connection,
    id: i64,
    fields: &MedicalRecordFields<'_>,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE medical_records
         SET patient_id=?1, doctor_name=?2, diagnosis=?3, treatment=?4,
             prescription=?5, notes=?6, visit_date=?7
         WHERE id=?8",
        params![
            fields.patient_id,
            fields.doctor_name,
            fields.diagnosis,
            fields.treatment,
            fields.prescription,
            fields.notes,
            fields.visit_date,
            id,
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound { entity: "medical record", id });
    }
    Ok(())
}

/// Unconditional delete.
pub fn delete_record(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM medical_records WHERE id = ?1", params![id])?;
    Ok(())
}

/// A patient and their full visit history, newest visit first. Fails with
/// `NotFound` when the patient id does not resolve, even if orphaned
/// records still reference it.
pub fn patient_history(
    conn: &Connection,
    patient_id: i64,
) -> Result<(Patient, Vec<MedicalRecord>), DatabaseError> {
    let patient = patient::get_patient(conn, patient_id)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM medical_records mr
         WHERE mr.patient_id = ?1
         ORDER BY mr.visit_date DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id], record_from_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok((patient, records))
}
