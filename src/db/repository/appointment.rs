use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::Appointment;

#[derive(Debug)]
pub struct AppointmentFields<'a> {
    pub patient_name: &'a str,
    pub doctor_name: &'a str,
    pub date: &'a str,
    pub time: &'a str,
}

fn appointment_from_row(row: &Row<'_>) -> Result<Appointment, rusqlite::Error> {
    Ok(Appointment {
        id: row.get(0)?,
        patient_name: row.get(1)?,
        doctor_name: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
    })
}

/// Pure insert; patient/doctor names are free text, not validated against
/// the patient registry.
pub fn insert_appointment(
    conn: &Connection,
    fields: &AppointmentFields<'_>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (patient_name, doctor_name, date, time)
         VALUES (?1, ?2, ?3, ?4)",
        params![fields.patient_name, fields.doctor_name, fields.date, fields.time],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Substring match on patient OR doctor name; ordered date descending then
/// time descending. Ordering is lexicographic on the stored text and relies
/// on ISO-like date/time strings.
pub fn list_appointments(
    conn: &Connection,
    search: Option<&str>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut appointments = Vec::new();
    match search.filter(|s| !s.is_empty()) {
        Some(term) => {
            let pattern = format!("%{term}%");
            let mut stmt = conn.prepare(
                "SELECT id, patient_name, doctor_name, date, time FROM appointments
                 WHERE LOWER(patient_name) LIKE LOWER(?1) OR LOWER(doctor_name) LIKE LOWER(?1)
                 ORDER BY date DESC, time DESC",
            )?;
            let rows = stmt.query_map(params![pattern], appointment_from_row)?;
            for row in rows {
                appointments.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, patient_name, doctor_name, date, time FROM appointments
                 ORDER BY date DESC, time DESC",
            )?;
            let rows = stmt.query_map([], appointment_from_row)?;
            for row in rows {
                appointments.push(row?);
            }
        }
    }
    Ok(appointments)
}

/// The most recent `limit` appointments, for the dashboard.
pub fn recent_appointments(
    conn: &Connection,
    limit: i64,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_name, doctor_name, date, time FROM appointments
         ORDER BY date DESC, time DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], appointment_from_row)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row?);
    }
    Ok(appointments)
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Appointment, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_name, doctor_name, date, time FROM appointments WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], appointment_from_row)?;
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(DatabaseError::NotFound { entity: "appointment", id }),
    }
}

/// Full-row overwrite. Missing id is `NotFound`.
pub fn update_appointment(
    conn: &Connection,
    id: i64,
    fields: &AppointmentFields<'_>,
) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE appointments SET patient_name=?1, doctor_name=?2, date=?3, time=?4 WHERE id=?5",
        params![fields.patient_name, fields.doctor_name, fields.date, fields.time, id],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound { entity: "appointment", id });
    }
    Ok(())
}

/// Unconditional delete.
pub fn delete_appointment(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn count_appointments(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count)
}
