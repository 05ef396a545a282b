use rusqlite::{params, Connection};
use tracing::debug;

use crate::catalog::INSTRUCTOR;
use crate::error::{RecordsError, Result};
use crate::models::{Instructor, InstructorId};

use super::connection::{map_constraint, Store};

/// Flat `instructors` row as stored. Assigned courses are not kept here;
/// they live on the course rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorRow {
    pub instructor_id: String,
    pub name: String,
    pub age: i64,
    pub email: String,
}

impl InstructorRow {
    /// Re-validate the stored fields. Fails when another writer left a value
    /// the validation rules reject.
    pub fn to_instructor(&self) -> Result<Instructor> {
        Ok(Instructor::new(
            &self.instructor_id,
            &self.name,
            self.age,
            &self.email,
        )?)
    }
}

/// Every instructor in insertion order, which is also the order name
/// resolution walks.
pub(crate) fn fetch_instructors(conn: &Connection) -> Result<Vec<InstructorRow>> {
    let mut stmt = conn
        .prepare("SELECT instructor_id, name, age, email FROM instructors ORDER BY rowid")?;

    let instructors = stmt
        .query_map([], |row| {
            Ok(InstructorRow {
                instructor_id: row.get(0)?,
                name: row.get(1)?,
                age: row.get(2)?,
                email: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(instructors)
}

/// Add a new instructor row. A taken id comes back as `DuplicateKey` and the
/// table is left as it was.
pub(crate) fn insert_instructor(conn: &Connection, instructor: &Instructor) -> Result<()> {
    let person = instructor.person();
    conn.execute(
        "INSERT INTO instructors (instructor_id, name, age, email) VALUES (?1, ?2, ?3, ?4)",
        params![
            instructor.id().as_str(),
            person.name(),
            person.age(),
            person.email()
        ],
    )
    .map_err(|err| map_constraint(err, INSTRUCTOR, instructor.id().as_str()))?;

    debug!(instructor_id = %instructor.id(), "inserted instructor");
    Ok(())
}

/// Overwrite name, age and email for an existing row. Never inserts.
pub(crate) fn update_instructor(conn: &Connection, instructor: &Instructor) -> Result<()> {
    let person = instructor.person();
    let updated = conn.execute(
        "UPDATE instructors SET name = ?1, age = ?2, email = ?3 WHERE instructor_id = ?4",
        params![
            person.name(),
            person.age(),
            person.email(),
            instructor.id().as_str()
        ],
    )?;

    if updated == 0 {
        Err(RecordsError::not_found(INSTRUCTOR, instructor.id().as_str()))
    } else {
        debug!(instructor_id = %instructor.id(), "updated instructor");
        Ok(())
    }
}

/// Courses keep pointing at the deleted id; reload reads them as unassigned.
pub(crate) fn delete_instructor(conn: &Connection, id: &InstructorId) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM instructors WHERE instructor_id = ?1",
        params![id.as_str()],
    )?;

    if deleted == 0 {
        Err(RecordsError::not_found(INSTRUCTOR, id.as_str()))
    } else {
        debug!(instructor_id = %id, "deleted instructor");
        Ok(())
    }
}

/// Scan every row and return the id of the first instructor whose name
/// matches exactly (case-sensitive).
pub(crate) fn find_instructor_id_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<InstructorId>> {
    fetch_instructors(conn)?
        .into_iter()
        .find(|row| row.name == name)
        .map(|row| InstructorId::new(row.instructor_id).map_err(RecordsError::from))
        .transpose()
}

impl Store {
    /// Insert one instructor. `DuplicateKey` if the id is taken.
    pub fn add_instructor(&self, instructor: &Instructor) -> Result<()> {
        let conn = self.connect()?;
        insert_instructor(&conn, instructor)
    }

    /// All instructor rows in insertion order.
    pub fn instructors(&self) -> Result<Vec<InstructorRow>> {
        let conn = self.connect()?;
        fetch_instructors(&conn)
    }

    /// Rewrite an existing instructor's fields. `NotFound` if the id is unknown.
    pub fn update_instructor(&self, instructor: &Instructor) -> Result<()> {
        let conn = self.connect()?;
        update_instructor(&conn, instructor)
    }

    /// Remove an instructor. Courses that pointed at them keep the stale id.
    pub fn delete_instructor(&self, id: &InstructorId) -> Result<()> {
        let conn = self.connect()?;
        delete_instructor(&conn, id)
    }

    /// Id of the first instructor with exactly this name, if any.
    pub fn instructor_id_by_name(&self, name: &str) -> Result<Option<InstructorId>> {
        let conn = self.connect()?;
        find_instructor_id_by_name(&conn, name)
    }
}
