use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::{ffi, Connection, Error as SqlError, OptionalExtension};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{RecordsError, Result};

use super::{courses, instructors, registrations, students};

/// Handle to the on-disk SQLite database. The handle only remembers where the
/// file lives; every operation opens its own connection and drops it before
/// returning, so no connection outlives a single request.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Create the parent directory if needed, make sure the four tables exist,
    /// and return a handle to the database.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };

        if let Some(parent) = store.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut conn = store.connect()?;
        ensure_schema(&mut conn)?;
        info!(path = %store.path.display(), "opened records database");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Replace the contents of every table with `catalog` in one transaction.
    /// If any insert fails the transaction is dropped uncommitted and the
    /// database keeps its previous rows.
    pub fn replace_all(&self, catalog: &Catalog) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute_batch(
            "DELETE FROM registrations;
             DELETE FROM courses;
             DELETE FROM instructors;
             DELETE FROM students;",
        )?;

        for student in catalog.students() {
            students::insert_student(&tx, student)?;
        }
        for instructor in catalog.instructors() {
            instructors::insert_instructor(&tx, instructor)?;
        }
        for course in catalog.courses() {
            courses::insert_course(&tx, course)?;
            for student in course.enrolled_students() {
                registrations::insert_registration(&tx, student, course.id())?;
            }
        }

        tx.commit()?;
        debug!("replaced database contents");
        Ok(())
    }

    /// Write a consistent snapshot of the live database to `target`. SQLite
    /// refuses to overwrite an existing file here. The target is passed to
    /// SQLite as text, so a path that is not valid UTF-8 is rejected.
    pub fn backup_to(&self, target: &Path) -> Result<()> {
        let target_str = target.to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("backup path {} is not valid UTF-8", target.display()),
            )
        })?;
        let conn = self.connect()?;
        conn.execute("VACUUM INTO ?1", [target_str])?;
        info!(target = %target.display(), "backed up records database");
        Ok(())
    }
}

/// Create the four relations if they are missing. Foreign keys are declared
/// for documentation but `PRAGMA foreign_keys` stays off: deletes never
/// cascade and never fail on references, and reload treats orphaned ids as
/// unassigned.
fn ensure_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS students (
            student_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            email TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS instructors (
            instructor_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            email TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS courses (
            course_id TEXT PRIMARY KEY,
            course_name TEXT NOT NULL,
            instructor_id TEXT,
            FOREIGN KEY (instructor_id) REFERENCES instructors(instructor_id)
        );

        CREATE TABLE IF NOT EXISTS registrations (
            student_id TEXT NOT NULL,
            course_id TEXT NOT NULL,
            PRIMARY KEY (student_id, course_id),
            FOREIGN KEY (student_id) REFERENCES students(student_id),
            FOREIGN KEY (course_id) REFERENCES courses(course_id)
        );",
    )?;
    migrate_nullable_instructor(conn)
}

/// Databases written by the first version of the records program declare
/// `courses.instructor_id TEXT NOT NULL` and store `''` for "no instructor".
/// `CREATE TABLE IF NOT EXISTS` leaves that table alone, so rebuild it with a
/// nullable column and turn the empty strings into `NULL`.
fn migrate_nullable_instructor(conn: &mut Connection) -> Result<()> {
    let not_null: bool = conn
        .query_row(
            "SELECT \"notnull\" FROM pragma_table_info('courses') WHERE name = 'instructor_id'",
            [],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(false);
    if !not_null {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(
        "CREATE TABLE courses_migrated (
            course_id TEXT PRIMARY KEY,
            course_name TEXT NOT NULL,
            instructor_id TEXT,
            FOREIGN KEY (instructor_id) REFERENCES instructors(instructor_id)
        );

        INSERT INTO courses_migrated (course_id, course_name, instructor_id)
            SELECT course_id, course_name, NULLIF(TRIM(instructor_id), '')
            FROM courses ORDER BY rowid;

        DROP TABLE courses;
        ALTER TABLE courses_migrated RENAME TO courses;",
    )?;
    tx.commit()?;
    info!("migrated courses table to a nullable instructor column");
    Ok(())
}

/// Turn primary-key and unique collisions into `DuplicateKey` so the caller
/// can show which identifier was taken. Every other failure, including NOT
/// NULL, CHECK and foreign-key violations, passes through as `Storage`.
pub(crate) fn map_constraint(err: SqlError, entity: &'static str, key: &str) -> RecordsError {
    let collision = matches!(
        &err,
        SqlError::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    );
    if collision {
        RecordsError::duplicate(entity, key)
    } else {
        err.into()
    }
}
