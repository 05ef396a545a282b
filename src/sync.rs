//! Reconciliation between the store and the in-memory graph.
//!
//! The store is the durable owner of every record, the [`Catalog`] is what
//! the presentation layer reads. [`reload`] rebuilds a catalog purely from
//! store rows, and [`Registrar`] is the single entry point for user actions:
//! validate, write the store, then reload so the two never drift apart.

use std::fs::File;
use std::path::Path;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::codec;
use crate::db::{
    fetch_courses, fetch_instructors, fetch_registrations, fetch_students, RegistrationRow, Store,
};
use crate::error::{RecordsError, Result};
use crate::export;
use crate::models::{Course, CourseId, Instructor, InstructorId, Student, StudentId};
use crate::search::{SearchHits, SearchQuery};

/// A stored row whose fields fail validation, for example an email written
/// by another tool. It stays in the store so it can be edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub table: &'static str,
    pub key: String,
    pub reason: String,
}

/// Rows that reload could not validate or link and therefore skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Rows left out of the catalog because a field is invalid.
    pub rejected_rows: Vec<RejectedRow>,
    /// Courses whose stored instructor id matches no instructor row. These
    /// load as unassigned.
    pub unresolved_instructors: Vec<(CourseId, String)>,
    /// Registrations naming a student or course that no longer exists.
    pub orphaned_registrations: Vec<RegistrationRow>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.rejected_rows.is_empty()
            && self.unresolved_instructors.is_empty()
            && self.orphaned_registrations.is_empty()
    }

    fn reject(&mut self, table: &'static str, key: &str, err: RecordsError) {
        warn!(table, key, error = %err, "skipping invalid row");
        self.rejected_rows.push(RejectedRow {
            table,
            key: key.to_string(),
            reason: err.to_string(),
        });
    }
}

/// Discard nothing, trust nothing: read all four tables and build a fresh
/// catalog from them. Invalid rows and foreign ids that resolve to nothing are
/// reported and skipped rather than failing the reload, so one bad row never
/// blocks the commands that could repair it. Registrations of a skipped
/// student or course show up as orphans.
pub fn reload(store: &Store) -> Result<(Catalog, SyncReport)> {
    let (students, instructors, courses, registrations) = {
        let conn = store.connect()?;
        (
            fetch_students(&conn)?,
            fetch_instructors(&conn)?,
            fetch_courses(&conn)?,
            fetch_registrations(&conn)?,
        )
    };

    let mut catalog = Catalog::new();
    let mut report = SyncReport::default();

    for row in &students {
        match row.to_student() {
            Ok(student) => catalog.insert_student(student)?,
            Err(err) => report.reject("students", &row.student_id, err),
        }
    }
    for row in &instructors {
        match row.to_instructor() {
            Ok(instructor) => catalog.insert_instructor(instructor)?,
            Err(err) => report.reject("instructors", &row.instructor_id, err),
        }
    }

    for row in &courses {
        let course = match Course::new(&row.course_id, &row.course_name) {
            Ok(course) => course,
            Err(err) => {
                report.reject("courses", &row.course_id, err.into());
                continue;
            }
        };
        let course_id = course.id().clone();
        catalog.insert_course(course)?;

        let Some(raw) = &row.instructor_id else {
            continue;
        };
        match InstructorId::new(raw.as_str()) {
            Ok(instructor) if catalog.instructor(&instructor).is_some() => {
                catalog.assign(&instructor, &course_id)?;
            }
            _ => {
                warn!(course_id = %course_id, instructor_id = %raw, "course references a missing instructor; loading as unassigned");
                report.unresolved_instructors.push((course_id, raw.clone()));
            }
        }
    }

    for row in registrations {
        let pair = StudentId::new(row.student_id.as_str())
            .ok()
            .zip(CourseId::new(row.course_id.as_str()).ok())
            .filter(|(student, course)| {
                catalog.student(student).is_some() && catalog.course(course).is_some()
            });
        match pair {
            Some((student, course)) => catalog.enroll(&student, &course)?,
            None => {
                warn!(student_id = %row.student_id, course_id = %row.course_id, "skipping orphaned registration");
                report.orphaned_registrations.push(row);
            }
        }
    }

    Ok((catalog, report))
}

/// Owns the store handle and the catalog for the lifetime of the program.
/// Every mutating method validates its input, writes the store, and reloads
/// the catalog before returning.
pub struct Registrar {
    store: Store,
    catalog: Catalog,
    last_sync: SyncReport,
}

impl Registrar {
    pub fn open(store: Store) -> Result<Self> {
        let (catalog, last_sync) = reload(&store)?;
        Ok(Self {
            store,
            catalog,
            last_sync,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// What the most recent reload had to skip.
    pub fn last_sync(&self) -> &SyncReport {
        &self.last_sync
    }

    /// Rebuild the catalog from the store.
    pub fn resync(&mut self) -> Result<&SyncReport> {
        let (catalog, report) = reload(&self.store)?;
        self.catalog = catalog;
        self.last_sync = report;
        Ok(&self.last_sync)
    }

    pub fn add_student(&mut self, student_id: &str, name: &str, age: i64, email: &str) -> Result<()> {
        let student = Student::new(student_id, name, age, email)?;
        self.store.add_student(&student)?;
        info!(student_id, "added student");
        self.resync()?;
        Ok(())
    }

    pub fn add_instructor(
        &mut self,
        instructor_id: &str,
        name: &str,
        age: i64,
        email: &str,
    ) -> Result<()> {
        let instructor = Instructor::new(instructor_id, name, age, email)?;
        self.store.add_instructor(&instructor)?;
        info!(instructor_id, "added instructor");
        self.resync()?;
        Ok(())
    }

    pub fn add_course(&mut self, course_id: &str, course_name: &str) -> Result<()> {
        let course = Course::new(course_id, course_name)?;
        self.store.add_course(&course)?;
        info!(course_id, "added course");
        self.resync()?;
        Ok(())
    }

    pub fn update_student(&mut self, student_id: &str, name: &str, age: i64, email: &str) -> Result<()> {
        let student = Student::new(student_id, name, age, email)?;
        self.store.update_student(&student)?;
        info!(student_id, "updated student");
        self.resync()?;
        Ok(())
    }

    pub fn update_instructor(
        &mut self,
        instructor_id: &str,
        name: &str,
        age: i64,
        email: &str,
    ) -> Result<()> {
        let instructor = Instructor::new(instructor_id, name, age, email)?;
        self.store.update_instructor(&instructor)?;
        info!(instructor_id, "updated instructor");
        self.resync()?;
        Ok(())
    }

    pub fn update_course(&mut self, course_id: &str, course_name: &str) -> Result<()> {
        let course = Course::new(course_id, course_name)?;
        self.store.update_course(&course)?;
        info!(course_id, "updated course");
        self.resync()?;
        Ok(())
    }

    /// The student's registrations stay in the store; reload skips them.
    pub fn delete_student(&mut self, student_id: &str) -> Result<()> {
        self.store.delete_student(&StudentId::new(student_id)?)?;
        info!(student_id, "deleted student");
        self.resync()?;
        Ok(())
    }

    /// Courses keep the stale instructor id; reload shows them unassigned.
    pub fn delete_instructor(&mut self, instructor_id: &str) -> Result<()> {
        self.store.delete_instructor(&InstructorId::new(instructor_id)?)?;
        info!(instructor_id, "deleted instructor");
        self.resync()?;
        Ok(())
    }

    pub fn delete_course(&mut self, course_id: &str) -> Result<()> {
        self.store.delete_course(&CourseId::new(course_id)?)?;
        info!(course_id, "deleted course");
        self.resync()?;
        Ok(())
    }

    /// Register the first student named `student_name` into `course_id`.
    pub fn register(&mut self, student_name: &str, course_id: &str) -> Result<StudentId> {
        let course = CourseId::new(course_id)?;
        let student = self.store.register_student(student_name, &course)?;
        info!(student_id = %student, course_id, "registered student");
        self.resync()?;
        Ok(student)
    }

    pub fn unregister(&mut self, student_id: &str, course_id: &str) -> Result<()> {
        let student = StudentId::new(student_id)?;
        let course = CourseId::new(course_id)?;
        self.store.unregister_student(&student, &course)?;
        info!(student_id, course_id, "unregistered student");
        self.resync()?;
        Ok(())
    }

    /// Make the first instructor named `instructor_name` teach `course_id`.
    pub fn assign(&mut self, instructor_name: &str, course_id: &str) -> Result<InstructorId> {
        let course = CourseId::new(course_id)?;
        let instructor = self.store.assign_instructor(instructor_name, &course)?;
        info!(instructor_id = %instructor, course_id, "assigned instructor");
        self.resync()?;
        Ok(instructor)
    }

    pub fn unassign(&mut self, course_id: &str) -> Result<()> {
        self.store.unassign_instructor(&CourseId::new(course_id)?)?;
        info!(course_id, "unassigned instructor");
        self.resync()?;
        Ok(())
    }

    /// Students registered in a course, read straight from the join query.
    /// Rows that fail validation are left out, as reload does.
    pub fn registered_students(&self, course_id: &str) -> Result<Vec<Student>> {
        let rows = self.store.registered_students(&CourseId::new(course_id)?)?;
        Ok(rows
            .iter()
            .filter_map(|row| match row.to_student() {
                Ok(student) => Some(student),
                Err(err) => {
                    warn!(student_id = %row.student_id, error = %err, "skipping invalid row");
                    None
                }
            })
            .collect())
    }

    pub fn search(&self, query: &SearchQuery) -> SearchHits<'_> {
        query.run(&self.catalog)
    }

    /// Replace everything in the store with `catalog`, then reload.
    pub fn import(&mut self, catalog: &Catalog) -> Result<()> {
        self.store.replace_all(catalog)?;
        info!("imported records");
        self.resync()?;
        Ok(())
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        codec::save(&self.catalog, path)?;
        info!(path = %path.display(), "saved records to json");
        Ok(())
    }

    pub fn load_json(&mut self, path: &Path) -> Result<()> {
        let catalog = codec::load(path)?;
        self.import(&catalog)
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        export::write_csv(&self.catalog, file)?;
        info!(path = %path.display(), "exported records to csv");
        Ok(())
    }

    pub fn backup(&self, path: &Path) -> Result<()> {
        self.store.backup_to(path)
    }
}
