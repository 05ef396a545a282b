//! Portable export document for saving the entity graph to a file and
//! loading it back.
//!
//! The document is deliberately denormalized: a course carries full copies of
//! its instructor and enrolled students, while students and instructors list
//! their courses by id. Decoding merges both directions, so a relationship
//! survives as long as either side recorded it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::Catalog;
use crate::error::{RecordsError, Result};
use crate::models::{Course, CourseId, Instructor, InstructorId, Student, StudentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDocument {
    pub name: String,
    pub age: i64,
    pub email: String,
    pub student_id: String,
    #[serde(default)]
    pub registered_courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorDocument {
    pub name: String,
    pub age: i64,
    pub email: String,
    pub instructor_id: String,
    #[serde(default)]
    pub assigned_courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDocument {
    pub course_id: String,
    pub course_name: String,
    #[serde(default)]
    pub instructor: Option<InstructorDocument>,
    #[serde(default)]
    pub enrolled_students: Vec<StudentDocument>,
}

/// Top-level file layout. Students and instructors are keyed by id, courses
/// by course id. Missing sections read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default)]
    pub students: IndexMap<String, StudentDocument>,
    #[serde(default)]
    pub instructors: IndexMap<String, InstructorDocument>,
    #[serde(default)]
    pub courses: IndexMap<String, CourseDocument>,
}

impl Student {
    pub fn to_document(&self) -> StudentDocument {
        StudentDocument {
            name: self.name().to_string(),
            age: self.person().age(),
            email: self.person().email().to_string(),
            student_id: self.id().to_string(),
            registered_courses: self.registered_courses().iter().map(CourseId::to_string).collect(),
        }
    }
}

impl Instructor {
    pub fn to_document(&self) -> InstructorDocument {
        InstructorDocument {
            name: self.name().to_string(),
            age: self.person().age(),
            email: self.person().email().to_string(),
            instructor_id: self.id().to_string(),
            assigned_courses: self.assigned_courses().iter().map(CourseId::to_string).collect(),
        }
    }
}

impl Course {
    /// Nest the full instructor and student documents. The catalog supplies
    /// the records behind the ids.
    pub fn to_document(&self, catalog: &Catalog) -> CourseDocument {
        CourseDocument {
            course_id: self.id().to_string(),
            course_name: self.name().to_string(),
            instructor: catalog.instructor_of(self).map(Instructor::to_document),
            enrolled_students: catalog
                .students_in(self)
                .into_iter()
                .map(Student::to_document)
                .collect(),
        }
    }
}

impl StudentDocument {
    fn to_student(&self) -> Result<Student> {
        Ok(Student::new(&self.student_id, &self.name, self.age, &self.email)?)
    }
}

impl InstructorDocument {
    fn to_instructor(&self) -> Result<Instructor> {
        Ok(Instructor::new(
            &self.instructor_id,
            &self.name,
            self.age,
            &self.email,
        )?)
    }
}

pub fn encode(catalog: &Catalog) -> ExportDocument {
    ExportDocument {
        students: catalog
            .students()
            .map(|s| (s.id().to_string(), s.to_document()))
            .collect(),
        instructors: catalog
            .instructors()
            .map(|i| (i.id().to_string(), i.to_document()))
            .collect(),
        courses: catalog
            .courses()
            .map(|c| (c.id().to_string(), c.to_document(catalog)))
            .collect(),
    }
}

/// Rebuild a catalog from a document. Every record goes through the
/// validating constructors; relationship ids that point nowhere are dropped.
pub fn decode(document: &ExportDocument) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    for doc in document.students.values() {
        catalog.insert_student(doc.to_student()?)?;
    }
    for doc in document.instructors.values() {
        catalog.insert_instructor(doc.to_instructor()?)?;
    }

    for doc in document.courses.values() {
        let course = Course::new(&doc.course_id, &doc.course_name)?;
        let course_id = course.id().clone();
        catalog.insert_course(course)?;

        if let Some(nested) = &doc.instructor {
            let instructor = InstructorId::new(nested.instructor_id.as_str())?;
            if catalog.instructor(&instructor).is_none() {
                catalog.insert_instructor(nested.to_instructor()?)?;
            }
            catalog.assign(&instructor, &course_id)?;
        }

        for nested in &doc.enrolled_students {
            let student = StudentId::new(nested.student_id.as_str())?;
            if catalog.student(&student).is_none() {
                catalog.insert_student(nested.to_student()?)?;
            }
            if !catalog.is_enrolled(&student, &course_id) {
                catalog.enroll(&student, &course_id)?;
            }
        }
    }

    for doc in document.students.values() {
        let student = StudentId::new(doc.student_id.as_str())?;
        for raw in &doc.registered_courses {
            match CourseId::new(raw.as_str()) {
                Ok(course) if catalog.course(&course).is_some() => {
                    if !catalog.is_enrolled(&student, &course) {
                        catalog.enroll(&student, &course)?;
                    }
                }
                _ => warn!(student_id = %student, course_id = %raw, "dropping registration to unknown course"),
            }
        }
    }

    for doc in document.instructors.values() {
        let instructor = InstructorId::new(doc.instructor_id.as_str())?;
        for raw in &doc.assigned_courses {
            let course = match CourseId::new(raw.as_str()) {
                Ok(course) => course,
                Err(_) => continue,
            };
            match catalog.course(&course).map(|c| c.instructor().cloned()) {
                Some(None) => catalog.assign(&instructor, &course)?,
                Some(Some(current)) if current != instructor => {
                    warn!(course_id = %course, instructor_id = %instructor, "course document names a different instructor; keeping it");
                }
                Some(Some(_)) => {}
                None => warn!(instructor_id = %instructor, course_id = %raw, "dropping assignment to unknown course"),
            }
        }
    }

    Ok(catalog)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Student,
    Instructor,
    Course,
}

impl EntityKind {
    fn label(self) -> &'static str {
        match self {
            EntityKind::Student => "student",
            EntityKind::Instructor => "instructor",
            EntityKind::Course => "course",
        }
    }

    fn detect(entry: &Value) -> Option<Self> {
        if entry.get("student_id").is_some() {
            Some(EntityKind::Student)
        } else if entry.get("instructor_id").is_some() {
            Some(EntityKind::Instructor)
        } else if entry.get("course_id").is_some() {
            Some(EntityKind::Course)
        } else {
            None
        }
    }
}

fn expect_kind(entry: &Value, expected: EntityKind) -> Result<()> {
    match EntityKind::detect(entry) {
        Some(found) if found != expected => Err(RecordsError::TypeMismatch {
            expected: expected.label(),
            found: found.label(),
        }),
        _ => Ok(()),
    }
}

fn expect_section(document: &Value, section: &str, expected: EntityKind) -> Result<()> {
    let Some(entries) = document.get(section).and_then(Value::as_object) else {
        return Ok(());
    };
    for entry in entries.values() {
        expect_kind(entry, expected)?;
        if expected == EntityKind::Course {
            if let Some(instructor) = entry.get("instructor").filter(|v| !v.is_null()) {
                expect_kind(instructor, EntityKind::Instructor)?;
            }
            if let Some(students) = entry.get("enrolled_students").and_then(Value::as_array) {
                for student in students {
                    expect_kind(student, EntityKind::Student)?;
                }
            }
        }
    }
    Ok(())
}

/// Check that every entry sits in the section for its kind, then parse.
pub fn document_from_value(value: Value) -> Result<ExportDocument> {
    expect_section(&value, "students", EntityKind::Student)?;
    expect_section(&value, "instructors", EntityKind::Instructor)?;
    expect_section(&value, "courses", EntityKind::Course)?;
    Ok(serde_json::from_value(value)?)
}

pub fn to_json(catalog: &Catalog) -> Result<String> {
    Ok(serde_json::to_string_pretty(&encode(catalog))?)
}

pub fn from_json(text: &str) -> Result<Catalog> {
    let value: Value = serde_json::from_str(text)?;
    decode(&document_from_value(value)?)
}

pub fn save(catalog: &Catalog, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &encode(catalog))?;
    writer.flush()?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Catalog> {
    let reader = BufReader::new(File::open(path)?);
    let value: Value = serde_json::from_reader(reader)?;
    decode(&document_from_value(value)?)
}
