//! Field-level checks applied before any record is accepted. Each check hands
//! the value back untouched on success so constructors can chain them inline.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// `local-part@label.label...tld` where the final label is at least two
/// letters.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Identifier-like fields that only need to be non-blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    StudentId,
    InstructorId,
    CourseId,
    CourseName,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::StudentId => "Student ID",
            Field::InstructorId => "Instructor ID",
            Field::CourseId => "Course ID",
            Field::CourseName => "Course name",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name must be more than one character.")]
    Name,
    #[error("Age must be non-negative.")]
    NegativeAge(i64),
    #[error("Invalid email format.")]
    Email(String),
    #[error("{0} cannot be empty.")]
    Blank(Field),
}

/// Reject empty names and names shorter than two characters once trimmed.
pub fn validate_name(name: &str) -> Result<&str, ValidationError> {
    if name.trim().chars().count() < 2 {
        return Err(ValidationError::Name);
    }
    Ok(name)
}

/// Ages have no upper bound; only negatives are rejected.
pub fn validate_age(age: i64) -> Result<i64, ValidationError> {
    if age < 0 {
        return Err(ValidationError::NegativeAge(age));
    }
    Ok(age)
}

pub fn validate_email(email: &str) -> Result<&str, ValidationError> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::Email(email.to_string()));
    }
    Ok(email)
}

/// Shared check for ids and course names: anything but empty or all-whitespace.
pub fn validate_identifier(field: Field, value: &str) -> Result<&str, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(value)
}

pub fn validate_student_id(student_id: &str) -> Result<&str, ValidationError> {
    validate_identifier(Field::StudentId, student_id)
}

pub fn validate_instructor_id(instructor_id: &str) -> Result<&str, ValidationError> {
    validate_identifier(Field::InstructorId, instructor_id)
}

pub fn validate_course_id(course_id: &str) -> Result<&str, ValidationError> {
    validate_identifier(Field::CourseId, course_id)
}

pub fn validate_course_name(course_name: &str) -> Result<&str, ValidationError> {
    validate_identifier(Field::CourseName, course_name)
}
