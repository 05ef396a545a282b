//! Domain models for the records core. Students and instructors share one
//! validated `Person` field-set and differ only in their identifier and the
//! relationship collection they own. Relationships are held as typed
//! identifiers rather than object references; the `Catalog` resolves them and
//! keeps both sides of every pairing in agreement.

use std::fmt;

use crate::validation::{
    validate_age, validate_course_id, validate_course_name, validate_email,
    validate_instructor_id, validate_name, validate_student_id, ValidationError,
};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a raw identifier. The value is stored as
            /// entered; only blank input is rejected.
            pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
                let raw = raw.into();
                $validate(&raw)?;
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// Primary key of the `students` table.
    StudentId,
    validate_student_id
);
identifier!(
    /// Primary key of the `instructors` table.
    InstructorId,
    validate_instructor_id
);
identifier!(
    /// Primary key of the `courses` table.
    CourseId,
    validate_course_id
);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fields common to every person record. The email stays private and is only
/// reachable through [`Person::email`], matching how the desktop form treats
/// it as contact data rather than a display column.
pub struct Person {
    name: String,
    age: i64,
    email: String,
}

impl Person {
    /// Validate all three fields up front. Either every check passes and a
    /// person comes back, or nothing is constructed.
    pub fn new(name: &str, age: i64, email: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name(name)?.to_string(),
            age: validate_age(age)?,
            email: validate_email(email)?.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> i64 {
        self.age
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = validate_name(name)?.to_string();
        Ok(())
    }

    pub fn set_age(&mut self, age: i64) -> Result<(), ValidationError> {
        self.age = validate_age(age)?;
        Ok(())
    }

    pub fn set_email(&mut self, email: &str) -> Result<(), ValidationError> {
        self.email = validate_email(email)?.to_string();
        Ok(())
    }

    /// Replace every field at once. Validation runs on the full set before
    /// anything is written, so a failed edit leaves the person untouched.
    pub fn replace(&mut self, name: &str, age: i64, email: &str) -> Result<(), ValidationError> {
        *self = Person::new(name, age, email)?;
        Ok(())
    }

    pub fn introduce(&self) -> String {
        format!(
            "Hello, my name is {} and I am {} years old.",
            self.name, self.age
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    person: Person,
    student_id: StudentId,
    /// Insertion order is registration order.
    registered_courses: Vec<CourseId>,
}

impl Student {
    pub fn new(student_id: &str, name: &str, age: i64, email: &str) -> Result<Self, ValidationError> {
        let person = Person::new(name, age, email)?;
        Ok(Self {
            person,
            student_id: StudentId::new(student_id)?,
            registered_courses: Vec::new(),
        })
    }

    pub fn id(&self) -> &StudentId {
        &self.student_id
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub(crate) fn person_mut(&mut self) -> &mut Person {
        &mut self.person
    }

    pub fn name(&self) -> &str {
        self.person.name()
    }

    pub fn registered_courses(&self) -> &[CourseId] {
        &self.registered_courses
    }

    /// Append a course reference. Only the student's side changes; the
    /// `Catalog` mirrors the pairing into the course.
    pub fn register_course(&mut self, course: &CourseId) {
        self.registered_courses.push(course.clone());
    }

    pub(crate) fn drop_course(&mut self, course: &CourseId) {
        self.registered_courses.retain(|c| c != course);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructor {
    person: Person,
    instructor_id: InstructorId,
    assigned_courses: Vec<CourseId>,
}

impl Instructor {
    pub fn new(
        instructor_id: &str,
        name: &str,
        age: i64,
        email: &str,
    ) -> Result<Self, ValidationError> {
        let person = Person::new(name, age, email)?;
        Ok(Self {
            person,
            instructor_id: InstructorId::new(instructor_id)?,
            assigned_courses: Vec::new(),
        })
    }

    pub fn id(&self) -> &InstructorId {
        &self.instructor_id
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub(crate) fn person_mut(&mut self) -> &mut Person {
        &mut self.person
    }

    pub fn name(&self) -> &str {
        self.person.name()
    }

    pub fn assigned_courses(&self) -> &[CourseId] {
        &self.assigned_courses
    }

    pub fn assign_course(&mut self, course: &CourseId) {
        self.assigned_courses.push(course.clone());
    }

    pub(crate) fn drop_course(&mut self, course: &CourseId) {
        self.assigned_courses.retain(|c| c != course);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    course_id: CourseId,
    course_name: String,
    instructor: Option<InstructorId>,
    enrolled_students: Vec<StudentId>,
}

impl Course {
    /// Courses start without an instructor; assignment is a separate step.
    pub fn new(course_id: &str, course_name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            course_id: CourseId::new(course_id)?,
            course_name: validate_course_name(course_name)?.to_string(),
            instructor: None,
            enrolled_students: Vec::new(),
        })
    }

    pub fn id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn name(&self) -> &str {
        &self.course_name
    }

    pub fn set_name(&mut self, course_name: &str) -> Result<(), ValidationError> {
        self.course_name = validate_course_name(course_name)?.to_string();
        Ok(())
    }

    pub fn instructor(&self) -> Option<&InstructorId> {
        self.instructor.as_ref()
    }

    pub(crate) fn set_instructor(&mut self, instructor: Option<InstructorId>) {
        self.instructor = instructor;
    }

    pub fn enrolled_students(&self) -> &[StudentId] {
        &self.enrolled_students
    }

    pub fn add_student(&mut self, student: &StudentId) {
        self.enrolled_students.push(student.clone());
    }

    pub(crate) fn drop_student(&mut self, student: &StudentId) {
        self.enrolled_students.retain(|s| s != student);
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.course_name, self.course_id)
    }
}

/// Either kind of person record. Used wherever students and instructors are
/// handled side by side (search hits, listings, introductions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member<'a> {
    Student(&'a Student),
    Instructor(&'a Instructor),
}

impl<'a> Member<'a> {
    pub fn person(&self) -> &'a Person {
        match self {
            Member::Student(student) => student.person(),
            Member::Instructor(instructor) => instructor.person(),
        }
    }

    pub fn id(&self) -> &'a str {
        match self {
            Member::Student(student) => student.id().as_str(),
            Member::Instructor(instructor) => instructor.id().as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Member::Student(_) => "student",
            Member::Instructor(_) => "instructor",
        }
    }

    pub fn introduce(&self) -> String {
        self.person().introduce()
    }
}
