//! CSV export. One file holds three sections, each with its own header row,
//! so the writer runs in flexible mode (rows differ in width).

use std::io::Write;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::CourseId;

const STUDENT_HEADER: [&str; 5] = ["Student Name", "Age", "Email", "Student ID", "Registered Courses"];
const INSTRUCTOR_HEADER: [&str; 5] = ["Instructor Name", "Age", "Email", "Instructor ID", "Assigned Courses"];
const COURSE_HEADER: [&str; 4] = ["Course ID", "Course Name", "Instructor", "Enrolled Students"];
const NO_INSTRUCTOR: &str = "No instructor";

fn join_ids(ids: &[CourseId]) -> String {
    ids.iter().map(CourseId::as_str).collect::<Vec<_>>().join(", ")
}

pub fn write_csv<W: Write>(catalog: &Catalog, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);

    writer.write_record(STUDENT_HEADER)?;
    for student in catalog.students() {
        let person = student.person();
        writer.write_record([
            person.name(),
            person.age().to_string().as_str(),
            person.email(),
            student.id().as_str(),
            join_ids(student.registered_courses()).as_str(),
        ])?;
    }

    writer.write_record(INSTRUCTOR_HEADER)?;
    for instructor in catalog.instructors() {
        let person = instructor.person();
        writer.write_record([
            person.name(),
            person.age().to_string().as_str(),
            person.email(),
            instructor.id().as_str(),
            join_ids(instructor.assigned_courses()).as_str(),
        ])?;
    }

    writer.write_record(COURSE_HEADER)?;
    for course in catalog.courses() {
        let instructor = catalog
            .instructor_of(course)
            .map(|i| i.name())
            .unwrap_or(NO_INSTRUCTOR);
        let students = catalog
            .students_in(course)
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ");
        writer.write_record([course.id().as_str(), course.name(), instructor, students.as_str()])?;
    }

    writer.flush()?;
    Ok(())
}
