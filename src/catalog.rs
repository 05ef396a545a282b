//! The in-memory entity graph. A `Catalog` is an explicitly owned repository
//! object: it is built once (empty, from a document, or from the store) and
//! passed to whatever needs it. Every relationship mutation goes through here
//! so both sides of a student/course or instructor/course pairing change
//! together.

use indexmap::IndexMap;

use crate::error::{RecordsError, Result};
use crate::models::{Course, CourseId, Instructor, InstructorId, Member, Student, StudentId};

pub(crate) const STUDENT: &str = "Student";
pub(crate) const INSTRUCTOR: &str = "Instructor";
pub(crate) const COURSE: &str = "Course";
pub(crate) const REGISTRATION: &str = "Registration";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    students: IndexMap<StudentId, Student>,
    instructors: IndexMap<InstructorId, Instructor>,
    courses: IndexMap<CourseId, Course>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty() && self.instructors.is_empty() && self.courses.is_empty()
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }

    pub fn instructors(&self) -> impl Iterator<Item = &Instructor> {
        self.instructors.values()
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Students and instructors in one sequence, students first.
    pub fn members(&self) -> impl Iterator<Item = Member<'_>> {
        self.students()
            .map(Member::Student)
            .chain(self.instructors().map(Member::Instructor))
    }

    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.get(id)
    }

    pub fn instructor(&self, id: &InstructorId) -> Option<&Instructor> {
        self.instructors.get(id)
    }

    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.get(id)
    }

    /// First student whose name matches exactly, in catalog order.
    pub fn find_student_by_name(&self, name: &str) -> Option<&Student> {
        self.students().find(|s| s.name() == name)
    }

    /// First instructor whose name matches exactly, in catalog order.
    pub fn find_instructor_by_name(&self, name: &str) -> Option<&Instructor> {
        self.instructors().find(|i| i.name() == name)
    }

    /// Instructor record for a course, if one is assigned and still present.
    pub fn instructor_of(&self, course: &Course) -> Option<&Instructor> {
        course.instructor().and_then(|id| self.instructors.get(id))
    }

    pub fn students_in(&self, course: &Course) -> Vec<&Student> {
        course
            .enrolled_students()
            .iter()
            .filter_map(|id| self.students.get(id))
            .collect()
    }

    /// Add a student. Any courses it already lists must exist and are
    /// mirrored into those courses' enrolment lists.
    pub fn insert_student(&mut self, mut student: Student) -> Result<()> {
        if self.students.contains_key(student.id()) {
            return Err(RecordsError::duplicate(STUDENT, student.id().as_str()));
        }
        let courses = student.registered_courses().to_vec();
        for course in &courses {
            if !self.courses.contains_key(course) {
                return Err(RecordsError::not_found(COURSE, course.as_str()));
            }
        }
        for course in &courses {
            student.drop_course(course);
        }
        let id = student.id().clone();
        self.students.insert(id.clone(), student);
        for course in &courses {
            if !self.is_enrolled(&id, course) {
                self.enroll(&id, course)?;
            }
        }
        Ok(())
    }

    /// Add an instructor. Listed courses must exist and are reassigned to
    /// this instructor.
    pub fn insert_instructor(&mut self, mut instructor: Instructor) -> Result<()> {
        if self.instructors.contains_key(instructor.id()) {
            return Err(RecordsError::duplicate(INSTRUCTOR, instructor.id().as_str()));
        }
        let courses = instructor.assigned_courses().to_vec();
        for course in &courses {
            if !self.courses.contains_key(course) {
                return Err(RecordsError::not_found(COURSE, course.as_str()));
            }
        }
        for course in &courses {
            instructor.drop_course(course);
        }
        let id = instructor.id().clone();
        self.instructors.insert(id.clone(), instructor);
        for course in &courses {
            self.assign(&id, course)?;
        }
        Ok(())
    }

    /// Add a course along with any instructor and students it references.
    pub fn insert_course(&mut self, mut course: Course) -> Result<()> {
        if self.courses.contains_key(course.id()) {
            return Err(RecordsError::duplicate(COURSE, course.id().as_str()));
        }
        let instructor = course.instructor().cloned();
        let students = course.enrolled_students().to_vec();
        if let Some(instructor) = &instructor {
            if !self.instructors.contains_key(instructor) {
                return Err(RecordsError::not_found(INSTRUCTOR, instructor.as_str()));
            }
        }
        for student in &students {
            if !self.students.contains_key(student) {
                return Err(RecordsError::not_found(STUDENT, student.as_str()));
            }
        }
        course.set_instructor(None);
        for student in &students {
            course.drop_student(student);
        }
        let id = course.id().clone();
        self.courses.insert(id.clone(), course);
        if let Some(instructor) = instructor {
            self.assign(&instructor, &id)?;
        }
        for student in &students {
            if !self.is_enrolled(student, &id) {
                self.enroll(student, &id)?;
            }
        }
        Ok(())
    }

    pub fn is_enrolled(&self, student: &StudentId, course: &CourseId) -> bool {
        self.courses
            .get(course)
            .is_some_and(|c| c.enrolled_students().contains(student))
    }

    /// Pair a student with a course on both sides. A repeated pairing is a
    /// duplicate key, the same as the store's registration primary key.
    pub fn enroll(&mut self, student: &StudentId, course: &CourseId) -> Result<()> {
        if !self.students.contains_key(student) {
            return Err(RecordsError::not_found(STUDENT, student.as_str()));
        }
        if !self.courses.contains_key(course) {
            return Err(RecordsError::not_found(COURSE, course.as_str()));
        }
        if self.is_enrolled(student, course) {
            return Err(RecordsError::duplicate(
                REGISTRATION,
                format!("{student}/{course}"),
            ));
        }
        if let Some(s) = self.students.get_mut(student) {
            s.register_course(course);
        }
        if let Some(c) = self.courses.get_mut(course) {
            c.add_student(student);
        }
        Ok(())
    }

    pub fn withdraw(&mut self, student: &StudentId, course: &CourseId) -> Result<()> {
        if !self.is_enrolled(student, course) {
            return Err(RecordsError::not_found(
                REGISTRATION,
                format!("{student}/{course}"),
            ));
        }
        if let Some(s) = self.students.get_mut(student) {
            s.drop_course(course);
        }
        if let Some(c) = self.courses.get_mut(course) {
            c.drop_student(student);
        }
        Ok(())
    }

    /// Make `instructor` the sole instructor of `course`, moving the course
    /// off whoever taught it before.
    pub fn assign(&mut self, instructor: &InstructorId, course: &CourseId) -> Result<()> {
        if !self.instructors.contains_key(instructor) {
            return Err(RecordsError::not_found(INSTRUCTOR, instructor.as_str()));
        }
        if !self.courses.contains_key(course) {
            return Err(RecordsError::not_found(COURSE, course.as_str()));
        }
        self.unassign(course)?;
        if let Some(i) = self.instructors.get_mut(instructor) {
            i.assign_course(course);
        }
        if let Some(c) = self.courses.get_mut(course) {
            c.set_instructor(Some(instructor.clone()));
        }
        Ok(())
    }

    /// Clear a course's instructor. Clearing an already unset instructor is
    /// fine; a missing course is not.
    pub fn unassign(&mut self, course: &CourseId) -> Result<()> {
        let previous = match self.courses.get_mut(course) {
            Some(c) => {
                let previous = c.instructor().cloned();
                c.set_instructor(None);
                previous
            }
            None => return Err(RecordsError::not_found(COURSE, course.as_str())),
        };
        if let Some(i) = previous.and_then(|id| self.instructors.get_mut(&id)) {
            i.drop_course(course);
        }
        Ok(())
    }

    pub fn update_student(&mut self, id: &StudentId, name: &str, age: i64, email: &str) -> Result<()> {
        let student = self
            .students
            .get_mut(id)
            .ok_or_else(|| RecordsError::not_found(STUDENT, id.as_str()))?;
        student.person_mut().replace(name, age, email)?;
        Ok(())
    }

    pub fn update_instructor(
        &mut self,
        id: &InstructorId,
        name: &str,
        age: i64,
        email: &str,
    ) -> Result<()> {
        let instructor = self
            .instructors
            .get_mut(id)
            .ok_or_else(|| RecordsError::not_found(INSTRUCTOR, id.as_str()))?;
        instructor.person_mut().replace(name, age, email)?;
        Ok(())
    }

    pub fn update_course(&mut self, id: &CourseId, course_name: &str) -> Result<()> {
        let course = self
            .courses
            .get_mut(id)
            .ok_or_else(|| RecordsError::not_found(COURSE, id.as_str()))?;
        course.set_name(course_name)?;
        Ok(())
    }

    /// Remove a student and every enrolment that points at it.
    pub fn remove_student(&mut self, id: &StudentId) -> Result<Student> {
        let student = self
            .students
            .shift_remove(id)
            .ok_or_else(|| RecordsError::not_found(STUDENT, id.as_str()))?;
        for course in student.registered_courses() {
            if let Some(c) = self.courses.get_mut(course) {
                c.drop_student(id);
            }
        }
        Ok(student)
    }

    /// Remove an instructor; their courses become unassigned.
    pub fn remove_instructor(&mut self, id: &InstructorId) -> Result<Instructor> {
        let instructor = self
            .instructors
            .shift_remove(id)
            .ok_or_else(|| RecordsError::not_found(INSTRUCTOR, id.as_str()))?;
        for course in instructor.assigned_courses() {
            if let Some(c) = self.courses.get_mut(course) {
                c.set_instructor(None);
            }
        }
        Ok(instructor)
    }

    /// Remove a course and drop it from its instructor and students.
    pub fn remove_course(&mut self, id: &CourseId) -> Result<Course> {
        let course = self
            .courses
            .shift_remove(id)
            .ok_or_else(|| RecordsError::not_found(COURSE, id.as_str()))?;
        if let Some(i) = course
            .instructor()
            .and_then(|instructor| self.instructors.get_mut(instructor))
        {
            i.drop_course(id);
        }
        for student in course.enrolled_students() {
            if let Some(s) = self.students.get_mut(student) {
                s.drop_course(id);
            }
        }
        Ok(course)
    }

    /// Check that every relationship is mirrored on both sides and that no
    /// collection points at a missing entity.
    pub fn is_consistent(&self) -> bool {
        let students_mirrored = self.students.values().all(|s| {
            s.registered_courses().iter().all(|c| {
                self.courses
                    .get(c)
                    .is_some_and(|course| course.enrolled_students().contains(s.id()))
            })
        });
        let courses_mirrored = self.courses.values().all(|c| {
            c.enrolled_students().iter().all(|s| {
                self.students
                    .get(s)
                    .is_some_and(|student| student.registered_courses().contains(c.id()))
            }) && c.instructor().map_or(true, |i| {
                self.instructors
                    .get(i)
                    .is_some_and(|instructor| instructor.assigned_courses().contains(c.id()))
            })
        });
        let instructors_mirrored = self.instructors.values().all(|i| {
            i.assigned_courses().iter().all(|c| {
                self.courses
                    .get(c)
                    .is_some_and(|course| course.instructor() == Some(i.id()))
            })
        });
        students_mirrored && courses_mirrored && instructors_mirrored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sid(raw: &str) -> StudentId {
        StudentId::new(raw).unwrap()
    }

    fn iid(raw: &str) -> InstructorId {
        InstructorId::new(raw).unwrap()
    }

    fn cid(raw: &str) -> CourseId {
        CourseId::new(raw).unwrap()
    }

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .insert_student(Student::new("S1", "Ann", 20, "ann@x.com").unwrap())
            .unwrap();
        catalog
            .insert_student(Student::new("S2", "Ben", 22, "ben@x.com").unwrap())
            .unwrap();
        catalog
            .insert_instructor(Instructor::new("I1", "Grace", 50, "grace@x.com").unwrap())
            .unwrap();
        catalog
            .insert_instructor(Instructor::new("I2", "Alan", 41, "alan@x.com").unwrap())
            .unwrap();
        catalog.insert_course(Course::new("C1", "Math").unwrap()).unwrap();
        catalog.insert_course(Course::new("C2", "Logic").unwrap()).unwrap();
        catalog
    }

    #[test]
    fn enroll_updates_both_sides() {
        let mut catalog = sample();
        catalog.enroll(&sid("S1"), &cid("C1")).unwrap();
        catalog.enroll(&sid("S1"), &cid("C2")).unwrap();

        let ann = catalog.student(&sid("S1")).unwrap();
        assert_eq!(ann.registered_courses(), &[cid("C1"), cid("C2")]);
        let math = catalog.course(&cid("C1")).unwrap();
        assert_eq!(math.enrolled_students(), &[sid("S1")]);
        assert!(catalog.is_consistent());
    }

    #[test]
    fn repeated_enrolment_is_a_duplicate() {
        let mut catalog = sample();
        catalog.enroll(&sid("S1"), &cid("C1")).unwrap();
        let err = catalog.enroll(&sid("S1"), &cid("C1")).unwrap_err();
        assert!(matches!(err, RecordsError::DuplicateKey { .. }));
        assert_eq!(catalog.course(&cid("C1")).unwrap().enrolled_students().len(), 1);
    }

    #[test]
    fn enrolment_needs_both_ends() {
        let mut catalog = sample();
        assert!(matches!(
            catalog.enroll(&sid("S9"), &cid("C1")),
            Err(RecordsError::NotFound { entity: STUDENT, .. })
        ));
        assert!(matches!(
            catalog.enroll(&sid("S1"), &cid("C9")),
            Err(RecordsError::NotFound { entity: COURSE, .. })
        ));
    }

    #[test]
    fn reassigning_moves_the_course() {
        let mut catalog = sample();
        catalog.assign(&iid("I1"), &cid("C1")).unwrap();
        catalog.assign(&iid("I2"), &cid("C1")).unwrap();

        assert!(catalog.instructor(&iid("I1")).unwrap().assigned_courses().is_empty());
        assert_eq!(
            catalog.instructor(&iid("I2")).unwrap().assigned_courses(),
            &[cid("C1")]
        );
        assert_eq!(catalog.course(&cid("C1")).unwrap().instructor(), Some(&iid("I2")));
        assert!(catalog.is_consistent());
    }

    #[test]
    fn removing_entities_clears_references() {
        let mut catalog = sample();
        catalog.enroll(&sid("S1"), &cid("C1")).unwrap();
        catalog.enroll(&sid("S2"), &cid("C1")).unwrap();
        catalog.assign(&iid("I1"), &cid("C1")).unwrap();

        catalog.remove_student(&sid("S1")).unwrap();
        assert_eq!(catalog.course(&cid("C1")).unwrap().enrolled_students(), &[sid("S2")]);

        catalog.remove_instructor(&iid("I1")).unwrap();
        assert_eq!(catalog.course(&cid("C1")).unwrap().instructor(), None);

        catalog.remove_course(&cid("C1")).unwrap();
        assert!(catalog.student(&sid("S2")).unwrap().registered_courses().is_empty());
        assert!(catalog.is_consistent());
    }

    #[test]
    fn inserting_with_relationships_mirrors_them() {
        let mut catalog = sample();
        let mut student = Student::new("S3", "Cy", 19, "cy@x.com").unwrap();
        student.register_course(&cid("C2"));
        student.register_course(&cid("C2"));
        catalog.insert_student(student).unwrap();

        assert_eq!(catalog.student(&sid("S3")).unwrap().registered_courses(), &[cid("C2")]);
        assert_eq!(catalog.course(&cid("C2")).unwrap().enrolled_students(), &[sid("S3")]);
        assert!(catalog.is_consistent());
    }

    #[test]
    fn inserting_a_dangling_reference_fails_without_changes() {
        let mut catalog = sample();
        let before = catalog.clone();
        let mut student = Student::new("S3", "Cy", 19, "cy@x.com").unwrap();
        student.register_course(&cid("C9"));

        assert!(catalog.insert_student(student).is_err());
        assert_eq!(catalog, before);
    }

    #[test]
    fn name_lookup_takes_first_exact_match() {
        let mut catalog = sample();
        catalog
            .insert_student(Student::new("S3", "Ann", 30, "ann2@x.com").unwrap())
            .unwrap();
        assert_eq!(catalog.find_student_by_name("Ann").unwrap().id(), &sid("S1"));
        assert!(catalog.find_student_by_name("ann").is_none());
        assert_eq!(catalog.find_instructor_by_name("Alan").unwrap().id(), &iid("I2"));
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let mut catalog = sample();
        let err = catalog
            .update_student(&sid("S1"), "Ann", 20, "not-an-email")
            .unwrap_err();
        assert!(matches!(err, RecordsError::Validation(_)));
        assert_eq!(catalog.student(&sid("S1")).unwrap().person().email(), "ann@x.com");
        assert!(matches!(
            catalog.update_course(&cid("C9"), "Art"),
            Err(RecordsError::NotFound { .. })
        ));
    }
}
