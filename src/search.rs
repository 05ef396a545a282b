//! Record search over the in-memory catalog. The desktop form offers three
//! search boxes (person id, person name, course id) and filters every list at
//! once; this is the same behaviour without the widgets.

use crate::catalog::Catalog;
use crate::models::{Course, Member};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Exact student or instructor id, ignoring case.
    PersonId(String),
    /// Substring of a student or instructor name, ignoring case.
    Name(String),
    /// Exact course id, ignoring case.
    CourseId(String),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchHits<'a> {
    pub members: Vec<Member<'a>>,
    pub courses: Vec<&'a Course>,
}

impl SearchHits<'_> {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.courses.is_empty()
    }
}

impl SearchQuery {
    pub fn run<'a>(&self, catalog: &'a Catalog) -> SearchHits<'a> {
        match self {
            SearchQuery::PersonId(raw) => {
                let needle = raw.trim().to_lowercase();
                SearchHits {
                    members: catalog
                        .members()
                        .filter(|m| m.id().to_lowercase() == needle)
                        .collect(),
                    courses: Vec::new(),
                }
            }
            SearchQuery::Name(raw) => {
                let needle = raw.trim().to_lowercase();
                SearchHits {
                    members: catalog
                        .members()
                        .filter(|m| m.person().name().to_lowercase().contains(&needle))
                        .collect(),
                    courses: Vec::new(),
                }
            }
            SearchQuery::CourseId(raw) => {
                let needle = raw.trim().to_lowercase();
                SearchHits {
                    members: Vec::new(),
                    courses: catalog
                        .courses()
                        .filter(|c| c.id().as_str().to_lowercase() == needle)
                        .collect(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Instructor, Student};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .insert_student(Student::new("S1", "Ann Lee", 20, "ann@x.com").unwrap())
            .unwrap();
        catalog
            .insert_student(Student::new("S2", "Ben", 22, "ben@x.com").unwrap())
            .unwrap();
        catalog
            .insert_instructor(Instructor::new("i1", "Joanna", 45, "jo@x.com").unwrap())
            .unwrap();
        catalog.insert_course(Course::new("MATH101", "Math").unwrap()).unwrap();
        catalog
    }

    #[test]
    fn name_search_matches_substrings_across_kinds() {
        let catalog = catalog();
        let hits = SearchQuery::Name("  AN ".into()).run(&catalog);
        let ids: Vec<_> = hits.members.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["S1", "i1"]);
        assert!(hits.courses.is_empty());
    }

    #[test]
    fn id_search_is_exact_but_case_blind() {
        let catalog = catalog();
        let hits = SearchQuery::PersonId("I1".into()).run(&catalog);
        assert_eq!(hits.members.len(), 1);
        assert_eq!(hits.members[0].kind(), "instructor");
        assert!(SearchQuery::PersonId("S".into()).run(&catalog).is_empty());
    }

    #[test]
    fn course_search_finds_course() {
        let catalog = catalog();
        let hits = SearchQuery::CourseId("math101".into()).run(&catalog);
        assert_eq!(hits.courses.len(), 1);
        assert_eq!(hits.courses[0].name(), "Math");
    }
}
