mod common;

use std::collections::BTreeSet;

use common::{fresh_registrar, seeded_registrar};
use pretty_assertions::assert_eq;
use school_records::codec::{self, ExportDocument};
use school_records::{Catalog, RecordsError};
use serde_json::json;

/// Scalars plus relationship membership as sets, so collection order does not
/// matter.
fn shape(catalog: &Catalog) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for s in catalog.students() {
        out.insert(format!(
            "student {} {} {} {}",
            s.id(),
            s.name(),
            s.person().age(),
            s.person().email()
        ));
        for c in s.registered_courses() {
            out.insert(format!("registered {} {}", s.id(), c));
        }
    }
    for i in catalog.instructors() {
        out.insert(format!(
            "instructor {} {} {} {}",
            i.id(),
            i.name(),
            i.person().age(),
            i.person().email()
        ));
        for c in i.assigned_courses() {
            out.insert(format!("assigned {} {}", i.id(), c));
        }
    }
    for c in catalog.courses() {
        out.insert(format!(
            "course {} {} {:?}",
            c.id(),
            c.name(),
            c.instructor().map(|i| i.as_str())
        ));
        for s in c.enrolled_students() {
            out.insert(format!("enrolled {} {}", c.id(), s));
        }
    }
    out
}

#[test]
fn encode_then_decode_preserves_graph() {
    let (_dir, registrar) = seeded_registrar();
    let original = registrar.catalog();

    let text = codec::to_json(original).unwrap();
    let decoded = codec::from_json(&text).unwrap();

    assert_eq!(shape(&decoded), shape(original));
    assert!(decoded.is_consistent());
}

#[test]
fn course_documents_nest_full_records() {
    let (_dir, registrar) = seeded_registrar();
    let document = codec::encode(registrar.catalog());

    let course = &document.courses["C1"];
    let instructor = course.instructor.as_ref().unwrap();
    assert_eq!(instructor.name, "Grace");
    assert_eq!(instructor.assigned_courses, vec!["C1"]);
    let names: Vec<_> = course.enrolled_students.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Ben"]);
    assert_eq!(document.students["S1"].registered_courses, vec!["C1"]);
    assert_eq!(document.students["S1"].email, "ann@x.com");
}

#[test]
fn one_sided_relationships_are_mirrored_on_decode() {
    let value = json!({
        "students": {
            "S1": { "name": "Ann", "age": 20, "email": "ann@x.com", "student_id": "S1",
                    "registered_courses": ["C1", "C404"] }
        },
        "instructors": {
            "I1": { "name": "Grace", "age": 50, "email": "grace@x.com", "instructor_id": "I1",
                    "assigned_courses": ["C1"] }
        },
        "courses": {
            "C1": { "course_id": "C1", "course_name": "Math", "instructor": null,
                    "enrolled_students": [] }
        }
    });

    let catalog = codec::decode(&codec::document_from_value(value).unwrap()).unwrap();
    let course = catalog.courses().next().unwrap();
    assert_eq!(course.enrolled_students().len(), 1);
    assert_eq!(course.instructor().map(|i| i.as_str()), Some("I1"));
    assert!(catalog.is_consistent());
}

#[test]
fn nested_records_missing_from_sections_are_added() {
    let value = json!({
        "courses": {
            "C1": {
                "course_id": "C1",
                "course_name": "Math",
                "instructor": { "name": "Grace", "age": 50, "email": "grace@x.com",
                                "instructor_id": "I1", "assigned_courses": [] },
                "enrolled_students": [
                    { "name": "Ann", "age": 20, "email": "ann@x.com", "student_id": "S1",
                      "registered_courses": [] }
                ]
            }
        }
    });

    let catalog = codec::decode(&codec::document_from_value(value).unwrap()).unwrap();
    assert_eq!(catalog.students().count(), 1);
    assert_eq!(catalog.instructors().count(), 1);
    assert!(catalog.is_consistent());
}

#[test]
fn record_in_wrong_section_is_a_type_mismatch() {
    let value = json!({
        "students": {
            "Grace": { "name": "Grace", "age": 50, "email": "grace@x.com", "instructor_id": "I1" }
        }
    });

    let err = codec::document_from_value(value).unwrap_err();
    assert!(matches!(
        err,
        RecordsError::TypeMismatch {
            expected: "student",
            found: "instructor"
        }
    ));
}

#[test]
fn invalid_fields_in_document_fail_validation() {
    let value = json!({
        "students": {
            "S1": { "name": "A", "age": 20, "email": "ann@x.com", "student_id": "S1" }
        }
    });
    let err = codec::decode(&codec::document_from_value(value).unwrap()).unwrap_err();
    assert!(matches!(err, RecordsError::Validation(_)));
}

#[test]
fn empty_document_decodes_to_empty_catalog() {
    let catalog = codec::from_json("{}").unwrap();
    assert!(catalog.is_empty());
    assert_eq!(codec::encode(&catalog), ExportDocument::default());
}

#[test]
fn save_and_load_replace_store_contents() {
    let (dir, source) = seeded_registrar();
    let path = dir.path().join("records.json");
    source.save_json(&path).unwrap();

    let (_other, mut target) = fresh_registrar();
    target.add_student("S9", "Zed", 30, "zed@x.com").unwrap();
    target.load_json(&path).unwrap();

    assert_eq!(shape(target.catalog()), shape(source.catalog()));
    assert_eq!(target.store().students().unwrap().len(), 2);
    assert_eq!(target.store().registrations().unwrap().len(), 2);
}

#[test]
fn failed_load_keeps_previous_store() {
    let (dir, mut registrar) = seeded_registrar();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        r#"{"students": {"S1": {"name": "Ann", "age": -4, "email": "ann@x.com", "student_id": "S1"}}}"#,
    )
    .unwrap();

    assert!(registrar.load_json(&path).is_err());
    assert_eq!(registrar.store().students().unwrap().len(), 2);
    assert_eq!(registrar.catalog().courses().count(), 1);
}
