mod common;

use common::{fresh_registrar, seeded_registrar};
use pretty_assertions::assert_eq;
use school_records::export::write_csv;
use school_records::search::SearchQuery;
use school_records::{RecordsError, Registrar, Store};

#[test]
fn csv_lists_three_sections() {
    let (_dir, mut registrar) = seeded_registrar();
    registrar.add_course("C2", "Art").unwrap();

    let mut out = Vec::new();
    write_csv(registrar.catalog(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let expected = "\
Student Name,Age,Email,Student ID,Registered Courses
Ann,20,ann@x.com,S1,C1
Ben,22,ben@x.com,S2,C1
Instructor Name,Age,Email,Instructor ID,Assigned Courses
Grace,50,grace@x.com,I1,C1
Course ID,Course Name,Instructor,Enrolled Students
C1,Math,Grace,\"Ann, Ben\"
C2,Art,No instructor,
";
    assert_eq!(text, expected);
}

#[test]
fn csv_file_is_written_through_registrar() {
    let (dir, registrar) = seeded_registrar();
    let path = dir.path().join("records.csv");
    registrar.export_csv(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Student Name,"));
    assert!(text.contains("Grace,50,grace@x.com,I1,C1"));
}

#[test]
fn backup_produces_an_openable_copy() {
    let (dir, registrar) = seeded_registrar();
    let path = dir.path().join("backup.sqlite");
    registrar.backup(&path).unwrap();

    let copy = Registrar::open(Store::open(&path).unwrap()).unwrap();
    assert_eq!(copy.catalog(), registrar.catalog());

    // VACUUM INTO refuses to overwrite.
    assert!(registrar.backup(&path).is_err());
}

#[cfg(unix)]
#[test]
fn backup_refuses_path_that_is_not_utf8() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (dir, registrar) = seeded_registrar();
    let path = dir.path().join(OsStr::from_bytes(b"backup-\xff.sqlite"));

    let err = registrar.backup(&path).unwrap_err();
    assert!(matches!(err, RecordsError::Io(ref io) if io.kind() == std::io::ErrorKind::InvalidInput));

    // Nothing was written under a lossily renamed file either.
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert!(names.iter().all(|name| !name.to_string_lossy().starts_with("backup-")));
}

#[test]
fn search_runs_against_current_catalog() {
    let (_dir, mut registrar) = fresh_registrar();
    registrar.add_student("S1", "Ann", 20, "ann@x.com").unwrap();
    registrar.add_instructor("I1", "Joanna", 45, "jo@x.com").unwrap();

    let hits = registrar.search(&SearchQuery::Name("ann".into()));
    let ids: Vec<_> = hits.members.iter().map(|m| m.id()).collect();
    assert_eq!(ids, vec!["S1", "I1"]);

    registrar.delete_student("S1").unwrap();
    assert!(registrar.search(&SearchQuery::PersonId("s1".into())).is_empty());
}
