#![allow(dead_code)]

use school_records::{Registrar, Store};
use tempfile::TempDir;

/// A store in its own temporary directory. Keep the `TempDir` alive for as
/// long as the store is used.
pub fn fresh_store() -> (TempDir, Store) {
    let dir = TempDir::new().expect("temp dir");
    let store = Store::open(dir.path().join("records.sqlite")).expect("open store");
    (dir, store)
}

pub fn fresh_registrar() -> (TempDir, Registrar) {
    let (dir, store) = fresh_store();
    let registrar = Registrar::open(store).expect("open registrar");
    (dir, registrar)
}

/// Two students, one instructor, one course with both students enrolled and
/// the instructor assigned.
pub fn seeded_registrar() -> (TempDir, Registrar) {
    let (dir, mut registrar) = fresh_registrar();
    registrar.add_student("S1", "Ann", 20, "ann@x.com").unwrap();
    registrar.add_student("S2", "Ben", 22, "ben@x.com").unwrap();
    registrar.add_instructor("I1", "Grace", 50, "grace@x.com").unwrap();
    registrar.add_course("C1", "Math").unwrap();
    registrar.register("Ann", "C1").unwrap();
    registrar.register("Ben", "C1").unwrap();
    registrar.assign("Grace", "C1").unwrap();
    (dir, registrar)
}
