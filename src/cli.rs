//! Command-line front end. It only parses arguments, forwards them to the
//! `Registrar`, and prints what comes back; all rules live in the library.

use std::path::PathBuf;

use anyhow::{Context, Error, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::catalog::Catalog;
use crate::config::{Config, DB_ENV_VAR};
use crate::db::Store;
use crate::models::Member;
use crate::search::SearchQuery;
use crate::sync::Registrar;

#[derive(Debug, Parser)]
#[command(name = "school-records", about = "Manage students, instructors and courses")]
pub struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, env = DB_ENV_VAR)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SearchBy {
    Id,
    Name,
    Course,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show every student, instructor and course.
    List,
    AddStudent {
        id: String,
        name: String,
        #[arg(allow_negative_numbers = true)]
        age: i64,
        email: String,
    },
    AddInstructor {
        id: String,
        name: String,
        #[arg(allow_negative_numbers = true)]
        age: i64,
        email: String,
    },
    AddCourse {
        id: String,
        name: String,
    },
    EditStudent {
        id: String,
        name: String,
        #[arg(allow_negative_numbers = true)]
        age: i64,
        email: String,
    },
    EditInstructor {
        id: String,
        name: String,
        #[arg(allow_negative_numbers = true)]
        age: i64,
        email: String,
    },
    EditCourse {
        id: String,
        name: String,
    },
    DeleteStudent {
        id: String,
    },
    DeleteInstructor {
        id: String,
    },
    DeleteCourse {
        id: String,
    },
    /// Register a student, looked up by name, into a course.
    Register {
        student_name: String,
        course_id: String,
    },
    Unregister {
        student_id: String,
        course_id: String,
    },
    /// Assign an instructor, looked up by name, to a course.
    Assign {
        instructor_name: String,
        course_id: String,
    },
    Unassign {
        course_id: String,
    },
    /// List the students registered in a course.
    Roster {
        course_id: String,
    },
    Search {
        #[arg(value_enum)]
        by: SearchBy,
        value: String,
    },
    /// Write all records to a JSON file.
    Save {
        path: PathBuf,
    },
    /// Replace all records with the contents of a JSON file.
    Load {
        path: PathBuf,
    },
    Csv {
        path: PathBuf,
    },
    Backup {
        path: PathBuf,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.db)?;
    let store = Store::open(&config.db_path).context("failed to open records database")?;
    let mut registrar = Registrar::open(store).context("failed to load records")?;

    match cli.command {
        Command::List => print_catalog(registrar.catalog()),
        Command::AddStudent {
            id,
            name,
            age,
            email,
        } => {
            registrar.add_student(&id, &name, age, &email)?;
            println!("Student {id} added.");
        }
        Command::AddInstructor {
            id,
            name,
            age,
            email,
        } => {
            registrar.add_instructor(&id, &name, age, &email)?;
            println!("Instructor {id} added.");
        }
        Command::AddCourse { id, name } => {
            registrar.add_course(&id, &name)?;
            println!("Course {id} added.");
        }
        Command::EditStudent {
            id,
            name,
            age,
            email,
        } => {
            registrar.update_student(&id, &name, age, &email)?;
            println!("Student {id} updated.");
        }
        Command::EditInstructor {
            id,
            name,
            age,
            email,
        } => {
            registrar.update_instructor(&id, &name, age, &email)?;
            println!("Instructor {id} updated.");
        }
        Command::EditCourse { id, name } => {
            registrar.update_course(&id, &name)?;
            println!("Course {id} updated.");
        }
        Command::DeleteStudent { id } => {
            registrar.delete_student(&id)?;
            println!("Student {id} deleted.");
        }
        Command::DeleteInstructor { id } => {
            registrar.delete_instructor(&id)?;
            println!("Instructor {id} deleted.");
        }
        Command::DeleteCourse { id } => {
            registrar.delete_course(&id)?;
            println!("Course {id} deleted.");
        }
        Command::Register {
            student_name,
            course_id,
        } => {
            let student = registrar.register(&student_name, &course_id)?;
            println!("{student_name} ({student}) registered for {course_id}.");
        }
        Command::Unregister {
            student_id,
            course_id,
        } => {
            registrar.unregister(&student_id, &course_id)?;
            println!("{student_id} removed from {course_id}.");
        }
        Command::Assign {
            instructor_name,
            course_id,
        } => {
            let instructor = registrar.assign(&instructor_name, &course_id)?;
            println!("{instructor_name} ({instructor}) has been assigned to {course_id}.");
        }
        Command::Unassign { course_id } => {
            registrar.unassign(&course_id)?;
            println!("{course_id} no longer has an instructor.");
        }
        Command::Roster { course_id } => {
            for student in registrar.registered_students(&course_id)? {
                println!(
                    "{}\t{}\t{}\t{}",
                    student.id(),
                    student.name(),
                    student.person().age(),
                    student.person().email()
                );
            }
        }
        Command::Search { by, value } => {
            let query = match by {
                SearchBy::Id => SearchQuery::PersonId(value),
                SearchBy::Name => SearchQuery::Name(value),
                SearchBy::Course => SearchQuery::CourseId(value),
            };
            let hits = registrar.search(&query);
            if hits.is_empty() {
                println!("No matching records.");
            }
            for member in &hits.members {
                print_member(member);
            }
            for course in &hits.courses {
                println!("course\t{}\t{}", course.id(), course.name());
            }
        }
        Command::Save { path } => {
            registrar.save_json(&path)?;
            println!("Data saved to {}.", path.display());
        }
        Command::Load { path } => {
            registrar.load_json(&path)?;
            println!("Data loaded from {}.", path.display());
        }
        Command::Csv { path } => {
            registrar.export_csv(&path)?;
            println!("Records exported to {}.", path.display());
        }
        Command::Backup { path } => {
            registrar.backup(&path)?;
            println!("Database backed up to {}.", path.display());
        }
    }

    let report = registrar.last_sync();
    if !report.is_clean() {
        eprintln!(
            "note: {} invalid row(s) skipped, {} course(s) reference missing instructors, {} orphaned registration(s) ignored",
            report.rejected_rows.len(),
            report.unresolved_instructors.len(),
            report.orphaned_registrations.len()
        );
    }
    Ok(())
}

fn print_member(member: &Member<'_>) {
    let person = member.person();
    println!(
        "{}\t{}\t{}\t{}\t{}",
        member.kind(),
        member.id(),
        person.name(),
        person.age(),
        person.email()
    );
}

fn print_catalog(catalog: &Catalog) {
    println!("Students:");
    for student in catalog.students() {
        let courses: Vec<_> = student.registered_courses().iter().map(|c| c.as_str()).collect();
        println!(
            "  {}\t{}\t{}\t{}\t[{}]",
            student.id(),
            student.name(),
            student.person().age(),
            student.person().email(),
            courses.join(", ")
        );
    }
    println!("Instructors:");
    for instructor in catalog.instructors() {
        let courses: Vec<_> = instructor.assigned_courses().iter().map(|c| c.as_str()).collect();
        println!(
            "  {}\t{}\t{}\t{}\t[{}]",
            instructor.id(),
            instructor.name(),
            instructor.person().age(),
            instructor.person().email(),
            courses.join(", ")
        );
    }
    println!("Courses:");
    for course in catalog.courses() {
        let instructor = catalog
            .instructor_of(course)
            .map(|i| i.name())
            .unwrap_or("No instructor");
        let students: Vec<_> = catalog.students_in(course).iter().map(|s| s.name()).collect();
        println!(
            "  {}\t{}\t{}\t[{}]",
            course.id(),
            course.name(),
            instructor,
            students.join(", ")
        );
    }
}

/// Extract the most relevant error message from a chained error.
pub fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
