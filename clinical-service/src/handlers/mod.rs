pub mod exams;
pub mod health;
pub mod pages;
pub mod patients;

pub use exams::{create_exam, list_exams_by_cpf, remove_exam};
pub use health::{connectivity_test, health_check};
pub use patients::{get_patient, list_patients, patient_directory, register_patient};
