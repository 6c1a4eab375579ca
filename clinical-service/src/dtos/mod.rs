pub mod exams;
pub mod patients;

pub use exams::{CreateExamRequest, ExamWithPatientResponse};
pub use patients::RegisterPatientRequest;
