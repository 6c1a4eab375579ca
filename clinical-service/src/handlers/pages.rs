//! Placeholder pages for the browser-facing routes. The rendered frontend is
//! served elsewhere; only the routes themselves are part of the surface.

use axum::response::Html;

fn page(title: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\"><head><meta charset=\"utf-8\">\
         <title>{title}</title></head><body><h1>{title}</h1></body></html>"
    ))
}

pub async fn home() -> Html<String> {
    page("DevHealthy")
}

pub async fn register_patient_page() -> Html<String> {
    page("Cadastrar paciente")
}

pub async fn consult_patient_page() -> Html<String> {
    page("Consultar paciente")
}

pub async fn create_exam_page() -> Html<String> {
    page("Criar exame")
}

pub async fn consult_exam_page() -> Html<String> {
    page("Consultar exame")
}
