use crate::models::{HEART_RATE_FIELD, LEGACY_HEART_RATE_FIELD};
use crate::services::DocumentStore;
use service_core::error::AppError;

/// One-shot migration: moves the legacy `frequencia` key inside ECG exam
/// details to its canonical name `frequenciaCardiaca`.
///
/// Runs during application build, before the listener starts serving.
/// Idempotent: exams without the legacy key are skipped, so a rerun (or a
/// crash mid-run followed by a restart) rewrites nothing twice. No
/// transaction spans the scan and the per-document updates. Returns the
/// number of documents rewritten.
pub async fn rename_legacy_ecg_fields(store: &dyn DocumentStore) -> Result<u64, AppError> {
    let exams = store.list_ecg_exams().await?;

    let mut renamed = 0u64;
    for (exam_id, mut detalhes) in exams {
        let Some(heart_rate) = detalhes.remove(LEGACY_HEART_RATE_FIELD) else {
            continue;
        };
        detalhes.insert(HEART_RATE_FIELD.to_string(), heart_rate);

        store.set_exam_details(&exam_id, &detalhes).await?;
        tracing::info!(exam_id = %exam_id, "Renamed legacy heart-rate field");
        renamed += 1;
    }

    Ok(renamed)
}
