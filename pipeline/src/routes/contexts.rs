//! `GET /api/contexts` — supplemented feature (SPEC_FULL.md), lets a caller
//! discover the five recognized context profiles and their prompt templates
//! without hardcoding them client-side.

use axum::Json;
use serde::Serialize;

use whisper_common::context::list_profiles;

#[derive(Serialize)]
pub struct ContextSummary {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub summary: bool,
    pub pii: bool,
    pub diarization: bool,
    pub text_processing: bool,
}

pub async fn list() -> Json<Vec<ContextSummary>> {
    let profiles = list_profiles()
        .into_iter()
        .map(|p| ContextSummary {
            name: p.name.as_str(),
            label: p.label,
            description: p.description,
            summary: p.summary,
            pii: p.pii,
            diarization: p.diarization,
            text_processing: p.text_processing,
        })
        .collect();
    Json(profiles)
}
