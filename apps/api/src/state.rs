use crate::pipeline::run::PipelineContext;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Adapter set, scorer and run settings, built once at startup from `Config` and cloned
    /// into each run.
    pub pipeline: PipelineContext,
}
