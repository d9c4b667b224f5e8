use axum::extract::FromRef;

use crate::{config::Config, engine::ExamEngine};

#[derive(Clone)]
pub struct AppState {
    pub engine: ExamEngine,
    pub config: Config,
}

impl AppState {
    pub fn new(engine: ExamEngine, config: Config) -> Self {
        Self { engine, config }
    }
}

impl FromRef<AppState> for ExamEngine {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
