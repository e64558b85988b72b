//! HTTP routes gateway: merges every endpoint subrouter and attaches the
//! shared engine state.

use std::sync::Arc;

use axum::Router;

use crate::ClimateEngine;

mod climascore;
mod health;

// ---

pub fn router(engine: Arc<ClimateEngine>) -> Router {
    // ---
    Router::new()
        .merge(climascore::router())
        .merge(health::router())
        .with_state(engine)
}
