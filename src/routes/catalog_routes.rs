use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;

use crate::models::test::TestKind;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListTestsQuery {
    pub kind: Option<TestKind>,
}

#[axum::debug_handler]
pub async fn list_tests(
    State(state): State<AppState>,
    Query(query): Query<ListTestsQuery>,
) -> crate::error::Result<Response> {
    let tests: Vec<_> = match query.kind {
        Some(kind) => state.catalog.tests_of_kind(kind),
        None => state
            .catalog
            .tests_of_kind(TestKind::Assessment)
            .into_iter()
            .chain(state.catalog.tests_of_kind(TestKind::Practice))
            .collect(),
    };
    Ok(Json(tests).into_response())
}

#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> crate::error::Result<Response> {
    let test = state.catalog.test(&test_id)?;
    Ok(Json(test).into_response())
}

#[axum::debug_handler]
pub async fn get_problem(
    State(state): State<AppState>,
    Path(problem_id): Path<String>,
) -> crate::error::Result<Response> {
    let problem = state.catalog.problem(&problem_id)?;
    Ok(Json(problem).into_response())
}
