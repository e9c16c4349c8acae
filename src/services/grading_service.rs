use std::sync::Arc;
use std::time::Duration;

use crate::models::problem::TestCase;
use crate::models::submission::TestResult;
use crate::services::execution::{ExecutionBackend, MockBackend, NodeBackend};

/// Dispatches a submission to the execution backend for its language
/// and turns the outcome into an ordered result list plus a score.
#[derive(Clone)]
pub struct GradingService {
    node: Arc<dyn ExecutionBackend>,
}

impl GradingService {
    pub fn new(node_binary: impl Into<String>, case_timeout: Duration) -> Self {
        Self {
            node: Arc::new(NodeBackend::new(node_binary, case_timeout)),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_javascript_backend(backend: Arc<dyn ExecutionBackend>) -> Self {
        Self { node: backend }
    }

    fn backend_for(&self, language: &str) -> Arc<dyn ExecutionBackend> {
        match language {
            "javascript" => self.node.clone(),
            other => Arc::new(MockBackend::new(other)),
        }
    }

    /// One result per case, preserving input order. The only exception
    /// is the JavaScript function-detection failure, which yields a
    /// single diagnostic result for the whole batch.
    pub async fn grade(
        &self,
        source: &str,
        language: &str,
        cases: &[TestCase],
    ) -> Vec<TestResult> {
        let results = self.backend_for(language).run(source, cases).await;
        tracing::info!(
            language,
            cases = cases.len(),
            passed = results.iter().filter(|r| r.passed).count(),
            "Graded submission"
        );
        results
    }

    /// `round(100 * passed / total)`, defined as 0 for an empty case
    /// list. `total` is the problem's case count, not the result count,
    /// so a batch-level failure still scores against every case.
    pub fn coding_score(results: &[TestResult], total: usize) -> i32 {
        if total == 0 {
            return 0;
        }
        let passed = results.iter().filter(|r| r.passed).count();
        ((passed as f64 / total as f64) * 100.0).round() as i32
    }
}
