use std::cmp::Ordering;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use serde_json::Value as JsonValue;
use tokio::process::Command;

use crate::models::problem::TestCase;
use crate::models::submission::TestResult;

/// Uniform per-language execution contract: submitted source plus a
/// problem's ordered cases in, one graded result per case out. The
/// mocked backends become real ones without changing this interface.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn run(&self, source: &str, cases: &[TestCase]) -> Vec<TestResult>;
}

/// Executes JavaScript submissions by spawning one disposable `node`
/// process per test case, under a strict timeout. A fault in one case
/// never affects the others.
pub struct NodeBackend {
    node_binary: String,
    case_timeout: Duration,
}

static FUNCTION_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Detects the callable's name from the `var <name> = function` starter
/// pattern. Candidates are told not to change the original definition.
pub fn detect_function_name(source: &str) -> Option<&str> {
    let re = FUNCTION_PATTERN.get_or_init(|| {
        Regex::new(r"var\s+([a-zA-Z0-9_]+)\s*=\s*function").expect("valid pattern")
    });
    re.captures(source).and_then(|c| c.get(1)).map(|m| m.as_str())
}

impl NodeBackend {
    pub fn new(node_binary: impl Into<String>, case_timeout: Duration) -> Self {
        Self {
            node_binary: node_binary.into(),
            case_timeout,
        }
    }

    async fn run_case(&self, source: &str, name: &str, case: &TestCase) -> std::result::Result<JsonValue, String> {
        let args = serde_json::to_string(&case.input).map_err(|e| e.to_string())?;
        // Fresh scope per case: the submitted source plus a spread call
        // into the detected function, result serialized on stdout.
        let script = format!(
            "{source}\nconst __args = {args};\nconst __out = {name}(...__args);\n\
             process.stdout.write(JSON.stringify({{ result: __out === undefined ? null : __out }}));"
        );

        let output = tokio::time::timeout(
            self.case_timeout,
            Command::new(&self.node_binary)
                .arg("--no-warnings")
                .arg("-e")
                .arg(&script)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| format!("execution timed out after {}ms", self.case_timeout.as_millis()))?
        .map_err(|e| e.to_string())?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(extract_fault_message(&stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: JsonValue =
            serde_json::from_str(stdout.trim()).map_err(|e| format!("unreadable output: {}", e))?;
        Ok(parsed.get("result").cloned().unwrap_or(JsonValue::Null))
    }
}

fn extract_fault_message(stderr: &str) -> String {
    stderr
        .lines()
        .find(|line| line.contains("Error"))
        .unwrap_or_else(|| stderr.trim())
        .trim()
        .to_string()
}

#[async_trait]
impl ExecutionBackend for NodeBackend {
    async fn run(&self, source: &str, cases: &[TestCase]) -> Vec<TestResult> {
        let Some(name) = detect_function_name(source) else {
            // One diagnostic result for the whole batch; the remaining
            // cases are not separately evaluated.
            return vec![TestResult {
                test_case_id: 1,
                passed: false,
                output: "Execution Error: Could not determine function name. Please do not \
                         change the original function definition."
                    .to_string(),
            }];
        };

        let mut results = Vec::with_capacity(cases.len());
        for (index, case) in cases.iter().enumerate() {
            let result = match self.run_case(source, name, case).await {
                Ok(actual) => {
                    let passed = outputs_match(&actual, &case.expected);
                    TestResult {
                        test_case_id: index + 1,
                        passed,
                        output: if passed {
                            "Passed".to_string()
                        } else {
                            format!(
                                "Expected: {}\nGot: {}",
                                compact(&case.expected),
                                compact(&actual)
                            )
                        },
                    }
                }
                Err(message) => TestResult {
                    test_case_id: index + 1,
                    passed: false,
                    output: format!("Runtime Error: {}", message),
                },
            };
            results.push(result);
        }
        results
    }
}

/// Order-insensitive comparison for sequence answers (e.g. index
/// pairs): arrays are compared against a sorted copy of each side.
/// Everything else is deep structural equality.
pub fn outputs_match(actual: &JsonValue, expected: &JsonValue) -> bool {
    sort_if_array(actual) == sort_if_array(expected)
}

fn sort_if_array(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(items) => {
            let mut copy = items.clone();
            copy.sort_by(compare_values);
            JsonValue::Array(copy)
        }
        other => other.clone(),
    }
}

fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => compact(a).cmp(&compact(b)),
    }
}

fn compact(value: &JsonValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Placeholder for a server-side sandboxed execution backend for
/// languages the platform cannot run natively yet: no real execution,
/// biased-random pass/fail per case with a mocked-result diagnostic.
pub struct MockBackend {
    language: String,
}

impl MockBackend {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

#[async_trait]
impl ExecutionBackend for MockBackend {
    async fn run(&self, _source: &str, cases: &[TestCase]) -> Vec<TestResult> {
        let mut rng = rand::thread_rng();
        cases
            .iter()
            .enumerate()
            .map(|(index, _)| TestResult {
                test_case_id: index + 1,
                passed: rng.gen_bool(0.7),
                output: format!("Passed\n(Mocked result for {})", self.language),
            })
            .collect()
    }
}
