use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// One positional-input/expected-output pair owned by a problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Vec<JsonValue>,
    pub expected: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub examples: Vec<Example>,
    pub constraints: Vec<String>,
    pub difficulty: Difficulty,
    /// Per-language starter source, keyed by language tag.
    pub starter_code: BTreeMap<String, String>,
    pub test_cases: Vec<TestCase>,
}

impl Problem {
    pub fn starter_for(&self, language: &str) -> Option<&str> {
        self.starter_code.get(language).map(|s| s.as_str())
    }
}
