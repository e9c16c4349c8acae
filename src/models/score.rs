use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningRecommendation {
    pub topic: String,
    pub reason: String,
}

/// Structured evaluation produced by the AI collaborator at interview
/// completion. Sub-scores are integers in 0..=100. `overall_score` is
/// presented as the mean of the three but trusted as supplied by the
/// scorer rather than recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewScore {
    pub communication: i32,
    pub technical_knowledge: i32,
    pub problem_solving: i32,
    pub overall_score: i32,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub learning_recommendations: Vec<LearningRecommendation>,
}
