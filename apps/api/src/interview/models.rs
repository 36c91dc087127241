use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Three-step scale shared by face metrics and answer quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Final qualitative outcome of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Strong performance")]
    Strong,
    #[serde(rename = "Moderate performance")]
    Moderate,
    #[serde(rename = "Needs improvement")]
    NeedsImprovement,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Interview,
    /// Group discussion round.
    Gd,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Interview => "interview",
            SessionMode::Gd => "gd",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expected_answer: Option<String>,
    #[serde(default)]
    pub answer_text: String,
    #[serde(default)]
    pub asked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

impl QuestionAnswer {
    /// Reference text the answer is compared against: the explicit expected
    /// answer when given and non-empty, otherwise the question itself.
    pub fn expected_text(&self) -> &str {
        self.expected_answer
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(self.question.as_str())
            .trim()
    }

    pub fn candidate_text(&self) -> &str {
        self.answer_text.trim()
    }
}

/// Behavioral signals computed client-side by the vision pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FaceMetrics {
    pub confidence_level: Level,
    pub nervousness_level: Level,
    #[validate(range(min = 0.0, max = 100.0))]
    pub confidence_score: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub nervousness_score: f64,
    #[serde(default)]
    pub face_visible_ratio: Option<f64>,
    #[serde(default)]
    pub centered_ratio: Option<f64>,
    #[serde(default)]
    pub movement_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InterviewSessionPayload {
    #[serde(default)]
    pub session_mode: Option<SessionMode>,
    #[serde(default)]
    pub candidate_email: Option<String>,
    #[serde(default)]
    pub candidate_name: Option<String>,
    pub answers: Vec<QuestionAnswer>,
    #[validate]
    pub face_metrics: FaceMetrics,
}

/// Output of the answer scoring pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    pub question_scores: Vec<f64>,
    pub average_score: f64,
    pub completion_rate: f64,
    pub quality: Level,
}

/// Persisted and returned per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub answer_quality: Level,
    pub question_scores: Vec<f64>,
    pub average_answer_score: f64,
    pub completion_rate: f64,
    pub confidence_level: Level,
    pub nervousness_level: Level,
    pub overall_result: Verdict,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expected_text_defaults_to_question() {
        let qa: QuestionAnswer =
            serde_json::from_value(json!({"question": "  What is Rust?  "})).unwrap();
        assert_eq!(qa.expected_text(), "What is Rust?");
        assert_eq!(qa.candidate_text(), "");
    }

    #[test]
    fn test_expected_text_prefers_expected_answer() {
        let qa: QuestionAnswer = serde_json::from_value(json!({
            "question": "Q1",
            "expected_answer": " A1 ",
            "answer_text": "A1"
        }))
        .unwrap();
        assert_eq!(qa.expected_text(), "A1");
    }

    #[test]
    fn test_missing_question_is_rejected() {
        let result = serde_json::from_value::<QuestionAnswer>(json!({"answer_text": "hi"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_verdict_serializes_as_phrase() {
        assert_eq!(
            serde_json::to_value(Verdict::NeedsImprovement).unwrap(),
            json!("Needs improvement")
        );
        assert_eq!(
            serde_json::to_value(Verdict::Strong).unwrap(),
            json!("Strong performance")
        );
    }

    #[test]
    fn test_session_mode_defaults_to_interview() {
        let payload: InterviewSessionPayload = serde_json::from_value(json!({
            "answers": [],
            "face_metrics": {
                "confidence_level": "High",
                "nervousness_level": "Low",
                "confidence_score": 80,
                "nervousness_score": 10
            }
        }))
        .unwrap();
        assert_eq!(payload.session_mode.unwrap_or_default(), SessionMode::Interview);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let result = serde_json::from_value::<Level>(json!("Extreme"));
        assert!(result.is_err());
    }

    #[test]
    fn test_face_metrics_score_out_of_range_fails_validation() {
        let metrics: FaceMetrics = serde_json::from_value(json!({
            "confidence_level": "High",
            "nervousness_level": "Low",
            "confidence_score": 101,
            "nervousness_score": 10
        }))
        .unwrap();
        let errors = metrics.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confidence_score"));
    }

    #[test]
    fn test_payload_validation_reaches_nested_metrics() {
        let payload: InterviewSessionPayload = serde_json::from_value(json!({
            "answers": [{"question": "Q1"}],
            "face_metrics": {
                "confidence_level": "Medium",
                "nervousness_level": "Medium",
                "confidence_score": 50,
                "nervousness_score": -1
            }
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }
}
