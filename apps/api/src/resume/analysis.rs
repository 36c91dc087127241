//! Resume analysis — LLM extraction normalized through a schema with defaults.
//!
//! The model is asked for a fixed JSON shape but routinely drifts from it: fields go
//! missing, lists arrive as single strings, the group discussion arrives as a bare
//! topic. Every field here deserializes leniently and falls back to a default, and
//! empty question categories are filled from a deterministic fallback generator.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::{extract_json_object, LlmClient};
use crate::resume::prompts::build_analysis_prompt;

const KNOWN_SKILLS: &[&str] = &[
    "Python",
    "FastAPI",
    "Django",
    "Spring Boot",
    "MongoDB",
    "SQL",
    "React",
    "Java",
    "Kafka",
];

const TECHNICAL_QUESTION_COUNT: usize = 5;

const GENERIC_TECHNICAL: [&str; TECHNICAL_QUESTION_COUNT] = [
    "How do you design a backend API for scalability and reliability?",
    "How do you optimize database performance for read-heavy workloads?",
    "How do you test and validate critical backend workflows?",
    "How do you monitor and debug failures in a deployed service?",
    "How do you secure authentication and sensitive data in APIs?",
];

const FALLBACK_HR: &[&str] = &[
    "Tell me about yourself and your current role.",
    "Why do you want this role, and what value will you bring?",
    "Describe a time you handled feedback and improved your performance.",
];

const FALLBACK_BEHAVIORAL: &[&str] = &[
    "Describe a situation where you had conflicting priorities and how you handled it.",
    "Tell me about a time you found a critical bug and how you managed the fix.",
];

const FALLBACK_GD_TOPIC: &str = "Discuss how you would design and deliver a production-ready backend feature \
from requirements gathering to deployment and monitoring.";

const FALLBACK_GD_EXPECTED: &str = "A strong answer should cover requirement analysis, architecture choices, API/database design, \
testing strategy, deployment plan, observability, risks, and trade-offs.";

// ────────────────────────────────────────────────────────────────────────────
// Output schema
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedInformation {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "string_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub education: String,
    #[serde(deserialize_with = "lenient_string")]
    pub projects: String,
    #[serde(deserialize_with = "lenient_string")]
    pub internships: String,
    #[serde(deserialize_with = "lenient_string")]
    pub work_experience: String,
    #[serde(deserialize_with = "lenient_string")]
    pub strengths: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hobbies: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewQuestions {
    #[serde(deserialize_with = "string_list")]
    pub technical: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub hr: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub behavioral: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDiscussion {
    pub topic: String,
    pub expected_answer: String,
}

/// Normalized analysis returned to clients and stored with the interview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "object_or_default")]
    pub extracted_information: ExtractedInformation,
    #[serde(deserialize_with = "object_or_default")]
    pub interview_questions: InterviewQuestions,
    #[serde(deserialize_with = "lenient_group_discussion")]
    pub group_discussion: GroupDiscussion,
}

/// Analysis plus the provenance stored alongside it.
#[derive(Debug, Clone)]
pub struct ResumeAnalysis {
    pub result: AnalysisResult,
    pub raw_output: String,
    pub parse_error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Prompts the LLM with the resume text and normalizes whatever comes back.
/// Unparseable output is not an error: it is recorded and the fallbacks apply.
pub async fn analyze_resume(llm: &LlmClient, resume_text: &str) -> Result<ResumeAnalysis, AppError> {
    let prompt = build_analysis_prompt(resume_text);
    let raw_output = llm
        .complete(&prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

    let (parsed, parse_error) = match extract_json_object(&raw_output) {
        Ok(value) => (value, None),
        Err(e) => {
            warn!("LLM output was not usable JSON: {e}");
            (Value::Object(Default::default()), Some(e.to_string()))
        }
    };

    Ok(ResumeAnalysis {
        result: normalize_analysis(parsed, resume_text),
        raw_output,
        parse_error,
    })
}

/// Applies schema defaults and fills empty question categories.
pub fn normalize_analysis(parsed: Value, resume_text: &str) -> AnalysisResult {
    let mut result: AnalysisResult = if parsed.is_object() {
        serde_json::from_value(parsed).unwrap_or_default()
    } else {
        AnalysisResult::default()
    };

    let questions = &mut result.interview_questions;
    let gd = &mut result.group_discussion;
    let needs_questions =
        questions.technical.is_empty() || questions.hr.is_empty() || questions.behavioral.is_empty();

    if needs_questions || gd.topic.is_empty() {
        let fallback = fallback_questions(resume_text, &result.extracted_information.skills);

        if questions.technical.is_empty() {
            questions.technical = fallback.technical;
        }
        if questions.hr.is_empty() {
            questions.hr = fallback.hr;
        }
        if questions.behavioral.is_empty() {
            questions.behavioral = fallback.behavioral;
        }
        if gd.topic.is_empty() {
            gd.topic = fallback.group_discussion.topic;
            if gd.expected_answer.is_empty() {
                gd.expected_answer = fallback.group_discussion.expected_answer;
            }
        }
    }

    result
}

#[derive(Debug, Clone)]
pub struct FallbackQuestions {
    pub technical: Vec<String>,
    pub hr: Vec<String>,
    pub behavioral: Vec<String>,
    pub group_discussion: GroupDiscussion,
}

/// Deterministic question bank seeded by the skills found in the resume.
pub fn fallback_questions(resume_text: &str, skills: &[String]) -> FallbackQuestions {
    let haystack = format!("{} {}", skills.join(" "), resume_text);

    let mut technical: Vec<String> = detect_known_skills(&haystack)
        .into_iter()
        .take(TECHNICAL_QUESTION_COUNT)
        .map(|skill| format!("Explain one production issue you solved using {skill}."))
        .collect();
    while technical.len() < TECHNICAL_QUESTION_COUNT {
        technical.push(GENERIC_TECHNICAL[technical.len()].to_string());
    }

    FallbackQuestions {
        technical,
        hr: FALLBACK_HR.iter().map(|q| q.to_string()).collect(),
        behavioral: FALLBACK_BEHAVIORAL.iter().map(|q| q.to_string()).collect(),
        group_discussion: GroupDiscussion {
            topic: FALLBACK_GD_TOPIC.to_string(),
            expected_answer: FALLBACK_GD_EXPECTED.to_string(),
        },
    }
}

/// Whole-word, case-insensitive matchers for `KNOWN_SKILLS`, compiled once.
fn skill_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        KNOWN_SKILLS
            .iter()
            .map(|skill| {
                let re = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(skill)))
                    .case_insensitive(true)
                    .build()
                    .expect("valid skill regex");
                (*skill, re)
            })
            .collect()
    })
}

/// Known skills mentioned in `text`, in `KNOWN_SKILLS` order.
fn detect_known_skills(text: &str) -> Vec<&'static str> {
    skill_patterns()
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(skill, _)| *skill)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient deserializers
// ────────────────────────────────────────────────────────────────────────────

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_string(&Value::deserialize(deserializer)?))
}

/// Accepts a list (blank items dropped) or a single non-blank string.
fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => vec![],
    };
    Ok(items)
}

fn object_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Accepts `{topic|question, expected_answer|expected_points}` or a bare topic string.
fn lenient_group_discussion<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<GroupDiscussion, D::Error> {
    fn first_present(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
        keys.iter()
            .map(|k| obj.get(*k).map(value_to_string).unwrap_or_default())
            .find(|s| !s.is_empty())
            .unwrap_or_default()
    }

    let gd = match Value::deserialize(deserializer)? {
        Value::Object(obj) => GroupDiscussion {
            topic: first_present(&obj, &["topic", "question"]),
            expected_answer: first_present(&obj, &["expected_answer", "expected_points"]),
        },
        Value::String(s) => GroupDiscussion {
            topic: s.trim().to_string(),
            expected_answer: String::new(),
        },
        _ => GroupDiscussion::default(),
    };
    Ok(gd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_llm_output() -> Value {
        json!({
            "extracted_information": {
                "name": "Priya Sharma",
                "email": "priya@example.com",
                "phone": "+91 98765 43210",
                "summary": "Backend developer",
                "skills": ["Python", " ", "FastAPI"],
                "education": "B.Tech CSE",
                "projects": "Interview bot",
                "internships": "",
                "work_experience": "2 years",
                "strengths": "Ownership",
                "hobbies": "Chess"
            },
            "interview_questions": {
                "technical": ["t1", "t2", "t3", "t4", "t5"],
                "hr": ["h1", "h2", "h3"],
                "behavioral": ["b1", "b2"]
            },
            "group_discussion": {
                "topic": "Remote work vs office work",
                "expected_answer": "Balanced arguments"
            }
        })
    }

    #[test]
    fn test_well_formed_output_passes_through() {
        let result = normalize_analysis(full_llm_output(), "");
        assert_eq!(result.extracted_information.name, "Priya Sharma");
        assert_eq!(result.extracted_information.skills, vec!["Python", "FastAPI"]);
        assert_eq!(result.interview_questions.technical.len(), 5);
        assert_eq!(result.interview_questions.hr, vec!["h1", "h2", "h3"]);
        assert_eq!(result.group_discussion.topic, "Remote work vs office work");
        assert_eq!(result.group_discussion.expected_answer, "Balanced arguments");
    }

    #[test]
    fn test_empty_object_gets_full_fallback() {
        let result = normalize_analysis(json!({}), "Worked with Kafka and java daily.");

        assert_eq!(result.extracted_information, ExtractedInformation::default());
        assert_eq!(
            result.interview_questions.technical,
            vec![
                "Explain one production issue you solved using Java.",
                "Explain one production issue you solved using Kafka.",
                GENERIC_TECHNICAL[2],
                GENERIC_TECHNICAL[3],
                GENERIC_TECHNICAL[4],
            ]
        );
        assert_eq!(result.interview_questions.hr.len(), 3);
        assert_eq!(result.interview_questions.behavioral.len(), 2);
        assert_eq!(result.group_discussion.topic, FALLBACK_GD_TOPIC);
        assert_eq!(result.group_discussion.expected_answer, FALLBACK_GD_EXPECTED);
    }

    #[test]
    fn test_non_object_root_is_treated_as_empty() {
        let result = normalize_analysis(json!(["not", "an", "object"]), "");
        assert_eq!(result.interview_questions.technical, GENERIC_TECHNICAL.to_vec());
    }

    #[test]
    fn test_only_missing_categories_are_filled() {
        let mut output = full_llm_output();
        output["interview_questions"]["hr"] = json!([]);
        let result = normalize_analysis(output, "");

        assert_eq!(result.interview_questions.technical[0], "t1");
        assert_eq!(result.interview_questions.hr[0], FALLBACK_HR[0]);
        assert_eq!(result.interview_questions.behavioral, vec!["b1", "b2"]);
    }

    #[test]
    fn test_single_string_lists_are_wrapped() {
        let result = normalize_analysis(
            json!({
                "extracted_information": {"skills": "Rust"},
                "interview_questions": {"technical": "What is ownership?", "hr": "Why us?", "behavioral": ["b"]}
            }),
            "",
        );
        assert_eq!(result.extracted_information.skills, vec!["Rust"]);
        assert_eq!(result.interview_questions.technical, vec!["What is ownership?"]);
        assert_eq!(result.interview_questions.hr, vec!["Why us?"]);
    }

    #[test]
    fn test_malformed_extracted_information_defaults() {
        let result = normalize_analysis(
            json!({"extracted_information": "Priya", "interview_questions": 42}),
            "",
        );
        assert_eq!(result.extracted_information, ExtractedInformation::default());
        assert_eq!(result.interview_questions.technical.len(), TECHNICAL_QUESTION_COUNT);
    }

    #[test]
    fn test_non_string_fields_are_coerced() {
        let result = normalize_analysis(
            json!({"extracted_information": {
                "name": null,
                "phone": 9876543210u64,
                "education": ["B.Tech", "M.Tech"]
            }}),
            "",
        );
        let info = result.extracted_information;
        assert_eq!(info.name, "");
        assert_eq!(info.phone, "9876543210");
        assert_eq!(info.education, "B.Tech, M.Tech");
    }

    #[test]
    fn test_group_discussion_variants() {
        let result = normalize_analysis(
            json!({"group_discussion": {"question": "Is AI good for jobs?", "expected_points": "Both sides"}}),
            "",
        );
        assert_eq!(result.group_discussion.topic, "Is AI good for jobs?");
        assert_eq!(result.group_discussion.expected_answer, "Both sides");

        let result = normalize_analysis(json!({"group_discussion": "  Climate policy  "}), "");
        assert_eq!(result.group_discussion.topic, "Climate policy");
        assert_eq!(result.group_discussion.expected_answer, "");
    }

    #[test]
    fn test_missing_gd_topic_keeps_model_expected_answer() {
        let result = normalize_analysis(
            json!({"group_discussion": {"topic": "", "expected_answer": "Cover pros and cons"}}),
            "",
        );
        assert_eq!(result.group_discussion.topic, FALLBACK_GD_TOPIC);
        assert_eq!(result.group_discussion.expected_answer, "Cover pros and cons");
    }

    #[test]
    fn test_skill_detection_is_whole_word() {
        // "JavaScript" must not count as Java; "sql" matches case-insensitively.
        let found = detect_known_skills("JavaScript developer, wrote sql reports");
        assert_eq!(found, vec!["SQL"]);
    }

    #[test]
    fn test_skill_patterns_compiled_once() {
        assert_eq!(skill_patterns().len(), KNOWN_SKILLS.len());
        assert!(std::ptr::eq(skill_patterns(), skill_patterns()));
        assert_eq!(detect_known_skills("spring boot and KAFKA"), vec!["Spring Boot", "Kafka"]);
    }

    #[test]
    fn test_skill_detection_uses_extracted_skills() {
        let skills = vec!["Spring Boot".to_string(), "React".to_string()];
        let fallback = fallback_questions("", &skills);
        assert_eq!(
            fallback.technical[0],
            "Explain one production issue you solved using Spring Boot."
        );
        assert_eq!(
            fallback.technical[1],
            "Explain one production issue you solved using React."
        );
    }

    #[test]
    fn test_fallback_caps_technical_at_five() {
        let text = "Python FastAPI Django Spring Boot MongoDB SQL React Java Kafka";
        let fallback = fallback_questions(text, &[]);
        assert_eq!(fallback.technical.len(), TECHNICAL_QUESTION_COUNT);
        assert!(fallback.technical[4].ends_with("using MongoDB."));
    }
}
