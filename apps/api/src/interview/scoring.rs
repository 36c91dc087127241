//! Answer scoring — semantic similarity between expected and candidate answers.
//!
//! Algorithm:
//! 1. Empty answer set → zero result, embedder never called.
//! 2. completion_rate = non-empty candidate answers / total
//! 3. Embed expected texts and candidate texts as two batches
//! 4. score[i] = 0.0 for an empty answer, else clamp(cos(expected[i], candidate[i]), 0, 1) × 10
//! 5. average = mean of all rounded per-question scores
//! 6. quality from (average, completion_rate)

use thiserror::Error;
use tracing::debug;

use crate::embedding::{Embedder, EmbeddingError};
use crate::interview::models::{Level, QuestionAnswer, ScoringResult};

pub const HIGH_MIN_AVERAGE: f64 = 7.0;
pub const HIGH_MIN_COMPLETION: f64 = 0.8;
pub const MEDIUM_MIN_AVERAGE: f64 = 4.5;
pub const MEDIUM_MIN_COMPLETION: f64 = 0.5;

const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("embedding batch size mismatch: {expected} expected vs {candidate} candidate vectors for {answers} answers")]
    BatchMismatch {
        answers: usize,
        expected: usize,
        candidate: usize,
    },

    #[error("vector dimension mismatch at question {index}: {left} vs {right}")]
    DimensionMismatch {
        index: usize,
        left: usize,
        right: usize,
    },
}

/// Scores a batch of answers against their expected texts.
pub async fn score_answers(
    embedder: &dyn Embedder,
    answers: &[QuestionAnswer],
) -> Result<ScoringResult, ScoringError> {
    if answers.is_empty() {
        return Ok(ScoringResult {
            question_scores: vec![],
            average_score: 0.0,
            completion_rate: 0.0,
            quality: Level::Low,
        });
    }

    let expected_texts: Vec<String> = answers
        .iter()
        .map(|a| a.expected_text().to_string())
        .collect();
    let candidate_texts: Vec<String> = answers
        .iter()
        .map(|a| a.candidate_text().to_string())
        .collect();

    let answered = candidate_texts.iter().filter(|t| !t.is_empty()).count();
    let completion_rate = answered as f64 / answers.len() as f64;

    let expected_emb = embedder.embed(&expected_texts).await?;
    let candidate_emb = embedder.embed(&candidate_texts).await?;

    if expected_emb.len() != answers.len() || candidate_emb.len() != answers.len() {
        return Err(ScoringError::BatchMismatch {
            answers: answers.len(),
            expected: expected_emb.len(),
            candidate: candidate_emb.len(),
        });
    }

    let mut question_scores = Vec::with_capacity(answers.len());
    for (i, candidate) in candidate_texts.iter().enumerate() {
        if candidate.is_empty() {
            question_scores.push(0.0);
            continue;
        }
        let similarity = cosine_similarity(&expected_emb[i], &candidate_emb[i]).ok_or(
            ScoringError::DimensionMismatch {
                index: i,
                left: expected_emb[i].len(),
                right: candidate_emb[i].len(),
            },
        )?;
        question_scores.push(similarity_to_score(similarity));
    }

    let average_score =
        round2(question_scores.iter().sum::<f64>() / question_scores.len() as f64);
    let quality = answer_quality(average_score, completion_rate);

    debug!(
        answers = answers.len(),
        answered, average_score, ?quality, "Scored answer batch"
    );

    Ok(ScoringResult {
        question_scores,
        average_score,
        completion_rate: round2(completion_rate),
        quality,
    })
}

/// Maps an average score and completion rate to a quality label.
/// Boundaries are inclusive.
pub fn answer_quality(average_score: f64, completion_rate: f64) -> Level {
    if average_score >= HIGH_MIN_AVERAGE && completion_rate >= HIGH_MIN_COMPLETION {
        Level::High
    } else if average_score >= MEDIUM_MIN_AVERAGE && completion_rate >= MEDIUM_MIN_COMPLETION {
        Level::Medium
    } else {
        Level::Low
    }
}

/// Cosine similarity of two vectors. `None` when their lengths differ.
/// A zero-magnitude vector has similarity 0 with everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return Some(0.0);
    }
    Some(dot / denom)
}

fn similarity_to_score(similarity: f64) -> f64 {
    round2(similarity.clamp(0.0, 1.0) * MAX_SCORE)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
