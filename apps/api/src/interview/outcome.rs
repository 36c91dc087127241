use crate::interview::models::{Level, Verdict};

/// Combines behavioral signals with answer quality into a verdict.
///
/// Rules are checked in order; the first match wins:
/// 1. Strong: High confidence, Low nervousness, and at least Medium answers.
/// 2. Needs improvement: Low confidence, High nervousness, or Low answers.
/// 3. Moderate otherwise.
pub fn classify_outcome(confidence: Level, nervousness: Level, answer_quality: Level) -> Verdict {
    if confidence == Level::High
        && nervousness == Level::Low
        && matches!(answer_quality, Level::High | Level::Medium)
    {
        return Verdict::Strong;
    }
    if confidence == Level::Low || nervousness == Level::High || answer_quality == Level::Low {
        return Verdict::NeedsImprovement;
    }
    Verdict::Moderate
}
