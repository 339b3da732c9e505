use crate::models::result::{PerformanceTier, ResultSummary};
use crate::models::session::AnswerRecord;
use std::collections::BTreeMap;

pub struct GradingService;

impl GradingService {
    /// Integer percentage rounded half up. Zero questions score zero.
    pub fn score_percent(correct: u32, total: u32) -> u32 {
        if total == 0 {
            return 0;
        }
        let correct = correct.min(total) as u64;
        let total = total as u64;
        ((200 * correct + total) / (2 * total)) as u32
    }

    pub fn performance_tier(score_percent: u32) -> PerformanceTier {
        match score_percent {
            85.. => PerformanceTier::Excellent,
            70..=84 => PerformanceTier::Good,
            45..=69 => PerformanceTier::Average,
            _ => PerformanceTier::Poor,
        }
    }

    /// Builds the summary from a fully reconciled answer map. Indices without
    /// a record still count against the score.
    pub fn summarize(answers: &BTreeMap<usize, AnswerRecord>, total_questions: usize) -> ResultSummary {
        let mut correct = 0u32;
        let mut skipped = 0u32;
        for record in answers.values() {
            match record {
                AnswerRecord::Answered { is_correct: true, .. } => correct += 1,
                AnswerRecord::Answered { .. } => {}
                AnswerRecord::Skipped => skipped += 1,
            }
        }
        let total = total_questions as u32;
        Self::summary_from_counts(correct, skipped, total)
    }

    pub fn summary_from_counts(correct: u32, skipped: u32, total: u32) -> ResultSummary {
        let score_percent = Self::score_percent(correct, total);
        ResultSummary {
            correct,
            wrong: total.saturating_sub(correct),
            skipped,
            total_questions: total,
            score_percent,
            performance_tier: Self::performance_tier(score_percent),
        }
    }
}
