//! Self-consistency voting over accepted candidates.
//!
//! Each candidate is scored on its own quality signals; there is no
//! cross-candidate averaging and the winner is returned verbatim:
//!
//! ```text
//! confidence * 50
//!   + evidence bonus (strong 30, moderate 15, weak 0)
//!   - contradictions * 5
//!   + min(reasoning chars / 50, 10)
//!   + key insights * 2
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{EvidenceQuality, ScoredAnalysis};

/// Bonus added for the provider-reported evidence quality.
pub fn evidence_bonus(quality: EvidenceQuality) -> f64 {
    match quality {
        EvidenceQuality::Strong => 30.0,
        EvidenceQuality::Moderate => 15.0,
        EvidenceQuality::Weak => 0.0,
    }
}

/// Intrinsic voting score of one candidate. Higher is better.
pub fn voting_score(candidate: &ScoredAnalysis) -> f64 {
    let reasoning_bonus = (candidate.reasoning_len() as f64 / 50.0).min(10.0);
    candidate.confidence() * 50.0 + evidence_bonus(candidate.evidence_quality())
        - candidate.validation.contradictions.len() as f64 * 5.0
        + reasoning_bonus
        + candidate.key_insights.len() as f64 * 2.0
}

/// A candidate paired with its voting score. Lives for one selection only.
#[derive(Debug, Clone, Copy)]
pub struct VotingCandidate<'a> {
    pub analysis: &'a ScoredAnalysis,
    pub voting_score: f64,
}

/// Result of a vote: every candidate's score plus the winner's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub scores: Vec<f64>,
    pub winner_index: usize,
}

/// Score all candidates and pick the winner; ties keep the earlier candidate.
///
/// Returns `None` for an empty slice.
pub fn tally(candidates: &[ScoredAnalysis]) -> Option<Ballot> {
    let scored: Vec<VotingCandidate<'_>> = candidates
        .iter()
        .map(|analysis| VotingCandidate {
            analysis,
            voting_score: voting_score(analysis),
        })
        .collect();

    let mut winner_index = 0usize;
    for (i, c) in scored.iter().enumerate().skip(1) {
        // Strict comparison: first wins on ties.
        if c.voting_score > scored[winner_index].voting_score {
            winner_index = i;
        }
    }

    (!scored.is_empty()).then(|| Ballot {
        scores: scored.iter().map(|c| c.voting_score).collect(),
        winner_index,
    })
}

/// Select the most trustworthy candidate. One candidate is returned unchanged;
/// an empty slice yields `None`.
pub fn select_best(candidates: &[ScoredAnalysis]) -> Option<&ScoredAnalysis> {
    tally(candidates).map(|ballot| &candidates[ballot.winner_index])
}
