//! Hand-off of finished runs
//!
//! A live run that ends with points produces a sealed [`ReplayLog`]. The
//! game never uploads or ranks anything itself; it wraps the log in a
//! [`Submission`] and passes it to whatever [`ReplaySink`] the host provides.

use serde::{Deserialize, Serialize};

use crate::machine::Effect;
use crate::sim::ReplayLog;

/// Payload for the score endpoint: `{"replay": {...}, "roomId": 3}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub replay: ReplayLog,
    /// Private room the run was played in, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<u32>,
}

impl Submission {
    /// Wrap a sealed log. Zero-score runs are never submitted.
    pub fn new(replay: ReplayLog, room_id: Option<u32>) -> Option<Self> {
        if replay.final_score() == 0 {
            return None;
        }
        Some(Self { replay, room_id })
    }

    pub fn score(&self) -> u64 {
        self.replay.final_score()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// External persistence / leaderboard collaborator
pub trait ReplaySink {
    fn submit(&mut self, submission: Submission);
}

/// Keeps submissions in memory, best score first
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub submissions: Vec<Submission>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn best_score(&self) -> Option<u64> {
        self.submissions.first().map(|s| s.score())
    }
}

impl ReplaySink for MemorySink {
    fn submit(&mut self, submission: Submission) {
        // Insertion point keeps the list sorted descending by score
        let pos = self
            .submissions
            .iter()
            .position(|s| submission.score() > s.score())
            .unwrap_or(self.submissions.len());
        log::info!("Run submitted (score {}, rank {})", submission.score(), pos + 1);
        self.submissions.insert(pos, submission);
    }
}

/// Forward every sealed run among `effects` to `sink`; returns how many
pub fn forward_sealed(effects: &[Effect], sink: &mut dyn ReplaySink, room_id: Option<u32>) -> usize {
    let mut forwarded = 0;
    for effect in effects {
        if let Effect::RunSealed(log) = effect {
            if let Some(submission) = Submission::new(log.clone(), room_id) {
                sink.submit(submission);
                forwarded += 1;
            }
        }
    }
    forwarded
}
