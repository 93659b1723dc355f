//! Pairwise battle rounds over the candidate shortlist.
//!
//! Pairings are greedy: each round matches the two candidates with the fewest
//! appearances so far (then fewest wins, then catalog order), which keeps
//! exposure balanced across the fixed round budget.

use tracing::debug;

use super::domain::{BattleRecord, CandidateMember, MemberId, BATTLE_ROUNDS};

/// The two candidates proposed for the next round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattlePairing {
    pub round: usize,
    pub member_a: MemberId,
    pub member_b: MemberId,
}

impl BattlePairing {
    pub fn contains(&self, id: &MemberId) -> bool {
        &self.member_a == id || &self.member_b == id
    }

    fn matches(&self, a: &MemberId, b: &MemberId) -> bool {
        (&self.member_a == a && &self.member_b == b) || (&self.member_a == b && &self.member_b == a)
    }

    pub fn record(&self, winner_id: MemberId) -> BattleRecord {
        BattleRecord {
            round: self.round,
            member_a: self.member_a.clone(),
            member_b: self.member_b.clone(),
            winner_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    #[error("all battle rounds have already been recorded")]
    Complete,
    #[error("expected round {expected}, got round {actual}")]
    OutOfOrder { expected: usize, actual: usize },
    #[error("member '{0}' is not a candidate")]
    UnknownCandidate(MemberId),
    #[error("a candidate cannot battle itself ('{0}')")]
    SelfBattle(MemberId),
    #[error("round {round} should pair '{expected_a}' and '{expected_b}'")]
    UnexpectedPairing {
        round: usize,
        expected_a: MemberId,
        expected_b: MemberId,
    },
    #[error("winner '{0}' did not take part in the round")]
    WinnerNotInRound(MemberId),
}

pub fn is_complete(records: &[BattleRecord]) -> bool {
    records.len() >= BATTLE_ROUNDS
}

/// Propose the next pairing, or `None` once the round budget is spent.
pub fn next_pairing(
    candidates: &[CandidateMember],
    records: &[BattleRecord],
) -> Option<BattlePairing> {
    if is_complete(records) || candidates.len() < 2 {
        return None;
    }

    let mut order: Vec<&CandidateMember> = candidates.iter().collect();
    order.sort_by_key(|candidate| {
        (
            candidate.appearance_count,
            candidate.win_count,
            candidate.catalog_index,
        )
    });

    Some(BattlePairing {
        round: records.len() + 1,
        member_a: order[0].member.id.clone(),
        member_b: order[1].member.id.clone(),
    })
}

/// Apply one round to the shortlist and the log.
///
/// Validation happens before any mutation, so an `Err` leaves both slices
/// exactly as they were.
pub fn record_round(
    candidates: &mut [CandidateMember],
    records: &mut Vec<BattleRecord>,
    record: BattleRecord,
) -> Result<(), BattleError> {
    if is_complete(records) {
        return Err(BattleError::Complete);
    }

    let expected = records.len() + 1;
    if record.round != expected {
        return Err(BattleError::OutOfOrder {
            expected,
            actual: record.round,
        });
    }

    if record.member_a == record.member_b {
        return Err(BattleError::SelfBattle(record.member_a));
    }

    for id in [&record.member_a, &record.member_b] {
        if !candidates.iter().any(|candidate| candidate.id() == id) {
            return Err(BattleError::UnknownCandidate(id.clone()));
        }
    }

    let pairing = next_pairing(candidates, records).ok_or(BattleError::Complete)?;
    if !pairing.matches(&record.member_a, &record.member_b) {
        return Err(BattleError::UnexpectedPairing {
            round: pairing.round,
            expected_a: pairing.member_a,
            expected_b: pairing.member_b,
        });
    }

    if !pairing.contains(&record.winner_id) {
        return Err(BattleError::WinnerNotInRound(record.winner_id));
    }

    for candidate in candidates.iter_mut() {
        if pairing.contains(candidate.id()) {
            candidate.appearance_count += 1;
            if candidate.id() == &record.winner_id {
                candidate.win_count += 1;
            }
        }
    }

    debug!(
        round = record.round,
        member_a = %record.member_a,
        member_b = %record.member_b,
        winner = %record.winner_id,
        "battle recorded"
    );
    records.push(record);

    Ok(())
}
