//! Hub computation and alert-member selection.
//!
//! Member sampling is biased toward well-connected accounts: a random
//! hub plus its successors seed the candidate set until it is large
//! enough, then members are drawn uniformly without replacement. The
//! subject is picked from the intersection of the drawn members with
//! the subject pool; a fraud subject is consumed from the pool so no
//! account is ever the subject of two fraud groups in one run.
//!
//! Ordered containers everywhere the iteration order feeds the RNG —
//! hash-map ordering would break run reproducibility.

use crate::{
    error::{GenError, GenResult},
    graph::TransactionGraph,
    rng::GenRng,
    types::AccountId,
};
use std::collections::BTreeSet;

/// Draws whose member set misses the subject pool entirely are retried
/// from scratch; after this many failed draws the pool is considered
/// exhausted and the run aborts instead of spinning forever.
const MAX_SELECT_RETRIES: usize = 1000;

/// Cap on hub-expansion rounds within a single draw, so a saturated
/// neighborhood smaller than the requested member count cannot stall.
const MAX_GROW_ROUNDS: usize = 1000;

pub struct CandidateSelector {
    hubs: Vec<AccountId>,
    subject_candidates: BTreeSet<AccountId>,
}

impl CandidateSelector {
    /// Compute hubs over the current graph and initialize the subject
    /// pool to all accounts. Run once, after the backbone is built and
    /// before any alert injection.
    pub fn compute_hubs(graph: &TransactionGraph, degree_threshold: usize) -> Self {
        let mut hubs = Vec::new();
        let mut subject_candidates = BTreeSet::new();
        for (i, account) in graph.accounts().iter().enumerate() {
            if graph.degree_at(i) >= degree_threshold {
                hubs.push(account.account_id.clone());
            }
            subject_candidates.insert(account.account_id.clone());
        }
        log::info!(
            "{} hub accounts (degree >= {degree_threshold}) among {}",
            hubs.len(),
            graph.num_accounts()
        );
        Self {
            hubs,
            subject_candidates,
        }
    }

    pub fn hubs(&self) -> &[AccountId] {
        &self.hubs
    }

    pub fn subject_pool_len(&self) -> usize {
        self.subject_candidates.len()
    }

    /// Select `num` distinct member accounts plus one subject among
    /// them. When `needs_subject` is true the subject is permanently
    /// removed from the pool.
    pub fn select_members(
        &mut self,
        graph: &TransactionGraph,
        num: usize,
        needs_subject: bool,
        rng: &mut GenRng,
    ) -> GenResult<(AccountId, Vec<AccountId>)> {
        if self.hubs.is_empty() {
            return Err(GenError::CandidateExhausted {
                wanted: num,
                retries: 0,
            });
        }

        for retry in 0..MAX_SELECT_RETRIES {
            let mut candidates: BTreeSet<AccountId> = BTreeSet::new();
            let mut rounds = 0;
            while candidates.len() < num {
                rounds += 1;
                if rounds > MAX_GROW_ROUNDS {
                    break;
                }
                let hub = rng.choice(&self.hubs).clone();
                for neighbor in graph.out_neighbors(&hub)? {
                    candidates.insert(neighbor);
                }
                candidates.insert(hub);
            }
            if candidates.len() < num {
                log::debug!(
                    "retry {retry}: candidate set stuck at {} < {num}",
                    candidates.len()
                );
                continue;
            }

            let pool: Vec<AccountId> = candidates.into_iter().collect();
            let members = rng.sample(&pool, num);

            let eligible: Vec<AccountId> = members
                .iter()
                .filter(|m| self.subject_candidates.contains(*m))
                .cloned()
                .collect();
            if eligible.is_empty() {
                continue;
            }

            let subject = rng.choice(&eligible).clone();
            if needs_subject {
                self.subject_candidates.remove(&subject);
            }
            return Ok((subject, members));
        }

        Err(GenError::CandidateExhausted {
            wanted: num,
            retries: MAX_SELECT_RETRIES,
        })
    }
}
