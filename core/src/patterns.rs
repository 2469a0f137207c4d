//! Alert pattern injection: seven laundering sub-topologies.
//!
//! Each invocation selects members through the CandidateSelector, then
//! runs exactly one topology generator. All generators share the dual
//! stopping rule "stop once transaction count >= target AND total
//! amount >= aggregated floor" — both conditions required, so a
//! pattern can overrun on count while waiting for the amount floor and
//! vice versa. `dense` is the exception (single ungated pass) and
//! `cycle` always emits exactly one edge per member.
//!
//! Every generated transaction is written twice: into the group's
//! private sub-graph (for reporting) and into the shared graph, where
//! alert transactions are indistinguishable from backbone ones.

use crate::{
    candidates::CandidateSelector,
    error::GenResult,
    graph::TransactionGraph,
    rng::GenRng,
    types::{AccountId, AlertId, Step},
};
use std::collections::BTreeMap;

/// The closed set of alert topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    FanIn,
    FanOut,
    Bipartite,
    Mixed,
    Stack,
    Dense,
    Cycle,
}

impl PatternType {
    /// Parse a pattern name from the alert parameter table.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fan_in" => Some(Self::FanIn),
            "fan_out" => Some(Self::FanOut),
            "bipartite" => Some(Self::Bipartite),
            "mixed" => Some(Self::Mixed),
            "stack" => Some(Self::Stack),
            "dense" => Some(Self::Dense),
            "cycle" => Some(Self::Cycle),
            _ => None,
        }
    }

    /// The reason string written to the alert-member export.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FanIn => "fan_in",
            Self::FanOut => "fan_out",
            Self::Bipartite => "bipartite",
            Self::Mixed => "mixed",
            Self::Stack => "stack",
            Self::Dense => "dense",
            Self::Cycle => "cycle",
        }
    }

    /// Numeric alert model ID, stable across runs and exports.
    pub fn model_id(&self) -> i32 {
        match self {
            Self::FanOut => 1,
            Self::FanIn => 2,
            Self::Cycle => 3,
            Self::Bipartite => 4,
            Self::Stack => 5,
            Self::Dense => 6,
            Self::Mixed => 7,
        }
    }
}

/// One edge of an alert sub-graph. The group owns its own copy of the
/// attribute data; the shared graph holds the authoritative record.
#[derive(Debug, Clone)]
pub struct AlertEdge {
    pub src: AccountId,
    pub dst: AccountId,
    pub amount: f64,
    pub date: Step,
}

/// A generated alert: pattern metadata plus a private sub-graph.
#[derive(Debug, Clone)]
pub struct AlertGroup {
    pub alert_id: AlertId,
    pub pattern: PatternType,
    pub schedule_id: i32,
    pub start: Step,
    pub end: Step,
    /// None when the group is a non-fraud control case.
    pub subject: Option<AccountId>,
    members: Vec<AccountId>,
    edges: Vec<AlertEdge>,
}

impl AlertGroup {
    fn record(&mut self, src: &str, dst: &str, amount: f64, date: Step) {
        self.touch(src);
        self.touch(dst);
        self.edges.push(AlertEdge {
            src: src.to_string(),
            dst: dst.to_string(),
            amount,
            date,
        });
    }

    fn touch(&mut self, account_id: &str) {
        if !self.members.iter().any(|m| m == account_id) {
            self.members.push(account_id.to_string());
        }
    }

    /// Member accounts in first-touched order (export row order).
    pub fn members(&self) -> &[AccountId] {
        &self.members
    }

    pub fn edges(&self) -> &[AlertEdge] {
        &self.edges
    }

    /// Min/max amount over the member's incident edges in this group.
    pub fn amount_range_for(&self, account_id: &str) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for e in &self.edges {
            if e.src == account_id || e.dst == account_id {
                range = Some(match range {
                    None => (e.amount, e.amount),
                    Some((lo, hi)) => (lo.min(e.amount), hi.max(e.amount)),
                });
            }
        }
        range
    }
}

/// One alert-pattern invocation, as expanded from a parameter row.
#[derive(Debug, Clone)]
pub struct PatternRequest {
    pub is_fraud: bool,
    pub pattern: PatternType,
    pub accounts: usize,
    pub schedule_id: i32,
    /// Explicit minimum individual amount; max becomes 2x this value.
    pub individual_amount: Option<f64>,
    /// Aggregated-amount floor; 0 when unspecified.
    pub aggregated_amount: Option<f64>,
    /// Target transaction count; topology default when unspecified.
    pub transaction_count: Option<usize>,
    pub amount_difference: Option<f64>,
    pub period: Option<Step>,
    pub amount_rounded: Option<f64>,
    pub orig_country: bool,
    pub bene_country: bool,
    pub orig_business: bool,
    pub bene_business: bool,
}

/// Uniform per-invocation result for downstream bookkeeping.
#[derive(Debug, Clone)]
pub struct PatternOutcome {
    pub alert_id: AlertId,
    pub subject: AccountId,
    pub transaction_count: usize,
    pub total_amount: f64,
}

pub struct AlertPatternEngine {
    next_alert_id: AlertId,
    groups: BTreeMap<AlertId, AlertGroup>,
}

impl AlertPatternEngine {
    pub fn new() -> Self {
        Self {
            next_alert_id: 0,
            groups: BTreeMap::new(),
        }
    }

    /// Generated alert groups keyed by alert ID, in creation order.
    pub fn groups(&self) -> &BTreeMap<AlertId, AlertGroup> {
        &self.groups
    }

    /// Inject one alert pattern. Returns None when the request is
    /// degenerate (fewer than two members) — skipped, never fatal.
    pub fn add_alert_pattern(
        &mut self,
        req: &PatternRequest,
        graph: &mut TransactionGraph,
        selector: &mut CandidateSelector,
        rng: &mut GenRng,
        default_min_amount: f64,
        default_max_amount: f64,
        total_steps: Step,
    ) -> GenResult<Option<PatternOutcome>> {
        if req.accounts < 2 {
            log::warn!(
                "Skipping {} alert with {} account(s): at least 2 members required",
                req.pattern.name(),
                req.accounts
            );
            return Ok(None);
        }

        let (subject, members) =
            selector.select_members(graph, req.accounts, req.is_fraud, rng)?;

        let (min_amount, max_amount) = match req.individual_amount {
            Some(a) => (a, a * 2.0),
            None => (default_min_amount, default_max_amount),
        };
        let floor = req.aggregated_amount.unwrap_or(0.0);
        let start: Step = 0;
        let end: Step = total_steps;

        let mut group = AlertGroup {
            alert_id: self.next_alert_id,
            pattern: req.pattern,
            schedule_id: req.schedule_id,
            start,
            end,
            subject: None,
            members: Vec::new(),
            edges: Vec::new(),
        };
        let mut count: usize = 0;
        let mut total: f64 = 0.0;

        match req.pattern {
            PatternType::FanIn => {
                // All non-subject members send to the subject, cycling
                // through senders until count and floor are both met.
                let senders: Vec<AccountId> =
                    members.iter().filter(|m| **m != subject).cloned().collect();
                let target = req.transaction_count.unwrap_or(members.len() - 1);
                if !senders.is_empty() {
                    'fan_in: loop {
                        for src in &senders {
                            let amount = rng.uniform(min_amount, max_amount);
                            let date = rng.randrange(start, end);
                            group.record(src, &subject, amount, date);
                            graph.add_transaction(src, &subject, Some(amount), Some(date), None)?;
                            count += 1;
                            total += amount;
                            if count >= target && total >= floor {
                                break 'fan_in;
                            }
                        }
                    }
                }
            }

            PatternType::FanOut => {
                let receivers: Vec<AccountId> =
                    members.iter().filter(|m| **m != subject).cloned().collect();
                let target = req.transaction_count.unwrap_or(members.len() - 1);
                if !receivers.is_empty() {
                    'fan_out: loop {
                        for dst in &receivers {
                            let amount = rng.uniform(min_amount, max_amount);
                            let date = rng.randrange(start, end);
                            group.record(&subject, dst, amount, date);
                            graph.add_transaction(&subject, dst, Some(amount), Some(date), None)?;
                            count += 1;
                            total += amount;
                            if count >= target && total >= floor {
                                break 'fan_out;
                            }
                        }
                    }
                }
            }

            PatternType::Bipartite => {
                // Former half are senders, latter half receivers,
                // full cross product in a single pass.
                let half = members.len() / 2;
                let (src_list, dst_list) = members.split_at(half);
                let target = req
                    .transaction_count
                    .unwrap_or(src_list.len() * dst_list.len());
                'bipartite: for src in src_list {
                    for dst in dst_list {
                        let amount = rng.uniform(min_amount, max_amount);
                        let date = rng.randrange(start, end);
                        group.record(src, dst, amount, date);
                        graph.add_transaction(src, dst, Some(amount), Some(date), None)?;
                        count += 1;
                        total += amount;
                        if count >= target && total >= floor {
                            break 'bipartite;
                        }
                    }
                }
            }

            PatternType::Mixed => {
                // Entry account fans out to group A, full cross product
                // A x B, then B fans in to the sink. Only the fan-in
                // phase applies the stopping rule.
                let n = members.len();
                let entry = &members[0];
                let sink = &members[n - 1];
                let group_a = &members[1..n / 2];
                let group_b = &members[n / 2..n - 1];
                let target = req
                    .transaction_count
                    .unwrap_or(group_a.len() + group_b.len() + group_a.len() * group_b.len());

                for dst in group_a {
                    let amount = rng.uniform(min_amount, max_amount);
                    let date = rng.randrange(start, end);
                    group.record(entry, dst, amount, date);
                    graph.add_transaction(entry, dst, Some(amount), Some(date), None)?;
                    count += 1;
                    total += amount;
                }
                for src in group_a {
                    for dst in group_b {
                        let amount = rng.uniform(min_amount, max_amount);
                        let date = rng.randrange(start, end);
                        group.record(src, dst, amount, date);
                        graph.add_transaction(src, dst, Some(amount), Some(date), None)?;
                        count += 1;
                        total += amount;
                    }
                }
                if !group_b.is_empty() {
                    'fan_in_phase: loop {
                        for src in group_b {
                            let amount = rng.uniform(min_amount, max_amount);
                            let date = rng.randrange(start, end);
                            group.record(src, sink, amount, date);
                            graph.add_transaction(src, sink, Some(amount), Some(date), None)?;
                            count += 1;
                            total += amount;
                            if count >= target && total >= floor {
                                break 'fan_in_phase;
                            }
                        }
                    }
                }
            }

            PatternType::Stack => {
                // Two stacked all-to-all layers over member thirds.
                let n = members.len();
                let src_list = &members[..n / 3];
                let mid_list = &members[n / 3..n * 2 / 3];
                let dst_list = &members[n * 2 / 3..];
                let target = req.transaction_count.unwrap_or(
                    src_list.len() * mid_list.len() + mid_list.len() * dst_list.len(),
                );
                'layer1: for src in src_list {
                    for dst in mid_list {
                        let amount = rng.uniform(min_amount, max_amount);
                        let date = rng.randrange(start, end);
                        group.record(src, dst, amount, date);
                        graph.add_transaction(src, dst, Some(amount), Some(date), None)?;
                        count += 1;
                        total += amount;
                        if count >= target && total >= floor {
                            break 'layer1;
                        }
                    }
                }
                'layer2: for src in mid_list {
                    for dst in dst_list {
                        let amount = rng.uniform(min_amount, max_amount);
                        let date = rng.randrange(start, end);
                        group.record(src, dst, amount, date);
                        graph.add_transaction(src, dst, Some(amount), Some(date), None)?;
                        count += 1;
                        total += amount;
                        if count >= target && total >= floor {
                            break 'layer2;
                        }
                    }
                }
            }

            PatternType::Dense => {
                // Subject to every other member, plus one random extra
                // out-edge and one random extra in-edge per member.
                // Single pass, no count or amount gating.
                let others: Vec<AccountId> = members
                    .iter()
                    .filter(|m| **m != subject)
                    .cloned()
                    .collect();
                for dst in &others {
                    let amount = rng.uniform(min_amount, max_amount);
                    let date = rng.randrange(start, end);
                    group.record(&subject, dst, amount, date);
                    graph.add_transaction(&subject, dst, Some(amount), Some(date), None)?;
                    count += 1;
                    total += amount;
                }
                for dst in &others {
                    let nb1 = rng.choice(&others).clone();
                    if *dst != nb1 {
                        let amount = rng.uniform(min_amount, max_amount);
                        let date = rng.randrange(start, end);
                        group.record(dst, &nb1, amount, date);
                        graph.add_transaction(dst, &nb1, Some(amount), Some(date), None)?;
                        count += 1;
                        total += amount;
                    }
                    let nb2 = rng.choice(&others).clone();
                    if *dst != nb2 {
                        let amount = rng.uniform(min_amount, max_amount);
                        let date = rng.randrange(start, end);
                        group.record(&nb2, dst, amount, date);
                        graph.add_transaction(&nb2, dst, Some(amount), Some(date), None)?;
                        count += 1;
                        total += amount;
                    }
                }
            }

            PatternType::Cycle => {
                // Ring starting at the subject's position: one shared
                // amount, pre-sorted dates so the money moves forward
                // in time around the ring.
                let n = members.len();
                let subject_index = members
                    .iter()
                    .position(|m| *m == subject)
                    .unwrap_or(0);
                let amount = rng.uniform(min_amount, max_amount);
                let mut dates: Vec<Step> =
                    (0..n).map(|_| rng.randrange(start, end)).collect();
                dates.sort_unstable();
                for (i, &date) in dates.iter().enumerate() {
                    let src_i = (subject_index + i) % n;
                    let dst_i = (src_i + 1) % n;
                    let src = &members[src_i];
                    let dst = &members[dst_i];
                    group.record(src, dst, amount, date);
                    graph.add_transaction(src, dst, Some(amount), Some(date), None)?;
                    count += 1;
                    total += amount;
                }
            }
        }

        if req.is_fraud {
            group.subject = Some(subject.clone());
            graph.set_fraud(&subject)?;
        }

        let alert_id = self.next_alert_id;
        self.next_alert_id += 1;
        self.groups.insert(alert_id, group);

        Ok(Some(PatternOutcome {
            alert_id,
            subject,
            transaction_count: count,
            total_amount: total,
        }))
    }
}

impl Default for AlertPatternEngine {
    fn default() -> Self {
        Self::new()
    }
}
