//! Alert pattern topology tests.
//!
//! Each test builds a graph with exactly as many accounts as the
//! pattern requests, so the member set is the whole account population
//! and the topology can be checked structurally.

use amlsynth_core::candidates::CandidateSelector;
use amlsynth_core::graph::{Account, TransactionGraph};
use amlsynth_core::patterns::{AlertPatternEngine, PatternRequest, PatternType};
use amlsynth_core::rng::GenRng;
use std::collections::BTreeSet;

const MIN_AMOUNT: f64 = 100.0;
const MAX_AMOUNT: f64 = 1000.0;
const TOTAL_STEPS: i64 = 200;

fn account(id: &str) -> Account {
    Account {
        account_id: id.to_string(),
        init_balance: 1000.0,
        start: -1,
        end: -1,
        country: "US".into(),
        business: "I".into(),
        is_fraud: false,
        model_id: 1,
        attrs: Vec::new(),
    }
}

fn graph_of(n: usize) -> TransactionGraph {
    let mut graph = TransactionGraph::new();
    for i in 0..n {
        graph.add_account(account(&format!("acct-{i:02}")));
    }
    graph
}

fn request(pattern: PatternType, accounts: usize) -> PatternRequest {
    PatternRequest {
        is_fraud: true,
        pattern,
        accounts,
        schedule_id: 1,
        individual_amount: None,
        aggregated_amount: None,
        transaction_count: None,
        amount_difference: None,
        period: Some(TOTAL_STEPS),
        amount_rounded: None,
        orig_country: false,
        bene_country: false,
        orig_business: false,
        bene_business: false,
    }
}

/// Run one pattern over a graph whose whole population is the member set.
fn inject(
    req: &PatternRequest,
    seed: u64,
) -> (
    TransactionGraph,
    AlertPatternEngine,
    amlsynth_core::patterns::PatternOutcome,
) {
    let mut graph = graph_of(req.accounts);
    let mut selector = CandidateSelector::compute_hubs(&graph, 0);
    let mut rng = GenRng::new(seed);
    let mut engine = AlertPatternEngine::new();
    let outcome = engine
        .add_alert_pattern(req, &mut graph, &mut selector, &mut rng, MIN_AMOUNT, MAX_AMOUNT, TOTAL_STEPS)
        .unwrap()
        .expect("pattern should not be skipped");
    (graph, engine, outcome)
}

#[test]
fn fan_in_sends_one_transaction_per_non_subject_member() {
    let (graph, engine, outcome) = inject(&request(PatternType::FanIn, 5), 21);

    assert_eq!(outcome.transaction_count, 4, "N members yield N-1 transactions");
    let group = engine.groups().get(&outcome.alert_id).unwrap();
    assert_eq!(group.edges().len(), 4);
    let senders: BTreeSet<_> = group.edges().iter().map(|e| e.src.clone()).collect();
    assert_eq!(senders.len(), 4, "Every sender is distinct");
    assert!(
        group.edges().iter().all(|e| e.dst == outcome.subject),
        "All fan-in edges must point at the subject"
    );
    // Written twice: group sub-graph and shared graph.
    assert_eq!(graph.num_transactions(), 4);
    assert!(graph.account(&outcome.subject).unwrap().is_fraud);
}

#[test]
fn fan_out_sends_from_the_subject_to_every_other_member() {
    let (_, engine, outcome) = inject(&request(PatternType::FanOut, 5), 22);

    assert_eq!(outcome.transaction_count, 4);
    let group = engine.groups().get(&outcome.alert_id).unwrap();
    assert!(group.edges().iter().all(|e| e.src == outcome.subject));
    let receivers: BTreeSet<_> = group.edges().iter().map(|e| e.dst.clone()).collect();
    assert_eq!(receivers.len(), 4);
}

#[test]
fn bipartite_is_a_full_cross_product_of_the_halves() {
    let (_, engine, outcome) = inject(&request(PatternType::Bipartite, 6), 23);

    // 3 senders x 3 receivers.
    assert_eq!(outcome.transaction_count, 9);
    let group = engine.groups().get(&outcome.alert_id).unwrap();
    let senders: BTreeSet<_> = group.edges().iter().map(|e| e.src.clone()).collect();
    let receivers: BTreeSet<_> = group.edges().iter().map(|e| e.dst.clone()).collect();
    assert_eq!(senders.len(), 3);
    assert_eq!(receivers.len(), 3);
    assert!(
        senders.is_disjoint(&receivers),
        "Sender and receiver halves must not overlap"
    );
    let pairs: BTreeSet<_> = group
        .edges()
        .iter()
        .map(|e| (e.src.clone(), e.dst.clone()))
        .collect();
    assert_eq!(pairs.len(), 9, "Each ordered pair appears exactly once");
}

#[test]
fn mixed_chains_fan_out_cross_product_and_fan_in() {
    let (_, engine, outcome) = inject(&request(PatternType::Mixed, 6), 24);

    // |A| = 2, |B| = 2: 2 fan-out + 4 cross + 2 fan-in.
    assert_eq!(outcome.transaction_count, 8);
    let group = engine.groups().get(&outcome.alert_id).unwrap();
    let edges = group.edges();
    let entry = &edges[0].src;
    assert!(
        edges[..2].iter().all(|e| e.src == *entry),
        "First phase fans out of the entry account"
    );
    let sink = &edges[edges.len() - 1].dst;
    assert!(
        edges[6..].iter().all(|e| e.dst == *sink),
        "Last phase fans into the sink account"
    );
    assert_ne!(entry, sink);
}

#[test]
fn stack_builds_two_all_to_all_layers() {
    let (_, engine, outcome) = inject(&request(PatternType::Stack, 9), 25);

    // Thirds of 3: 3x3 + 3x3.
    assert_eq!(outcome.transaction_count, 18);
    let group = engine.groups().get(&outcome.alert_id).unwrap();
    let layer1: BTreeSet<_> = group.edges()[..9].iter().map(|e| e.src.clone()).collect();
    let mids: BTreeSet<_> = group.edges()[..9].iter().map(|e| e.dst.clone()).collect();
    let layer2_src: BTreeSet<_> = group.edges()[9..].iter().map(|e| e.src.clone()).collect();
    assert_eq!(mids, layer2_src, "Middle third bridges the two layers");
    assert!(layer1.is_disjoint(&mids));
}

#[test]
fn dense_connects_the_subject_to_everyone_with_random_extras() {
    let (graph, engine, outcome) = inject(&request(PatternType::Dense, 6), 26);

    let group = engine.groups().get(&outcome.alert_id).unwrap();
    let subject_targets: BTreeSet<_> = group
        .edges()
        .iter()
        .filter(|e| e.src == outcome.subject)
        .map(|e| e.dst.clone())
        .collect();
    assert_eq!(
        subject_targets.len(),
        5,
        "Subject must reach every other member"
    );
    // Extras are one optional in-edge and out-edge per member.
    assert!(outcome.transaction_count >= 5);
    assert!(outcome.transaction_count <= 5 + 2 * 5);
    assert!(
        graph.transactions().iter().all(|t| t.src != t.dst),
        "Dense extras must never self-loop"
    );
}

#[test]
fn cycle_walks_a_ring_in_chronological_order() {
    let (_, engine, outcome) = inject(&request(PatternType::Cycle, 5), 27);

    assert_eq!(outcome.transaction_count, 5, "Exactly one edge per member");
    let group = engine.groups().get(&outcome.alert_id).unwrap();
    let edges = group.edges();

    assert_eq!(edges[0].src, outcome.subject, "Ring starts at the subject");
    for window in edges.windows(2) {
        assert_eq!(window[0].dst, window[1].src, "Edges must chain into a ring");
        assert!(
            window[0].date <= window[1].date,
            "Dates must be non-decreasing along the ring"
        );
    }
    assert_eq!(
        edges[edges.len() - 1].dst,
        edges[0].src,
        "Ring must close on the subject"
    );
    let amounts: BTreeSet<_> = edges.iter().map(|e| e.amount.to_bits()).collect();
    assert_eq!(amounts.len(), 1, "Cycle uses one shared amount");
}

#[test]
fn amount_floor_overruns_the_count_target() {
    let mut req = request(PatternType::FanIn, 3);
    req.individual_amount = Some(10.0); // amounts in [10, 20)
    req.aggregated_amount = Some(1000.0);
    let (_, _, outcome) = inject(&req, 28);

    assert!(
        outcome.transaction_count > 2,
        "Count target alone would stop at 2"
    );
    assert!(outcome.total_amount >= 1000.0, "Floor must be reached");
    // At 10-20 per transaction, the floor needs at least 50.
    assert!(outcome.transaction_count >= 50);
}

#[test]
fn explicit_individual_amount_doubles_as_the_maximum() {
    let mut req = request(PatternType::FanOut, 4);
    req.individual_amount = Some(500.0);
    let (_, engine, outcome) = inject(&req, 29);

    let group = engine.groups().get(&outcome.alert_id).unwrap();
    assert!(group
        .edges()
        .iter()
        .all(|e| e.amount >= 500.0 && e.amount < 1000.0));
}

#[test]
fn non_fraud_groups_have_no_subject_and_flag_nobody() {
    let mut req = request(PatternType::FanIn, 4);
    req.is_fraud = false;
    let (graph, engine, outcome) = inject(&req, 30);

    let group = engine.groups().get(&outcome.alert_id).unwrap();
    assert!(group.subject.is_none(), "Control groups carry no subject");
    assert!(
        graph.accounts().iter().all(|a| !a.is_fraud),
        "No account may be flagged by a control group"
    );
}

#[test]
fn degenerate_single_account_request_is_skipped() {
    let mut graph = graph_of(3);
    let mut selector = CandidateSelector::compute_hubs(&graph, 0);
    let mut rng = GenRng::new(31);
    let mut engine = AlertPatternEngine::new();

    let outcome = engine
        .add_alert_pattern(
            &request(PatternType::Cycle, 1),
            &mut graph,
            &mut selector,
            &mut rng,
            MIN_AMOUNT,
            MAX_AMOUNT,
            TOTAL_STEPS,
        )
        .unwrap();
    assert!(outcome.is_none(), "accounts == 1 must be skipped, not fatal");
    assert_eq!(graph.num_transactions(), 0);
    assert!(engine.groups().is_empty());
}

#[test]
fn fraud_subjects_stay_unique_across_invocations() {
    let mut graph = graph_of(4);
    let mut selector = CandidateSelector::compute_hubs(&graph, 0);
    let mut rng = GenRng::new(32);
    let mut engine = AlertPatternEngine::new();

    let req = request(PatternType::FanIn, 3);
    let first = engine
        .add_alert_pattern(&req, &mut graph, &mut selector, &mut rng, MIN_AMOUNT, MAX_AMOUNT, TOTAL_STEPS)
        .unwrap()
        .unwrap();
    let second = engine
        .add_alert_pattern(&req, &mut graph, &mut selector, &mut rng, MIN_AMOUNT, MAX_AMOUNT, TOTAL_STEPS)
        .unwrap()
        .unwrap();

    assert_ne!(first.subject, second.subject);
    assert_eq!(engine.groups().len(), 2);
    assert_eq!(
        engine.groups().keys().copied().collect::<Vec<_>>(),
        vec![0, 1],
        "Alert IDs are allocated sequentially"
    );
}

#[test]
fn every_alert_edge_lands_in_the_shared_graph() {
    let (graph, engine, outcome) = inject(&request(PatternType::Stack, 6), 33);

    let group = engine.groups().get(&outcome.alert_id).unwrap();
    assert_eq!(graph.num_transactions(), group.edges().len());
    for (tx, edge) in graph.transactions().iter().zip(group.edges()) {
        assert_eq!(tx.src, edge.src);
        assert_eq!(tx.dst, edge.dst);
        assert_eq!(tx.amount, Some(edge.amount));
        assert_eq!(tx.date, Some(edge.date));
    }
}
