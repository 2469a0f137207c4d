//! The synthesis pipeline — the heart of amlsynth.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Load accounts
//!   2. Generate the normal-transaction backbone
//!   3. Compute hubs and the subject-candidate pool
//!   4. Inject alert patterns in parameter-file order
//!   5. Export accounts, transactions and alert members
//!
//! RULES:
//!   - The generator is an explicit context object: no globals, no
//!     ambient state. Everything a phase touches lives here.
//!   - Single-threaded by design. Transaction ID allocation and
//!     fraud-flag mutation assume one writer; reproducibility assumes
//!     all random draws happen in this exact phase order.

use crate::{
    backbone, candidates::CandidateSelector, config::GeneratorConfig, degree,
    error::{GenError, GenResult},
    graph::TransactionGraph,
    loader,
    patterns::{AlertGroup, AlertPatternEngine},
    rng::GenRng,
    types::AlertId,
    writer,
};
use std::collections::BTreeMap;

/// End-of-run totals for callers that want to print a summary.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub accounts: usize,
    pub backbone_transactions: usize,
    pub total_transactions: usize,
    pub alert_groups: usize,
    pub fraud_subjects: usize,
}

pub struct TransactionGenerator {
    conf: GeneratorConfig,
    rng: GenRng,
    graph: TransactionGraph,
    selector: Option<CandidateSelector>,
    engine: AlertPatternEngine,
    attr_names: Vec<String>,
    backbone_transactions: usize,
}

impl TransactionGenerator {
    pub fn new(conf: GeneratorConfig) -> Self {
        let rng = GenRng::new(conf.seed());
        Self {
            conf,
            rng,
            graph: TransactionGraph::new(),
            selector: None,
            engine: AlertPatternEngine::new(),
            attr_names: Vec::new(),
            backbone_transactions: 0,
        }
    }

    pub fn graph(&self) -> &TransactionGraph {
        &self.graph
    }

    pub fn alert_groups(&self) -> &BTreeMap<AlertId, AlertGroup> {
        self.engine.groups()
    }

    /// Phase 1: load account vertices from the configured table.
    pub fn load_accounts(&mut self) -> GenResult<()> {
        self.attr_names = loader::load_accounts(&self.conf, &mut self.graph, &mut self.rng)?;
        Ok(())
    }

    /// Phase 2: expand and balance the degree table, run the
    /// configuration model, and append the backbone transactions.
    ///
    /// Abstract edges map onto accounts in insertion order. A residual
    /// self-loop surviving stub matching cannot be inserted as a
    /// transaction; it is skipped with a warning — the accepted
    /// approximation, never a hard failure.
    pub fn generate_normal_transactions(&mut self) -> GenResult<usize> {
        let deg_path = self.conf.input_path(&self.conf.input.degree);
        let rows = loader::load_degree_rows(&deg_path)?;
        let (in_deg, out_deg) = degree::expand_degree_rows(&rows)?;
        let (in_deg, out_deg) =
            degree::balance_degrees(in_deg, out_deg, self.graph.num_accounts())?;
        let edges = backbone::configuration_model(&in_deg, &out_deg, &mut self.rng)?;

        log::info!("Add {} base transactions", edges.len());
        let ids: Vec<String> = self
            .graph
            .accounts()
            .iter()
            .map(|a| a.account_id.clone())
            .collect();
        let mut added = 0;
        for (src_i, dst_i) in edges {
            if src_i == dst_i {
                log::warn!("Skipping residual self loop at node {src_i}");
                continue;
            }
            self.graph
                .add_transaction(&ids[src_i], &ids[dst_i], None, None, None)?;
            added += 1;
        }
        self.backbone_transactions = added;
        Ok(added)
    }

    /// Phase 3: compute hub accounts over the backbone and initialize
    /// the subject-candidate pool.
    pub fn set_subject_candidates(&mut self) {
        self.selector = Some(CandidateSelector::compute_hubs(
            &self.graph,
            self.conf.graph_generator.degree_threshold,
        ));
    }

    /// Phase 4: expand the alert parameter table and inject each
    /// pattern in file order.
    pub fn load_alert_patterns(&mut self) -> GenResult<usize> {
        let selector = self.selector.as_mut().ok_or_else(|| {
            GenError::Configuration(
                "Subject candidates must be computed before alert injection".into(),
            )
        })?;
        let alert_path = self.conf.input_path(&self.conf.input.alert_patterns);
        let requests = loader::load_alert_requests(&alert_path, self.conf.general.total_steps)?;

        let mut injected = 0;
        for request in &requests {
            let outcome = self.engine.add_alert_pattern(
                request,
                &mut self.graph,
                selector,
                &mut self.rng,
                self.conf.default.min_amount,
                self.conf.default.max_amount,
                self.conf.general.total_steps,
            )?;
            if outcome.is_some() {
                injected += 1;
                if injected % 1000 == 0 {
                    log::info!("Wrote {injected} alerts");
                }
            }
        }
        Ok(injected)
    }

    /// Phase 5: write the three output CSV files.
    pub fn export(&mut self) -> GenResult<()> {
        std::fs::create_dir_all(&self.conf.output.directory)?;
        let type_path = self.conf.input_path(&self.conf.input.transaction_type);
        let tx_types = loader::load_transaction_types(&type_path)?;

        writer::write_account_list(
            &self.conf.output_path(&self.conf.output.accounts),
            &self.graph,
            &self.attr_names,
        )?;
        writer::write_transaction_list(
            &self.conf.output_path(&self.conf.output.transactions),
            &self.graph,
            &tx_types,
            &mut self.rng,
        )?;
        writer::write_alert_members(
            &self.conf.output_path(&self.conf.output.alert_members),
            &self.graph,
            self.engine.groups(),
            &self.attr_names,
        )?;
        Ok(())
    }

    /// Run the whole pipeline in order and return the totals.
    pub fn run(&mut self) -> GenResult<RunSummary> {
        self.load_accounts()?;
        self.generate_normal_transactions()?;
        self.set_subject_candidates();
        self.load_alert_patterns()?;
        self.export()?;
        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        let fraud_subjects = self
            .graph
            .accounts()
            .iter()
            .filter(|a| a.is_fraud)
            .count();
        RunSummary {
            accounts: self.graph.num_accounts(),
            backbone_transactions: self.backbone_transactions,
            total_transactions: self.graph.num_transactions(),
            alert_groups: self.engine.groups().len(),
            fraud_subjects,
        }
    }
}
