//! The shared transaction multigraph.
//!
//! RULE: The TransactionGraph exclusively owns every Account and
//! Transaction record of a run. Accounts are created during the load
//! phase and only their fraud flag mutates afterward; transactions are
//! append-only. Both the backbone generator and the alert pattern
//! engine write into this single structure.

use crate::{
    error::{GenError, GenResult},
    types::{AccountId, Step, TxId},
};
use std::collections::{BTreeSet, HashMap};

/// A node in the transaction network: one financial account.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    pub init_balance: f64,
    /// Step the account opened, -1 = unbounded.
    pub start: Step,
    /// Step the account closed, -1 = unbounded.
    pub end: Step,
    pub country: String,
    pub business: String,
    /// Set true exactly when the account is chosen as a fraud subject.
    pub is_fraud: bool,
    /// Transaction behavior model ID, carried through to export.
    pub model_id: i32,
    /// Passthrough attributes in declared column order.
    pub attrs: Vec<(String, String)>,
}

/// A directed edge: one transaction between two existing accounts.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub tx_id: TxId,
    pub src: AccountId,
    pub dst: AccountId,
    pub amount: Option<f64>,
    pub date: Option<Step>,
    pub tx_type: Option<String>,
}

pub struct TransactionGraph {
    accounts: Vec<Account>,
    index: HashMap<AccountId, usize>,
    transactions: Vec<Transaction>,
    in_degree: Vec<usize>,
    out_degree: Vec<usize>,
    // Distinct successor indices per node. Parallel edges collapse here;
    // degree counts do not.
    out_neighbors: Vec<BTreeSet<usize>>,
    next_tx_id: TxId,
}

impl TransactionGraph {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            index: HashMap::new(),
            transactions: Vec::new(),
            in_degree: Vec::new(),
            out_degree: Vec::new(),
            out_neighbors: Vec::new(),
            next_tx_id: 0,
        }
    }

    /// Insert an account vertex. Duplicate IDs are a logged no-op:
    /// the first insertion wins.
    pub fn add_account(&mut self, account: Account) {
        if self.index.contains_key(&account.account_id) {
            log::warn!("Account {} already exists", account.account_id);
            return;
        }
        self.index
            .insert(account.account_id.clone(), self.accounts.len());
        self.accounts.push(account);
        self.in_degree.push(0);
        self.out_degree.push(0);
        self.out_neighbors.push(BTreeSet::new());
    }

    /// Append a transaction edge. Both endpoints must already exist and
    /// src must differ from dst. Returns the freshly allocated ID.
    pub fn add_transaction(
        &mut self,
        src: &str,
        dst: &str,
        amount: Option<f64>,
        date: Option<Step>,
        tx_type: Option<String>,
    ) -> GenResult<TxId> {
        let src_i = self.index_of(src)?;
        let dst_i = self.index_of(dst)?;
        if src_i == dst_i {
            return Err(GenError::SelfLoop {
                account_id: src.to_string(),
            });
        }

        let tx_id = self.next_tx_id;
        self.next_tx_id += 1;
        self.transactions.push(Transaction {
            tx_id,
            src: src.to_string(),
            dst: dst.to_string(),
            amount,
            date,
            tx_type,
        });
        self.out_degree[src_i] += 1;
        self.in_degree[dst_i] += 1;
        self.out_neighbors[src_i].insert(dst_i);

        if tx_id > 0 && tx_id % 1_000_000 == 0 {
            log::info!("Added {tx_id} transactions");
        }
        Ok(tx_id)
    }

    fn index_of(&self, account_id: &str) -> GenResult<usize> {
        self.index
            .get(account_id)
            .copied()
            .ok_or_else(|| GenError::UnknownAccount {
                account_id: account_id.to_string(),
            })
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.index.contains_key(account_id)
    }

    pub fn account(&self, account_id: &str) -> Option<&Account> {
        self.index.get(account_id).map(|&i| &self.accounts[i])
    }

    /// Flag an account as a fraud subject.
    pub fn set_fraud(&mut self, account_id: &str) -> GenResult<()> {
        let i = self.index_of(account_id)?;
        self.accounts[i].is_fraud = true;
        Ok(())
    }

    /// Accounts in insertion order. Backbone node indices and export
    /// row order both rely on this ordering.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn num_accounts(&self) -> usize {
        self.accounts.len()
    }

    pub fn num_transactions(&self) -> usize {
        self.transactions.len()
    }

    /// Total (in + out) degree of the node at insertion index `i`.
    pub fn degree_at(&self, i: usize) -> usize {
        self.in_degree[i] + self.out_degree[i]
    }

    /// Distinct successor account IDs of `account_id`, in insertion
    /// index order.
    pub fn out_neighbors(&self, account_id: &str) -> GenResult<Vec<AccountId>> {
        let i = self.index_of(account_id)?;
        Ok(self.out_neighbors[i]
            .iter()
            .map(|&j| self.accounts[j].account_id.clone())
            .collect())
    }
}

impl Default for TransactionGraph {
    fn default() -> Self {
        Self::new()
    }
}
