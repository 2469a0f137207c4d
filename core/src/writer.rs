//! CSV exporters for accounts, transactions and alert members.
//!
//! RULE: Export never mutates the graph. Transaction type labels are
//! drawn from the weighted pool at export time for transactions that
//! carry none, so alert and backbone edges are indistinguishable in
//! the output.

use crate::{
    error::{GenError, GenResult},
    graph::TransactionGraph,
    patterns::AlertGroup,
    rng::GenRng,
    types::AlertId,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Export all accounts: fixed columns then passthrough attributes in
/// declared order.
pub fn write_account_list(
    path: &Path,
    graph: &TransactionGraph,
    attr_names: &[String],
) -> GenResult<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header: Vec<String> = [
        "ACCOUNT_ID",
        "CUSTOMER_ID",
        "INIT_BALANCE",
        "START_DATE",
        "END_DATE",
        "COUNTRY",
        "ACCOUNT_TYPE",
        "IS_FRAUD",
        "TX_BEHAVIOR_ID",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(attr_names.iter().cloned());
    writer.write_record(&header)?;

    for account in graph.accounts() {
        let mut row = vec![
            account.account_id.clone(),
            format!("C_{}", account.account_id),
            format!("{:.2}", account.init_balance),
            account.start.to_string(),
            account.end.to_string(),
            account.country.clone(),
            account.business.clone(),
            flag_str(account.is_fraud).to_string(),
            account.model_id.to_string(),
        ];
        for name in attr_names {
            let value = account
                .attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            row.push(value);
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    log::info!("Exported {} accounts", graph.num_accounts());
    Ok(graph.num_accounts())
}

/// Export all transactions with a type label per row.
pub fn write_transaction_list(
    path: &Path,
    graph: &TransactionGraph,
    tx_types: &[String],
    rng: &mut GenRng,
) -> GenResult<usize> {
    if tx_types.is_empty() {
        return Err(GenError::Configuration(
            "Transaction type table is empty, cannot label transactions".into(),
        ));
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["id", "src", "dst", "ttype"])?;
    for tx in graph.transactions() {
        let ttype = match &tx.tx_type {
            Some(t) => t.clone(),
            None => rng.choice(tx_types).clone(),
        };
        writer.write_record([tx.tx_id.to_string(), tx.src.clone(), tx.dst.clone(), ttype])?;
    }
    writer.flush()?;
    log::info!("Exported {} transactions", graph.num_transactions());
    Ok(graph.num_transactions())
}

/// Export one row per alert-group member, with the min/max amount seen
/// on that member's incident edges inside the group's sub-graph.
pub fn write_alert_members(
    path: &Path,
    graph: &TransactionGraph,
    groups: &BTreeMap<AlertId, AlertGroup>,
    attr_names: &[String],
) -> GenResult<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header: Vec<String> = [
        "alertID",
        "reason",
        "clientID",
        "isSubject",
        "modelID",
        "minAmount",
        "maxAmount",
        "startStep",
        "endStep",
        "scheduleID",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(attr_names.iter().cloned());
    writer.write_record(&header)?;

    let mut member_count = 0;
    for (alert_id, group) in groups {
        for member in group.members() {
            let is_subject = group.subject.as_deref() == Some(member.as_str());
            let (min_amount, max_amount) =
                group.amount_range_for(member).unwrap_or((0.0, 0.0));
            let mut row = vec![
                alert_id.to_string(),
                group.pattern.name().to_string(),
                member.clone(),
                flag_str(is_subject).to_string(),
                group.pattern.model_id().to_string(),
                format!("{min_amount:.2}"),
                format!("{max_amount:.2}"),
                group.start.to_string(),
                group.end.to_string(),
                group.schedule_id.to_string(),
            ];
            if let Some(account) = graph.account(member) {
                for name in attr_names {
                    let value = account
                        .attrs
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default();
                    row.push(value);
                }
            }
            writer.write_record(&row)?;
            member_count += 1;
        }
    }
    writer.flush()?;
    log::info!(
        "Exported {member_count} members for {} alerted groups",
        groups.len()
    );
    Ok(member_count)
}

fn flag_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
