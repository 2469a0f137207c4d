//! Parameter-table loaders.
//!
//! All input tables are CSV with a header row; lines starting with '#'
//! are comments. Column positions are resolved by header name, so
//! files may carry extra columns (warned about, then ignored).
//! Malformed optional values degrade to the unbounded marker or the
//! configured default rather than aborting the run; structurally
//! broken files are fatal.

use crate::{
    config::GeneratorConfig,
    degree::DegreeRow,
    error::{GenError, GenResult},
    graph::{Account, TransactionGraph},
    patterns::{PatternRequest, PatternType},
    rng::GenRng,
    types::Step,
};
use std::collections::HashMap;
use std::path::Path;

/// Passthrough attribute columns of the raw account file, in export order.
const RAW_ATTR_NAMES: [&str; 12] = [
    "first_name",
    "last_name",
    "street_addr",
    "city",
    "state",
    "zip",
    "gender",
    "phone_number",
    "birth_date",
    "ssn",
    "lon",
    "lat",
];

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn parse_amount(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn open_reader(path: &Path) -> GenResult<csv::Reader<std::fs::File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .comment(Some(b'#'))
        .from_path(path)?)
}

fn header_index(reader: &mut csv::Reader<std::fs::File>) -> GenResult<HashMap<String, usize>> {
    let headers = reader.headers()?.clone();
    Ok(headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_string(), i))
        .collect())
}

/// Load account vertices into the graph. Returns the passthrough
/// attribute names declared by the chosen account format.
pub fn load_accounts(
    conf: &GeneratorConfig,
    graph: &mut TransactionGraph,
    rng: &mut GenRng,
) -> GenResult<Vec<String>> {
    let path = conf.input_path(&conf.input.accounts);
    if conf.input.is_aggregated_accounts {
        load_accounts_aggregated(&path, conf, graph, rng)?;
        Ok(Vec::new())
    } else {
        load_accounts_raw(&path, conf, graph, rng)?;
        Ok(RAW_ATTR_NAMES.iter().map(|s| s.to_string()).collect())
    }
}

/// Raw per-person records: one account per row, identity attributes
/// carried through opaquely, balance drawn from the configured range.
fn load_accounts_raw(
    path: &Path,
    conf: &GeneratorConfig,
    graph: &mut TransactionGraph,
    rng: &mut GenRng,
) -> GenResult<usize> {
    let min_balance = conf.default.min_balance.ok_or_else(|| {
        GenError::Configuration(
            "Option 'min_balance' is required to load a raw account list".into(),
        )
    })?;
    let max_balance = conf.default.max_balance.ok_or_else(|| {
        GenError::Configuration(
            "Option 'max_balance' is required to load a raw account list".into(),
        )
    })?;

    let start_day = conf.default.start_step.filter(|&s| s >= 0);
    let end_day = conf.default.end_step.filter(|&s| s > 0);
    let start_range = conf.default.start_range.filter(|&r| r > 0);
    let end_range = conf.default.end_range.filter(|&r| r > 0);
    let model_id = conf.default.transaction_model.unwrap_or(1);

    let mut reader = open_reader(path)?;
    let index = header_index(&mut reader)?;
    let idx_of = |name: &str| -> GenResult<usize> {
        index.get(name).copied().ok_or_else(|| {
            GenError::Configuration(format!(
                "Account file {} is missing column '{name}'",
                path.display()
            ))
        })
    };
    let idx_aid = idx_of("uuid")?;
    let attr_indices: Vec<(String, usize)> = RAW_ATTR_NAMES
        .iter()
        .map(|&name| Ok((name.to_string(), idx_of(name)?)))
        .collect::<GenResult<_>>()?;

    let mut count = 0;
    for record in reader.records() {
        let record = record?;
        let aid = record.get(idx_aid).unwrap_or("").to_string();

        let start: Step = match (start_day, start_range) {
            (Some(day), Some(range)) => day + rng.randrange(0, range),
            _ => -1,
        };
        let end: Step = match (end_day, end_range) {
            (Some(day), Some(range)) => day - rng.randrange(0, range),
            _ => -1,
        };

        let attrs: Vec<(String, String)> = attr_indices
            .iter()
            .map(|(name, i)| (name.clone(), record.get(*i).unwrap_or("").to_string()))
            .collect();

        let init_balance = rng.uniform(min_balance, max_balance);
        graph.add_account(Account {
            account_id: aid,
            init_balance,
            start,
            end,
            country: "US".into(),
            business: "I".into(),
            is_fraud: false,
            model_id,
            attrs,
        });
        count += 1;
    }
    log::info!("Created {count} accounts from raw records");
    Ok(count)
}

/// Aggregated parameter rows: each row expands into `count` accounts
/// with sequential integer IDs.
fn load_accounts_aggregated(
    path: &Path,
    conf: &GeneratorConfig,
    graph: &mut TransactionGraph,
    rng: &mut GenRng,
) -> GenResult<usize> {
    let mut reader = open_reader(path)?;
    let index = header_index(&mut reader)?;

    let mut idx_num = None;
    let mut idx_min = None;
    let mut idx_max = None;
    let mut idx_start = None;
    let mut idx_end = None;
    let mut idx_country = None;
    let mut idx_business = None;
    let mut idx_model = None;
    for (key, &i) in &index {
        match key.as_str() {
            "count" => idx_num = Some(i),
            "min_balance" => idx_min = Some(i),
            "max_balance" => idx_max = Some(i),
            "start_day" => idx_start = Some(i),
            "end_day" => idx_end = Some(i),
            "country" => idx_country = Some(i),
            "business_type" => idx_business = Some(i),
            "model" => idx_model = Some(i),
            other => log::warn!("Unknown key: {other}"),
        }
    }
    let require = |idx: Option<usize>, name: &str| -> GenResult<usize> {
        idx.ok_or_else(|| {
            GenError::Configuration(format!(
                "Account file {} is missing column '{name}'",
                path.display()
            ))
        })
    };
    let idx_num = require(idx_num, "count")?;
    let idx_min = require(idx_min, "min_balance")?;
    let idx_max = require(idx_max, "max_balance")?;
    let idx_country = require(idx_country, "country")?;
    let idx_business = require(idx_business, "business_type")?;

    let default_model = conf.default.transaction_model.unwrap_or(1);
    let mut aid: usize = 0;
    for record in reader.records() {
        let record = record?;
        let get = |i: usize| record.get(i).unwrap_or("");
        let num = parse_int(get(idx_num)).unwrap_or(0) as usize;
        let min_balance = parse_amount(get(idx_min)).ok_or_else(|| {
            GenError::Configuration(format!("Bad min_balance in {}", path.display()))
        })?;
        let max_balance = parse_amount(get(idx_max)).ok_or_else(|| {
            GenError::Configuration(format!("Bad max_balance in {}", path.display()))
        })?;
        let start_day = idx_start.and_then(|i| parse_int(get(i))).unwrap_or(-1);
        let end_day = idx_end.and_then(|i| parse_int(get(i))).unwrap_or(-1);
        let country = get(idx_country).to_string();
        let business = get(idx_business).to_string();
        let model_id = idx_model
            .and_then(|i| parse_int(get(i)))
            .map(|m| m as i32)
            .unwrap_or(default_model);

        for _ in 0..num {
            let init_balance = rng.uniform(min_balance, max_balance);
            graph.add_account(Account {
                account_id: aid.to_string(),
                init_balance,
                start: start_day,
                end: end_day,
                country: country.clone(),
                business: business.clone(),
                is_fraud: false,
                model_id,
                attrs: Vec::new(),
            });
            aid += 1;
        }
    }
    log::info!("Created {aid} accounts");
    Ok(aid)
}

/// Load degree parameter rows: (degree value, in-count, out-count).
pub fn load_degree_rows(path: &Path) -> GenResult<Vec<DegreeRow>> {
    let mut reader = open_reader(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let value = parse_int(record.get(0).unwrap_or("")).unwrap_or(0) as usize;
        let in_count = parse_int(record.get(1).unwrap_or("")).unwrap_or(0) as usize;
        let out_count = parse_int(record.get(2).unwrap_or("")).unwrap_or(0) as usize;
        rows.push((value, in_count, out_count));
    }
    Ok(rows)
}

/// Load the alert parameter table, expanding each row's `count` into
/// individual pattern requests. Rows with an unknown pattern name or a
/// transaction count below the member count are skipped with a warning.
pub fn load_alert_requests(path: &Path, total_steps: Step) -> GenResult<Vec<PatternRequest>> {
    let mut reader = open_reader(path)?;
    let index = header_index(&mut reader)?;

    let mut idx_num = None;
    let mut idx_type = None;
    let mut idx_accts = None;
    let mut idx_schedule = None;
    let mut idx_individual = None;
    let mut idx_aggregated = None;
    let mut idx_count = None;
    let mut idx_difference = None;
    let mut idx_period = None;
    let mut idx_rounded = None;
    let mut idx_orig_country = None;
    let mut idx_bene_country = None;
    let mut idx_orig_business = None;
    let mut idx_bene_business = None;
    let mut idx_fraud = None;
    for (key, &i) in &index {
        match key.as_str() {
            "count" => idx_num = Some(i),
            "type" => idx_type = Some(i),
            "accounts" => idx_accts = Some(i),
            "schedule_id" => idx_schedule = Some(i),
            "individual_amount" => idx_individual = Some(i),
            "aggregated_amount" => idx_aggregated = Some(i),
            "transaction_count" => idx_count = Some(i),
            "amount_difference" => idx_difference = Some(i),
            "period" => idx_period = Some(i),
            "amount_rounded" => idx_rounded = Some(i),
            "orig_country" => idx_orig_country = Some(i),
            "bene_country" => idx_bene_country = Some(i),
            "orig_business" => idx_orig_business = Some(i),
            "bene_business" => idx_bene_business = Some(i),
            "is_fraud" => idx_fraud = Some(i),
            other => log::warn!("Unknown key: {other}"),
        }
    }
    let require = |idx: Option<usize>, name: &str| -> GenResult<usize> {
        idx.ok_or_else(|| {
            GenError::Configuration(format!(
                "Alert file {} is missing column '{name}'",
                path.display()
            ))
        })
    };
    let idx_num = require(idx_num, "count")?;
    let idx_type = require(idx_type, "type")?;
    let idx_accts = require(idx_accts, "accounts")?;
    let idx_schedule = require(idx_schedule, "schedule_id")?;
    let idx_fraud = require(idx_fraud, "is_fraud")?;

    let mut requests = Vec::new();
    for record in reader.records() {
        let record = record?;
        let get = |i: usize| record.get(i).unwrap_or("");
        let num = parse_int(get(idx_num)).unwrap_or(0) as usize;
        let type_name = get(idx_type).trim().to_string();
        let accounts = parse_int(get(idx_accts)).unwrap_or(0) as usize;
        let schedule_id = parse_int(get(idx_schedule)).unwrap_or(1) as i32;
        let individual_amount = idx_individual.and_then(|i| parse_amount(get(i)));
        let aggregated_amount = idx_aggregated.and_then(|i| parse_amount(get(i)));
        let transaction_count = idx_count
            .and_then(|i| parse_int(get(i)))
            .map(|c| c as usize);
        let amount_difference = idx_difference.and_then(|i| parse_amount(get(i)));
        let period = idx_period
            .and_then(|i| parse_int(get(i)))
            .or(Some(total_steps));
        let amount_rounded = idx_rounded.and_then(|i| parse_amount(get(i)));
        let orig_country = idx_orig_country.map(|i| parse_flag(get(i))).unwrap_or(false);
        let bene_country = idx_bene_country.map(|i| parse_flag(get(i))).unwrap_or(false);
        let orig_business = idx_orig_business.map(|i| parse_flag(get(i))).unwrap_or(false);
        let bene_business = idx_bene_business.map(|i| parse_flag(get(i))).unwrap_or(false);
        let is_fraud = parse_flag(get(idx_fraud));

        let pattern = match PatternType::from_name(&type_name) {
            Some(p) => p,
            None => {
                log::warn!("Pattern type ({type_name}) is not supported, row skipped");
                continue;
            }
        };
        if let Some(tc) = transaction_count {
            if tc < accounts {
                log::warn!(
                    "Number of transactions ({tc}) must not be smaller than \
                     the number of accounts ({accounts}), row skipped"
                );
                continue;
            }
        }

        for _ in 0..num {
            requests.push(PatternRequest {
                is_fraud,
                pattern,
                accounts,
                schedule_id,
                individual_amount,
                aggregated_amount,
                transaction_count,
                amount_difference,
                period,
                amount_rounded,
                orig_country,
                bene_country,
                orig_business,
                bene_business,
            });
        }
    }
    Ok(requests)
}

/// Load the weighted transaction-type table into a label pool.
/// A label appearing with count k is k times as likely at export.
pub fn load_transaction_types(path: &Path) -> GenResult<Vec<String>> {
    let mut reader = open_reader(path)?;
    let mut types = Vec::new();
    for record in reader.records() {
        let record = record?;
        let label = record.get(0).unwrap_or("").trim().to_string();
        if label.is_empty() {
            continue;
        }
        let count = parse_int(record.get(1).unwrap_or("")).unwrap_or(0) as usize;
        types.extend(std::iter::repeat(label).take(count));
    }
    Ok(types)
}
