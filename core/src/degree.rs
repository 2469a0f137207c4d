//! Degree-sequence expansion and balancing.
//!
//! The degree parameter table supplies in/out-degree sequences of
//! arbitrary total length; the backbone generator needs exactly one
//! entry per account. Balancing trims or replicates entries while
//! keeping the in/out sums equal — the configuration model cannot run
//! on sequences whose sums differ.

use crate::error::{GenError, GenResult};

/// One parsed degree-table row: (degree value, in-count, out-count).
/// The value is appended `in-count` times to the in-degree sequence and
/// `out-count` times to the out-degree sequence.
pub type DegreeRow = (usize, usize, usize);

/// Expand parameter rows into full per-node degree sequences.
pub fn expand_degree_rows(rows: &[DegreeRow]) -> GenResult<(Vec<usize>, Vec<usize>)> {
    let mut in_deg = Vec::new();
    let mut out_deg = Vec::new();
    for &(value, in_count, out_count) in rows {
        in_deg.extend(std::iter::repeat(value).take(in_count));
        out_deg.extend(std::iter::repeat(value).take(out_count));
    }
    if in_deg.len() != out_deg.len() {
        return Err(GenError::Configuration(format!(
            "In/Out-degree sequences must have equal length: {} vs {}",
            in_deg.len(),
            out_deg.len()
        )));
    }
    Ok((in_deg, out_deg))
}

/// Reconcile equal-length degree sequences to exactly `target` entries.
///
/// Longer sequences are trimmed, preferring entries whose in-degree
/// equals their out-degree (removing those cannot break sum equality).
/// Shorter sequences are replicated whole, then padded with degree-1
/// entries. Sum equality is enforced before and after; a trim that had
/// to drop mismatched entries and broke it is a fatal configuration
/// error, not something to patch up silently.
pub fn balance_degrees(
    in_deg: Vec<usize>,
    out_deg: Vec<usize>,
    target: usize,
) -> GenResult<(Vec<usize>, Vec<usize>)> {
    if in_deg.len() != out_deg.len() {
        return Err(GenError::Configuration(format!(
            "In/Out-degree sequences must have equal length: {} vs {}",
            in_deg.len(),
            out_deg.len()
        )));
    }
    if in_deg.is_empty() {
        return Err(GenError::Configuration(
            "Degree sequences must not be empty".into(),
        ));
    }
    check_sums(&in_deg, &out_deg)?;

    let total = in_deg.len();
    let (mut in_out, mut out_out);

    if total > target {
        let mut diff = total - target;
        in_out = Vec::with_capacity(target);
        out_out = Vec::with_capacity(target);
        for i in 0..total {
            if in_deg[i] == out_deg[i] && diff > 0 {
                diff -= 1;
            } else {
                in_out.push(in_deg[i]);
                out_out.push(out_deg[i]);
            }
        }
        // Not enough matched-degree entries: drop mismatched ones from
        // the tail and let the sum check below catch any imbalance.
        while diff > 0 {
            in_out.pop();
            out_out.pop();
            diff -= 1;
        }
    } else {
        let repeats = target / total;
        in_out = Vec::with_capacity(target);
        out_out = Vec::with_capacity(target);
        for _ in 0..repeats {
            in_out.extend_from_slice(&in_deg);
            out_out.extend_from_slice(&out_deg);
        }
        let remain = target - total * repeats;
        in_out.extend(std::iter::repeat(1).take(remain));
        out_out.extend(std::iter::repeat(1).take(remain));
    }

    check_sums(&in_out, &out_out)?;
    Ok((in_out, out_out))
}

fn check_sums(in_deg: &[usize], out_deg: &[usize]) -> GenResult<()> {
    let in_sum: usize = in_deg.iter().sum();
    let out_sum: usize = out_deg.iter().sum();
    if in_sum != out_sum {
        return Err(GenError::Configuration(format!(
            "Degree sequences must have equal sums: in={in_sum} out={out_sum}"
        )));
    }
    Ok(())
}
