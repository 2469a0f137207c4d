//! Directed configuration model: the normal-transaction backbone.
//!
//! Stub matching: every node contributes one out-stub per unit of
//! out-degree and one in-stub per unit of in-degree. Both stub lists
//! are shuffled independently and paired positionally, which preserves
//! the degree sequence by construction and yields a multigraph
//! (parallel edges are expected).
//!
//! A positional pair with src == dst would be a self-loop; it is
//! resolved by scanning forward for the nearest later in-stub with a
//! different node and swapping the two in-stub positions. Swapping only
//! permutes in-stub positions, so degree counts never change. If no
//! swap target exists before the end of the list the self-loop stays in
//! the returned edge list and is reported — an accepted approximation,
//! not a failure.

use crate::{error::GenResult, rng::GenRng};

/// Abstract edge: (source node index, destination node index).
pub type StubEdge = (usize, usize);

/// Build a random directed multigraph with exactly the given per-node
/// degrees. Output is bit-identical for a fixed seed and fixed input
/// sequences. Node indices correspond to sequence positions; the caller
/// maps them onto real account IDs.
pub fn configuration_model(
    in_deg: &[usize],
    out_deg: &[usize],
    rng: &mut GenRng,
) -> GenResult<Vec<StubEdge>> {
    let in_sum: usize = in_deg.iter().sum();
    let out_sum: usize = out_deg.iter().sum();
    if in_sum != out_sum {
        return Err(crate::error::GenError::Configuration(format!(
            "Invalid degree sequences: sums must be equal (in={in_sum} out={out_sum})"
        )));
    }

    let num_nodes = in_deg.len().max(out_deg.len());
    if num_nodes == 0 || in_sum == 0 {
        return Ok(Vec::new());
    }

    // A sequence shorter than the other counts as zero-degree nodes.
    let mut in_stubs: Vec<usize> = Vec::with_capacity(in_sum);
    let mut out_stubs: Vec<usize> = Vec::with_capacity(out_sum);
    for node in 0..num_nodes {
        let din = in_deg.get(node).copied().unwrap_or(0);
        let dout = out_deg.get(node).copied().unwrap_or(0);
        in_stubs.extend(std::iter::repeat(node).take(din));
        out_stubs.extend(std::iter::repeat(node).take(dout));
    }

    rng.shuffle(&mut in_stubs);
    rng.shuffle(&mut out_stubs);

    let num_edges = in_stubs.len();
    for i in 0..num_edges {
        let src = out_stubs[i];
        if src == in_stubs[i] {
            // ID conflict causes a self-loop: swap with the nearest
            // later in-stub belonging to a different node.
            for j in (i + 1)..num_edges {
                if src != in_stubs[j] {
                    in_stubs.swap(i, j);
                    break;
                }
            }
        }
    }

    let edges: Vec<StubEdge> = out_stubs.into_iter().zip(in_stubs).collect();
    for (idx, &(src, dst)) in edges.iter().enumerate() {
        if src == dst {
            log::warn!("Self loop from/to {src} at {idx}");
        }
    }
    Ok(edges)
}
