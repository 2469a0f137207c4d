//! Shared primitive types used across the entire synthesizer.

/// A simulation step. One step = one in-network day. -1 = unbounded.
pub type Step = i64;

/// A stable, unique identifier for an account vertex.
pub type AccountId = String;

/// Transaction identifier, allocated monotonically by the graph.
pub type TxId = u64;

/// Alert group identifier, allocated monotonically by the pattern engine.
pub type AlertId = u64;
