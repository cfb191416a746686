//! Exact inference over small, fixed-structure discrete Bayesian networks.
//! Networks are assembled from named variables and tabular CPDs, validated once at build time
//! and then queried by variable elimination for posterior distributions and MAP states.

pub mod cpd;
pub mod evidence;
pub mod factor;
pub mod inference;
pub mod network;
pub mod probs;
pub mod variable;
