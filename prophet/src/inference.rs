//! Exact inference by variable elimination.
//!
//! Every CPD becomes a factor, reduced by the evidence. Each variable that is neither observed nor
//! queried is then eliminated in turn: the factors mentioning it are multiplied together and the
//! variable is summed out of the product. What remains is a set of factors over the query target
//! alone, whose normalised product is the posterior.

use strum_macros::{Display, EnumIter};
use thiserror::Error;
use tracing::debug;

use crate::evidence::{Evidence, EvidenceError};
use crate::factor::{union_of_scopes, Factor};
use crate::network::Network;
use crate::probs::SliceExt;
use crate::variable::VariableId;

#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("{0}")]
    Evidence(#[from] EvidenceError),

    #[error("unknown query variable {0}")]
    UnknownTarget(String),

    #[error("the evidence is impossible under the model when querying {0}")]
    ImpossibleEvidence(String),
}

/// The sequence in which unobserved, unqueried variables are summed out. Only affects the size of
/// intermediate factors, never the posterior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter)]
pub enum EliminationOrder {
    /// The network's topological order.
    Declared,

    /// Greedily eliminates the variable whose combined factor spans the fewest variables; ties go
    /// to the variable earliest in topological order.
    #[default]
    MinNeighbours,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    pub variable: String,
    pub probs: Vec<f64>,
}
impl Posterior {
    /// The most probable state. Ties resolve to the lowest state index.
    pub fn map_state(&self) -> usize {
        self.probs.argmax().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VariableElimination<'a> {
    network: &'a Network,
    order: EliminationOrder,
}
impl<'a> VariableElimination<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            order: EliminationOrder::default(),
        }
    }

    pub fn with_order(mut self, order: EliminationOrder) -> Self {
        self.order = order;
        self
    }

    /// The posterior distribution of `target` given `evidence`.
    pub fn query(&self, target: &str, evidence: &Evidence) -> Result<Posterior, InferenceError> {
        let network = self.network;
        let target_id = network
            .id_of(target)
            .ok_or_else(|| InferenceError::UnknownTarget(target.into()))?;
        let observed = evidence.resolve(network)?;
        if observed[target_id].is_some() {
            return Err(EvidenceError::ObservedTarget(target.into()).into());
        }

        let mut factors = network
            .factors()
            .into_iter()
            .map(|factor| reduce_by_evidence(factor, &observed))
            .collect::<Vec<_>>();

        let hidden = network
            .topological_order()
            .iter()
            .copied()
            .filter(|&id| id != target_id && observed[id].is_none())
            .collect::<Vec<_>>();
        let order = match self.order {
            EliminationOrder::Declared => hidden,
            EliminationOrder::MinNeighbours => min_neighbours(hidden, &factors),
        };
        debug!(
            "querying {target}, eliminating {:?}",
            network.variables().names(&order).collect::<Vec<_>>()
        );

        for variable in order {
            factors = eliminate(factors, variable);
        }

        let joint = factors
            .iter()
            .fold(Factor::unit(), |joint, factor| joint.product(factor));
        debug_assert_eq!(&[target_id], joint.scope());
        let mut probs = joint.into_values();
        let sum = probs.sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(InferenceError::ImpossibleEvidence(target.into()));
        }
        probs.scale(1.0 / sum);
        debug!("posterior of {target}: {probs:?}");

        Ok(Posterior {
            variable: target.into(),
            probs,
        })
    }

    /// The maximum a posteriori state of `target` given `evidence`.
    pub fn map_query(&self, target: &str, evidence: &Evidence) -> Result<usize, InferenceError> {
        self.query(target, evidence).map(|posterior| posterior.map_state())
    }
}

/// The maximum a posteriori state of `target` given `evidence`, using the default elimination
/// order.
pub fn map_query(
    network: &Network,
    target: &str,
    evidence: &Evidence,
) -> Result<usize, InferenceError> {
    VariableElimination::new(network).map_query(target, evidence)
}

fn reduce_by_evidence(factor: Factor, observed: &[Option<usize>]) -> Factor {
    let fixed = factor
        .scope()
        .iter()
        .filter_map(|&id| observed[id].map(|state| (id, state)))
        .collect::<Vec<_>>();
    fixed
        .into_iter()
        .fold(factor, |factor, (id, state)| factor.reduce(id, state))
}

fn eliminate(factors: Vec<Factor>, variable: VariableId) -> Vec<Factor> {
    let (mentioning, mut rest): (Vec<_>, Vec<_>) = factors
        .into_iter()
        .partition(|factor| factor.contains(variable));
    if mentioning.is_empty() {
        return rest;
    }
    let product = mentioning
        .iter()
        .fold(Factor::unit(), |product, factor| product.product(factor));
    debug_assert_eq!(Factor::joint_scope(&mentioning), product.scope());
    rest.push(product.sum_out(variable));
    rest
}

fn min_neighbours(mut remaining: Vec<VariableId>, factors: &[Factor]) -> Vec<VariableId> {
    // scopes evolve as eliminations merge factors, so simulate them on scopes alone
    let mut scopes = factors
        .iter()
        .map(|factor| factor.scope().to_vec())
        .collect::<Vec<_>>();
    let mut order = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_width = usize::MAX;
        for (index, &variable) in remaining.iter().enumerate() {
            let width = merged_scope(&scopes, variable).len();
            if width < best_width {
                best = index;
                best_width = width;
            }
        }
        let variable = remaining.remove(best);
        let mut merged = merged_scope(&scopes, variable);
        merged.retain(|&id| id != variable);
        scopes.retain(|scope| !scope.contains(&variable));
        scopes.push(merged);
        order.push(variable);
    }
    order
}

fn merged_scope(scopes: &[Vec<VariableId>], variable: VariableId) -> Vec<VariableId> {
    union_of_scopes(
        scopes
            .iter()
            .filter(|scope| scope.contains(&variable))
            .map(Vec::as_slice),
    )
}
