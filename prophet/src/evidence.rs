//! Observed variable states.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::network::Network;
use crate::variable::VariableId;

#[derive(Debug, Error, PartialEq)]
pub enum EvidenceError {
    #[error("no evidence for root variable {0}")]
    MissingRoot(String),

    #[error("evidence for unknown variable {0}")]
    UnknownVariable(String),

    #[error("state {state} is out of range for {variable} with {cardinality} states")]
    StateOutOfRange {
        variable: String,
        state: usize,
        cardinality: usize,
    },

    #[error("cannot query {0}, which is itself observed")]
    ObservedTarget(String),
}

/// A mapping from variable names to observed states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    states: FxHashMap<String, usize>,
}
impl Evidence {
    pub fn observe(mut self, variable: impl Into<String>, state: usize) -> Self {
        self.insert(variable, state);
        self
    }

    pub fn insert(&mut self, variable: impl Into<String>, state: usize) -> Option<usize> {
        self.states.insert(variable.into(), state)
    }

    pub fn remove(&mut self, variable: &str) -> Option<usize> {
        self.states.remove(variable)
    }

    pub fn get(&self, variable: &str) -> Option<usize> {
        self.states.get(variable).copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.states.iter().map(|(variable, &state)| (variable.as_str(), state))
    }

    /// Resolves the evidence against `network`, yielding the observed state (if any) of every
    /// variable by id. Every root must be observed, every name must exist in the network and every
    /// state must be within its variable's cardinality.
    pub fn resolve(&self, network: &Network) -> Result<Vec<Option<usize>>, EvidenceError> {
        let variables = network.variables();
        for root in network.roots() {
            if !self.states.contains_key(&variables[root].name) {
                return Err(EvidenceError::MissingRoot(variables[root].name.clone()));
            }
        }

        let mut observed = vec![None; variables.len()];
        let mut entries = self.iter().collect::<Vec<_>>();
        entries.sort_unstable();
        for (name, state) in entries {
            let id: VariableId = variables
                .id_of(name)
                .ok_or_else(|| EvidenceError::UnknownVariable(name.into()))?;
            let cardinality = variables[id].cardinality;
            if state >= cardinality {
                return Err(EvidenceError::StateOutOfRange {
                    variable: name.into(),
                    state,
                    cardinality,
                });
            }
            observed[id] = Some(state);
        }
        Ok(observed)
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for Evidence {
    fn from_iter<T: IntoIterator<Item = (S, usize)>>(iter: T) -> Self {
        Self {
            states: iter
                .into_iter()
                .map(|(variable, state)| (variable.into(), state))
                .collect(),
        }
    }
}
