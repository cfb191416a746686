//! Validated, immutable Bayesian networks.
//!
//! A [`NetworkBuilder`] collects variables, directed edges and CPDs in any order; [`NetworkBuilder::build`]
//! checks every structural and numeric invariant once and yields a [`Network`] that can be shared
//! read-only across threads and queried any number of times.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::debug;

use crate::cpd::{CpdError, MisshapenCpd, TabularCpd};
use crate::factor::Factor;
use crate::variable::{Variable, VariableId, Variables};

/// Default tolerance for a CPD column to count as summing to one.
pub const COLUMN_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("duplicate variable {0}")]
    DuplicateVariable(String),

    #[error("variable {0} has no states")]
    ZeroCardinality(String),

    #[error("unknown variable {0}")]
    UnknownVariable(String),

    #[error("{0} cannot depend on itself")]
    SelfLoop(String),

    #[error("duplicate edge {parent} -> {child}")]
    DuplicateEdge { parent: String, child: String },

    #[error("duplicate CPD for {0}")]
    DuplicateCpd(String),

    #[error("missing CPD for {0}")]
    MissingCpd(String),

    #[error("{0}")]
    MisshapenCpd(#[from] MisshapenCpd),

    #[error("CPD for {variable} is conditioned on {cpd:?}, but the declared parents are {declared:?}")]
    ParentMismatch {
        variable: String,
        declared: Vec<String>,
        cpd: Vec<String>,
    },

    #[error("CPD for {cpd_of} assumes {variable} has {cpd} states, but it is declared with {declared}")]
    CardinalityMismatch {
        cpd_of: String,
        variable: String,
        declared: usize,
        cpd: usize,
    },

    #[error("{0}")]
    InvalidCpd(#[from] CpdError),

    #[error("dependency cycle through {0:?}")]
    Cycle(Vec<String>),
}

#[derive(Debug)]
pub struct NetworkBuilder {
    variables: Variables,
    parents: Vec<Vec<VariableId>>,
    cpds: Vec<TabularCpd>,
    tolerance: f64,
}
impl Default for NetworkBuilder {
    fn default() -> Self {
        Self {
            variables: Variables::default(),
            parents: vec![],
            cpds: vec![],
            tolerance: COLUMN_SUM_TOLERANCE,
        }
    }
}
impl NetworkBuilder {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        cardinality: usize,
    ) -> Result<VariableId, ModelError> {
        let variable = Variable::new(name, cardinality);
        if cardinality == 0 {
            return Err(ModelError::ZeroCardinality(variable.name));
        }
        let id = self
            .variables
            .push(variable)
            .map_err(|rejected| ModelError::DuplicateVariable(rejected.name))?;
        self.parents.push(vec![]);
        Ok(id)
    }

    /// Declares `parent → child`. The order in which a child's edges are declared is the parent
    /// order its CPD must follow.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<(), ModelError> {
        let parent_id = self.resolve(parent)?;
        let child_id = self.resolve(child)?;
        if parent_id == child_id {
            return Err(ModelError::SelfLoop(child.into()));
        }
        let parents = &mut self.parents[child_id];
        if parents.contains(&parent_id) {
            return Err(ModelError::DuplicateEdge {
                parent: parent.into(),
                child: child.into(),
            });
        }
        parents.push(parent_id);
        Ok(())
    }

    pub fn add_cpd(&mut self, cpd: TabularCpd) -> Result<(), ModelError> {
        if self
            .cpds
            .iter()
            .any(|existing| existing.variable().name == cpd.variable().name)
        {
            return Err(ModelError::DuplicateCpd(cpd.variable().name.clone()));
        }
        self.cpds.push(cpd);
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<VariableId, ModelError> {
        self.variables
            .id_of(name)
            .ok_or_else(|| ModelError::UnknownVariable(name.into()))
    }

    pub fn build(self) -> Result<Network, ModelError> {
        let NetworkBuilder {
            variables,
            parents,
            cpds,
            tolerance,
        } = self;

        let mut slots: Vec<Option<TabularCpd>> = vec![None; variables.len()];
        for cpd in cpds {
            let id = variables
                .id_of(&cpd.variable().name)
                .ok_or_else(|| ModelError::UnknownVariable(cpd.variable().name.clone()))?;
            check_alignment(&variables, id, &parents[id], &cpd)?;
            cpd.check_columns(tolerance)?;
            slots[id] = Some(cpd);
        }
        let cpds = slots
            .into_iter()
            .enumerate()
            .map(|(id, cpd)| cpd.ok_or_else(|| ModelError::MissingCpd(variables[id].name.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let mut children = vec![vec![]; variables.len()];
        for (child, parents) in parents.iter().enumerate() {
            for &parent in parents {
                children[parent].push(child);
            }
        }
        let topological_order = topological_sort(&variables, &parents, &children)?;
        debug!(
            "built network of {} variables in topological order {:?}",
            variables.len(),
            variables.names(&topological_order).collect::<Vec<_>>()
        );

        Ok(Network {
            variables,
            parents,
            cpds,
            topological_order,
        })
    }
}

fn check_alignment(
    variables: &Variables,
    id: VariableId,
    declared_parents: &[VariableId],
    cpd: &TabularCpd,
) -> Result<(), ModelError> {
    let variable = &variables[id];
    if cpd.variable().cardinality != variable.cardinality {
        return Err(ModelError::CardinalityMismatch {
            cpd_of: variable.name.clone(),
            variable: variable.name.clone(),
            declared: variable.cardinality,
            cpd: cpd.variable().cardinality,
        });
    }

    let aligned = declared_parents.len() == cpd.parents().len()
        && declared_parents
            .iter()
            .zip(cpd.parents())
            .all(|(&declared, parent)| variables[declared].name == parent.name);
    if !aligned {
        return Err(ModelError::ParentMismatch {
            variable: variable.name.clone(),
            declared: variables.names(declared_parents).map(String::from).collect(),
            cpd: cpd.parents().iter().map(|parent| parent.name.clone()).collect(),
        });
    }

    for (&declared, parent) in declared_parents.iter().zip(cpd.parents()) {
        let declared = &variables[declared];
        if declared.cardinality != parent.cardinality {
            return Err(ModelError::CardinalityMismatch {
                cpd_of: variable.name.clone(),
                variable: declared.name.clone(),
                declared: declared.cardinality,
                cpd: parent.cardinality,
            });
        }
    }
    Ok(())
}

/// Kahn's algorithm. Ties are broken by declaration order, so the result is deterministic.
fn topological_sort(
    variables: &Variables,
    parents: &[Vec<VariableId>],
    children: &[Vec<VariableId>],
) -> Result<Vec<VariableId>, ModelError> {
    let mut in_degree = parents.iter().map(Vec::len).collect::<Vec<_>>();
    let mut ready = (0..variables.len())
        .filter(|&id| in_degree[id] == 0)
        .collect::<VecDeque<_>>();
    let mut order = Vec::with_capacity(variables.len());
    while let Some(id) = ready.pop_front() {
        order.push(id);
        for &child in &children[id] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.push_back(child);
            }
        }
    }

    if order.len() == variables.len() {
        Ok(order)
    } else {
        let stuck = (0..variables.len())
            .filter(|&id| in_degree[id] > 0)
            .map(|id| variables[id].name.clone())
            .collect();
        Err(ModelError::Cycle(stuck))
    }
}

#[derive(Debug, Clone)]
pub struct Network {
    variables: Variables,
    parents: Vec<Vec<VariableId>>,
    cpds: Vec<TabularCpd>,
    topological_order: Vec<VariableId>,
}
impl Network {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn id_of(&self, name: &str) -> Option<VariableId> {
        self.variables.id_of(name)
    }

    pub fn parents(&self, id: VariableId) -> &[VariableId] {
        &self.parents[id]
    }

    pub fn is_root(&self, id: VariableId) -> bool {
        self.parents[id].is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = VariableId> + '_ {
        (0..self.variables.len()).filter(|&id| self.is_root(id))
    }

    pub fn cpd(&self, id: VariableId) -> &TabularCpd {
        &self.cpds[id]
    }

    pub fn cpds(&self) -> &[TabularCpd] {
        &self.cpds
    }

    pub fn topological_order(&self) -> &[VariableId] {
        &self.topological_order
    }

    /// One factor per CPD, in variable order.
    pub fn factors(&self) -> Vec<Factor> {
        self.cpds
            .iter()
            .enumerate()
            .map(|(id, cpd)| cpd.to_factor(id, &self.parents[id]))
            .collect()
    }
}

#[cfg(test)]
mod tests;
