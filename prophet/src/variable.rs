//! Named discrete random variables and a name ↔ index registry.

use std::fmt::{Display, Formatter};
use std::ops::Index;

use rustc_hash::FxHashMap;

/// Position of a variable within its [`Variables`] registry.
pub type VariableId = usize;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub cardinality: usize,
}
impl Variable {
    pub fn new(name: impl Into<String>, cardinality: usize) -> Self {
        Self {
            name: name.into(),
            cardinality,
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.name, self.cardinality)
    }
}

/// Variables in declaration order, addressable both by [`VariableId`] and by name.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    name_to_id: FxHashMap<String, VariableId>,
    id_to_variable: Vec<Variable>,
}
impl Variables {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            name_to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            id_to_variable: Vec::with_capacity(capacity),
        }
    }

    /// Registers a variable, returning its id, or gives the variable back if its name is taken.
    pub fn push(&mut self, variable: Variable) -> Result<VariableId, Variable> {
        if self.name_to_id.contains_key(&variable.name) {
            return Err(variable);
        }
        let id = self.id_to_variable.len();
        self.name_to_id.insert(variable.name.clone(), id);
        self.id_to_variable.push(variable);
        Ok(id)
    }

    pub fn get(&self, id: VariableId) -> Option<&Variable> {
        self.id_to_variable.get(id)
    }

    pub fn id_of(&self, name: &str) -> Option<VariableId> {
        self.name_to_id.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Variable> {
        self.id_of(name).map(|id| &self.id_to_variable[id])
    }

    pub fn len(&self) -> usize {
        self.id_to_variable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_variable.is_empty()
    }

    pub fn names<'a>(&'a self, ids: &'a [VariableId]) -> impl Iterator<Item = &'a str> + 'a {
        ids.iter().map(|&id| self.id_to_variable[id].name.as_str())
    }
}

impl Index<VariableId> for Variables {
    type Output = Variable;

    fn index(&self, id: VariableId) -> &Self::Output {
        self.get(id)
            .unwrap_or_else(|| panic!("no variable with id {id}"))
    }
}
