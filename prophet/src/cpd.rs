//! Tabular conditional probability distributions.
//!
//! A [`TabularCpd`] holds `P(variable | parents)` as a dense row-major table: one row per state of
//! the variable, one column per joint parent state. Columns enumerate parent states in mixed
//! radix with the last declared parent varying fastest, so for parents `[A, B]` with cardinalities
//! `[2, 3]` the columns are `(a0,b0), (a0,b1), (a0,b2), (a1,b0), ...`.

use std::ops::{Index, Range};

use thiserror::Error;

use crate::factor::Factor;
use crate::probs::SliceExt;
use crate::variable::{Variable, VariableId};

#[derive(Debug, Error, PartialEq)]
#[error("CPD for {variable} is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
pub struct MisshapenCpd {
    pub variable: String,
    pub rows: usize,
    pub cols: usize,
    pub expected_rows: usize,
    pub expected_cols: usize,
}

#[derive(Debug, Error, PartialEq)]
#[error("column {column} of the CPD for {variable} sums to {actual}, expected 1 ± {tolerance}")]
pub struct WrongColumnSum {
    pub variable: String,
    pub column: usize,
    pub actual: f64,
    pub tolerance: f64,
}

#[derive(Debug, Error, PartialEq)]
#[error("CPD for {variable} contains invalid probability {value} in column {column}")]
pub struct InvalidProbability {
    pub variable: String,
    pub column: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabularCpd {
    variable: Variable,
    parents: Vec<Variable>,
    values: Vec<f64>,
    cols: usize,
}
impl TabularCpd {
    /// Builds a CPD from `rows`, one per state of `variable`, each spanning every joint parent state.
    pub fn new(
        variable: Variable,
        parents: Vec<Variable>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, MisshapenCpd> {
        let expected_cols = parents.iter().map(|parent| parent.cardinality).product::<usize>();
        let misshapen = |actual_cols: usize| MisshapenCpd {
            variable: variable.name.clone(),
            rows: rows.len(),
            cols: actual_cols,
            expected_rows: variable.cardinality,
            expected_cols,
        };
        if rows.len() != variable.cardinality {
            return Err(misshapen(rows.first().map(Vec::len).unwrap_or(0)));
        }
        if let Some(ragged) = rows.iter().find(|row| row.len() != expected_cols) {
            return Err(misshapen(ragged.len()));
        }

        let values = rows.into_iter().flatten().collect();
        Ok(Self {
            variable,
            parents,
            values,
            cols: expected_cols,
        })
    }

    /// An unconditional distribution: a single column.
    pub fn root(variable: Variable, prior: Vec<f64>) -> Result<Self, MisshapenCpd> {
        let rows = prior.into_iter().map(|prob| vec![prob]).collect();
        Self::new(variable, vec![], rows)
    }

    /// Builds a CPD column by column. `column` receives the parent states of each column (in
    /// declared parent order) and must return one probability per state of `variable`.
    pub fn from_columns(
        variable: Variable,
        parents: Vec<Variable>,
        mut column: impl FnMut(&[usize]) -> Vec<f64>,
    ) -> Result<Self, MisshapenCpd> {
        let cards = parents.iter().map(|parent| parent.cardinality).collect::<Vec<_>>();
        let cols = cards.iter().product::<usize>();
        let mut rows = vec![Vec::with_capacity(cols); variable.cardinality];
        let mut parent_states = vec![0; cards.len()];
        for _ in 0..cols {
            let probs = column(&parent_states);
            if probs.len() != variable.cardinality {
                return Err(MisshapenCpd {
                    variable: variable.name.clone(),
                    rows: probs.len(),
                    cols,
                    expected_rows: variable.cardinality,
                    expected_cols: cols,
                });
            }
            for (row, prob) in rows.iter_mut().zip(probs) {
                row.push(prob);
            }
            crate::factor::advance(&mut parent_states, &cards);
        }
        Self::new(variable, parents, rows)
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn parents(&self) -> &[Variable] {
        &self.parents
    }

    pub fn rows(&self) -> usize {
        self.variable.cardinality
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows()).map(|row| self[(row, col)]).collect()
    }

    pub fn row_slice(&self, row: usize) -> &[f64] {
        &self.values[self.row_range(row)]
    }

    /// Column index for a joint parent assignment given in declared parent order.
    pub fn column_of(&self, parent_states: &[usize]) -> usize {
        debug_assert_eq!(self.parents.len(), parent_states.len());
        parent_states
            .iter()
            .zip(&self.parents)
            .fold(0, |col, (&state, parent)| col * parent.cardinality + state)
    }

    /// Verifies that every entry is a finite, non-negative probability and that each column sums to
    /// one within `tolerance`.
    pub fn check_columns(&self, tolerance: f64) -> Result<(), CpdError> {
        for col in 0..self.cols {
            let column = self.column(col);
            if let Some(&value) = column.iter().find(|value| !value.is_finite() || **value < 0.0) {
                return Err(InvalidProbability {
                    variable: self.variable.name.clone(),
                    column: col,
                    value,
                }
                .into());
            }
            let actual = column.sum();
            if (actual - 1.0).abs() > tolerance {
                return Err(WrongColumnSum {
                    variable: self.variable.name.clone(),
                    column: col,
                    actual,
                    tolerance,
                }
                .into());
            }
        }
        Ok(())
    }

    /// The CPD as a factor over `[variable, parents...]`, given the ids those variables have in
    /// the owning network.
    pub fn to_factor(&self, variable_id: VariableId, parent_ids: &[VariableId]) -> Factor {
        debug_assert_eq!(self.parents.len(), parent_ids.len());
        let mut scope = Vec::with_capacity(1 + parent_ids.len());
        scope.push(variable_id);
        scope.extend_from_slice(parent_ids);
        let mut cards = Vec::with_capacity(scope.len());
        cards.push(self.variable.cardinality);
        cards.extend(self.parents.iter().map(|parent| parent.cardinality));
        Factor::new(scope, cards, self.values.clone())
    }

    fn row_range(&self, row: usize) -> Range<usize> {
        assert!(
            row < self.rows(),
            "invalid row {row} for the {}x{} CPD of {}",
            self.rows(),
            self.cols,
            self.variable.name
        );
        let start = row * self.cols;
        start..start + self.cols
    }
}

impl Index<(usize, usize)> for TabularCpd {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(
            col < self.cols,
            "invalid column {col} for the {}x{} CPD of {}",
            self.rows(),
            self.cols,
            self.variable.name
        );
        &self.values[self.row_range(row).start + col]
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CpdError {
    #[error("{0}")]
    WrongColumnSum(#[from] WrongColumnSum),

    #[error("{0}")]
    InvalidProbability(#[from] InvalidProbability),
}
