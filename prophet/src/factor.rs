//! Dense factors over mixed-radix variable scopes.
//!
//! A factor maps every joint assignment of its scope to a non-negative value. Values are laid
//! out with the last scope variable varying fastest, matching [`TabularCpd`](crate::cpd::TabularCpd).

use crate::variable::VariableId;

#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    scope: Vec<VariableId>,
    cards: Vec<usize>,
    values: Vec<f64>,
}
impl Factor {
    pub fn new(scope: Vec<VariableId>, cards: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(scope.len(), cards.len(), "scope and cardinalities are misaligned");
        assert_eq!(
            cards.iter().product::<usize>(),
            values.len(),
            "{} values cannot fill cardinalities {cards:?}",
            values.len()
        );
        Self {
            scope,
            cards,
            values,
        }
    }

    /// The multiplicative identity: an empty scope holding a single `1.0`.
    pub fn unit() -> Self {
        Self {
            scope: vec![],
            cards: vec![],
            values: vec![1.0],
        }
    }

    pub fn scope(&self) -> &[VariableId] {
        &self.scope
    }

    pub fn cards(&self) -> &[usize] {
        &self.cards
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn contains(&self, variable: VariableId) -> bool {
        self.axis_of(variable).is_some()
    }

    /// The union of the factors' scopes, each variable listed where it first appears.
    pub fn joint_scope<'a>(factors: impl IntoIterator<Item = &'a Factor>) -> Vec<VariableId> {
        union_of_scopes(factors.into_iter().map(Factor::scope))
    }

    fn axis_of(&self, variable: VariableId) -> Option<usize> {
        self.scope.iter().position(|&scoped| scoped == variable)
    }

    fn strides(&self) -> Vec<usize> {
        let mut strides = vec![0; self.cards.len()];
        let mut stride = 1;
        for axis in (0..self.cards.len()).rev() {
            strides[axis] = stride;
            stride *= self.cards[axis];
        }
        strides
    }

    /// Strides of this factor's variables laid over `scope`; variables outside this factor get a
    /// stride of zero.
    fn strides_within(&self, scope: &[VariableId]) -> Vec<usize> {
        let own = self.strides();
        scope
            .iter()
            .map(|&variable| self.axis_of(variable).map_or(0, |axis| own[axis]))
            .collect()
    }

    /// Fixes `variable` to `state`, dropping it from the scope. Factors that do not mention
    /// `variable` are returned unchanged.
    pub fn reduce(&self, variable: VariableId, state: usize) -> Factor {
        let Some(axis) = self.axis_of(variable) else {
            return self.clone();
        };
        assert!(
            state < self.cards[axis],
            "state {state} out of range for cardinality {}",
            self.cards[axis]
        );

        let mut scope = self.scope.clone();
        scope.remove(axis);
        let mut cards = self.cards.clone();
        cards.remove(axis);
        let len = self.values.len() / self.cards[axis];
        let mut values = Vec::with_capacity(len);

        let mut assignment = vec![0; self.scope.len()];
        for &value in &self.values {
            if assignment[axis] == state {
                values.push(value);
            }
            advance(&mut assignment, &self.cards);
        }
        Factor::new(scope, cards, values)
    }

    /// Pointwise product over the union of both scopes. The result's scope lists this factor's
    /// variables first, followed by those only `other` mentions.
    pub fn product(&self, other: &Factor) -> Factor {
        let mut scope = self.scope.clone();
        let mut cards = self.cards.clone();
        for (&variable, &card) in other.scope.iter().zip(&other.cards) {
            match self.axis_of(variable) {
                None => {
                    scope.push(variable);
                    cards.push(card);
                }
                Some(axis) => debug_assert_eq!(card, self.cards[axis]),
            }
        }

        let self_strides = self.strides_within(&scope);
        let other_strides = other.strides_within(&scope);
        let len = cards.iter().product();
        let mut values = Vec::with_capacity(len);
        let mut assignment = vec![0; scope.len()];
        for _ in 0..len {
            let (mut lhs, mut rhs) = (0, 0);
            for (axis, &state) in assignment.iter().enumerate() {
                lhs += state * self_strides[axis];
                rhs += state * other_strides[axis];
            }
            values.push(self.values[lhs] * other.values[rhs]);
            advance(&mut assignment, &cards);
        }
        Factor::new(scope, cards, values)
    }

    /// Sums `variable` out of the factor. Factors that do not mention `variable` are returned
    /// unchanged.
    pub fn sum_out(&self, variable: VariableId) -> Factor {
        let Some(axis) = self.axis_of(variable) else {
            return self.clone();
        };

        let mut scope = self.scope.clone();
        scope.remove(axis);
        let mut cards = self.cards.clone();
        cards.remove(axis);
        let summed = Factor::new(scope, cards, vec![0.0; self.values.len() / self.cards[axis]]);
        let out_strides = summed.strides_within(&self.scope);

        let mut values = summed.values;
        let mut assignment = vec![0; self.scope.len()];
        for &value in &self.values {
            let index = assignment
                .iter()
                .zip(&out_strides)
                .map(|(state, stride)| state * stride)
                .sum::<usize>();
            values[index] += value;
            advance(&mut assignment, &self.cards);
        }
        Factor::new(summed.scope, summed.cards, values)
    }
}

pub(crate) fn union_of_scopes<'a>(
    scopes: impl IntoIterator<Item = &'a [VariableId]>,
) -> Vec<VariableId> {
    let mut union = vec![];
    for scope in scopes {
        for &variable in scope {
            if !union.contains(&variable) {
                union.push(variable);
            }
        }
    }
    union
}

/// Steps a mixed-radix `assignment` to its successor, last axis fastest, wrapping to all zeros
/// after the final assignment.
pub(crate) fn advance(assignment: &mut [usize], cards: &[usize]) {
    for axis in (0..assignment.len()).rev() {
        assignment[axis] += 1;
        if assignment[axis] < cards[axis] {
            return;
        }
        assignment[axis] = 0;
    }
}
