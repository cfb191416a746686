//! The fixed football model: six observed roots feeding four market targets.
//!
//! Target CPDs are authored as a base distribution tilted by one weight vector per parent state.
//! Each column is the normalised elementwise product of the base and the tilts selected by that
//! column's parent states.

use ordinalizer::Ordinal;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};
use tracing::debug;

use prophet::cpd::{MisshapenCpd, TabularCpd};
use prophet::network::{ModelError, Network};
use prophet::probs::SliceExt;
use prophet::variable::Variable;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, IntoStaticStr,
)]
pub enum SoccerVariable {
    HomeForm,
    AwayForm,
    HomeInjuries,
    AwayInjuries,
    H2HResult,
    ExternalPrediction,
    MatchResult,
    OverUnderResult,
    GGResult,
    HandicapResult,
}

/// A team's recent form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display)]
pub enum Form {
    Good,
    Poor,
}

/// Whether a team is missing any player it relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display)]
pub enum Absences {
    Clear,
    Impactful,
}

/// The trend of recent meetings between the two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display)]
pub enum H2hTrend {
    HomeDominant,
    NotDominant,
}

/// The most trusted third-party 1X2 tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display)]
pub enum Tip {
    Home,
    Draw,
    Away,
}

use SoccerVariable::*;

const MATCH_RESULT_PARENTS: [SoccerVariable; 6] = [
    HomeForm,
    AwayForm,
    HomeInjuries,
    AwayInjuries,
    H2HResult,
    ExternalPrediction,
];
const OVER_UNDER_PARENTS: [SoccerVariable; 3] = [HomeForm, AwayForm, H2HResult];
const GG_PARENTS: [SoccerVariable; 3] = [HomeForm, AwayForm, H2HResult];
const HANDICAP_PARENTS: [SoccerVariable; 2] = [HomeForm, AwayForm];

const HOME_FORM_PRIOR: [f64; Form::COUNT] = [0.7, 0.3];
const AWAY_FORM_PRIOR: [f64; Form::COUNT] = [0.4, 0.6];
const HOME_INJURIES_PRIOR: [f64; Absences::COUNT] = [0.9, 0.1];
const AWAY_INJURIES_PRIOR: [f64; Absences::COUNT] = [0.8, 0.2];
const H2H_PRIOR: [f64; H2hTrend::COUNT] = [0.6, 0.4];
const TIP_PRIOR: [f64; Tip::COUNT] = [0.5, 0.3, 0.2];

/// Home win, draw, away win.
const MATCH_RESULT_BASE: [f64; 3] = [0.5, 0.3, 0.2];
const MATCH_RESULT_TILTS: [&[[f64; 3]]; 6] = [
    &[[1.3, 1.0, 0.8], [0.8, 1.05, 1.2]],
    &[[0.8, 1.0, 1.3], [1.25, 1.0, 0.8]],
    &[[1.0, 1.0, 1.0], [0.8, 1.05, 1.2]],
    &[[1.0, 1.0, 1.0], [1.2, 1.05, 0.8]],
    &[[1.25, 1.0, 0.85], [0.9, 1.05, 1.1]],
    &[[1.5, 0.9, 0.7], [0.85, 1.6, 0.85], [0.7, 0.9, 1.5]],
];

/// Over, under.
const OVER_UNDER_BASE: [f64; 2] = [0.6, 0.4];
const OVER_UNDER_TILTS: [&[[f64; 2]]; 3] = [
    &[[1.15, 0.85], [0.9, 1.1]],
    &[[1.1, 0.9], [0.9, 1.1]],
    &[[1.1, 0.9], [0.95, 1.05]],
];

/// Both score, not both.
const GG_BASE: [f64; 2] = [0.55, 0.45];
const GG_TILTS: [&[[f64; 2]]; 3] = [
    &[[1.1, 0.9], [0.9, 1.1]],
    &[[1.2, 0.8], [0.8, 1.2]],
    &[[0.95, 1.05], [1.05, 0.95]],
];

/// Home, draw, away on the handicap line.
const HANDICAP_BASE: [f64; 3] = [0.4, 0.3, 0.3];
const HANDICAP_TILTS: [&[[f64; 3]]; 2] = [
    &[[1.3, 1.0, 0.75], [0.8, 1.0, 1.25]],
    &[[0.75, 1.0, 1.3], [1.3, 1.0, 0.8]],
];

impl SoccerVariable {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn cardinality(&self) -> usize {
        match self {
            HomeForm | AwayForm => Form::COUNT,
            HomeInjuries | AwayInjuries => Absences::COUNT,
            H2HResult => H2hTrend::COUNT,
            ExternalPrediction => Tip::COUNT,
            MatchResult | HandicapResult => 3,
            OverUnderResult | GGResult => 2,
        }
    }

    /// Parents in the order their states enumerate the CPD's columns.
    pub fn parents(&self) -> &'static [SoccerVariable] {
        match self {
            MatchResult => &MATCH_RESULT_PARENTS,
            OverUnderResult => &OVER_UNDER_PARENTS,
            GGResult => &GG_PARENTS,
            HandicapResult => &HANDICAP_PARENTS,
            _ => &[],
        }
    }

    pub fn is_root(&self) -> bool {
        self.parents().is_empty()
    }

    pub fn variable(&self) -> Variable {
        Variable::new(self.name(), self.cardinality())
    }

    pub fn cpd(&self) -> Result<TabularCpd, MisshapenCpd> {
        let variable = self.variable();
        match self {
            HomeForm => TabularCpd::root(variable, HOME_FORM_PRIOR.to_vec()),
            AwayForm => TabularCpd::root(variable, AWAY_FORM_PRIOR.to_vec()),
            HomeInjuries => TabularCpd::root(variable, HOME_INJURIES_PRIOR.to_vec()),
            AwayInjuries => TabularCpd::root(variable, AWAY_INJURIES_PRIOR.to_vec()),
            H2HResult => TabularCpd::root(variable, H2H_PRIOR.to_vec()),
            ExternalPrediction => TabularCpd::root(variable, TIP_PRIOR.to_vec()),
            MatchResult => self.tilted_cpd(&MATCH_RESULT_BASE, &MATCH_RESULT_TILTS),
            OverUnderResult => self.tilted_cpd(&OVER_UNDER_BASE, &OVER_UNDER_TILTS),
            GGResult => self.tilted_cpd(&GG_BASE, &GG_TILTS),
            HandicapResult => self.tilted_cpd(&HANDICAP_BASE, &HANDICAP_TILTS),
        }
    }

    fn tilted_cpd<const N: usize>(
        &self,
        base: &[f64; N],
        tilts: &[&[[f64; N]]],
    ) -> Result<TabularCpd, MisshapenCpd> {
        let parents = self
            .parents()
            .iter()
            .map(SoccerVariable::variable)
            .collect::<Vec<_>>();
        TabularCpd::from_columns(self.variable(), parents, |parent_states| {
            let mut column = base.to_vec();
            for (parent_tilts, &state) in tilts.iter().zip(parent_states) {
                for (prob, weight) in column.iter_mut().zip(parent_tilts[state]) {
                    *prob *= weight;
                }
            }
            column.normalise(1.0);
            column
        })
    }
}

/// Builds the validated football network. Variables are declared in [`SoccerVariable`] order,
/// so a variable's id is its ordinal.
pub fn build_model() -> Result<Network, ModelError> {
    let mut builder = Network::builder();
    for variable in SoccerVariable::iter() {
        builder.add_variable(variable.name(), variable.cardinality())?;
    }
    for child in SoccerVariable::iter() {
        for parent in child.parents() {
            builder.add_edge(parent.name(), child.name())?;
        }
    }
    for variable in SoccerVariable::iter() {
        builder.add_cpd(variable.cpd()?)?;
    }
    let network = builder.build()?;
    debug!(
        "built football model with {} variables",
        network.variables().len()
    );
    Ok(network)
}
