//! Reduces a fixture's history to one observed state per root of the football model.

use std::error::Error;

use anyhow::anyhow;
use thiserror::Error;
use tracing::debug;

use prophet::evidence::Evidence;

use crate::domain::{
    AbsenceKind, ExternalPrediction, Fixture, FixtureId, FormResult, PredictionType, Side, TeamId,
};
use crate::schema::{Absences, Form, H2hTrend, SoccerVariable, Tip};
use crate::store::{HistoricalStore, StoreError};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(#[from] pub Box<dyn Error + Send + Sync>);

impl From<anyhow::Error> for ValidationError {
    fn from(value: anyhow::Error) -> Self {
        ValidationError(value.into())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("malformed head-to-head result '{result}' for fixture {fixture}")]
    MalformedResult { fixture: FixtureId, result: String },
}

/// How the goal tokens of a head-to-head result are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GoalComparison {
    /// As integers.
    #[default]
    Numeric,

    /// As strings, so that "10" ranks below "2". Kept for compatibility with legacy predictions.
    Lexical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of recent form entries considered.
    pub form_window: usize,
    /// Wins within the window for the form to be good.
    pub form_min_wins: usize,
    /// Number of recent meetings considered.
    pub h2h_window: usize,
    /// Home wins within the window for the home side to be dominant.
    pub h2h_min_home_wins: usize,
    pub goal_comparison: GoalComparison,
    /// Whether impactful suspended players count alongside injured ones.
    pub count_suspensions: bool,
}
impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.form_window == 0 {
            return Err(anyhow!("form window cannot be empty").into());
        }
        if self.form_min_wins == 0 || self.form_min_wins > self.form_window {
            return Err(anyhow!(
                "form wins threshold must lie between 1 and the form window of {}",
                self.form_window
            )
            .into());
        }
        if self.h2h_window == 0 {
            return Err(anyhow!("head-to-head window cannot be empty").into());
        }
        if self.h2h_min_home_wins == 0 || self.h2h_min_home_wins > self.h2h_window {
            return Err(anyhow!(
                "head-to-head home wins threshold must lie between 1 and the head-to-head window of {}",
                self.h2h_window
            )
            .into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            form_window: 5,
            form_min_wins: 3,
            h2h_window: 5,
            h2h_min_home_wins: 3,
            goal_comparison: GoalComparison::default(),
            count_suspensions: false,
        }
    }
}

/// The observed state of every root variable for one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchEvidence {
    pub home_form: Form,
    pub away_form: Form,
    pub home_injuries: Absences,
    pub away_injuries: Absences,
    pub h2h: H2hTrend,
    pub tip: Tip,
}
impl MatchEvidence {
    pub fn to_evidence(&self) -> Evidence {
        Evidence::from_iter([
            (SoccerVariable::HomeForm.name(), self.home_form.ordinal()),
            (SoccerVariable::AwayForm.name(), self.away_form.ordinal()),
            (SoccerVariable::HomeInjuries.name(), self.home_injuries.ordinal()),
            (SoccerVariable::AwayInjuries.name(), self.away_injuries.ordinal()),
            (SoccerVariable::H2HResult.name(), self.h2h.ordinal()),
            (SoccerVariable::ExternalPrediction.name(), self.tip.ordinal()),
        ])
    }
}

pub struct Extractor<'a, S: HistoricalStore + ?Sized> {
    store: &'a S,
    config: Config,
}
impl<'a, S: HistoricalStore + ?Sized> Extractor<'a, S> {
    pub fn new(store: &'a S, config: Config) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Good if the team won at least the threshold number of its most recent games before the
    /// fixture. A short history is judged on what is available.
    pub fn form(&self, team: TeamId, fixture: &Fixture) -> Result<Form, ExtractError> {
        let forms = self
            .store
            .forms_before(team, fixture.date, self.config.form_window)?;
        let wins = forms
            .iter()
            .take(self.config.form_window)
            .filter(|form| form.result == FormResult::Win)
            .count();
        Ok(if wins >= self.config.form_min_wins {
            Form::Good
        } else {
            Form::Poor
        })
    }

    pub fn absences(&self, team: TeamId) -> Result<Absences, ExtractError> {
        let mut absent = self.store.absent_players(team, AbsenceKind::Injured)?;
        if self.config.count_suspensions {
            absent.extend(self.store.absent_players(team, AbsenceKind::Suspended)?);
        }
        Ok(if absent.iter().any(|player| player.effect.is_impactful()) {
            Absences::Impactful
        } else {
            Absences::Clear
        })
    }

    pub fn head_to_head(&self, fixture: &Fixture) -> Result<H2hTrend, ExtractError> {
        let head_to_heads = self
            .store
            .head_to_heads(fixture.id, self.config.h2h_window)?;
        let mut home_wins = 0;
        for head_to_head in head_to_heads.iter().take(self.config.h2h_window) {
            if self.is_home_win(fixture.id, &head_to_head.result)? {
                home_wins += 1;
            }
        }
        Ok(if home_wins >= self.config.h2h_min_home_wins {
            H2hTrend::HomeDominant
        } else {
            H2hTrend::NotDominant
        })
    }

    fn is_home_win(&self, fixture: FixtureId, result: &str) -> Result<bool, ExtractError> {
        let malformed = || ExtractError::MalformedResult {
            fixture,
            result: result.into(),
        };
        let mut tokens = result.split('-');
        let (Some(home), Some(away), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(malformed());
        };
        match self.config.goal_comparison {
            GoalComparison::Lexical => Ok(home > away),
            GoalComparison::Numeric => {
                let home = home.trim().parse::<u16>().map_err(|_| malformed())?;
                let away = away.trim().parse::<u16>().map_err(|_| malformed())?;
                Ok(home > away)
            }
        }
    }

    /// The 1X2 tip of the most accurate site. The first of equally accurate tips wins; no tips, or
    /// a tip that is not one of "1", "X" and "2", count as a home tip.
    pub fn external_prediction(&self, fixture: &Fixture) -> Result<Tip, ExtractError> {
        let predictions = self
            .store
            .predictions(fixture.id, PredictionType::OneXTwo)?;
        let mut best: Option<&ExternalPrediction> = None;
        for prediction in predictions.iter().filter(|prediction| !prediction.accuracy.is_nan()) {
            if best.map_or(true, |incumbent| prediction.accuracy > incumbent.accuracy) {
                best = Some(prediction);
            }
        }
        let tip = match best.map(|prediction| prediction.value.as_str()) {
            Some("X") => Tip::Draw,
            Some("2") => Tip::Away,
            _ => Tip::Home,
        };
        Ok(tip)
    }

    pub fn extract(&self, fixture: &Fixture) -> Result<MatchEvidence, ExtractError> {
        let (home, away) = (fixture.team(&Side::Home), fixture.team(&Side::Away));
        let evidence = MatchEvidence {
            home_form: self.form(home, fixture)?,
            away_form: self.form(away, fixture)?,
            home_injuries: self.absences(home)?,
            away_injuries: self.absences(away)?,
            h2h: self.head_to_head(fixture)?,
            tip: self.external_prediction(fixture)?,
        };
        debug!("evidence for fixture {}: {evidence:?}", fixture.id);
        Ok(evidence)
    }
}
