//! The per-fixture prediction façade.

use std::fmt::{Display, Formatter};

use ordinalizer::Ordinal;
use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumCount, EnumIter};
use thiserror::Error;
use tracing::debug;

use prophet::evidence::Evidence;
use prophet::inference::{EliminationOrder, InferenceError, Posterior, VariableElimination};
use prophet::network::Network;

use crate::domain::{Fixture, FixtureId, Score};
use crate::evidence::{Config, ExtractError, Extractor, MatchEvidence, ValidationError};
use crate::schema::SoccerVariable;
use crate::store::{HistoricalStore, StoreError};

#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Extract(#[from] ExtractError),

    #[error("{0}")]
    Inference(#[from] InferenceError),

    #[error("state {state} of {variable} has no label")]
    UnmappedState { variable: &'static str, state: usize },
}

/// A market label derived from the MAP state of one target variable.
pub trait Label: Sized + IntoEnumIterator {
    const TARGET: SoccerVariable;

    fn from_state(state: usize) -> Option<Self> {
        Self::iter().nth(state)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, Serialize,
)]
pub enum MatchOutcome {
    #[strum(serialize = "1")]
    #[serde(rename = "1")]
    Home,
    #[strum(serialize = "X")]
    #[serde(rename = "X")]
    Draw,
    #[strum(serialize = "2")]
    #[serde(rename = "2")]
    Away,
}
impl Label for MatchOutcome {
    const TARGET: SoccerVariable = SoccerVariable::MatchResult;
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, Serialize,
)]
pub enum TotalGoals {
    Over,
    Under,
}
impl Label for TotalGoals {
    const TARGET: SoccerVariable = SoccerVariable::OverUnderResult;
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, Serialize,
)]
pub enum BothTeamsToScore {
    #[strum(serialize = "GG")]
    #[serde(rename = "GG")]
    Yes,
    #[strum(serialize = "No GG")]
    #[serde(rename = "No GG")]
    No,
}
impl Label for BothTeamsToScore {
    const TARGET: SoccerVariable = SoccerVariable::GGResult;
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ordinal, EnumCount, EnumIter, Display, Serialize,
)]
pub enum HandicapOutcome {
    #[strum(serialize = "Home Handicap Win")]
    #[serde(rename = "Home Handicap Win")]
    Home,
    #[strum(serialize = "Draw Handicap")]
    #[serde(rename = "Draw Handicap")]
    Draw,
    #[strum(serialize = "Away Handicap Win")]
    #[serde(rename = "Away Handicap Win")]
    Away,
}
impl Label for HandicapOutcome {
    const TARGET: SoccerVariable = SoccerVariable::HandicapResult;
}

/// Correct score is not modelled; every fixture gets the same placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectScoreStub;
impl CorrectScoreStub {
    pub const SCORE: Score = Score::new(2, 1);

    pub fn score(&self) -> Score {
        Self::SCORE
    }
}

impl Display for CorrectScoreStub {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Self::SCORE)
    }
}

impl Serialize for CorrectScoreStub {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Market {
    #[strum(serialize = "1X2")]
    MatchResult,
    #[strum(serialize = "Over/Under")]
    OverUnder,
    #[strum(serialize = "GG")]
    BothTeamsToScore,
    Handicap,
    #[strum(serialize = "Correct Score")]
    CorrectScore,
}
impl Market {
    /// The model variable behind the market, if it is modelled at all.
    pub fn target(&self) -> Option<SoccerVariable> {
        match self {
            Market::MatchResult => Some(SoccerVariable::MatchResult),
            Market::OverUnder => Some(SoccerVariable::OverUnderResult),
            Market::BothTeamsToScore => Some(SoccerVariable::GGResult),
            Market::Handicap => Some(SoccerVariable::HandicapResult),
            Market::CorrectScore => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixturePrediction {
    pub fixture: Fixture,
    pub match_result: MatchOutcome,
    pub over_under: TotalGoals,
    pub gg: BothTeamsToScore,
    pub handicap: HandicapOutcome,
    pub correct_score: CorrectScoreStub,
}

pub struct Predictor<'a, S: HistoricalStore + ?Sized> {
    network: &'a Network,
    store: &'a S,
    extractor: Extractor<'a, S>,
    order: EliminationOrder,
}
impl<'a, S: HistoricalStore + ?Sized> Predictor<'a, S> {
    pub fn new(
        network: &'a Network,
        store: &'a S,
        config: Config,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            network,
            store,
            extractor: Extractor::new(store, config)?,
            order: EliminationOrder::default(),
        })
    }

    pub fn with_order(mut self, order: EliminationOrder) -> Self {
        self.order = order;
        self
    }

    pub fn store(&self) -> &S {
        self.store
    }

    pub fn evidence(&self, fixture: FixtureId) -> Result<MatchEvidence, PredictionError> {
        let fixture = self.store.fixture(fixture)?;
        Ok(self.extractor.extract(&fixture)?)
    }

    /// The label of the MAP state of `L`'s target under arbitrary evidence.
    pub fn label<L: Label>(&self, evidence: &Evidence) -> Result<L, PredictionError> {
        let variable = L::TARGET.name();
        let state = VariableElimination::new(self.network)
            .with_order(self.order)
            .map_query(variable, evidence)?;
        L::from_state(state).ok_or(PredictionError::UnmappedState { variable, state })
    }

    fn predict_market<L: Label>(&self, fixture: FixtureId) -> Result<L, PredictionError> {
        let evidence = self.evidence(fixture)?.to_evidence();
        self.label(&evidence)
    }

    pub fn predict_1x2(&self, fixture: FixtureId) -> Result<MatchOutcome, PredictionError> {
        self.predict_market(fixture)
    }

    pub fn predict_over_under(&self, fixture: FixtureId) -> Result<TotalGoals, PredictionError> {
        self.predict_market(fixture)
    }

    pub fn predict_gg(&self, fixture: FixtureId) -> Result<BothTeamsToScore, PredictionError> {
        self.predict_market(fixture)
    }

    pub fn predict_handicap(&self, fixture: FixtureId) -> Result<HandicapOutcome, PredictionError> {
        self.predict_market(fixture)
    }

    /// Always the placeholder score, provided the fixture exists.
    pub fn predict_correct_score(
        &self,
        fixture: FixtureId,
    ) -> Result<CorrectScoreStub, PredictionError> {
        self.store.fixture(fixture)?;
        Ok(CorrectScoreStub)
    }

    /// All five markets, from a single extraction of the fixture's evidence.
    pub fn predict(&self, fixture: FixtureId) -> Result<FixturePrediction, PredictionError> {
        let fixture = self.store.fixture(fixture)?;
        self.predict_fixture(fixture)
    }

    pub fn predict_fixture(&self, fixture: Fixture) -> Result<FixturePrediction, PredictionError> {
        let evidence = self.extractor.extract(&fixture)?.to_evidence();
        let prediction = FixturePrediction {
            match_result: self.label(&evidence)?,
            over_under: self.label(&evidence)?,
            gg: self.label(&evidence)?,
            handicap: self.label(&evidence)?,
            correct_score: CorrectScoreStub,
            fixture,
        };
        debug!(
            "fixture {}: {}, {}, {}, {}, {}",
            prediction.fixture.id,
            prediction.match_result,
            prediction.over_under,
            prediction.gg,
            prediction.handicap,
            prediction.correct_score
        );
        Ok(prediction)
    }

    /// The full posterior of every modelled market.
    pub fn posteriors(
        &self,
        fixture: FixtureId,
    ) -> Result<Vec<(Market, Posterior)>, PredictionError> {
        let evidence = self.evidence(fixture)?.to_evidence();
        let engine = VariableElimination::new(self.network).with_order(self.order);
        let mut posteriors = vec![];
        for market in Market::iter() {
            if let Some(target) = market.target() {
                posteriors.push((market, engine.query(target.name(), &evidence)?));
            }
        }
        Ok(posteriors)
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;
    use prophet::evidence::EvidenceError;
    use prophet_testing::assert_distribution;

    use crate::schema::build_model;
    use crate::store::fixtures::*;
    use crate::store::Dataset;

    use super::*;

    fn predictor<'a>(network: &'a Network, dataset: &'a Dataset) -> Predictor<'a, Dataset> {
        Predictor::new(network, dataset, Config::default()).unwrap()
    }

    #[test]
    fn labels() {
        assert_eq!("1", MatchOutcome::Home.to_string());
        assert_eq!("X", MatchOutcome::Draw.to_string());
        assert_eq!("Under", TotalGoals::Under.to_string());
        assert_eq!("No GG", BothTeamsToScore::No.to_string());
        assert_eq!("Draw Handicap", HandicapOutcome::Draw.to_string());
        assert_eq!("2-1", CorrectScoreStub.to_string());
        assert_eq!("Over/Under", Market::OverUnder.to_string());
    }

    #[test]
    fn labels_follow_state_order() {
        assert_eq!(Some(MatchOutcome::Away), MatchOutcome::from_state(2));
        assert_eq!(Some(BothTeamsToScore::Yes), BothTeamsToScore::from_state(0));
        assert_eq!(None, TotalGoals::from_state(2));
        for outcome in HandicapOutcome::iter() {
            assert_eq!(Some(outcome), HandicapOutcome::from_state(outcome.ordinal()));
        }
    }

    #[test]
    fn predict_each_market() {
        let network = build_model().unwrap();
        let dataset = dataset();
        let predictor = predictor(&network, &dataset);
        assert_eq!(MatchOutcome::Home, predictor.predict_1x2(FIXTURE).unwrap());
        assert_eq!(TotalGoals::Over, predictor.predict_over_under(FIXTURE).unwrap());
        assert_eq!(BothTeamsToScore::No, predictor.predict_gg(FIXTURE).unwrap());
        assert_eq!(HandicapOutcome::Home, predictor.predict_handicap(FIXTURE).unwrap());
        assert_eq!(CorrectScoreStub, predictor.predict_correct_score(FIXTURE).unwrap());
    }

    #[test]
    fn predict_all_markets() {
        let network = build_model().unwrap();
        let dataset = dataset();
        for order in EliminationOrder::iter() {
            let prediction = predictor(&network, &dataset)
                .with_order(order)
                .predict(FIXTURE)
                .unwrap();
            assert_eq!(FIXTURE, prediction.fixture.id);
            assert_eq!(
                vec!["1", "Over", "No GG", "Home Handicap Win", "2-1"],
                vec![
                    prediction.match_result.to_string(),
                    prediction.over_under.to_string(),
                    prediction.gg.to_string(),
                    prediction.handicap.to_string(),
                    prediction.correct_score.to_string(),
                ]
            );
        }
    }

    #[test]
    fn serialize_prediction() {
        let network = build_model().unwrap();
        let dataset = dataset();
        let prediction = predictor(&network, &dataset).predict(FIXTURE).unwrap();
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!("1", json["match_result"]);
        assert_eq!("Over", json["over_under"]);
        assert_eq!("No GG", json["gg"]);
        assert_eq!("Home Handicap Win", json["handicap"]);
        assert_eq!("2-1", json["correct_score"]);
        assert_eq!(100, json["fixture"]["id"]);
    }

    #[test]
    fn posteriors_are_target_columns() {
        let network = build_model().unwrap();
        let dataset = dataset();
        let posteriors = predictor(&network, &dataset).posteriors(FIXTURE).unwrap();
        assert_eq!(
            vec![
                Market::MatchResult,
                Market::OverUnder,
                Market::BothTeamsToScore,
                Market::Handicap
            ],
            posteriors.iter().map(|(market, _)| *market).collect::<Vec<_>>()
        );
        for (_, posterior) in &posteriors {
            assert_distribution(&posterior.probs, 1e-9);
        }

        let over_under = &posteriors[1].1;
        assert_float_absolute_eq!(0.6831 / (0.6831 + 0.3366), over_under.probs[0], 1e-12);
        let handicap = &posteriors[3].1;
        assert_float_absolute_eq!(0.676 / 1.156, handicap.probs[0], 1e-12);
    }

    #[test]
    fn missing_root_is_an_evidence_error() {
        let network = build_model().unwrap();
        let dataset = dataset();
        let predictor = predictor(&network, &dataset);
        let mut evidence = predictor.evidence(FIXTURE).unwrap().to_evidence();
        evidence.remove("HomeForm");
        assert_eq!(
            PredictionError::Inference(InferenceError::Evidence(EvidenceError::MissingRoot(
                "HomeForm".into()
            ))),
            predictor.label::<MatchOutcome>(&evidence).unwrap_err()
        );
    }

    #[test]
    fn unknown_fixture() {
        let network = build_model().unwrap();
        let dataset = dataset();
        let predictor = predictor(&network, &dataset);
        assert_eq!(
            PredictionError::Store(StoreError::UnknownFixture(999)),
            predictor.predict(999).unwrap_err()
        );
        assert_eq!(
            "unknown fixture 999",
            predictor.predict_correct_score(999).unwrap_err().to_string()
        );
    }

    #[test]
    fn malformed_history_fails_the_whole_prediction() {
        let network = build_model().unwrap();
        let mut dataset = dataset();
        dataset.head_to_heads[0].result = "three-one".into();
        let predictor = predictor(&network, &dataset);
        assert!(matches!(
            predictor.predict(FIXTURE),
            Err(PredictionError::Extract(ExtractError::MalformedResult { .. }))
        ));
        assert!(predictor.predict_correct_score(FIXTURE).is_ok());
    }
}
