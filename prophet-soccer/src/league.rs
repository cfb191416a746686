//! Predicts every fixture of a league.

use std::time::Instant;

use rayon::prelude::*;
use tracing::info;

use crate::domain::{Fixture, LeagueId};
use crate::predict::{FixturePrediction, PredictionError, Predictor};
use crate::store::{HistoricalStore, StoreError};

pub type Outcome = Result<FixturePrediction, PredictionError>;

/// One outcome per fixture of the league, in kick-off order. A failing fixture does not affect
/// the others. With `parallel`, fixtures are spread over the rayon pool; the order is unchanged.
pub fn predict_league<S: HistoricalStore + Sync + ?Sized>(
    predictor: &Predictor<S>,
    league: LeagueId,
    parallel: bool,
) -> Result<Vec<(Fixture, Outcome)>, StoreError> {
    let start_time = Instant::now();
    let fixtures = predictor.store().league_fixtures(league)?;
    let predict = |fixture: &Fixture| (fixture.clone(), predictor.predict_fixture(fixture.clone()));
    let outcomes = if parallel {
        fixtures.par_iter().map(predict).collect::<Vec<_>>()
    } else {
        fixtures.iter().map(predict).collect::<Vec<_>>()
    };
    let elapsed = start_time.elapsed();
    let failed = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.is_err())
        .count();
    info!(
        "predicted {} fixtures of league {league} ({failed} failed) in {elapsed:?}",
        outcomes.len()
    );
    Ok(outcomes)
}
