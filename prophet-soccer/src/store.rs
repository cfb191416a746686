//! Read-only access to the historical records that evidence is extracted from.

use std::fs::File;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{
    Absence, AbsenceKind, ExternalPrediction, Fixture, FixtureId, FormRecord, HeadToHead, League,
    LeagueId, Player, PredictionType, Team, TeamId,
};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("unknown fixture {0}")]
    UnknownFixture(FixtureId),

    #[error("unknown league {0}")]
    UnknownLeague(LeagueId),

    #[error("{record} refers to unknown {referent} {id}")]
    DanglingReference {
        record: &'static str,
        referent: &'static str,
        id: u32,
    },

    #[error("form of team {team} dated {date}, but fixture {fixture} was on {played}")]
    MisdatedForm {
        team: TeamId,
        fixture: FixtureId,
        date: NaiveDate,
        played: NaiveDate,
    },
}

/// The queries the prediction engine makes of the surrounding persistence layer.
pub trait HistoricalStore {
    fn fixture(&self, id: FixtureId) -> Result<Fixture, StoreError>;

    /// All fixtures of a league, ordered by date, kick-off time and id.
    fn league_fixtures(&self, league: LeagueId) -> Result<Vec<Fixture>, StoreError>;

    /// At most `limit` of the team's form records dated strictly before `date`, ordered by
    /// descending game number.
    fn forms_before(
        &self,
        team: TeamId,
        date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<FormRecord>, StoreError>;

    /// Players of the team currently absent for the given reason.
    fn absent_players(&self, team: TeamId, kind: AbsenceKind) -> Result<Vec<Player>, StoreError>;

    /// At most `limit` head-to-head records of the fixture, most recent first.
    fn head_to_heads(&self, fixture: FixtureId, limit: usize)
        -> Result<Vec<HeadToHead>, StoreError>;

    /// Third-party predictions for the fixture of the given type, in stored order.
    fn predictions(
        &self,
        fixture: FixtureId,
        prediction_type: PredictionType,
    ) -> Result<Vec<ExternalPrediction>, StoreError>;
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// An in-memory [`HistoricalStore`], typically deserialised from a JSON export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub leagues: Vec<League>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub absences: Vec<Absence>,
    #[serde(default)]
    pub forms: Vec<FormRecord>,
    #[serde(default)]
    pub head_to_heads: Vec<HeadToHead>,
    #[serde(default)]
    pub predictions: Vec<ExternalPrediction>,
}
impl Dataset {
    /// Reads a JSON-encoded dataset from `path` and checks its references.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        let dataset: Dataset = serde_json::from_reader(io::BufReader::new(file))?;
        dataset.validate()?;
        debug!(
            "loaded {} leagues, {} teams, {} fixtures, {} form records",
            dataset.leagues.len(),
            dataset.teams.len(),
            dataset.fixtures.len(),
            dataset.forms.len()
        );
        Ok(dataset)
    }

    /// Verifies that every record refers to leagues, teams, fixtures and players that exist, and
    /// that form records carry the date of their fixture.
    pub fn validate(&self) -> Result<(), StoreError> {
        let leagues = self.leagues.iter().map(|league| league.id).collect::<FxHashSet<_>>();
        let teams = self.teams.iter().map(|team| team.id).collect::<FxHashSet<_>>();
        let fixtures = self.fixtures.iter().map(|fixture| fixture.id).collect::<FxHashSet<_>>();
        let played = self
            .fixtures
            .iter()
            .map(|fixture| (fixture.id, fixture.date))
            .collect::<FxHashMap<_, _>>();
        let players = self.players.iter().map(|player| player.id).collect::<FxHashSet<_>>();

        fn check(
            known: &FxHashSet<u32>,
            id: u32,
            record: &'static str,
            referent: &'static str,
        ) -> Result<(), StoreError> {
            if known.contains(&id) {
                Ok(())
            } else {
                Err(StoreError::DanglingReference {
                    record,
                    referent,
                    id,
                })
            }
        }

        for team in &self.teams {
            check(&leagues, team.league, "team", "league")?;
        }
        for fixture in &self.fixtures {
            check(&leagues, fixture.league, "fixture", "league")?;
            check(&teams, fixture.home_team, "fixture", "team")?;
            check(&teams, fixture.away_team, "fixture", "team")?;
        }
        for player in &self.players {
            check(&teams, player.team, "player", "team")?;
        }
        for absence in &self.absences {
            check(&players, absence.player, "absence", "player")?;
        }
        for form in &self.forms {
            check(&teams, form.team, "form record", "team")?;
            check(&fixtures, form.fixture, "form record", "fixture")?;
            if let Some(&played) = played.get(&form.fixture) {
                if played != form.date {
                    return Err(StoreError::MisdatedForm {
                        team: form.team,
                        fixture: form.fixture,
                        date: form.date,
                        played,
                    });
                }
            }
        }
        for head_to_head in &self.head_to_heads {
            check(&fixtures, head_to_head.fixture, "head-to-head", "fixture")?;
        }
        for prediction in &self.predictions {
            check(&fixtures, prediction.fixture, "prediction", "fixture")?;
        }
        Ok(())
    }
}

impl HistoricalStore for Dataset {
    fn fixture(&self, id: FixtureId) -> Result<Fixture, StoreError> {
        self.fixtures
            .iter()
            .find(|fixture| fixture.id == id)
            .cloned()
            .ok_or(StoreError::UnknownFixture(id))
    }

    fn league_fixtures(&self, league: LeagueId) -> Result<Vec<Fixture>, StoreError> {
        if !self.leagues.iter().any(|existing| existing.id == league) {
            return Err(StoreError::UnknownLeague(league));
        }
        let mut fixtures = self
            .fixtures
            .iter()
            .filter(|fixture| fixture.league == league)
            .cloned()
            .collect::<Vec<_>>();
        fixtures.sort_by_key(|fixture| (fixture.date, fixture.time, fixture.id));
        Ok(fixtures)
    }

    fn forms_before(
        &self,
        team: TeamId,
        date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<FormRecord>, StoreError> {
        let mut forms = self
            .forms
            .iter()
            .filter(|form| form.team == team && form.date < date)
            .cloned()
            .collect::<Vec<_>>();
        forms.sort_by(|a, b| b.game_number.cmp(&a.game_number));
        forms.truncate(limit);
        Ok(forms)
    }

    fn absent_players(&self, team: TeamId, kind: AbsenceKind) -> Result<Vec<Player>, StoreError> {
        Ok(self
            .players
            .iter()
            .filter(|player| player.team == team)
            .filter(|player| {
                self.absences
                    .iter()
                    .any(|absence| absence.player == player.id && absence.kind == kind)
            })
            .cloned()
            .collect())
    }

    fn head_to_heads(
        &self,
        fixture: FixtureId,
        limit: usize,
    ) -> Result<Vec<HeadToHead>, StoreError> {
        let mut head_to_heads = self
            .head_to_heads
            .iter()
            .filter(|head_to_head| head_to_head.fixture == fixture)
            .cloned()
            .collect::<Vec<_>>();
        head_to_heads.sort_by(|a, b| b.match_date.cmp(&a.match_date));
        head_to_heads.truncate(limit);
        Ok(head_to_heads)
    }

    fn predictions(
        &self,
        fixture: FixtureId,
        prediction_type: PredictionType,
    ) -> Result<Vec<ExternalPrediction>, StoreError> {
        Ok(self
            .predictions
            .iter()
            .filter(|prediction| {
                prediction.fixture == fixture && prediction.prediction_type == prediction_type
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures;
