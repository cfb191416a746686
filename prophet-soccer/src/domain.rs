use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub type LeagueId = u32;
pub type TeamId = u32;
pub type FixtureId = u32;
pub type PlayerId = u32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub country: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub league: LeagueId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub league: LeagueId,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub date: NaiveDate,
    pub time: NaiveTime,
}
impl Fixture {
    pub fn team(&self, side: &Side) -> TeamId {
        match side {
            Side::Home => self.home_team,
            Side::Away => self.away_team,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    #[serde(rename = "W", alias = "Win")]
    Win,
    #[serde(rename = "D", alias = "Draw")]
    Draw,
    #[serde(rename = "L", alias = "Loss")]
    Loss,
}

/// One entry of a team's recent form, recorded against the fixture it was compiled for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub team: TeamId,
    pub fixture: FixtureId,
    pub date: NaiveDate,
    pub game_number: u32,
    pub result: FormResult,
}

/// How much a player matters to the team's line-up.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Threat,
    Best,
    Moderate,
    Required,
}
impl Effect {
    pub fn is_impactful(&self) -> bool {
        matches!(self, Effect::Threat | Effect::Best | Effect::Required)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub code: String,
    pub team: TeamId,
    pub name: String,
    pub effect: Effect,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceKind {
    Injured,
    Suspended,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub player: PlayerId,
    pub kind: AbsenceKind,
}

/// A past meeting of the fixture's teams. `result` is formatted as `"<home goals>-<away goals>"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub fixture: FixtureId,
    pub match_date: NaiveDate,
    pub result: String,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionType {
    #[serde(rename = "1X2")]
    OneXTwo,
    #[serde(rename = "GG")]
    BothTeamsToScore,
    Over,
    Under,
    Handicap,
    #[serde(rename = "Correct Score")]
    CorrectScore,
}

/// A third-party tip for a fixture, with the tipster site's stated accuracy (percent).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalPrediction {
    pub fixture: FixtureId,
    pub prediction_type: PredictionType,
    pub value: String,
    pub site: String,
    pub accuracy: f64,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}
impl Score {
    pub const fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}
