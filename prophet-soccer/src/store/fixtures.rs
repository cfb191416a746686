//! A small league with enough history to exercise every evidence rule.

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::domain::{
    Absence, AbsenceKind, Effect, ExternalPrediction, Fixture, FixtureId, FormRecord, FormResult,
    HeadToHead, League, LeagueId, Player, PredictionType, Team, TeamId,
};
use crate::store::Dataset;

pub const LEAGUE: LeagueId = 1;
pub const EMPTY_LEAGUE: LeagueId = 2;
/// Holds the past games that form records refer to.
pub const ARCHIVE: LeagueId = 3;

pub const HOME: TeamId = 10;
pub const AWAY: TeamId = 20;
pub const THIRD: TeamId = 30;

/// Home against away, with evidence (0, 1, 0, 1, 0, 0).
pub const FIXTURE: FixtureId = 100;
/// Away against third, with a "10-2" head-to-head and no tips.
pub const DOUBLE_DIGITS: FixtureId = 101;
/// Third against home, with an unrecognised tip.
pub const EARLIER: FixtureId = 102;
/// Home against third, a week after [`FIXTURE`].
pub const LATER: FixtureId = 103;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn kick_off(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn fixture_date() -> NaiveDate {
    date(2024, 3, 9)
}

fn fixture(
    id: FixtureId,
    home_team: TeamId,
    away_team: TeamId,
    date: NaiveDate,
    time: NaiveTime,
) -> Fixture {
    Fixture {
        id,
        league: LEAGUE,
        home_team,
        away_team,
        date,
        time,
    }
}

/// Appends form entries for `team`, most recent first, played weekly before `before`. Each
/// entry gets its own archived fixture. Game numbers count down from `results.len()`.
pub fn push_forms(dataset: &mut Dataset, team: TeamId, before: NaiveDate, results: &[FormResult]) {
    let opponent = if team == THIRD { HOME } else { THIRD };
    for (index, &result) in results.iter().enumerate() {
        let id = dataset
            .fixtures
            .iter()
            .map(|fixture| fixture.id)
            .fold(999, FixtureId::max)
            + 1;
        let date = before - Duration::weeks(index as i64 + 1);
        dataset.fixtures.push(Fixture {
            league: ARCHIVE,
            ..fixture(id, team, opponent, date, kick_off(15, 0))
        });
        dataset.forms.push(FormRecord {
            team,
            fixture: id,
            date,
            game_number: (results.len() - index) as u32,
            result,
        });
    }
}

/// Appends head-to-head results for `fixture`, most recent first, played yearly before
/// `before`.
pub fn push_head_to_heads(
    dataset: &mut Dataset,
    fixture: FixtureId,
    before: NaiveDate,
    results: &[&str],
) {
    for (index, &result) in results.iter().enumerate() {
        dataset.head_to_heads.push(HeadToHead {
            fixture,
            match_date: before - Duration::days(365 * (index as i64 + 1)),
            result: result.into(),
        });
    }
}

pub fn push_prediction(
    dataset: &mut Dataset,
    fixture: FixtureId,
    prediction_type: PredictionType,
    value: &str,
    accuracy: f64,
) {
    let site = format!("tipster-{}.example", dataset.predictions.len());
    dataset.predictions.push(ExternalPrediction {
        fixture,
        prediction_type,
        value: value.into(),
        site,
        accuracy,
    });
}

fn player(id: u32, team: TeamId, name: &str, effect: Effect) -> Player {
    Player {
        id,
        code: format!("P{id:03}"),
        team,
        name: name.into(),
        effect,
    }
}

pub fn dataset() -> Dataset {
    use FormResult::{Draw as D, Loss as L, Win as W};

    let mut dataset = Dataset {
        leagues: vec![
            League {
                id: LEAGUE,
                country: "England".into(),
                name: "Premier League".into(),
            },
            League {
                id: EMPTY_LEAGUE,
                country: "Italy".into(),
                name: "Serie A".into(),
            },
            League {
                id: ARCHIVE,
                country: "England".into(),
                name: "Friendlies".into(),
            },
        ],
        teams: vec![
            Team {
                id: HOME,
                league: LEAGUE,
                name: "Harbour Town".into(),
            },
            Team {
                id: AWAY,
                league: LEAGUE,
                name: "Ashford Rovers".into(),
            },
            Team {
                id: THIRD,
                league: LEAGUE,
                name: "Thornbury".into(),
            },
        ],
        fixtures: vec![
            fixture(LATER, HOME, THIRD, date(2024, 3, 16), kick_off(15, 0)),
            fixture(FIXTURE, HOME, AWAY, fixture_date(), kick_off(15, 0)),
            fixture(DOUBLE_DIGITS, AWAY, THIRD, fixture_date(), kick_off(12, 30)),
            fixture(EARLIER, THIRD, HOME, date(2024, 3, 2), kick_off(17, 30)),
        ],
        players: vec![
            player(1, HOME, "Moderate Injured", Effect::Moderate),
            player(2, HOME, "Threat Suspended", Effect::Threat),
            player(3, AWAY, "Best Injured", Effect::Best),
            player(4, AWAY, "Moderate Fit", Effect::Moderate),
        ],
        absences: vec![
            Absence {
                player: 1,
                kind: AbsenceKind::Injured,
            },
            Absence {
                player: 2,
                kind: AbsenceKind::Suspended,
            },
            Absence {
                player: 3,
                kind: AbsenceKind::Injured,
            },
        ],
        ..Dataset::default()
    };

    // the sixth entry falls outside the default window
    push_forms(&mut dataset, HOME, fixture_date(), &[W, W, W, L, D, L]);
    push_forms(&mut dataset, AWAY, fixture_date(), &[W, L, L, D, L]);
    // recorded after the fixture, so never counted for it
    dataset.forms.push(FormRecord {
        team: HOME,
        fixture: LATER,
        date: date(2024, 3, 16),
        game_number: 7,
        result: L,
    });

    push_head_to_heads(
        &mut dataset,
        FIXTURE,
        fixture_date(),
        &["3-1", "2-0", "1-0", "0-1", "1-1", "0-4"],
    );
    push_head_to_heads(
        &mut dataset,
        DOUBLE_DIGITS,
        fixture_date(),
        &["10-2", "0-1", "1-2", "3-0", "2-1"],
    );

    push_prediction(&mut dataset, FIXTURE, PredictionType::OneXTwo, "X", 70.0);
    push_prediction(&mut dataset, FIXTURE, PredictionType::OneXTwo, "1", 91.5);
    push_prediction(&mut dataset, FIXTURE, PredictionType::OneXTwo, "2", 91.5);
    push_prediction(&mut dataset, FIXTURE, PredictionType::BothTeamsToScore, "GG", 99.0);
    push_prediction(&mut dataset, EARLIER, PredictionType::OneXTwo, "H", 80.0);

    dataset
}
