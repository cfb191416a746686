use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Cell, Col, Row, Table};
use strum::IntoEnumIterator;

use prophet::inference::Posterior;

use crate::domain::{Fixture, TeamId};
use crate::evidence::MatchEvidence;
use crate::league::Outcome;
use crate::predict::{
    BothTeamsToScore, CorrectScoreStub, HandicapOutcome, Market, MatchOutcome, TotalGoals,
};
use crate::schema::SoccerVariable;

fn header(labels: &[&str]) -> Row {
    Row::new(
        Styles::default().with(Header(true)),
        labels.iter().map(|&label| label.into()).collect(),
    )
}

pub fn tabulate_predictions(
    outcomes: &[(Fixture, Outcome)],
    team_name: impl Fn(TeamId) -> String,
) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(Left)),
            Col::new(Styles::default().with(MinWidth(5)).with(Left)),
            Col::new(Styles::default().with(MinWidth(20)).with(Left)),
            Col::new(Styles::default().with(MinWidth(3)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(17)).with(Left)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Centred)),
        ])
        .with_row(header(&[
            "Date",
            "Time",
            "Fixture",
            "1X2",
            "O/U",
            "GG",
            "Handicap",
            "Correct Score",
        ]));
    for (fixture, outcome) in outcomes {
        let mut cells: Vec<Cell> = vec![
            fixture.date.to_string().into(),
            fixture.time.format("%H:%M").to_string().into(),
            format!(
                "{} v {}",
                team_name(fixture.home_team),
                team_name(fixture.away_team)
            )
            .into(),
        ];
        match outcome {
            Ok(prediction) => {
                cells.push(prediction.match_result.to_string().into());
                cells.push(prediction.over_under.to_string().into());
                cells.push(prediction.gg.to_string().into());
                cells.push(prediction.handicap.to_string().into());
                cells.push(prediction.correct_score.to_string().into());
            }
            Err(err) => {
                cells.push(format!("error: {err}").into());
                cells.extend((0..4).map(|_| "".into()));
            }
        }
        table.push_row(Row::new(Styles::default(), cells));
    }
    table
}

fn state_labels(market: Market) -> Vec<String> {
    fn labels<L: IntoEnumIterator + ToString>() -> Vec<String> {
        L::iter().map(|label| label.to_string()).collect()
    }
    match market {
        Market::MatchResult => labels::<MatchOutcome>(),
        Market::OverUnder => labels::<TotalGoals>(),
        Market::BothTeamsToScore => labels::<BothTeamsToScore>(),
        Market::Handicap => labels::<HandicapOutcome>(),
        Market::CorrectScore => vec![CorrectScoreStub.to_string()],
    }
}

pub fn tabulate_posteriors(posteriors: &[(Market, Posterior)]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(Left)),
            Col::new(Styles::default().with(MinWidth(17)).with(Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(header(&["Market", "Outcome", "Probability"]));
    for (market, posterior) in posteriors {
        for (index, (label, prob)) in state_labels(*market)
            .into_iter()
            .zip(&posterior.probs)
            .enumerate()
        {
            let market = if index == 0 {
                market.to_string()
            } else {
                String::new()
            };
            table.push_row(Row::new(
                Styles::default(),
                vec![market.into(), label.into(), format!("{prob:.4}").into()],
            ));
        }
    }
    table
}

pub fn tabulate_evidence(evidence: &MatchEvidence) -> Table {
    let states = [
        (SoccerVariable::HomeForm, evidence.home_form.to_string()),
        (SoccerVariable::AwayForm, evidence.away_form.to_string()),
        (SoccerVariable::HomeInjuries, evidence.home_injuries.to_string()),
        (SoccerVariable::AwayInjuries, evidence.away_injuries.to_string()),
        (SoccerVariable::H2HResult, evidence.h2h.to_string()),
        (SoccerVariable::ExternalPrediction, evidence.tip.to_string()),
    ];
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(18)).with(Left)),
            Col::new(Styles::default().with(MinWidth(12)).with(Left)),
        ])
        .with_row(header(&["Variable", "State"]));
    for (variable, state) in states {
        table.push_row(Row::new(
            Styles::default(),
            vec![variable.name().into(), state.into()],
        ));
    }
    table
}
