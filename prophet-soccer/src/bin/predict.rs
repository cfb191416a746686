use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use prophet::inference::EliminationOrder;
use prophet_soccer::domain::{FixtureId, LeagueId, TeamId};
use prophet_soccer::evidence::{Config, GoalComparison};
use prophet_soccer::league::predict_league;
use prophet_soccer::predict::Predictor;
use prophet_soccer::print;
use prophet_soccer::schema::build_model;
use prophet_soccer::store::{Dataset, HistoricalStore};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the historical dataset from
    #[clap(short = 'f', long)]
    file: PathBuf,

    /// predict every fixture of the given league
    #[clap(short = 'l', long)]
    league: Option<LeagueId>,

    /// predict a single fixture
    #[clap(short = 'x', long)]
    fixture: Option<FixtureId>,

    /// print predictions as JSON
    #[clap(long)]
    json: bool,

    /// predict league fixtures in parallel
    #[clap(long)]
    parallel: bool,

    /// compare head-to-head goals as strings
    #[clap(long)]
    lexical: bool,

    /// count suspended players alongside injured ones
    #[clap(long)]
    suspensions: bool,

    /// eliminate variables in topological order
    #[clap(long)]
    declared_order: bool,

    /// also print the evidence and market posteriors of a single fixture
    #[clap(short = 'v', long)]
    verbose: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.league.is_none() && self.fixture.is_none()
            || self.league.is_some() && self.fixture.is_some()
        {
            bail!("either the -l or the -x flag must be specified");
        }
        if self.verbose && self.league.is_some() {
            bail!("-v applies to single fixtures only");
        }
        Ok(())
    }

    fn config(&self) -> Config {
        Config {
            goal_comparison: if self.lexical {
                GoalComparison::Lexical
            } else {
                GoalComparison::Numeric
            },
            count_suspensions: self.suspensions,
            ..Config::default()
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let dataset = Dataset::read_json_file(&args.file)?;
    info!(
        "loaded {} fixtures from {}",
        dataset.fixtures.len(),
        args.file.display()
    );
    let network = build_model()?;
    let order = if args.declared_order {
        EliminationOrder::Declared
    } else {
        EliminationOrder::MinNeighbours
    };
    let predictor = Predictor::new(&network, &dataset, args.config())?.with_order(order);

    let outcomes = match (args.league, args.fixture) {
        (Some(league), _) => predict_league(&predictor, league, args.parallel)?,
        (_, Some(fixture)) => {
            let fixture = dataset.fixture(fixture)?;
            let outcome = predictor.predict_fixture(fixture.clone());
            vec![(fixture, outcome)]
        }
        _ => unreachable!(),
    };

    if args.json {
        let predictions = outcomes
            .into_iter()
            .map(|(_, outcome)| outcome)
            .collect::<Result<Vec<_>, _>>()?;
        println!("{}", serde_json::to_string_pretty(&predictions)?);
        return Ok(());
    }

    let team_name = |team: TeamId| {
        dataset
            .teams
            .iter()
            .find(|candidate| candidate.id == team)
            .map(|candidate| candidate.name.clone())
            .unwrap_or_else(|| format!("#{team}"))
    };
    println!(
        "{}",
        Console::default().render(&print::tabulate_predictions(&outcomes, team_name))
    );

    if args.verbose {
        if let Some(fixture) = args.fixture {
            let evidence = predictor.evidence(fixture)?;
            println!(
                "Evidence:\n{}",
                Console::default().render(&print::tabulate_evidence(&evidence))
            );
            let posteriors = predictor.posteriors(fixture)?;
            println!(
                "Posteriors:\n{}",
                Console::default().render(&print::tabulate_posteriors(&posteriors))
            );
        }
    }
    Ok(())
}
