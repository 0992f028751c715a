use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, anyhow};

use nba_matchup::artifacts;
use nba_matchup::config::{self, AppConfig};
use nba_matchup::predictor::MatchupPredictor;

const USAGE: &str = "\
usage: nba_matchup [--resources DIR] [--json] <command>

commands:
  teams                 list selectable team names
  predict <A> <B>       predict the winner of A vs B
  field <TEAM>          predict TEAM against every other team
  team <TEAM>           season summary for TEAM
  outliers              print the precomputed outlier table";

enum Command {
    Help,
    Teams,
    Predict { team_a: String, team_b: String },
    Field { team: String },
    Team { team: String },
    Outliers,
}

struct Args {
    resources: Option<PathBuf>,
    json: bool,
    command: Command,
}

fn main() -> ExitCode {
    config::load_dotenv();
    config::init_tracing();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    let cfg = match &args.resources {
        Some(dir) => AppConfig::with_resource_dir(dir),
        None => AppConfig::from_env(),
    };

    if let Command::Help = args.command {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    }
    if let Command::Outliers = args.command {
        let report = artifacts::load_outliers(&cfg)?;
        println!("{}", report.render_table());
        println!();
        println!("Chart: {}", report.outlier_visual().display());
        return Ok(ExitCode::SUCCESS);
    }

    let predictor = artifacts::load_predictor(&cfg)?;
    run_command(&predictor, &args)
}

fn run_command(predictor: &MatchupPredictor, args: &Args) -> Result<ExitCode> {
    match &args.command {
        Command::Teams => {
            for name in predictor.roster().display_names() {
                println!("{name}");
            }
        }
        Command::Predict { team_a, team_b } => match predictor.predict(team_a, team_b) {
            Ok(res) if args.json => println!("{}", serde_json::to_string_pretty(&res)?),
            Ok(res) => println!("{res}"),
            Err(err) => {
                eprintln!("{err}");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Field { team } => match predictor.predict_against_field(team) {
            Ok(rows) if args.json => println!("{}", serde_json::to_string_pretty(&rows)?),
            Ok(rows) => {
                let width = rows.iter().map(|r| r.team_b.len()).max().unwrap_or(0);
                for row in rows {
                    println!(
                        "{:<width$}  {:>6.2}%  {}",
                        row.team_b,
                        row.prob_a * 100.0,
                        if row.winner == row.team_a { "W" } else { "L" }
                    );
                }
            }
            Err(err) => {
                eprintln!("{err}");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Team { team } => match predictor.team_summary(team) {
            Ok(s) => {
                println!("{team} ({})", s.team);
                println!("Seasons: {} ({}-{})", s.seasons, s.first_year, s.last_year);
                println!("Leagues: {}", s.leagues.join(", "));
                println!("Mean win pct: {:.3}", s.mean_win_pct);
            }
            Err(err) => {
                eprintln!("{err}");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Help | Command::Outliers => {}
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_args(raw: Vec<String>) -> Result<Args> {
    let mut resources = None;
    let mut json = false;
    let mut help = false;
    let mut positional = Vec::new();

    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        if let Some(dir) = arg.strip_prefix("--resources=") {
            resources = Some(PathBuf::from(dir.trim()));
        } else if arg == "--resources" {
            let dir = iter.next().ok_or_else(|| anyhow!("--resources needs a directory"))?;
            resources = Some(PathBuf::from(dir.trim()));
        } else if arg == "--json" {
            json = true;
        } else if arg == "-h" || arg == "--help" {
            help = true;
        } else {
            positional.push(arg);
        }
    }

    if help {
        return Ok(Args {
            resources,
            json,
            command: Command::Help,
        });
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("teams") => Command::Teams,
        Some("outliers") => Command::Outliers,
        Some("predict") => Command::Predict {
            team_a: positional.next().unwrap_or_default(),
            team_b: positional.next().unwrap_or_default(),
        },
        Some("field") => Command::Field {
            team: positional.next().unwrap_or_default(),
        },
        Some("team") => Command::Team {
            team: positional.next().unwrap_or_default(),
        },
        Some(other) => return Err(anyhow!("unknown command `{other}`\n\n{USAGE}")),
        None => return Err(anyhow!("{USAGE}")),
    };

    Ok(Args {
        resources,
        json,
        command,
    })
}
