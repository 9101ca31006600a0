//! workorders CLI — line-oriented front end to an in-memory work order queue.

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use workorders::Repository;
use workorders::config::Config;
use workorders::model::{WorkItem, classify, parse_id};
use workorders::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "workorders", about = "Rank-ordered work order queue")]
struct Cli {
    /// Render results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read queue commands from stdin until EOF or Ctrl-C
    Serve,
    /// Print the tier a work order id falls into
    Classify {
        /// Work order id
        id: String,
    },
}

/// One line of input to `serve`.
#[derive(Debug)]
enum Request {
    Add { id: String, arrival: String },
    Next,
    List,
    Delete { id: String },
    Position { id: String },
    Mean { reference: String },
    Help,
    Quit,
}

impl Request {
    fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let request = match words.as_slice() {
            [] => return Ok(None),
            ["add", id, arrival] => Request::Add {
                id: id.to_string(),
                arrival: arrival.to_string(),
            },
            ["next"] => Request::Next,
            ["list"] => Request::List,
            ["delete", id] => Request::Delete { id: id.to_string() },
            ["position", id] => Request::Position { id: id.to_string() },
            ["mean", reference] => Request::Mean {
                reference: reference.to_string(),
            },
            ["help"] => Request::Help,
            ["quit"] | ["exit"] => Request::Quit,
            [cmd, ..] => anyhow::bail!("unrecognised command '{cmd}' (try 'help')"),
        };
        Ok(Some(request))
    }
}

const HELP: &str = "\
commands:
  add <id> <YYYY-MM-DDTHH:mm:ssZ>   queue a work order
  next                              dequeue the top work order (-1 if empty)
  list                              ids in queue order
  delete <id>                       remove a work order
  position <id>                     zero-based queue position (-1 if absent)
  mean <YYYY-MM-DDTHH:mm:ssZ>       mean wait in seconds at the reference instant
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let _guard = init_telemetry(TelemetryConfig::from_config(&config))?;

    match cli.command {
        Command::Serve => cmd_serve(cli.json).await,
        Command::Classify { id } => cmd_classify(&id, cli.json),
    }
}

fn cmd_classify(raw: &str, as_json: bool) -> anyhow::Result<()> {
    let id = parse_id(raw)?;
    let tier = classify(id);
    if as_json {
        println!("{}", json!({ "id": id, "tier": tier }));
    } else {
        println!("{tier}");
    }
    Ok(())
}

async fn cmd_serve(as_json: bool) -> anyhow::Result<()> {
    let repository = Repository::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!("work order queue ready, reading commands from stdin");

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        let request = match Request::parse(&line) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                report_error(&e, as_json);
                continue;
            }
        };
        if matches!(request, Request::Quit) {
            break;
        }
        if let Err(e) = handle(&repository, request, as_json) {
            report_error(&e, as_json);
        }
    }

    info!(remaining = repository.len(), "work order queue stopped");
    Ok(())
}

fn handle(repository: &Repository, request: Request, as_json: bool) -> anyhow::Result<()> {
    match request {
        Request::Add { id, arrival } => {
            let item = repository.add(&id, &arrival)?;
            print_item(&item, as_json)?;
        }
        Request::Next => match repository.pop_next() {
            Some(item) => print_item(&item, as_json)?,
            None => println!("-1"),
        },
        Request::List => {
            let ids = repository.list_ids();
            if as_json {
                println!("{}", serde_json::to_string(&ids)?);
            } else {
                let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
                println!("[{}]", rendered.join(", "));
            }
        }
        Request::Delete { id } => {
            let id = parse_id(&id)?;
            match repository.delete(id) {
                Some(item) => print_item(&item, as_json)?,
                None => anyhow::bail!("the work id {id} does not exist in the queue"),
            }
        }
        Request::Position { id } => {
            let id = parse_id(&id)?;
            let position = repository
                .position_of(id)
                .map_or(-1, |p| i64::try_from(p).unwrap_or(i64::MAX));
            println!("{position}");
        }
        Request::Mean { reference } => {
            let mean = repository.mean_wait_time(&reference)?;
            if as_json {
                println!("{}", json!({ "mean_wait_seconds": mean }));
            } else {
                println!("{mean}");
            }
        }
        Request::Help => println!("{HELP}"),
        Request::Quit => {}
    }
    Ok(())
}

fn print_item(item: &WorkItem, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string(item)?);
    } else {
        println!("{}\t{}\t{}", item.id(), item.arrival(), item.tier());
    }
    Ok(())
}

fn report_error(e: &anyhow::Error, as_json: bool) {
    if as_json {
        println!("{}", json!({ "error": e.to_string() }));
    } else {
        println!("error: {e}");
    }
}
