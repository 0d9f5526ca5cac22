use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use rundeck_client::RundeckClient;
use rundeck_parse::{catalog, parse_with, Schema, Value};

#[derive(Debug, Parser)]
#[command(
    name = "rundeck-xml",
    version,
    about = "Inspect Rundeck XML API responses as JSON"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a saved response document and print it as JSON
    Parse {
        /// Input file (defaults to stdin)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,
        /// Parse table to evaluate against (defaults to the root table)
        #[arg(short, long, value_enum, default_value = "response")]
        schema: Table,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Query a live server and print the response as JSON
    Fetch {
        /// Server root URL, e.g. https://rundeck.example.org
        #[arg(long)]
        url: String,
        /// API token
        #[arg(long)]
        token: String,
        /// Endpoint to call
        #[arg(value_enum)]
        endpoint: Endpoint,
        /// Project name, for endpoints that take one
        #[arg(long)]
        project: Option<String>,
        /// Execution or job id, for endpoints that take one
        #[arg(long)]
        id: Option<String>,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Table {
    Response,
    Result,
    Joblist,
    Jobs,
    Executions,
    Execution,
    SystemInfo,
    DeleteJobs,
}

impl Table {
    fn schema(self) -> &'static Schema {
        let catalog = catalog();
        match self {
            Self::Response => &catalog.response,
            Self::Result => &catalog.result,
            Self::Joblist => &catalog.joblist,
            Self::Jobs => &catalog.jobs,
            Self::Executions => &catalog.executions,
            Self::Execution => &catalog.execution,
            Self::SystemInfo => &catalog.system_info,
            Self::DeleteJobs => &catalog.delete_jobs,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Endpoint {
    SystemInfo,
    Jobs,
    Execution,
    RunningExecutions,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .without_time()
        .init();

    match Args::parse().command {
        Command::Parse {
            input,
            schema,
            output,
            compact,
        } => {
            let document = read_input(&input)?;
            let value = parse_with(&document, schema.schema())
                .context("document does not match the selected table")?;
            write_output(&output, &render(&value, compact)?)
        }
        Command::Fetch {
            url,
            token,
            endpoint,
            project,
            id,
            compact,
        } => {
            let client = RundeckClient::new(url, token)?;
            let value = call(&client, endpoint, project.as_deref(), id.as_deref())?;
            write_output(&None, &render(&value, compact)?)
        }
    }
}

fn call(
    client: &RundeckClient,
    endpoint: Endpoint,
    project: Option<&str>,
    id: Option<&str>,
) -> Result<Value> {
    let value = match endpoint {
        Endpoint::SystemInfo => client.system_info()?,
        Endpoint::Jobs => {
            let Some(project) = project else {
                bail!("the jobs endpoint requires --project");
            };
            client.list_jobs(project)?
        }
        Endpoint::Execution => {
            let Some(id) = id else {
                bail!("the execution endpoint requires --id");
            };
            client.execution(id)?
        }
        Endpoint::RunningExecutions => {
            let Some(project) = project else {
                bail!("the running-executions endpoint requires --project");
            };
            client.running_executions(project)?
        }
    };
    Ok(value)
}

fn render(value: &Value, compact: bool) -> Result<String> {
    let mut rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    rendered.push('\n');
    Ok(rendered)
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(data.as_bytes())
                .context("failed to write stdout")?;
            Ok(())
        }
    }
}
