mod client;
mod config;
mod dispatch;
mod error;
mod filter;
mod handler;
mod registry;
mod render;

use crate::client::{Credentials, NrcClient};
use crate::config::Config;
use crate::dispatch::{Invocation, dispatch};
use crate::render::{OutputMode, RenderOpts, render_endpoints, render_fields};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "\
Examples:
  Show all valid endpoints:
    nrcq -L

  List all nagios options for the servicesets table:
    nrcq -l servicesets

  Show all hosts:
    nrcq http://server/rest show/hosts

  Show a subset of hosts using a simple regular expression:
    nrcq http://server/rest show/hosts -f \"name:host2\"

  Show a subset of services using a more complex regular expression:
    nrcq http://server/rest show/services -f \"name:\\bhost2\\b|web,svcdesc:(?i)swap\"

  Add a new host:
    nrcq http://server/rest add/hosts \\
      -d name:server1 \\
      -d alias:server1 \\
      -d ipaddress:server1.there.gq \\
      -d template:hsttmpl-local \\
      -d servicesets:example-lin

  Delete a host and all of its services:
    nrcq http://server/rest delete/services -d name:server1 -d \"svcdesc:.*\"
    nrcq http://server/rest delete/hosts -d name:server1";

#[derive(Parser)]
#[command(
    name = "nrcq",
    about = "NagRestConf query utility",
    disable_version_flag = true,
    after_help = EXAMPLES
)]
struct Cli {
    #[arg(value_name = "URL", help = "Base URL of the REST service, e.g. http://server/rest")]
    url: Option<String>,

    #[arg(value_name = "ENDPOINT", help = "Endpoint to call, e.g. show/hosts (see -L)")]
    endpoint: Option<String>,

    #[arg(
        short = 'F',
        long,
        value_name = "FOLDER",
        help = "The system folder to query [default: local]"
    )]
    folder: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_name = "OPTION:REGEX[,OPTION:REGEX]...",
        help = "Client side regex filter"
    )]
    filter: Option<String>,

    #[arg(
        short = 'd',
        long = "data",
        value_name = "OPTION:VALUE",
        help = "Extra data to send; may be repeated. Do not urlencode it yourself"
    )]
    data: Vec<String>,

    #[arg(
        short = 'l',
        long,
        value_name = "TABLE",
        help = "List all options for TABLE; required ones are preceded by '*'"
    )]
    list: Option<String>,

    #[arg(short = 'L', long, help = "List all endpoints/tables")]
    listendpoints: bool,

    #[arg(short = 'j', long, help = "Output in JSON format")]
    json: bool,

    #[arg(short = 'p', long, help = "Remove spaces and newlines from JSON output")]
    pack: bool,

    #[arg(short = 'c', long, help = "Also show fields with empty values")]
    complete: bool,

    #[arg(
        short = 'e',
        long,
        help = "URL-encode data values (always on with --json)"
    )]
    encode: bool,

    #[arg(short = 'U', long, env = "NRCQ_USERNAME", help = "Username for Basic Auth")]
    username: Option<String>,

    #[arg(
        short = 'P',
        long,
        env = "NRCQ_PASSWORD",
        hide_env_values = true,
        help = "Password for Basic Auth"
    )]
    password: Option<String>,

    #[arg(short = 'v', long, help = "Show the version of this program")]
    version: bool,

    #[arg(long, help = "Log debug information to stderr")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "nrcq=debug" } else { "nrcq=warn" };
    let filter = EnvFilter::try_from_env("NRCQ_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.version {
        println!("Nrcq version is {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let render = RenderOpts {
        mode: if cli.json {
            OutputMode::Json
        } else {
            OutputMode::Plain
        },
        complete: cli.complete,
        packed: cli.pack,
    };

    if let Some(table) = &cli.list {
        let (fields, required) = registry::known_fields(table)?;
        println!("{}", render_fields(&fields, &required, &render));
        return Ok(ExitCode::SUCCESS);
    }

    if cli.listendpoints {
        println!("{}", render_endpoints(&registry::endpoints(), &render));
        return Ok(ExitCode::SUCCESS);
    }

    let (Some(url), Some(endpoint)) = (cli.url, cli.endpoint) else {
        eprintln!("ERROR: 2 non-option arguments expected.");
        eprintln!();
        eprintln!("{}", Cli::command().render_usage());
        return Ok(ExitCode::FAILURE);
    };

    let cwd = std::env::current_dir().context("reading current directory")?;
    let effective = config::resolve(
        &cwd,
        Config {
            username: cli.username,
            password: cli.password,
            folder: cli.folder,
            ..Config::default()
        },
    )?;

    let client = NrcClient::new(
        Credentials {
            username: effective.username,
            password: effective.password,
        },
        effective.timeout,
        effective.insecure,
    )?;

    let invocation = Invocation {
        base_url: url,
        endpoint,
        folder: effective.folder,
        filter: cli.filter.unwrap_or_default(),
        data: cli.data,
        render,
        encode: cli.encode || cli.json,
    };

    let output = dispatch(&invocation, &client)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(ExitCode::SUCCESS)
}
