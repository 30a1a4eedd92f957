#[macro_use]
extern crate tracing;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fritz_switch::config::DEFAULT_HOST;
use fritz_switch::{ClientConfig, Credentials, FileSessionStore, FritzClient, SwitchAction};
use tracing_subscriber::prelude::*;

mod list;
mod switch;
mod watch;

#[derive(Parser)]
#[clap(name = "fritzswitch", version, about = "Lists and switches FRITZ!DECT outlets")]
struct Args {
    #[clap(short, long, action)]
    verbose: bool,
    #[clap(long, env = "FRITZ_HOST", default_value = DEFAULT_HOST)]
    host: String,
    #[clap(long, env = "FRITZ_USER")]
    user: String,
    #[clap(long, env = "FRITZ_PASSWORD", hide_env_values = true)]
    password: String,
    #[clap(long, value_parser = parse_interval, help = "request timeout, e.g. 10s")]
    timeout: Option<Duration>,
    #[clap(long, help = "yaml file to keep the session between runs")]
    session_file: Option<PathBuf>,
    #[clap(long, action, conflicts_with = "session_file")]
    no_session_file: bool,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Logs in and prints the session state.
    Login,
    /// Lists all switchable devices.
    List {
        #[clap(long, action)]
        capabilities: bool,
    },
    /// Turns an outlet on or off.
    Switch {
        #[clap(short, long, help = "the AIN of the outlet")]
        device: String,
        #[clap(flatten)]
        action: SwitchArgs,
    },
    /// Polls the device list and prints it whenever it changes.
    Watch {
        #[clap(short, long, default_value = "30s", value_parser = parse_interval)]
        interval: Duration,
        #[clap(long, action)]
        capabilities: bool,
    },
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct SwitchArgs {
    #[clap(long, action)]
    toggle: bool,
    #[clap(long, action)]
    on: bool,
    #[clap(long, action)]
    off: bool,
}

impl From<&SwitchArgs> for SwitchAction {
    fn from(args: &SwitchArgs) -> Self {
        if args.on {
            SwitchAction::On
        } else if args.off {
            SwitchAction::Off
        } else {
            SwitchAction::Toggle
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        "info,fritz_switch=trace,reqwest=debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::builder().parse_lossy(log_level))
        .with(tracing_forest::ForestLayer::default())
        .init();

    let client = client(&args)?;

    match &args.command {
        Command::Login => {
            client.login()?;
            println!("logged in to {}: {:?}", args.host, client.session_state());
            Ok(())
        }
        Command::List { capabilities } => list::list(&client, *capabilities),
        Command::Switch { device, action } => switch::switch(&client, device, action.into()),
        Command::Watch {
            interval,
            capabilities,
        } => watch::watch(&client, *interval, *capabilities),
    }
}

fn client(args: &Args) -> Result<FritzClient> {
    let mut config = ClientConfig::with_host(&args.host);
    if let Some(timeout) = args.timeout {
        config = config.timeout(timeout);
    }
    let credentials = Credentials::new(&args.user, &args.password);

    let session_file = match (&args.session_file, args.no_session_file) {
        (_, true) => None,
        (Some(path), _) => Some(path.clone()),
        (None, _) => default_session_file(),
    };

    let client = match session_file {
        Some(path) => {
            debug!("using session file {:?}", path);
            FritzClient::with_store(&config, credentials, FileSessionStore::new(path))?
        }
        None => FritzClient::new(&config, credentials)?,
    };
    Ok(client)
}

fn default_session_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "fritzswitch")
        .map(|dirs| dirs.cache_dir().join("session.yaml"))
}

fn parse_interval(arg: &str) -> Result<Duration, String> {
    parse_duration::parse(arg).map_err(|err| format!("{err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_intervals() {
        assert_eq!(parse_interval("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_interval("2min"), Ok(Duration::from_secs(120)));
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn switch_needs_exactly_one_action() {
        let base = ["fritzswitch", "--user", "u", "--password", "p", "switch", "-d", "1"];
        let args = Args::try_parse_from(base.iter().chain(&["--off"])).unwrap();
        match args.command {
            Command::Switch { device, action } => {
                assert_eq!(device, "1");
                assert_eq!(SwitchAction::from(&action), SwitchAction::Off);
            }
            _ => panic!("expected switch"),
        }
        assert!(Args::try_parse_from(base).is_err());
        assert!(Args::try_parse_from(base.iter().chain(&["--on", "--off"])).is_err());
    }
}
