mod commands;
mod settings;
mod version;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::{execute, parse_participant, parse_work_type, LedgerCommand};
use eureka_ledger::Ledger;
use eureka_storage::{load_ledger, save_ledger, SledStorage, Storage};
use eureka_types::{DiscoveryId, SessionId};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use settings::{apply_overrides, AppConfig};
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use version::{git_commit_hash, EUREKA_VERSION};

fn participant_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("ADDRESS")
        .required(true)
        .help(help)
}

fn work_proof_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("complexity")
                .long("complexity")
                .value_parser(value_parser!(u8))
                .default_value("0")
                .help("Complexity score (0-100)"),
        )
        .arg(
            Arg::new("tier")
                .long("tier")
                .value_parser(value_parser!(u8))
                .default_value("0")
                .help("Significance tier (0-10)"),
        )
}

fn cli() -> Command {
    Command::new("eureka-node")
        .version(EUREKA_VERSION)
        .about("Eureka discovery-mining ledger node")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Data directory")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("Override the log level")
                .global(true),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .value_parser(["pretty", "json"])
                .help("Select log output format")
                .global(true),
        )
        .arg(
            Arg::new("metrics")
                .long("metrics")
                .action(ArgAction::SetTrue)
                .help("Print Prometheus metrics after the command")
                .global(true),
        )
        .subcommand(Command::new("version").about("Print version information"))
        .subcommand(Command::new("status").about("Show supply, pools and security state"))
        .subcommand(
            Command::new("start-session")
                .about("Open a mining session")
                .arg(participant_arg("miner", "Miner address (hex or label:<name>)"))
                .arg(
                    Arg::new("work-type")
                        .long("work-type")
                        .required(true)
                        .help("Work type code or name"),
                )
                .arg(
                    Arg::new("difficulty")
                        .long("difficulty")
                        .value_parser(value_parser!(u8))
                        .required(true)
                        .help("Difficulty (1-50)"),
                ),
        )
        .subcommand(work_proof_args(
            Command::new("submit-proof")
                .about("Submit a proof of work for an active session")
                .arg(participant_arg("miner", "Session owner"))
                .arg(
                    Arg::new("session")
                        .long("session")
                        .value_parser(value_parser!(u64))
                        .required(true),
                )
                .arg(
                    Arg::new("nonce")
                        .long("nonce")
                        .value_parser(value_parser!(u32))
                        .help("Nonce; searched for when omitted"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .value_parser(value_parser!(u128))
                        .requires("nonce")
                        .help("Target hash; defaults to the nonce's digest"),
                )
                .arg(
                    Arg::new("max-nonce")
                        .long("max-nonce")
                        .value_parser(value_parser!(u32))
                        .default_value("10000000")
                        .help("Search bound when no nonce is given"),
                ),
        ))
        .subcommand(work_proof_args(
            Command::new("submit-discovery")
                .about("Register a discovery without a mining session")
                .arg(participant_arg("researcher", "Researcher address"))
                .arg(
                    Arg::new("work-type")
                        .long("work-type")
                        .required(true)
                        .help("Work type code or name"),
                ),
        ))
        .subcommand(
            Command::new("pause")
                .about("Emergency pause (operator only)")
                .arg(participant_arg("caller", "Operator address")),
        )
        .subcommand(
            Command::new("unpause")
                .about("Lift the emergency pause (operator only)")
                .arg(participant_arg("caller", "Operator address")),
        )
        .subcommand(
            Command::new("health")
                .about("Update the network health score (operator only)")
                .arg(participant_arg("caller", "Operator address"))
                .arg(
                    Arg::new("score")
                        .long("score")
                        .value_parser(value_parser!(u16))
                        .required(true)
                        .help("Health score (0-100)"),
                ),
        )
        .subcommand(
            Command::new("register-validator")
                .about("Stake and register a validator")
                .arg(participant_arg("address", "Validator address"))
                .arg(
                    Arg::new("stake")
                        .long("stake")
                        .value_parser(value_parser!(u128))
                        .required(true)
                        .help("Stake in µEKA"),
                ),
        )
        .subcommand(
            Command::new("deactivate-validator")
                .about("Deactivate a validator and return its stake")
                .arg(participant_arg("caller", "Must be the validator itself"))
                .arg(participant_arg("address", "Validator address")),
        )
        .subcommand(
            Command::new("transfer")
                .about("Transfer between participants")
                .arg(participant_arg("from", "Sender"))
                .arg(participant_arg("to", "Recipient"))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .value_parser(value_parser!(u128))
                        .required(true)
                        .help("Amount in µEKA, fee included"),
                ),
        )
        .subcommand(
            Command::new("session").about("Show a session").arg(
                Arg::new("id")
                    .value_parser(value_parser!(u64))
                    .required(true),
            ),
        )
        .subcommand(
            Command::new("discovery").about("Show a discovery").arg(
                Arg::new("id")
                    .value_parser(value_parser!(u64))
                    .required(true),
            ),
        )
        .subcommand(
            Command::new("discoveries")
                .about("List discoveries by id")
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .value_parser(value_parser!(usize))
                        .default_value("0"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .default_value("20"),
                ),
        )
        .subcommand(
            Command::new("balance")
                .about("Show a participant's balance, sessions and validator rewards")
                .arg(participant_arg("address", "Participant address")),
        )
        .subcommand(Command::new("validators").about("List registered validators"))
        .subcommand(
            Command::new("curve")
                .about("Sample the emission curve at the current research value")
                .arg(
                    Arg::new("start")
                        .long("start")
                        .value_parser(value_parser!(u64))
                        .default_value("0"),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .value_parser(value_parser!(u64))
                        .default_value("1000000"),
                )
                .arg(
                    Arg::new("step")
                        .long("step")
                        .value_parser(value_parser!(u64))
                        .default_value("100000"),
                ),
        )
}

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, name: &str) -> Result<T> {
    matches
        .get_one::<T>(name)
        .cloned()
        .with_context(|| format!("--{name} is required"))
}

fn required_str<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("--{name} is required"))
}

fn parse_command(name: &str, matches: &ArgMatches) -> Result<LedgerCommand> {
    let address = |arg: &str| -> Result<_> { parse_participant(required_str(matches, arg)?) };
    let command = match name {
        "status" => LedgerCommand::Status,
        "start-session" => LedgerCommand::StartSession {
            miner: address("miner")?,
            work_type: parse_work_type(required_str(matches, "work-type")?)?,
            difficulty: required(matches, "difficulty")?,
        },
        "submit-proof" => LedgerCommand::SubmitProof {
            miner: address("miner")?,
            session: SessionId(required(matches, "session")?),
            nonce: matches.get_one::<u32>("nonce").copied(),
            target: matches.get_one::<u128>("target").copied(),
            complexity: required(matches, "complexity")?,
            tier: required(matches, "tier")?,
            max_nonce: required(matches, "max-nonce")?,
        },
        "submit-discovery" => LedgerCommand::SubmitDiscovery {
            researcher: address("researcher")?,
            work_type: parse_work_type(required_str(matches, "work-type")?)?,
            complexity: required(matches, "complexity")?,
            tier: required(matches, "tier")?,
        },
        "pause" => LedgerCommand::Pause {
            caller: address("caller")?,
        },
        "unpause" => LedgerCommand::Unpause {
            caller: address("caller")?,
        },
        "health" => LedgerCommand::Health {
            caller: address("caller")?,
            score: required(matches, "score")?,
        },
        "register-validator" => LedgerCommand::RegisterValidator {
            address: address("address")?,
            stake: required(matches, "stake")?,
        },
        "deactivate-validator" => LedgerCommand::DeactivateValidator {
            caller: address("caller")?,
            address: address("address")?,
        },
        "transfer" => LedgerCommand::Transfer {
            from: address("from")?,
            to: address("to")?,
            amount: required(matches, "amount")?,
        },
        "session" => LedgerCommand::Session {
            id: SessionId(required(matches, "id")?),
        },
        "discovery" => LedgerCommand::Discovery {
            id: DiscoveryId(required(matches, "id")?),
        },
        "discoveries" => LedgerCommand::Discoveries {
            offset: required(matches, "offset")?,
            limit: required(matches, "limit")?,
        },
        "balance" => LedgerCommand::Balance {
            address: address("address")?,
        },
        "validators" => LedgerCommand::Validators,
        "curve" => LedgerCommand::Curve {
            start: required(matches, "start")?,
            end: required(matches, "end")?,
            step: required(matches, "step")?,
        },
        other => anyhow::bail!("Unsupported command {other}"),
    };
    Ok(command)
}

fn load_config_with_overrides(matches: &ArgMatches) -> Result<AppConfig> {
    let config_path = matches
        .get_one::<String>("config")
        .map(|value| value.as_str());
    let mut config = AppConfig::load(config_path)?;
    apply_overrides(matches, &mut config);
    config.validate()?;
    Ok(config)
}

/// Load the persisted ledger, or create genesis state on first run.
fn open_ledger(storage: &dyn Storage, config: &AppConfig) -> Result<Ledger> {
    match load_ledger(storage, config.ledger.clone()).context("failed to load ledger")? {
        Some(ledger) => Ok(ledger),
        None => {
            let ledger = Ledger::new(config.ledger.clone()).context("failed to build genesis")?;
            save_ledger(storage, &ledger).context("failed to persist genesis")?;
            info!(
                "Initialized genesis ledger with supply {}",
                ledger.global_state().total_supply
            );
            Ok(ledger)
        }
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let (name, sub_matches) = matches
        .subcommand()
        .context("a subcommand is required")?;

    if name == "version" {
        println!("Eureka {} (commit {})", EUREKA_VERSION, git_commit_hash());
        return Ok(());
    }

    let config = load_config_with_overrides(&matches)?;
    init_logging(&config)?;
    let metrics_handle = init_metrics(&config);

    let command = parse_command(name, sub_matches)?;

    fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("failed to create data directory {}", config.data_dir.display())
    })?;
    let storage = SledStorage::new(config.db_path()).with_context(|| {
        format!("failed to open database at {}", config.db_path().display())
    })?;
    let mut ledger = open_ledger(&storage, &config)?;

    let output = execute(&mut ledger, &command)?;
    if command.mutates() {
        save_ledger(&storage, &ledger).context("failed to persist ledger")?;
    }
    storage.flush().context("failed to flush database")?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    if let Some(handle) = metrics_handle {
        println!("{}", handle.render());
    }
    Ok(())
}

fn init_metrics(config: &AppConfig) -> Option<PrometheusHandle> {
    if !config.prometheus_enabled {
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe_counter!(
                "eureka_ledger_operations_total",
                "Accepted ledger operations by kind"
            );
            describe_counter!(
                "eureka_ledger_rejected_total",
                "Rejected ledger operations by kind"
            );
            describe_counter!("eureka_ledger_proofs_accepted_total", "Accepted proofs of work");
            describe_counter!("eureka_ledger_proofs_rejected_total", "Rejected proofs of work");
            describe_counter!("eureka_ledger_burned_micro_total", "µEKA burned by discoveries");
            describe_gauge!("eureka_ledger_block_height", "Current ledger block height");
            describe_gauge!("eureka_ledger_network_health", "Network health score (0-100)");
            Some(handle)
        }
        Err(err) => {
            warn!("Failed to install Prometheus metrics recorder: {}", err);
            None
        }
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
