//! `dts` - drive the deployment test simulation workflow from a terminal
//!
//! Settings come from `--config` (TOML) and the configuration slot lives in
//! the `--store` JSON file. Logs go to stderr, filtered by `RUST_LOG`.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use dts_core::{
    sample_records, AttachmentRequest, FileConfigStore, HistoryLedger, MemoryConfigStore, Stage,
    StaticChangeManagement, WorkflowConfig, WorkflowController, WorkflowEvent,
};
use dts_model::{ConfigType, RecordId, TestConfiguration, TrafficProfile, Zone};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_STORE: &str = "dts-config.json";

fn cli() -> Command {
    Command::new("dts")
        .version(dts_core::VERSION)
        .about("Deployment test simulation: save a configuration, run it, attach the results")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Workflow settings (TOML)"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .default_value(DEFAULT_STORE)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration slot (JSON file)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("save")
                .about("Save the test configuration, replacing any previous one")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .value_parser(value_parser!(ConfigType))
                        .help("network, firewall, sdwan, dns, identity, software or custom"),
                )
                .arg(
                    Arg::new("content")
                        .long("content")
                        .required(true)
                        .help("Configuration text, or @path to read it from a file"),
                )
                .arg(
                    Arg::new("zone")
                        .long("zone")
                        .default_value("global")
                        .value_parser(value_parser!(Zone)),
                )
                .arg(
                    Arg::new("traffic")
                        .long("traffic")
                        .default_value("normal")
                        .value_parser(value_parser!(TrafficProfile)),
                )
                .arg(
                    Arg::new("replicate")
                        .long("replicate")
                        .action(ArgAction::SetTrue)
                        .help("Mirror live zone topology and traffic into the sandbox"),
                ),
        )
        .subcommand(Command::new("show").about("Print the saved configuration as JSON"))
        .subcommand(
            Command::new("run")
                .about("Run a simulation over the saved configuration")
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducible progress"),
                ),
        )
        .subcommand(
            Command::new("scenario")
                .about("Save, run and attach in one session against an in-memory slot"),
        )
        .subcommand(
            Command::new("history")
                .about("Browse the demo history ledger")
                .arg(
                    Arg::new("delete")
                        .long("delete")
                        .value_parser(value_parser!(RecordId))
                        .help("Delete a record, then list the rest"),
                )
                .arg(
                    Arg::new("view")
                        .long("view")
                        .value_parser(value_parser!(RecordId))
                        .conflicts_with("delete")
                        .help("Show a record as a result"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn workflow_config(matches: &ArgMatches) -> Result<WorkflowConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => WorkflowConfig::load(path)
            .with_context(|| format!("loading workflow settings from {}", path.display())),
        None => Ok(WorkflowConfig::default()),
    }
}

fn store_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("store")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE))
}

fn read_content(raw: &str) -> Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}")),
        None => Ok(raw.to_string()),
    }
}

async fn save(config: WorkflowConfig, store: PathBuf, args: &ArgMatches) -> Result<()> {
    let config_type = *args
        .get_one::<ConfigType>("type")
        .context("--type is required")?;
    let content = read_content(
        args.get_one::<String>("content")
            .context("--content is required")?,
    )?;

    let configuration = TestConfiguration::new(config_type, content)
        .with_zone(args.get_one::<Zone>("zone").copied().unwrap_or_default())
        .with_traffic(
            args.get_one::<TrafficProfile>("traffic")
                .copied()
                .unwrap_or_default(),
        )
        .with_replication(args.get_flag("replicate"));

    let mut workflow = WorkflowController::open(config, Arc::new(FileConfigStore::new(&store))).await?;
    workflow.save_configuration(configuration).await?;
    println!("Saved {config_type} configuration to {}", store.display());
    Ok(())
}

async fn show(config: WorkflowConfig, store: PathBuf) -> Result<()> {
    let workflow = WorkflowController::open(config, Arc::new(FileConfigStore::new(&store))).await?;
    match workflow.configuration() {
        Some(configuration) => println!("{}", serde_json::to_string_pretty(configuration)?),
        None => println!("No configuration saved in {}", store.display()),
    }
    Ok(())
}

fn print_progress(event: &WorkflowEvent) {
    if let WorkflowEvent::Progress { percent, phase, .. } = event {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r{percent:>3}%  {:<48}", phase.label());
        let _ = out.flush();
    }
}

async fn run(mut config: WorkflowConfig, store: PathBuf, args: &ArgMatches) -> Result<()> {
    if let Some(seed) = args.get_one::<u64>("seed") {
        config.engine.seed = Some(*seed);
    }

    let mut workflow = WorkflowController::open(config, Arc::new(FileConfigStore::new(&store))).await?;
    if !workflow.can_start() {
        bail!(
            "no configuration saved in {}; run `dts save` first",
            store.display()
        );
    }

    let run_id = workflow.start_run()?;
    let outcome = workflow.run_to_completion(print_progress).await;
    println!();
    match &outcome {
        Ok(result) => tracing::info!(%run_id, risk_score = result.risk_score, "run finished"),
        Err(e) => tracing::error!(%run_id, error = %e, "run failed"),
    }
    outcome?;

    if let Some(report) = workflow.impact_report() {
        print!("{}", report.render());
    }
    Ok(())
}

async fn scenario(config: WorkflowConfig) -> Result<()> {
    let approver = config
        .approvers
        .first()
        .cloned()
        .context("approver roster is empty")?;
    let mut workflow = WorkflowController::open(config, Arc::new(MemoryConfigStore::new())).await?;

    let configuration = TestConfiguration::new(ConfigType::Network, "interface eth0\n  mtu 9000\n")
        .with_zone(Zone::Global)
        .with_traffic(TrafficProfile::Normal)
        .with_replication(false);
    workflow.save_configuration(configuration).await?;

    workflow.start_run()?;
    let result = workflow.run_to_completion(print_progress).await;
    println!();
    let result = result?;
    println!(
        "Run completed: risk score {}, {} affected services",
        result.risk_score,
        result.affected_services.len()
    );

    workflow.select_stage(Stage::Attach)?;
    let attachment = workflow
        .attach(
            AttachmentRequest::new_change("test", approver),
            &StaticChangeManagement::default(),
        )
        .await?;
    tracing::info!(attachment_id = %attachment.id(), "scenario finished");
    println!("{}", serde_json::to_string_pretty(attachment)?);
    Ok(())
}

fn history(args: &ArgMatches) -> Result<()> {
    let mut ledger = HistoryLedger::with_records(sample_records());

    if let Some(id) = args.get_one::<RecordId>("view") {
        let view = ledger.view(*id)?;
        println!(
            "{}  {}  {}  {}",
            view.record.timestamp.to_rfc3339(),
            view.record.config_type,
            view.record.user,
            view.record.status
        );
        println!(
            "Risk score: {}/100  Critical issues: {}",
            view.result.risk_score, view.result.critical_issues
        );
        for issue in &view.record.critical_issues {
            println!("  - {issue}");
        }
        return Ok(());
    }

    if let Some(id) = args.get_one::<RecordId>("delete") {
        let removed = ledger.delete(*id)?;
        println!("Deleted {}", removed.id);
    }

    for record in ledger.list() {
        println!(
            "{}  {:<20}  {:<9}  {:>3}  {:<15}  {}",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.config_type,
            record.risk_score,
            record.user,
            record.status
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = workflow_config(&matches)?;
    let store = store_path(&matches);
    tracing::debug!(store = %store.display(), operator = %config.operator, "settings loaded");
    if let Some((name, _)) = matches.subcommand() {
        tracing::info!(command = name, "dispatching");
    }

    match matches.subcommand() {
        Some(("save", args)) => save(config, store, args).await,
        Some(("show", _)) => show(config, store).await,
        Some(("run", args)) => run(config, store, args).await,
        Some(("scenario", _)) => scenario(config).await,
        Some(("history", args)) => history(args),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn save_parses_wire_names() {
        let matches = cli()
            .try_get_matches_from([
                "dts", "save", "--type", "sdwan", "--content", "x", "--zone", "eu-central",
                "--traffic", "burst-25", "--replicate",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(args.get_one::<ConfigType>("type"), Some(&ConfigType::Sdwan));
        assert_eq!(args.get_one::<Zone>("zone"), Some(&Zone::EuCentral));
        assert_eq!(
            args.get_one::<TrafficProfile>("traffic"),
            Some(&TrafficProfile::Burst25)
        );
        assert!(args.get_flag("replicate"));
    }

    #[test]
    fn unknown_config_type_is_rejected() {
        assert!(cli()
            .try_get_matches_from(["dts", "save", "--type", "router", "--content", "x"])
            .is_err());
    }

    #[test]
    fn view_and_delete_conflict() {
        let id = RecordId::new().to_string();
        assert!(cli()
            .try_get_matches_from(["dts", "history", "--view", &id, "--delete", &id])
            .is_err());
    }

    #[test]
    fn store_defaults() {
        let matches = cli().try_get_matches_from(["dts", "show"]).unwrap();
        assert_eq!(store_path(&matches), PathBuf::from(DEFAULT_STORE));
    }

    #[test]
    fn inline_content_passes_through() {
        assert_eq!(read_content("mtu 9000").unwrap(), "mtu 9000");
    }

    #[test]
    fn history_ids_resolve_across_invocations() {
        let id = sample_records()[0].id.to_string();

        let matches = cli()
            .try_get_matches_from(["dts", "history", "--view", &id])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert!(history(args).is_ok());

        let matches = cli()
            .try_get_matches_from(["dts", "history", "--delete", &id])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert!(history(args).is_ok());
    }
}
