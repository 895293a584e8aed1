//! CLI entrypoint for agentloop
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use agentloop_application::{
    ActionRunner, ApprovalGate, ApprovalNotifier, ChannelApprovalNotifier, LoopProgressNotifier,
    MemoryStore, ModelActionRunner, ModelGateway, ModelPlanner, NoApprovalNotifier,
    NoLoopProgress, NoRunLogger, PlanExecutor, RunLogger, RunLoopInput, RunLoopUseCase,
};
use agentloop_domain::{ConfigIssue, HilMode, Severity};
use agentloop_infrastructure::{
    ActionRegistry, CommandActionRunner, ConfigLoader, FileConfig, FileMemoryStore,
    InMemoryStore, JsonlRunLogger, MEMORY_ACTIONS, MemoryActionRunner, MemoryBackend,
    RUN_COMMAND, ScriptedGateway,
};
use agentloop_presentation::{
    Cli, ConsoleApprovalPrompt, ConsoleFormatter, OutputFormat, ProgressReporter,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(&cli)?;

    if cli.show_config {
        print_config_sources(&cli);
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    report_config_issues(&config.validate())?;

    let Some(goal) = cli.goal.clone() else {
        bail!("A goal is required. Run with --help for usage.");
    };

    info!("Starting agentloop");

    // === Run parameters ===
    let (strategy, _) = config.strategy.to_strategy();
    let (mut params, _) = config.to_loop_params();
    if let Some(mode) = cli.hil_mode() {
        params = params.with_hil_mode(mode);
    }
    if let Some(ms) = cli.approval_timeout_ms {
        params = params.with_approval_timeout((ms > 0).then(|| Duration::from_millis(ms)));
    }

    // One token per run: Ctrl-C cancels planning, steps and pending approvals
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling run");
                cancel.cancel();
            }
        });
    }

    // === Dependency Injection ===
    let gateway = build_gateway(&cli, &config)?;
    let memory = build_memory(&cli, &config).await?;

    let runner: Arc<dyn ActionRunner> = Arc::new(
        ActionRegistry::new()
            .register(
                [RUN_COMMAND],
                Arc::new(CommandActionRunner::new(config.actions.to_command_config())),
            )
            .register(
                MEMORY_ACTIONS.iter().copied(),
                Arc::new(MemoryActionRunner::new(memory.clone())),
            )
            .with_fallback(Arc::new(ModelActionRunner::new(gateway.clone()))),
    );

    let logger: Arc<dyn RunLogger> = match cli
        .run_log
        .clone()
        .or_else(|| config.logging.run_log.as_ref().map(PathBuf::from))
    {
        Some(path) => match JsonlRunLogger::new(&path) {
            Some(logger) => Arc::new(logger),
            None => bail!("Could not open run log {}", path.display()),
        },
        None => Arc::new(NoRunLogger),
    };

    let progress: Arc<dyn LoopProgressNotifier> = if cli.quiet {
        Arc::new(NoLoopProgress)
    } else {
        Arc::new(ProgressReporter::new())
    };

    let (notifier, approvals) = match params.hil_mode {
        HilMode::Interactive => {
            let (notifier, rx) = ChannelApprovalNotifier::new();
            (Arc::new(notifier) as Arc<dyn ApprovalNotifier>, Some(rx))
        }
        HilMode::AutoApprove | HilMode::AutoDeny => {
            (Arc::new(NoApprovalNotifier) as Arc<dyn ApprovalNotifier>, None)
        }
    };
    let gate = Arc::new(ApprovalGate::new(notifier, cancel.clone()));
    let prompt_task = approvals
        .map(|rx| ConsoleApprovalPrompt::new(gate.clone()).spawn(rx, cancel.child_token()));

    let executor = PlanExecutor::new(runner, gate.clone(), params.clone())
        .with_progress(progress.clone())
        .with_logger(logger.clone())
        .with_cancellation(cancel.clone());
    let planner = ModelPlanner::new(gateway)
        .with_attempts(params.planning_attempts)
        .with_cancellation(cancel.clone());

    let use_case = RunLoopUseCase::new(Arc::new(planner), Arc::new(executor))
        .with_memory(memory)
        .with_record_observations(params.record_observations)
        .with_progress(progress)
        .with_logger(logger)
        .with_cancellation(cancel.clone());

    let input = RunLoopInput::new(goal, strategy).with_overrides(&cli.strategy_overrides());
    let result = use_case.execute(input).await;

    // Stop the prompt task; any approval still pending resolves to denied
    gate.clear();
    if let Some(task) = prompt_task {
        task.abort();
    }

    let state = result.context("Run failed")?;

    let output = match cli.output {
        OutputFormat::Text => ConsoleFormatter::format(&state),
        OutputFormat::Json => ConsoleFormatter::format_json(&state),
    };
    println!("{}", output);

    if state.error.is_some() || !state.is_complete {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Install the tracing subscriber. `-q` keeps only errors; `-v` raises the level.
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match (cli.quiet, cli.verbose) {
        (true, 0) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .context("--log-file must name a file")?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Could not create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

fn print_config_sources(cli: &Cli) {
    println!("Configuration sources (in priority order):");
    for source in ConfigLoader::sources(cli.config.as_ref()) {
        let mark = if source.found { "FOUND" } else { "     " };
        println!("  [{}] {:<9} {}", mark, format!("{}:", source.label), source.location);
    }
    if cli.no_config {
        println!("  (--no-config: only built-in defaults are used)");
    }
}

fn report_config_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        match issue.severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => eprintln!("config error: {}", issue.message),
        }
    }
    if ConfigIssue::has_errors(issues) {
        bail!("Invalid configuration");
    }
    Ok(())
}

fn build_gateway(cli: &Cli, config: &FileConfig) -> Result<Arc<dyn ModelGateway>> {
    if let Some(path) = &cli.scripted {
        info!("Replaying model responses from {}", path.display());
        return Ok(Arc::new(ScriptedGateway::from_file(path)?));
    }
    http_gateway(config)
}

#[cfg(feature = "http-gateway")]
fn http_gateway(config: &FileConfig) -> Result<Arc<dyn ModelGateway>> {
    use agentloop_infrastructure::{HttpGatewayConfig, OpenAiCompatibleGateway};

    let api_key = config.model.api_key();
    if api_key.is_none() {
        warn!(
            "{} is not set; sending requests without an API key",
            config.model.api_key_env
        );
    }
    let gateway = OpenAiCompatibleGateway::new(HttpGatewayConfig {
        endpoint: config.model.endpoint.clone(),
        model: config.model.model.clone(),
        api_key,
        timeout: config.model.timeout(),
    })?;
    Ok(Arc::new(gateway))
}

#[cfg(not(feature = "http-gateway"))]
fn http_gateway(_config: &FileConfig) -> Result<Arc<dyn ModelGateway>> {
    bail!("Built without the http-gateway feature; use --scripted <file>")
}

async fn build_memory(cli: &Cli, config: &FileConfig) -> Result<Arc<dyn MemoryStore>> {
    let backend = match &cli.memory_file {
        Some(path) => MemoryBackend::File(path.clone()),
        None => config.memory.parse_backend().0,
    };
    let store: Arc<dyn MemoryStore> = match backend {
        MemoryBackend::InMemory => Arc::new(InMemoryStore::new()),
        MemoryBackend::File(path) => {
            info!("Using memory file {}", path.display());
            Arc::new(FileMemoryStore::open(&path).await?)
        }
        MemoryBackend::Redis {
            url,
            key_prefix,
            default_ttl,
        } => redis_memory(url, key_prefix, default_ttl).await?,
    };
    Ok(store)
}

#[cfg(feature = "redis-memory")]
async fn redis_memory(
    url: String,
    key_prefix: Option<String>,
    default_ttl: Option<Duration>,
) -> Result<Arc<dyn MemoryStore>> {
    use agentloop_infrastructure::{RedisMemoryConfig, RedisMemoryStore};

    let mut config = RedisMemoryConfig::new(url);
    if let Some(prefix) = key_prefix {
        config = config.with_key_prefix(prefix);
    }
    if let Some(ttl) = default_ttl {
        config = config.with_default_ttl(ttl);
    }
    info!("Using Redis memory store with prefix {}", config.key_prefix);
    Ok(Arc::new(RedisMemoryStore::connect(config).await?))
}

#[cfg(not(feature = "redis-memory"))]
async fn redis_memory(
    _url: String,
    _key_prefix: Option<String>,
    _default_ttl: Option<Duration>,
) -> Result<Arc<dyn MemoryStore>> {
    bail!("Built without the redis-memory feature; use backend = \"memory\" or \"file\"")
}
