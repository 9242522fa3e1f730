use anyhow::{Context as AnyhowContext, Result};
use backlog_protocol::{
    BacklinkSyncReport, Blocker, BurndownReport, CacheClearReport, Dashboard, LinkAuditReport,
    NextIdReport, ScopeReport, ValidationReport, VelocityReport,
};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use command::{CommandAction, CommandRequest, CommandResponse, Session};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

mod command;
mod report;

#[derive(Parser)]
#[command(name = "backlog")]
#[command(about = "Validation and analytics for outline-based task backlogs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backlog root directory
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to <root>/backlog.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference day for time-windowed reports (YYYY-MM-DD, end of day)
    #[arg(long, global = true, value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one document, or every document when FILE is omitted
    Validate(ValidateArgs),

    /// Status, progress, workload, blockers, velocity and burndown
    Dashboard(OutputArgs),

    /// List items held up by unfinished dependencies
    Blocked(OutputArgs),

    /// Report file links whose target does not exist
    Links(OutputArgs),

    /// Write REFERENCED_BY back-references into artifact documents
    #[command(name = "sync-backlinks")]
    SyncBacklinks(SyncArgs),

    /// Compute the next free category, item or checkpoint id
    #[command(name = "next-id")]
    NextId(NextIdArgs),

    /// Completion velocity and trend
    Velocity(WindowArgs),

    /// Remaining effort and projected completion
    Burndown(WindowArgs),

    /// Drop the agent registry and item index caches
    #[command(name = "clear-caches")]
    ClearCaches(OutputArgs),

    /// Show the category and checkpoint enclosing a line
    Scope(ScopeArgs),

    /// Print the JSON Schema of report outputs
    Schema(SchemaArgs),

    /// Execute JSON Command API requests
    Command(CommandArgs),
}

#[derive(Args)]
struct OutputArgs {
    /// Print the JSON response instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ValidateArgs {
    /// Document to validate, relative to --root
    file: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct SyncArgs {
    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct NextIdArgs {
    /// Next category id for this prefix
    #[arg(
        long,
        conflicts_with_all = ["item", "checkpoint"],
        required_unless_present_any = ["item", "checkpoint"]
    )]
    prefix: Option<String>,

    /// Next item id
    #[arg(long, conflicts_with = "checkpoint")]
    item: bool,

    /// Next checkpoint id under this category
    #[arg(long, value_name = "CATEGORY_ID")]
    checkpoint: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct WindowArgs {
    /// Window length in days (configured default when omitted)
    #[arg(long)]
    days: Option<u32>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct ScopeArgs {
    /// Document, relative to --root
    file: String,

    /// 1-based line number
    line: usize,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct SchemaArgs {
    /// Report name (validation, dashboard, ...); all schemas when omitted
    report: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct CommandArgs {
    /// Inline JSON request or array of requests (mutually exclusive with --file)
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to file containing the JSON request
    #[arg(long)]
    file: Option<PathBuf>,

    /// Pretty-print JSON response
    #[arg(long)]
    pretty: bool,
}

fn parse_now(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))?
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| format!("invalid date {raw}"))
}

impl Commands {
    fn json_output(&self) -> bool {
        match self {
            Commands::Validate(args) => args.output.json,
            Commands::Dashboard(args)
            | Commands::Blocked(args)
            | Commands::Links(args)
            | Commands::ClearCaches(args) => args.json,
            Commands::SyncBacklinks(args) => args.output.json,
            Commands::NextId(args) => args.output.json,
            Commands::Velocity(args) | Commands::Burndown(args) => args.output.json,
            Commands::Scope(args) => args.output.json,
            Commands::Schema(args) => args.output.json,
            Commands::Command(_) => true,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep stdout clean for JSON consumers
    let quiet = cli.quiet || cli.command.json_output();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let now = cli.now.unwrap_or_else(|| chrono::Local::now().naive_local());
    let mut session = Session::new(cli.root, cli.config, now);

    let success = match cli.command {
        Commands::Validate(args) => {
            let payload = json!({ "file": args.file });
            run_action(
                &mut session,
                CommandAction::Validate,
                payload,
                &args.output,
                report::render_validation,
            )?
            .is_some_and(|report: ValidationReport| report.valid)
        }
        Commands::Dashboard(args) => run_action::<Dashboard>(
            &mut session,
            CommandAction::Dashboard,
            json!({}),
            &args,
            report::render_dashboard,
        )?
        .is_some(),
        Commands::Blocked(args) => run_action::<Vec<Blocker>>(
            &mut session,
            CommandAction::Blocked,
            json!({}),
            &args,
            |blockers| report::render_blockers(blockers),
        )?
        .is_some(),
        Commands::Links(args) => run_action::<LinkAuditReport>(
            &mut session,
            CommandAction::AuditLinks,
            json!({}),
            &args,
            report::render_link_audit,
        )?
        .is_some(),
        Commands::SyncBacklinks(args) => run_action::<BacklinkSyncReport>(
            &mut session,
            CommandAction::SyncBacklinks,
            json!({ "dry_run": args.dry_run }),
            &args.output,
            report::render_backlink_sync,
        )?
        .is_some(),
        Commands::NextId(args) => {
            let payload = json!({
                "prefix": args.prefix,
                "item": args.item,
                "checkpoint": args.checkpoint,
            });
            run_action::<NextIdReport>(
                &mut session,
                CommandAction::NextId,
                payload,
                &args.output,
                report::render_next_id,
            )?
            .is_some()
        }
        Commands::Velocity(args) => run_action::<VelocityReport>(
            &mut session,
            CommandAction::Velocity,
            json!({ "days": args.days }),
            &args.output,
            report::render_velocity,
        )?
        .is_some(),
        Commands::Burndown(args) => run_action::<BurndownReport>(
            &mut session,
            CommandAction::Burndown,
            json!({ "days": args.days }),
            &args.output,
            report::render_burndown,
        )?
        .is_some(),
        Commands::ClearCaches(args) => run_action::<CacheClearReport>(
            &mut session,
            CommandAction::ClearCaches,
            json!({}),
            &args,
            report::render_cache_clear,
        )?
        .is_some(),
        Commands::Scope(args) => run_action::<ScopeReport>(
            &mut session,
            CommandAction::Scope,
            json!({ "file": args.file, "line": args.line }),
            &args.output,
            report::render_scope,
        )?
        .is_some(),
        Commands::Schema(args) => run_action::<Value>(
            &mut session,
            CommandAction::Schema,
            json!({ "report": args.report }),
            &args.output,
            report::render_schema,
        )?
        .is_some(),
        Commands::Command(args) => run_command(args, &mut session)?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// Execute one action and print it; `None` when the response is an error
fn run_action<T: DeserializeOwned>(
    session: &mut Session,
    action: CommandAction,
    payload: Value,
    output: &OutputArgs,
    render: impl Fn(&T) -> String,
) -> Result<Option<T>> {
    let response = session.execute(CommandRequest { action, payload });

    if output.json {
        print_stdout(&serde_json::to_string_pretty(&response)?)?;
    } else if response.is_error() {
        eprintln!(
            "Error: {}",
            response.message.as_deref().unwrap_or("Unknown error")
        );
        if let Some(hint) = response.error.as_ref().and_then(|e| e.hint.as_deref()) {
            eprintln!("Hint: {hint}");
        }
    }
    if response.is_error() {
        return Ok(None);
    }

    let data: T = serde_json::from_value(response.data)
        .with_context(|| format!("Invalid {} output", action.as_str()))?;
    if !output.json {
        print_stdout(&render(&data))?;
    }
    Ok(Some(data))
}

fn run_command(args: CommandArgs, session: &mut Session) -> Result<bool> {
    let raw = read_payload(&args)?;
    let value: Value =
        serde_json::from_str(&raw).context("Invalid JSON passed to --json/--file")?;

    let (output, success) = match value {
        Value::Array(requests) => {
            let responses: Vec<CommandResponse> = requests
                .into_iter()
                .map(|request| session.execute_value(request))
                .collect();
            let success = responses.iter().all(|r| !r.is_error());
            (serde_json::to_value(&responses)?, success)
        }
        request => {
            let response = session.execute_value(request);
            let success = !response.is_error();
            (serde_json::to_value(&response)?, success)
        }
    };

    let output = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    print_stdout(&output)?;
    Ok(success)
}

fn read_payload(args: &CommandArgs) -> Result<String> {
    if let Some(raw) = &args.json {
        return Ok(raw.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read JSON from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Command request is empty. Provide --json, --file, or pipe JSON via stdin.");
    }

    Ok(buffer)
}

/// Write a line to stdout; a closed pipe (`| head`) is not an error
fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match writeln!(stdout, "{text}") {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Failed to write to stdout"),
    }
}
