use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use repostat_git::RepoHandle;
use repostat_pool::{PoolSlot, StatusRequest};
use repostat_stage::StagingController;
use repostat_status::{CancelSignal, StatusResolver};
use repostat_types::{RepoStatus, TargetKind};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cli::*;
use crate::settings::Settings;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "loaded settings");
    let format = cli.format;

    match cli.command {
        Command::Status(args) => cmd_status(args, &settings, format).await,
        Command::Scan(args) => cmd_scan(args, &settings, format).await,
        Command::CanStage(args) => cmd_can_stage(args, format),
        Command::Stage(args) => {
            StagingController::new().stage_file(&args.path)?;
            println!("  {} {}", "staged:".green(), args.path.display());
            Ok(())
        }
        Command::Unstage(args) => {
            StagingController::new().unstage_file(&args.path)?;
            println!("  {} {}", "unstaged:".yellow(), args.path.display());
            Ok(())
        }
        Command::StageDir(args) => {
            StagingController::new().stage_directory(&args.path, args.recursive)?;
            let mode = if args.recursive { " (recursive)" } else { "" };
            println!("  {} {}{}", "staged:".green(), args.path.display(), mode.dimmed());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------
// Status
// ---------------------------------------------------------------

async fn cmd_status(args: StatusArgs, settings: &Settings, format: OutputFormat) -> anyhow::Result<()> {
    let kind = if args.file {
        TargetKind::File
    } else {
        TargetKind::of(&args.path)
    };

    let status = match RepoHandle::discover(&args.path) {
        Ok(repo) => {
            let resolver = StatusResolver::new(settings.resolver.clone());
            let cancel = CancelSignal::new();
            cancel_on_interrupt(&cancel);
            resolver.resolve(&repo, &args.path, kind, &cancel).await
        }
        Err(e) => {
            debug!(path = %args.path.display(), error = %e, "no repository");
            None
        }
    };

    print_result(&args.path, status.as_ref(), format)
}

async fn cmd_scan(args: ScanArgs, settings: &Settings, format: OutputFormat) -> anyhow::Result<()> {
    let resolver = Arc::new(StatusResolver::new(settings.resolver.clone()));
    let slot = PoolSlot::new(resolver, settings.pool.clone());
    let pool = slot.get().await?;

    let (tx, mut rx) = mpsc::unbounded_channel::<(PathBuf, Option<RepoStatus>)>();
    let mut dropped = Vec::new();

    for path in args.paths {
        let repo = match RepoHandle::discover(&path) {
            Ok(repo) => repo,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no repository");
                print_result(&path, None, format)?;
                continue;
            }
        };
        let kind = TargetKind::of(&path);
        let tx = tx.clone();
        let reply_path = path.clone();
        let request = StatusRequest::new(repo, path.clone(), kind, move |result| {
            let _ = tx.send((reply_path, result));
        });
        if !pool.submit(request) {
            dropped.push(path);
        }
    }
    drop(tx);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some((path, status)) => print_result(&path, status.as_ref(), format)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted, cancelling outstanding queries");
                break;
            }
        }
    }
    slot.close().await;

    if !dropped.is_empty() {
        eprintln!(
            "{} {} path(s) dropped, queue full:",
            "warning:".yellow().bold(),
            dropped.len()
        );
        for path in &dropped {
            eprintln!("  {}", path.display());
        }
    }
    Ok(())
}

fn cmd_can_stage(args: PathArgs, format: OutputFormat) -> anyhow::Result<()> {
    let can_stage = StagingController::new().can_be_staged(&args.path)?;
    match format {
        OutputFormat::Json => {
            let value = json!({ "path": args.path, "can_stage": can_stage });
            println!("{}", serde_json::to_string(&value)?);
        }
        OutputFormat::Text if can_stage => {
            println!("{} {}", "yes".green().bold(), args.path.display());
        }
        OutputFormat::Text => println!("{} {}", "no".dimmed(), args.path.display()),
    }
    Ok(())
}

// ---------------------------------------------------------------
// Output
// ---------------------------------------------------------------

fn print_result(path: &Path, status: Option<&RepoStatus>, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&status_json(path, status))?),
        OutputFormat::Text => match status {
            Some(status) => println!("{}  {}", badge(status), path.display()),
            None => println!("{}  {}", "(no status)".dimmed(), path.display()),
        },
    }
    Ok(())
}

fn status_json(path: &Path, status: Option<&RepoStatus>) -> serde_json::Value {
    json!({ "path": path, "status": status })
}

fn badge(status: &RepoStatus) -> String {
    let text = status.render();
    let badge = if status.is_clean() {
        text.green()
    } else {
        text.yellow()
    }
    .bold();
    if status.is_partial() {
        format!("{} {}", badge, "(partial)".dimmed())
    } else {
        badge.to_string()
    }
}

/// Fire `cancel` on Ctrl-C.
fn cancel_on_interrupt(cancel: &CancelSignal) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
}
