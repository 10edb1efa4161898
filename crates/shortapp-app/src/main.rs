// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ShortApp — host shell CLI.
//
// Entry point. Initialises logging and app services, then runs one command
// against the bridge and launcher crates with the terminal standing in for
// the web view and the host UI.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use shortapp_bridge::handler::{HandleOutcome, HandlerContext};
use shortapp_bridge::payment::{NavigationDecision, PaymentSession};
use shortapp_bridge::sender::NativeSender;
use shortapp_core::error::{Result, ShortAppError};
use shortapp_core::human_errors::humanize_error;
use shortapp_core::types::PaymentIntent;
use shortapp_core::url::normalize_exp_url_with;
use shortapp_launcher::preflight::preflight;
use shortapp_launcher::session::{OpenRequest, PreviewSession};

use services::app_services::AppServices;
use services::terminal::{StdoutPort, TerminalDelegate};

#[derive(Debug, Parser)]
#[command(name = "shortapp", version, about = "ShortApp host shell")]
struct Cli {
    /// Data directory (defaults to $SHORTAPP_DATA_DIR, then $XDG_DATA_HOME/shortapp).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the loadable form of a manifest URL.
    Normalize { url: String },

    /// Normalize a manifest URL and check that it answers a HEAD request.
    Preflight { url: String },

    /// Open a sub-app preview through the native launcher.
    Open {
        url: String,
        #[arg(long)]
        module: Option<String>,
        /// Initial prop as key=value; repeatable.
        #[arg(long = "prop", value_parser = parse_prop)]
        props: Vec<(String, String)>,
    },

    /// Feed raw web messages to the native message handler, in order.
    Handle {
        #[arg(long)]
        project: String,
        #[arg(required = true)]
        messages: Vec<String>,
    },

    /// Walk a payment sheet through a list of navigations.
    Pay {
        url: String,
        #[arg(long)]
        success_url: Option<String>,
        #[arg(long)]
        cancel_url: Option<String>,
        #[arg(long)]
        request_id: Option<String>,
        /// URLs the checkout page navigates to.
        #[arg(long = "nav")]
        navigations: Vec<String>,
        /// Close the sheet after the navigations.
        #[arg(long, conflicts_with = "fail")]
        dismiss: bool,
        /// Fail the page load with this description after the navigations.
        #[arg(long)]
        fail: Option<String>,
    },

    /// Show the effective configuration.
    Config {
        /// Write it to config.json in the data directory.
        #[arg(long)]
        write: bool,
    },
}

fn parse_prop(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(
        bridge = shortapp_bridge::platform_bridge().platform_name(),
        "ShortApp starting"
    );

    let svc = match AppServices::init(cli.data_dir).await {
        Ok(svc) => svc,
        Err(e) => {
            tracing::error!(error = %e, "persistent storage failed, using in-memory fallback");
            AppServices::fallback()
        }
    };

    match run(&svc, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let human = humanize_error(&e);
            tracing::debug!(error = %e, severity = ?human.severity, "command failed");
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(svc: &AppServices, command: Command) -> Result<()> {
    match command {
        Command::Normalize { url } => {
            println!("{}", normalize(svc, &url)?);
            Ok(())
        }
        Command::Preflight { url } => {
            let url = normalize(svc, &url)?;
            preflight(&svc.manifest_probe()?, &url).await?;
            println!("reachable: {url}");
            Ok(())
        }
        Command::Open { url, module, props } => open(svc, url, module, props).await,
        Command::Handle { project, messages } => handle(svc, &project, &messages).await,
        Command::Pay {
            url,
            success_url,
            cancel_url,
            request_id,
            navigations,
            dismiss,
            fail,
        } => {
            let intent = PaymentIntent {
                url,
                success_url: success_url.filter(|s| !s.is_empty()),
                cancel_url: cancel_url.filter(|s| !s.is_empty()),
                request_id: request_id
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(PaymentIntent::generate_request_id),
            };
            pay(intent, &navigations, dismiss, fail.as_deref());
            Ok(())
        }
        Command::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&svc.config)?);
            if write {
                let path = svc.save_config()?;
                println!("saved to {}", path.display());
            }
            Ok(())
        }
    }
}

fn normalize(svc: &AppServices, url: &str) -> Result<String> {
    normalize_exp_url_with(url, svc.config.trusted_https_hosts.as_slice())
}

async fn open(
    svc: &AppServices,
    url: String,
    module: Option<String>,
    props: Vec<(String, String)>,
) -> Result<()> {
    // No native launcher module exists outside the mobile hosts.
    let launcher = Arc::new(svc.launcher(None)?);
    let request = OpenRequest {
        manifest_url: url,
        module_name: module.unwrap_or_else(|| svc.config.default_module_name.clone()),
        initial_props: props
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect::<Map<String, Value>>(),
    };
    let session = PreviewSession::new(launcher, request);
    session.load().await?;
    println!("opened {}", session.request().manifest_url);
    Ok(())
}

async fn handle(svc: &AppServices, project: &str, messages: &[String]) -> Result<()> {
    if project.trim().is_empty() {
        return Err(ShortAppError::MissingParameter("projectId"));
    }
    let handler = svc.message_handler();
    let sender = NativeSender::attached(Arc::new(StdoutPort));
    let delegate = TerminalDelegate::new(svc.bridge.clone());
    let ctx = HandlerContext {
        project_id: project,
        sender: &sender,
        delegate: &delegate,
    };

    for raw in messages {
        let outcome = handler.handle(raw, &ctx).await;
        match outcome {
            HandleOutcome::Responded => println!("handled"),
            HandleOutcome::FirstContactRecorded => {
                println!("first request for {project}: recorded, no reply")
            }
            HandleOutcome::NotHandled => println!("not handled: {raw}"),
        }
        if let Some(intent) = delegate.take_payment() {
            println!("payment {} waiting for `shortapp pay`", intent.request_id);
        }
    }
    Ok(())
}

fn pay(intent: PaymentIntent, navigations: &[String], dismiss: bool, fail: Option<&str>) {
    let sender = NativeSender::attached(Arc::new(StdoutPort));
    let mut session = PaymentSession::new(intent);

    for url in navigations {
        match session.on_navigation(url) {
            NavigationDecision::Allow => println!("allow {url}"),
            NavigationDecision::Intercept(outcome) => {
                println!("intercept {url}");
                outcome.relay(&sender);
            }
        }
    }

    let closing = if dismiss {
        session.dismiss()
    } else if let Some(description) = fail {
        session.fail(Some(description))
    } else {
        None
    };
    if let Some(outcome) = closing {
        outcome.relay(&sender);
    }

    if !session.is_finished() {
        println!("payment {} still open", session.intent().request_id);
    }
}
