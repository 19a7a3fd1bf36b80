//! # Remote session commands
//!
//! `aira system` and `aira session` talk to the registry configured through
//! `AIRA_API_URL`, `AIRA_API_TOKEN` and `AIRA_TIMEOUT_SECS`. Each invocation
//! loads the session, performs one controller operation and exits; nothing
//! is cached between runs.
//!
//! ```bash
//! aira system create --name "CV Screener" --description "Ranks applicants"
//! aira session show <system-id>
//! aira session draft <system-id> --step 5 --data step5.yaml
//! aira session submit <system-id> --step 5 --data step5.yaml
//! aira session classify <system-id> --remote --report
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use aira_classifier::ComplianceReport;
use aira_client::{AiraClient, ClientConfig, CreateSystemRequest};
use aira_core::{StepIndex, SystemId, Timestamp};
use aira_wizard::{AssessmentSession, Banner, ClassificationMode, StepController, StepOutcome};

use crate::answers::{load_answers, write_output};
use crate::assess::parse_step;

/// System subcommand arguments.
#[derive(Args, Debug)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

/// Available system subcommands.
#[derive(Subcommand, Debug)]
pub enum SystemCommand {
    /// Register a system and open its assessment at step 1.
    Create {
        /// Display name of the system.
        #[arg(long)]
        name: String,

        /// Short description.
        #[arg(long)]
        description: Option<String>,

        /// Development stage (planning, development, testing, deployed, retired).
        #[arg(long, default_value = "planning")]
        stage: String,
    },
}

/// Session subcommand arguments.
#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Available session subcommands.
#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Print the hydrated session with its banners.
    Show {
        system_id: SystemId,
    },

    /// Validate and submit one step; advances on success.
    Submit {
        system_id: SystemId,

        /// Step number (1-10).
        #[arg(long, value_parser = parse_step)]
        step: StepIndex,

        /// Step answers (JSON or YAML, `-` for stdin).
        #[arg(long)]
        data: PathBuf,
    },

    /// Save one step as a draft without validation.
    Draft {
        system_id: SystemId,

        /// Step number (1-10).
        #[arg(long, value_parser = parse_step)]
        step: StepIndex,

        /// Step answers (JSON or YAML, `-` for stdin).
        #[arg(long)]
        data: PathBuf,
    },

    /// Classify the session; steps 4 to 7 must be complete.
    Classify {
        system_id: SystemId,

        /// Let the registry classify instead of evaluating locally.
        #[arg(long)]
        remote: bool,

        /// Emit the full compliance report instead of the bare result.
        #[arg(long)]
        report: bool,

        /// Write the output here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Session as printed by `aira session show`.
#[derive(Debug, Serialize)]
struct SessionView<'a> {
    #[serde(flatten)]
    session: &'a AssessmentSession,
    banners: Vec<BannerView>,
}

#[derive(Debug, Serialize)]
struct BannerView {
    kind: Banner,
    message: &'static str,
}

/// Execute the system subcommand.
pub fn run_system(args: &SystemArgs) -> Result<u8> {
    let client = client()?;
    let runtime = runtime()?;
    match &args.command {
        SystemCommand::Create {
            name,
            description,
            stage,
        } => {
            let req = CreateSystemRequest {
                name: name.clone(),
                description: description.clone(),
                development_stage: Some(stage.clone()),
            };
            let created = runtime.block_on(client.systems().create(&req))?;
            println!("{}", created.ai_system.id);
            Ok(0)
        }
    }
}

/// Execute the session subcommand.
pub fn run_session(args: &SessionArgs) -> Result<u8> {
    let client = client()?;
    let runtime = runtime()?;
    runtime.block_on(dispatch(client, &args.command))
}

async fn dispatch(client: AiraClient, command: &SessionCommand) -> Result<u8> {
    match command {
        SessionCommand::Show { system_id } => {
            let mut controller = StepController::new(client, ClassificationMode::Local);
            load(&mut controller, *system_id).await?;
            let banners = controller
                .banners()?
                .into_iter()
                .map(|kind| BannerView { kind, message: kind.message() })
                .collect();
            let view = SessionView {
                session: controller.session()?,
                banners,
            };
            write_output(&view, None)?;
            Ok(0)
        }
        SessionCommand::Submit {
            system_id,
            step,
            data,
        } => {
            let raw = load_answers(data)?;
            let mut controller = StepController::new(client, ClassificationMode::Local);
            load(&mut controller, *system_id).await?;
            match controller.go_next(*step, &raw).await? {
                StepOutcome::Advanced { current_step } => {
                    println!("step {step} saved; continue at step {current_step}");
                    Ok(0)
                }
                StepOutcome::Rejected(errors) => {
                    eprintln!("step {step} was not saved:");
                    for (field, message) in &errors {
                        eprintln!("  {field}: {message}");
                    }
                    Ok(1)
                }
            }
        }
        SessionCommand::Draft {
            system_id,
            step,
            data,
        } => {
            let raw = load_answers(data)?;
            let mut controller = StepController::new(client, ClassificationMode::Local);
            load(&mut controller, *system_id).await?;
            controller.save_draft(*step, &raw).await?;
            println!("step {step} saved as draft");
            Ok(0)
        }
        SessionCommand::Classify {
            system_id,
            remote,
            report,
            out,
        } => {
            let mode = if *remote {
                ClassificationMode::Remote
            } else {
                ClassificationMode::Local
            };
            let mut controller = StepController::new(client, mode);
            load(&mut controller, *system_id).await?;
            let result = controller.request_classification(*system_id).await?.clone();
            if *report {
                let answers = &controller.session()?.answers;
                let report = ComplianceReport::build(*system_id, &result, Some(answers), Timestamp::now())?;
                write_output(&report, out.as_deref())?;
            } else {
                write_output(&result, out.as_deref())?;
            }
            Ok(0)
        }
    }
}

async fn load(controller: &mut StepController<AiraClient>, system_id: SystemId) -> Result<()> {
    controller
        .load_session(system_id)
        .await
        .with_context(|| format!("failed to load session for system {system_id}"))?;
    Ok(())
}

fn client() -> Result<AiraClient> {
    let config = ClientConfig::from_env().context("invalid registry configuration")?;
    tracing::debug!(?config, "registry client configured");
    Ok(AiraClient::new(config)?)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
