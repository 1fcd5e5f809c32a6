// file: src/cli/commands.rs
// version: 2.1.0
// guid: 1f7b9c2d-48e6-4a30-b5d1-c6e0a93f8d72

//! Command implementations for the CLI

use crate::{
    config::{container::validate_hostname, AppConfig, Answers, ConfigLoader, ContainerConfig},
    host::{CommandExecutor, ContainerManager, LocalClient},
    lifecycle::{ContainerDriver, ReachabilityPoll},
    logging::{phase_span, with_operation_span},
    prompt::{parse_yes_no, AnswersPrompter, ConfigCollector, Field, Prompter, StdioPrompter},
    provision::{payload::GUEST_LOG_FILE, PayloadBuilder},
    reporter::Summary,
    utils::system::SystemUtils,
    ProvisionError, Result,
};
use chrono::Utc;
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use tracing::{debug, error, info, warn, Instrument};

/// How a `create` run ended
#[derive(Debug)]
pub enum CreateOutcome {
    Provisioned(Box<Summary>),
    /// Mutating commands were only logged
    DryRun,
    /// The operator declined the plan
    Aborted,
}

/// Switches for one `create` run
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    pub assume_yes: bool,
    pub show_progress: bool,
}

/// Create, start and provision a container on this host
pub async fn create_command(
    app: &AppConfig,
    answers: Option<&Path>,
    assume_yes: bool,
    dry_run: bool,
    json: bool,
) -> Result<CreateOutcome> {
    SystemUtils::ensure_preconditions()?;

    // With --json, stdout carries only the summary; child output joins the logs
    let client = LocalClient::new().with_stdout_to_stderr(json);
    let mut manager = ContainerManager::new(client).with_dry_run(dry_run);
    let options = CreateOptions {
        assume_yes,
        show_progress: std::io::stderr().is_terminal(),
    };

    let outcome = match answers {
        Some(path) => {
            let answers = ConfigLoader::new().load_answers(path)?;
            let mut prompter = AnswersPrompter::new(answers);
            run_create(app, &mut prompter, &mut manager, options).await?
        }
        None => {
            let mut prompter = StdioPrompter::from_terminal();
            run_create(app, &mut prompter, &mut manager, options).await?
        }
    };

    match &outcome {
        CreateOutcome::Provisioned(summary) if json => println!("{}", summary.to_json()?),
        CreateOutcome::Provisioned(summary) => summary.print(),
        CreateOutcome::DryRun => info!("Dry run complete, nothing was created"),
        CreateOutcome::Aborted => warn!("Aborted, nothing was created"),
    }

    Ok(outcome)
}

/// The create pipeline over any prompter and executor
pub async fn run_create<P, E>(
    app: &AppConfig,
    prompter: &mut P,
    manager: &mut ContainerManager<E>,
    options: CreateOptions,
) -> Result<CreateOutcome>
where
    P: Prompter + ?Sized,
    E: CommandExecutor,
{
    let started_at = Utc::now();

    let config = ConfigCollector::new(&app.defaults)
        .collect(prompter, manager)
        .instrument(phase_span("collect"))
        .await?;
    info!("Configuration collected: {:?}", config);

    write_plan(&mut io::stderr().lock(), &config, app)?;
    if !options.assume_yes && !prompter.confirm("Proceed?", true)? {
        return Ok(CreateOutcome::Aborted);
    }

    let template = manager
        .ensure_template(&app.template.storage, &app.template.pattern)
        .instrument(phase_span("template"))
        .await?;

    let payload = PayloadBuilder::new(&app.payload, &config.hostname, config.install_editor).build()?;
    let digest = payload.sha256_hex();
    info!(
        "Payload rendered: {} bytes, sha256 {}",
        payload.script().len(),
        digest
    );
    for installer in payload.unverified_installers() {
        if installer.pipes_to_shell {
            warn!(
                "Installer '{}' pipes {} into a root shell without integrity verification",
                installer.name, installer.url
            );
        } else {
            warn!(
                "Installer '{}' downloads {} without checksum verification",
                installer.name, installer.url
            );
        }
    }

    {
        let mut driver = ContainerDriver::new(manager);
        driver
            .create(&config, &template)
            .instrument(phase_span("create"))
            .await?;
        driver
            .start(config.ctid)
            .instrument(phase_span("start"))
            .await?;
    }

    if manager.is_dry_run() {
        info!(
            "DRY RUN: would wait for network, push the payload to {} and run it",
            app.payload.remote_path
        );
        return Ok(CreateOutcome::DryRun);
    }

    let poll = ReachabilityPoll::from_config(&app.network_wait).with_progress(options.show_progress);
    let attempt = ContainerDriver::new(manager)
        .wait_for_network(config.ctid, &poll, &app.network_wait.probe_target)
        .instrument(phase_span("network"))
        .await?;
    debug!("Guest answered on attempt {}", attempt);

    let script = payload.write_to_temp()?;
    manager
        .push(config.ctid, script.path(), &app.payload.remote_path, "0755")
        .await?;

    info!(
        "Running provisioning payload, guest log at {}",
        GUEST_LOG_FILE
    );
    manager
        .exec(config.ctid, &["bash", app.payload.remote_path.as_str()])
        .instrument(phase_span("provision"))
        .await?;
    info!("Provisioning finished");

    let summary = Summary::collect(manager, &config, &app.payload, &digest, started_at).await?;
    Ok(CreateOutcome::Provisioned(Box::new(summary)))
}

/// Show what is about to be created. Goes to stderr so `--json` output stays parseable.
fn write_plan<W: Write>(out: &mut W, config: &ContainerConfig, app: &AppConfig) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Plan".bold())?;
    writeln!(out, "  Container {} ({})", config.ctid, config.hostname)?;
    writeln!(
        out,
        "  {} cores, {} MB RAM, {} MB swap, {} GB disk on {}",
        config.cores, config.memory_mb, config.swap_mb, config.disk_gb, config.storage
    )?;
    writeln!(
        out,
        "  Network {} on {}, DNS {}",
        config.network.describe(),
        config.bridge,
        config.dns
    )?;
    if let Some(key) = &config.ssh_key_path {
        writeln!(out, "  SSH key {}", key.display())?;
    }
    writeln!(
        out,
        "  Template matching '{}' from {}",
        app.template.pattern, app.template.storage
    )?;
    if config.install_editor {
        writeln!(out, "  Browser editor on port {}", app.payload.editor_port)?;
    }
    writeln!(out)
}

/// Render the provisioning payload without touching the host
pub async fn render_payload_command(
    app: &AppConfig,
    answers: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let answers = match answers {
        Some(path) => ConfigLoader::new().load_answers(path)?,
        None => Answers::default(),
    };

    let hostname = answers
        .get(Field::Hostname.key())
        .unwrap_or(app.defaults.hostname.as_str())
        .to_string();
    validate_hostname(&hostname)?;
    let install_editor = match answers.get(Field::InstallEditor.key()) {
        Some(raw) => parse_yes_no(raw)?,
        None => false,
    };

    let payload = with_operation_span("render", || {
        PayloadBuilder::new(&app.payload, &hostname, install_editor).build()
    })?;
    info!("Payload sha256 {}", payload.sha256_hex());

    match output {
        Some(path) => {
            tokio::fs::write(path, payload.script()).await?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
            }
            info!("Payload written to {}", path.display());
        }
        None => print!("{}", payload.script()),
    }

    Ok(())
}

/// Check host prerequisites
pub async fn check_prereqs_command() -> Result<()> {
    info!("Checking host prerequisites");

    let missing = SystemUtils::check_prerequisites();
    if missing.is_empty() {
        info!("✓ pct, pveam and pvesh are available");
    } else {
        error!("✗ Missing required commands: {}", missing.join(", "));
        info!("  These ship with Proxmox VE; run this tool on the PVE host itself");
    }

    let root = SystemUtils::is_root();
    if root {
        info!("✓ Running as root");
    } else {
        error!("✗ Not running as root");
    }

    if missing.is_empty() && root {
        info!("Host is ready");
        Ok(())
    } else {
        Err(ProvisionError::precondition(format!(
            "{} prerequisite check(s) failed",
            missing.len() + usize::from(!root)
        )))
    }
}
