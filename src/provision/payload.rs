// file: src/provision/payload.rs
// version: 1.0.0
// guid: 3e9d7b20-c5f4-4a18-9e63-f1b8a02d4c97

//! Provisioning script rendering.
//!
//! The payload is one self-contained bash script. Generated files travel
//! inside it as quoted heredocs, so nothing else has to be pushed.

use super::compose::ComposeFile;
use super::packages::{installers, Installer, BASE_PACKAGES};
use super::settings::AgentSettings;
use crate::config::PayloadConfig;
use crate::error::ProvisionError;
use crate::Result;
use sha2::{Digest, Sha256};
use std::io::Write;
use tempfile::NamedTempFile;

/// Heredoc terminator for embedded files
const HEREDOC_MARKER: &str = "DEVBOX_EOF";

/// Log file inside the guest
pub const GUEST_LOG_FILE: &str = "/var/log/devbox-provision.log";

const MAINTENANCE_LOG_FILE: &str = "/var/log/devbox-maintenance.log";
const WATCHER_COMPOSE_PATH: &str = "/opt/devbox/watchtower/docker-compose.yml";
const EDITOR_COMPOSE_PATH: &str = "/opt/devbox/code-server/docker-compose.yml";

/// One titled block of shell lines
#[derive(Debug, Clone)]
struct Step {
    title: String,
    lines: Vec<String>,
    best_effort: bool,
}

impl Step {
    fn fatal(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
            best_effort: false,
        }
    }

    fn best_effort(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
            best_effort: true,
        }
    }

    fn render(&self, out: &mut String) {
        out.push_str(&format!("\nlog_step {}\n", shell_quote(&self.title)));

        if !self.best_effort {
            for line in &self.lines {
                out.push_str(line);
                out.push('\n');
            }
            return;
        }

        // errexit is ignored inside `if`/`||` conditions, so the subshell runs as a
        // plain command with errexit suspended in the parent.
        out.push_str("set +e\n(\n  set -e\n");
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(")\nstep_rc=$?\nset -e\n");
        out.push_str(&format!(
            "if [ \"$step_rc\" -ne 0 ]; then log_warn {} \"(exit $step_rc), continuing\"; fi\n",
            shell_quote(&format!("{} failed", self.title))
        ));
    }
}

/// A rendered payload ready to push
#[derive(Debug, Clone)]
pub struct Payload {
    script: String,
    installers: Vec<Installer>,
}

impl Payload {
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Hex SHA-256 of the script, logged and shown in the summary
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(self.script.as_bytes()))
    }

    /// Installers whose downloads run without integrity verification.
    ///
    /// None of them carry a checksum; the ones piped into a shell are the worst.
    pub fn unverified_installers(&self) -> impl Iterator<Item = &Installer> {
        self.installers.iter()
    }

    /// Materialize the script on the host; the file is removed when dropped
    pub fn write_to_temp(&self) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("devbox-provision-")
            .suffix(".sh")
            .tempfile()?;
        file.write_all(self.script.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

/// Builds the provisioning script from the payload config
pub struct PayloadBuilder<'a> {
    config: &'a PayloadConfig,
    hostname: String,
    install_editor: bool,
}

impl<'a> PayloadBuilder<'a> {
    pub fn new(config: &'a PayloadConfig, hostname: &str, install_editor: bool) -> Self {
        Self {
            config,
            hostname: hostname.to_string(),
            install_editor,
        }
    }

    /// Render the full script
    pub fn build(&self) -> Result<Payload> {
        let installers = installers(self.config);
        for installer in &installers {
            installer.validate()?;
        }

        let mut steps = vec![
            self.timezone_step(),
            self.locale_step(),
            Step::fatal(
                "Upgrading system packages",
                lines(&["apt-get update", "apt-get -y upgrade"]),
            ),
            Step::fatal(
                "Installing base packages",
                vec![format!(
                    "apt-get install -y --no-install-recommends {}",
                    BASE_PACKAGES.join(" ")
                )],
            ),
        ];

        for installer in &installers {
            let title = format!("Installing {}", installer.name);
            if installer.best_effort {
                steps.push(Step::best_effort(title, installer.commands.clone()));
            } else {
                steps.push(Step::fatal(title, installer.commands.clone()));
            }
        }

        if !self.config.npm_global_packages.is_empty() {
            steps.push(Step::best_effort(
                "Installing global npm tools",
                vec![format!(
                    "npm install -g {}",
                    self.config
                        .npm_global_packages
                        .iter()
                        .map(|p| shell_quote(p))
                        .collect::<Vec<_>>()
                        .join(" ")
                )],
            ));
        }

        steps.push(self.settings_step()?);
        steps.push(self.workspace_step()?);
        steps.push(self.ssh_step()?);
        steps.push(self.cron_step()?);
        steps.push(self.logrotate_step()?);
        steps.extend(self.compose_steps()?);
        steps.push(Step::fatal(
            "Cleaning up",
            lines(&["apt-get -y autoremove", "apt-get clean"]),
        ));

        let mut script = self.header();
        for step in &steps {
            step.render(&mut script);
        }
        script.push_str("\nlog_step 'Provisioning complete'\n");

        Ok(Payload {
            script,
            installers,
        })
    }

    fn header(&self) -> String {
        format!(
            r#"#!/usr/bin/env bash
# Provisioning payload for {hostname}, generated by pve-devbox-agent {version}
set -euo pipefail
export DEBIAN_FRONTEND=noninteractive
export HOME=/root

LOG_FILE={log_file}
exec > >(tee -a "$LOG_FILE") 2>&1

log_step() {{ printf '\n==> %s\n' "$*"; }}
log_warn() {{ printf 'WARN: %s\n' "$*" >&2; }}
"#,
            hostname = self.hostname,
            version = env!("CARGO_PKG_VERSION"),
            log_file = GUEST_LOG_FILE,
        )
    }

    fn timezone_step(&self) -> Step {
        let tz = shell_quote(&self.config.timezone);
        Step::fatal(
            "Configuring timezone",
            vec![
                format!("ln -sf /usr/share/zoneinfo/{} /etc/localtime", tz),
                format!("echo {} > /etc/timezone", tz),
            ],
        )
    }

    fn locale_step(&self) -> Step {
        let locale = &self.config.locale;
        Step::fatal(
            "Configuring locale",
            vec![
                "apt-get update".to_string(),
                "apt-get install -y locales".to_string(),
                format!(
                    "sed -i -e {} /etc/locale.gen",
                    shell_quote(&format!("s/^# *{} /{} /", locale, locale))
                ),
                "locale-gen".to_string(),
                format!("update-locale LANG={}", shell_quote(locale)),
            ],
        )
    }

    fn settings_step(&self) -> Result<Step> {
        let settings = AgentSettings::for_workspace(self.config, &self.hostname);
        Ok(Step::fatal(
            "Writing agent settings",
            write_file(&self.config.settings_path, &settings.to_json()?, "0600")?,
        ))
    }

    fn workspace_step(&self) -> Result<Step> {
        let workspace = &self.config.workspace_dir;
        let instructions = format!(
            "# {hostname} workspace\n\n\
             This container was provisioned by pve-devbox-agent.\n\n\
             - Work inside `{workspace}`.\n\
             - Toolchains: Node.js {node}, Go {go}, Rust (rustup), Bun, Docker.\n\
             - Provisioning log: `{log}`.\n",
            hostname = self.hostname,
            workspace = workspace,
            node = self.config.node_major,
            go = self.config.go_version,
            log = GUEST_LOG_FILE,
        );

        let mut step_lines = vec![format!("mkdir -p {}", shell_quote(workspace))];
        step_lines.extend(write_file(
            &format!("{}/AGENTS.md", workspace.trim_end_matches('/')),
            &instructions,
            "0644",
        )?);
        step_lines.push(format!("touch {}", shell_quote(&format!("{}/.devbox", workspace.trim_end_matches('/')))));

        Ok(Step::fatal("Preparing workspace", step_lines))
    }

    fn ssh_step(&self) -> Result<Step> {
        let mut step_lines = write_file(
            "/etc/ssh/sshd_config.d/10-devbox.conf",
            "PermitRootLogin yes\nPasswordAuthentication yes\nPubkeyAuthentication yes\n",
            "0644",
        )?;
        step_lines.push("systemctl restart ssh || systemctl restart sshd".to_string());
        Ok(Step::fatal("Configuring SSH daemon", step_lines))
    }

    fn cron_step(&self) -> Result<Step> {
        let cron = format!(
            "SHELL=/bin/bash\n\
             PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin\n\
             0 3 * * * root apt-get update -qq && apt-get -y -qq upgrade >> {log} 2>&1\n\
             30 3 * * 0 root docker system prune -af >> {log} 2>&1\n",
            log = MAINTENANCE_LOG_FILE
        );
        Ok(Step::fatal(
            "Installing cron jobs",
            write_file("/etc/cron.d/devbox-maintenance", &cron, "0644")?,
        ))
    }

    fn logrotate_step(&self) -> Result<Step> {
        let rule = format!(
            "{} {} {{\n    weekly\n    rotate 4\n    compress\n    missingok\n    notifempty\n}}\n",
            GUEST_LOG_FILE, MAINTENANCE_LOG_FILE
        );
        Ok(Step::fatal(
            "Installing logrotate rule",
            write_file("/etc/logrotate.d/devbox", &rule, "0644")?,
        ))
    }

    fn compose_steps(&self) -> Result<Vec<Step>> {
        let mut definitions = vec![(WATCHER_COMPOSE_PATH, ComposeFile::update_watcher())];
        if self.install_editor {
            definitions.push((EDITOR_COMPOSE_PATH, ComposeFile::browser_editor(self.config)));
        }

        let mut write_lines = Vec::new();
        let mut up_lines = Vec::new();
        for (path, compose) in &definitions {
            write_lines.extend(write_file(path, &compose.to_yaml()?, "0644")?);
            up_lines.push(format!("docker compose -f {} up -d", shell_quote(path)));
        }

        Ok(vec![
            Step::fatal("Writing service definitions", write_lines),
            Step::best_effort("Starting auxiliary services", up_lines),
        ])
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Single-quote a value for bash
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Shell lines that write `content` to `path` through a quoted heredoc
fn write_file(path: &str, content: &str, mode: &str) -> Result<Vec<String>> {
    if content.lines().any(|line| line == HEREDOC_MARKER) {
        return Err(ProvisionError::payload(format!(
            "Content for {} contains the heredoc terminator",
            path
        )));
    }

    let quoted = shell_quote(path);
    let mut body = content.to_string();
    if !body.ends_with('\n') {
        body.push('\n');
    }

    Ok(vec![
        format!("mkdir -p \"$(dirname {})\"", quoted),
        format!("cat > {} <<'{}'\n{}{}", quoted, HEREDOC_MARKER, body, HEREDOC_MARKER),
        format!("chmod {} {}", mode, quoted),
    ])
}
