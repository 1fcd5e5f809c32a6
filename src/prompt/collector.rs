// file: src/prompt/collector.rs
// version: 1.0.0
// guid: b7e14d36-0a9f-4c28-93d5-6f2a8e0c1b94

//! Collects and validates the container configuration.
//!
//! Every check runs before anything is created on the host. A bad answer ends
//! the run; there is no re-prompting.

use super::{parse_yes_no, Field, Prompter};
use crate::config::container::{parse_ctid, validate_hostname, validate_ip_cidr};
use crate::config::{ContainerConfig, Defaults, NetworkMode};
use crate::error::ProvisionError;
use crate::host::{CommandExecutor, ContainerManager};
use crate::Result;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct ConfigCollector<'a> {
    defaults: &'a Defaults,
}

impl<'a> ConfigCollector<'a> {
    pub fn new(defaults: &'a Defaults) -> Self {
        Self { defaults }
    }

    /// Ask for every field in order and return a validated record
    pub async fn collect<P, E>(
        &self,
        prompter: &mut P,
        manager: &mut ContainerManager<E>,
    ) -> Result<ContainerConfig>
    where
        P: Prompter + ?Sized,
        E: CommandExecutor,
    {
        let proposed = match manager.next_free_id().await {
            Ok(id) => Some(id.to_string()),
            Err(e) => {
                warn!("Could not query the next free container ID: {}", e);
                None
            }
        };

        let ctid = parse_ctid(&prompter.ask(Field::Ctid, proposed.as_deref())?)?;
        if manager.exists(ctid).await? {
            return Err(ProvisionError::validation(format!(
                "Container ID {} is already in use",
                ctid
            )));
        }
        debug!("Container ID {} is free", ctid);

        let hostname = prompter.ask(Field::Hostname, Some(&self.defaults.hostname))?;
        validate_hostname(&hostname)?;

        let password = prompter.ask_secret(Field::Password)?;
        if password.is_empty() {
            return Err(ProvisionError::validation("Password cannot be empty"));
        }

        let cores = ask_number(prompter, Field::Cores, self.defaults.cores)?;
        let memory_mb = ask_number(prompter, Field::MemoryMb, self.defaults.memory_mb)?;
        let swap_mb = ask_number(prompter, Field::SwapMb, self.defaults.swap_mb)?;
        let disk_gb = ask_number(prompter, Field::DiskGb, self.defaults.disk_gb)?;
        let storage = prompter.ask(Field::Storage, Some(&self.defaults.storage))?;

        let network = self.ask_network(prompter)?;
        let dns = prompter.ask(Field::Dns, Some(&self.defaults.dns))?;
        let ssh_key_path = ask_key_path(prompter)?;
        let install_editor = parse_yes_no(&prompter.ask(Field::InstallEditor, Some("no"))?)?;

        let config = ContainerConfig {
            ctid,
            hostname,
            password,
            cores,
            memory_mb,
            swap_mb,
            disk_gb,
            storage,
            bridge: self.defaults.bridge.clone(),
            network,
            dns,
            ssh_key_path,
            install_editor,
        };
        config.validate()?;
        Ok(config)
    }

    fn ask_network<P: Prompter + ?Sized>(&self, prompter: &mut P) -> Result<NetworkMode> {
        let mode = prompter.ask(Field::Network, Some("dhcp"))?;
        match mode.to_ascii_lowercase().as_str() {
            "dhcp" => Ok(NetworkMode::Dhcp),
            "static" => {
                let ip_cidr = prompter.ask(Field::IpCidr, None)?;
                validate_ip_cidr(&ip_cidr)?;
                let gateway = prompter.ask(Field::Gateway, None)?;
                let network = NetworkMode::Static { ip_cidr, gateway };
                network.validate()?;
                Ok(network)
            }
            other => Err(ProvisionError::validation(format!(
                "Network mode must be 'dhcp' or 'static', got '{}'",
                other
            ))),
        }
    }
}

fn ask_number<P: Prompter + ?Sized>(prompter: &mut P, field: Field, default: u32) -> Result<u32> {
    let raw = prompter.ask(field, Some(&default.to_string()))?;
    raw.parse::<u32>().map_err(|_| {
        ProvisionError::validation(format!("{} must be a number, got '{}'", field.question(), raw))
    })
}

fn ask_key_path<P: Prompter + ?Sized>(prompter: &mut P) -> Result<Option<PathBuf>> {
    let raw = prompter.ask(Field::SshKeyPath, None)?;
    if raw.is_empty() {
        return Ok(None);
    }

    let path = PathBuf::from(shellexpand::tilde(&raw).into_owned());
    if !path.is_file() {
        return Err(ProvisionError::validation(format!(
            "SSH public key file not found: {}",
            path.display()
        )));
    }
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::FakeExecutor;
    use std::collections::HashMap;
    use std::io::Write;

    /// Answers keyed by field; unanswered fields take the default
    struct ScriptedPrompter {
        answers: HashMap<Field, String>,
        asked: Vec<Field>,
    }

    impl ScriptedPrompter {
        fn new(pairs: &[(Field, &str)]) -> Self {
            Self {
                answers: pairs.iter().map(|(f, v)| (*f, v.to_string())).collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, field: Field, default: Option<&str>) -> Result<String> {
            self.asked.push(field);
            Ok(self
                .answers
                .get(&field)
                .cloned()
                .unwrap_or_else(|| default.unwrap_or_default().to_string()))
        }

        fn ask_secret(&mut self, field: Field) -> Result<String> {
            self.asked.push(field);
            Ok(self.answers.get(&field).cloned().unwrap_or_default())
        }

        fn confirm(&mut self, _question: &str, default: bool) -> Result<bool> {
            Ok(default)
        }
    }

    fn manager() -> ContainerManager<FakeExecutor> {
        ContainerManager::new(FakeExecutor::new().with_output("pvesh get /cluster/nextid", "\"120\"\n"))
    }

    #[tokio::test]
    async fn test_defaults_with_password() {
        // Arrange
        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[(Field::Password, "s3cret")]);
        let mut manager = manager();

        // Act
        let config = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await
            .unwrap();

        // Assert
        assert_eq!(config.ctid, 120);
        assert_eq!(config.hostname, "devbox");
        assert_eq!(config.cores, 4);
        assert_eq!(config.memory_mb, 8192);
        assert_eq!(config.network, NetworkMode::Dhcp);
        assert_eq!(config.bridge, "vmbr0");
        assert!(!config.install_editor);
        assert!(!prompter.asked.contains(&Field::Gateway));
    }

    #[tokio::test]
    async fn test_non_numeric_id_rejected() {
        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[(Field::Ctid, "abc")]);
        let mut manager = manager();

        let result = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await;

        assert!(matches!(result, Err(ProvisionError::ValidationError(_))));
        assert_eq!(prompter.asked, vec![Field::Ctid]);
    }

    #[tokio::test]
    async fn test_id_in_use_rejected() {
        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[(Field::Ctid, "105")]);
        let mut manager = ContainerManager::new(FakeExecutor::new().with_check("pct status 105", true));

        let err = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("already in use"));
    }

    #[tokio::test]
    async fn test_id_with_config_file_rejected() {
        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[(Field::Ctid, "130")]);
        let mut manager =
            ContainerManager::new(FakeExecutor::new().with_existing_path("/etc/pve/lxc/130.conf"));

        let result = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_nextid_failure_means_no_default() {
        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[(Field::Password, "pw")]);
        let mut manager = ContainerManager::new(FakeExecutor::new().with_failure("pvesh"));

        let result = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await;

        assert!(matches!(result, Err(ProvisionError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_empty_password_rejected() {
        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[]);
        let mut manager = manager();

        let err = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Password cannot be empty"));
    }

    #[tokio::test]
    async fn test_static_without_gateway_rejected() {
        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[
            (Field::Password, "pw"),
            (Field::Network, "static"),
            (Field::IpCidr, "192.168.1.50/24"),
        ]);
        let mut manager = manager();

        let err = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Gateway is required"));
        assert!(manager.executor().calls().iter().all(|c| !c.starts_with("pct create")));
    }

    #[tokio::test]
    async fn test_static_network_collected() {
        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[
            (Field::Password, "pw"),
            (Field::Network, "Static"),
            (Field::IpCidr, "10.0.0.5/24"),
            (Field::Gateway, "10.0.0.1"),
        ]);
        let mut manager = manager();

        let config = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await
            .unwrap();

        assert_eq!(
            config.network,
            NetworkMode::Static {
                ip_cidr: "10.0.0.5/24".to_string(),
                gateway: "10.0.0.1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_network_mode_rejected() {
        let defaults = Defaults::default();
        let mut prompter =
            ScriptedPrompter::new(&[(Field::Password, "pw"), (Field::Network, "bridge")]);
        let mut manager = manager();

        let result = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ssh_key_must_exist() {
        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[
            (Field::Password, "pw"),
            (Field::SshKeyPath, "/nonexistent/id_ed25519.pub"),
        ]);
        let mut manager = manager();

        let err = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("SSH public key file not found"));
    }

    #[tokio::test]
    async fn test_ssh_key_and_editor_accepted() {
        let mut key = tempfile::NamedTempFile::new().unwrap();
        writeln!(key, "ssh-ed25519 AAAA test").unwrap();
        let key_path = key.path().display().to_string();

        let defaults = Defaults::default();
        let mut prompter = ScriptedPrompter::new(&[
            (Field::Password, "pw"),
            (Field::SshKeyPath, key_path.as_str()),
            (Field::InstallEditor, "yes"),
        ]);
        let mut manager = manager();

        let config = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await
            .unwrap();

        assert_eq!(config.ssh_key_path, Some(key.path().to_path_buf()));
        assert!(config.install_editor);
    }

    #[tokio::test]
    async fn test_non_numeric_memory_rejected() {
        let defaults = Defaults::default();
        let mut prompter =
            ScriptedPrompter::new(&[(Field::Password, "pw"), (Field::MemoryMb, "lots")]);
        let mut manager = manager();

        let err = ConfigCollector::new(&defaults)
            .collect(&mut prompter, &mut manager)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("must be a number"));
    }
}
