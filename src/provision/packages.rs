// file: src/provision/packages.rs
// version: 1.0.0
// guid: a0c74e19-3d5b-4f82-96e1-b8f2d5a30c67

//! Package sets and third-party installers baked into the payload

use crate::config::PayloadConfig;
use crate::error::ProvisionError;
use crate::Result;
use url::Url;

/// Debian packages installed with apt
pub const BASE_PACKAGES: &[&str] = &[
    "build-essential",
    "ca-certificates",
    "cron",
    "curl",
    "fd-find",
    "git",
    "gnupg",
    "htop",
    "jq",
    "less",
    "logrotate",
    "lsb-release",
    "make",
    "openssh-server",
    "pkg-config",
    "python3",
    "python3-pip",
    "python3-venv",
    "ripgrep",
    "rsync",
    "sudo",
    "tmux",
    "unzip",
    "vim",
    "wget",
    "zip",
];

/// A third-party installer fetched over the network at provisioning time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installer {
    pub name: &'static str,
    pub url: String,
    /// Shell lines run inside the guest
    pub commands: Vec<String>,
    /// Downloaded content is piped straight into a shell
    pub pipes_to_shell: bool,
    /// Failure only logs a warning
    pub best_effort: bool,
}

impl Installer {
    /// Installers are only ever fetched over https
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.url.replace("${GO_ARCH}", "amd64")).map_err(|e| {
            ProvisionError::payload(format!("Installer '{}' has an invalid URL: {}", self.name, e))
        })?;
        if url.scheme() != "https" {
            return Err(ProvisionError::payload(format!(
                "Installer '{}' must be fetched over https, got {}",
                self.name, self.url
            )));
        }
        Ok(())
    }
}

/// Installers in the order the payload runs them
pub fn installers(config: &PayloadConfig) -> Vec<Installer> {
    let node_url = format!("https://deb.nodesource.com/setup_{}.x", config.node_major);
    let go_url = format!(
        "https://go.dev/dl/go{}.linux-${{GO_ARCH}}.tar.gz",
        config.go_version
    );

    vec![
        Installer {
            name: "bun",
            url: "https://bun.sh/install".to_string(),
            commands: vec![
                "curl -fsSL https://bun.sh/install | bash".to_string(),
                "ln -sf /root/.bun/bin/bun /usr/local/bin/bun".to_string(),
            ],
            pipes_to_shell: true,
            best_effort: true,
        },
        Installer {
            name: "nodejs",
            url: node_url.clone(),
            commands: vec![
                format!("curl -fsSL {} | bash -", node_url),
                "apt-get install -y nodejs".to_string(),
            ],
            pipes_to_shell: true,
            best_effort: false,
        },
        Installer {
            name: "go",
            url: go_url.clone(),
            commands: vec![
                "GO_ARCH=\"$(dpkg --print-architecture)\"".to_string(),
                format!("curl -fsSL \"{}\" -o /tmp/go.tar.gz", go_url),
                "rm -rf /usr/local/go".to_string(),
                "tar -C /usr/local -xzf /tmp/go.tar.gz".to_string(),
                "rm -f /tmp/go.tar.gz".to_string(),
                "echo 'export PATH=$PATH:/usr/local/go/bin:$HOME/go/bin' > /etc/profile.d/go.sh"
                    .to_string(),
            ],
            pipes_to_shell: false,
            best_effort: false,
        },
        Installer {
            name: "rust",
            url: "https://sh.rustup.rs".to_string(),
            commands: vec![
                "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y --profile default"
                    .to_string(),
                "echo 'source $HOME/.cargo/env' > /etc/profile.d/rust.sh".to_string(),
            ],
            pipes_to_shell: true,
            best_effort: false,
        },
        Installer {
            name: "docker",
            url: "https://get.docker.com".to_string(),
            commands: vec![
                "curl -fsSL https://get.docker.com | sh".to_string(),
                "systemctl enable --now docker".to_string(),
            ],
            pipes_to_shell: true,
            best_effort: false,
        },
    ]
}
