// file: src/lifecycle/driver.rs
// version: 1.0.0
// guid: 2c9e5b70-a3f1-4d86-9b24-e06d18c7f3a5

//! Container lifecycle driver

use super::poll::{Probe, ReachabilityPoll};
use crate::config::ContainerConfig;
use crate::host::{CommandExecutor, ContainerManager};
use crate::Result;
use tracing::info;

/// ICMP probe run from inside the guest with `pct exec ... ping`
pub struct GuestPingProbe<'a, E> {
    manager: &'a mut ContainerManager<E>,
    ctid: u32,
    target: String,
}

impl<'a, E: CommandExecutor> GuestPingProbe<'a, E> {
    pub fn new(manager: &'a mut ContainerManager<E>, ctid: u32, target: &str) -> Self {
        Self {
            manager,
            ctid,
            target: target.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl<'a, E: CommandExecutor> Probe for GuestPingProbe<'a, E> {
    async fn probe(&mut self) -> Result<bool> {
        self.manager
            .exec_check(self.ctid, &["ping", "-c", "1", "-W", "1", self.target.as_str()])
            .await
    }
}

/// Issues the create and start commands, then waits for the guest network
pub struct ContainerDriver<'a, E> {
    manager: &'a mut ContainerManager<E>,
}

impl<'a, E: CommandExecutor> ContainerDriver<'a, E> {
    pub fn new(manager: &'a mut ContainerManager<E>) -> Self {
        Self { manager }
    }

    /// One create command with the fixed option set
    pub async fn create(&mut self, config: &ContainerConfig, template: &str) -> Result<()> {
        self.manager.create(config, template).await?;
        info!("Container {} created", config.ctid);
        Ok(())
    }

    /// One start command
    pub async fn start(&mut self, ctid: u32) -> Result<()> {
        self.manager.start(ctid).await?;
        info!("Container {} started", ctid);
        Ok(())
    }

    /// Block until the guest answers a ping or the poll gives up
    pub async fn wait_for_network(
        &mut self,
        ctid: u32,
        poll: &ReachabilityPoll,
        target: &str,
    ) -> Result<u32> {
        info!(
            "Waiting up to {}s for container {} to reach {}",
            poll.window().as_secs(),
            ctid,
            target
        );
        let mut probe = GuestPingProbe::new(&mut *self.manager, ctid, target);
        poll.wait(&mut probe).await
    }
}
