// file: src/host/templates.rs
// version: 1.0.0
// guid: 6e0d9b41-f27a-4c83-95b8-a1c7e3f06d29

//! Container template discovery and download through `pveam`

use super::args;
use super::executor::CommandExecutor;
use super::manager::ContainerManager;
use crate::error::ProvisionError;
use crate::Result;
use std::cmp::Ordering;
use tracing::{info, warn};

impl<E: CommandExecutor> ContainerManager<E> {
    /// Make sure a template matching `pattern` is present on `storage`.
    ///
    /// Returns the volume id to pass to `pct create`. A cached template wins;
    /// otherwise the newest matching template in the `system` section is downloaded.
    pub async fn ensure_template(&mut self, storage: &str, pattern: &str) -> Result<String> {
        let listed = self.query("pveam", &args(["list", storage])).await?;
        if let Some(volid) = newest(parse_local_templates(&listed, pattern)) {
            info!("Using cached template {}", volid);
            return Ok(volid);
        }

        info!("No local template matching '{}', refreshing index", pattern);
        if let Err(e) = self.mutate("pveam", &args(["update"])).await {
            warn!("pveam update failed, continuing with the cached index: {}", e);
        }

        let available = self
            .query("pveam", &args(["available", "--section", "system"]))
            .await?;
        let file = newest(parse_available_templates(&available, pattern)).ok_or_else(|| {
            ProvisionError::template(format!(
                "No template matching '{}' is available for download",
                pattern
            ))
        })?;

        info!("Downloading template {} to {}", file, storage);
        self.mutate("pveam", &args(["download", storage, file.as_str()]))
            .await?;

        Ok(format!("{}:vztmpl/{}", storage, file))
    }
}

/// Volume ids from `pveam list <storage>` whose file name contains `pattern`
pub fn parse_local_templates(output: &str, pattern: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|volid| volid.contains(":vztmpl/"))
        .filter(|volid| volid.contains(pattern))
        .map(str::to_string)
        .collect()
}

/// File names from `pveam available` whose name contains `pattern`
pub fn parse_available_templates(output: &str, pattern: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let _section = columns.next()?;
            columns.next()
        })
        .filter(|file| file.contains(pattern))
        .map(str::to_string)
        .collect()
}

/// Pick the highest version using natural ordering
pub fn newest(mut candidates: Vec<String>) -> Option<String> {
    candidates.sort_by(|a, b| natural_cmp(a, b));
    candidates.pop()
}

/// Compare strings treating runs of digits as numbers, so `12.10` sorts after `12.9`
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_number(&mut left);
                let rn = take_number(&mut right);
                let ordering = ln
                    .trim_start_matches('0')
                    .len()
                    .cmp(&rn.trim_start_matches('0').len())
                    .then_with(|| ln.trim_start_matches('0').cmp(rn.trim_start_matches('0')));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_number<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}
