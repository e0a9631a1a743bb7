//! Fabric Ledger Transport
//!
//! Invokes the `security_logs` chaincode through the Fabric `peer` CLI.
//! The process is spawned with an argument vector; event fields travel
//! inside a JSON document built by serde_json, never through a shell.

use std::process::Stdio;

use async_trait::async_trait;
use serde_json::json;
use tokio::process::Command;

use super::{LedgerClient, LedgerError, LedgerWrite};
use crate::config::FabricConfig;
use crate::logic::telemetry::SecurityEvent;

// ============================================================================
// CONSTANTS
// ============================================================================

const CHAINCODE_FUNCTION: &str = "RecordEvent";

// ============================================================================
// TRANSPORT
// ============================================================================

pub struct FabricLedger {
    config: FabricConfig,
    accept_marker: String,
}

impl FabricLedger {
    pub fn new(config: FabricConfig, accept_marker: String) -> Self {
        Self {
            config,
            accept_marker,
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.config.peer_bin);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropped on timeout -> child is killed
            .kill_on_drop(true);
        if let Some(dir) = &self.config.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// `peer channel getinfo -c <channel>`
    pub fn probe_args(&self) -> Vec<String> {
        vec![
            "channel".to_string(),
            "getinfo".to_string(),
            "-c".to_string(),
            self.config.channel.clone(),
        ]
    }

    /// `peer chaincode invoke ...` with the event as the chaincode call
    pub fn invoke_args(&self, event: &SecurityEvent) -> Result<Vec<String>, LedgerError> {
        let cfg = &self.config;
        let mut args: Vec<String> = vec![
            "chaincode".into(),
            "invoke".into(),
            "-o".into(),
            cfg.orderer.clone(),
            "--ordererTLSHostnameOverride".into(),
            cfg.orderer_host.clone(),
            "--tls".into(),
        ];
        if let Some(ca) = &cfg.orderer_ca {
            args.push("--cafile".into());
            args.push(ca.clone());
        }
        args.extend([
            "-C".to_string(),
            cfg.channel.clone(),
            "-n".to_string(),
            cfg.chaincode.clone(),
        ]);
        for peer in &cfg.peers {
            args.push("--peerAddresses".into());
            args.push(peer.address.clone());
            args.push("--tlsRootCertFiles".into());
            args.push(peer.tls_root_cert.clone());
        }
        args.push("-c".into());
        args.push(chaincode_call(event)?);
        Ok(args)
    }
}

/// Chaincode call document; multi-line fields are flattened to one line
pub fn chaincode_call(event: &SecurityEvent) -> Result<String, LedgerError> {
    let flat = |s: &str| s.replace(['\r', '\n'], " ");
    let call = json!({
        "function": CHAINCODE_FUNCTION,
        "Args": [
            event.event_id,
            flat(&event.log_excerpt),
            flat(&event.analysis_excerpt),
            flat(&event.remediation_excerpt),
            event.criticality.as_str(),
            event.timestamp,
        ],
    });
    Ok(serde_json::to_string(&call)?)
}

#[async_trait]
impl LedgerClient for FabricLedger {
    fn name(&self) -> &'static str {
        "fabric"
    }

    async fn probe(&self) -> bool {
        match self.command(&self.probe_args()).output().await {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!("Fabric probe failed to spawn {}: {}", self.config.peer_bin, e);
                false
            }
        }
    }

    async fn write(&self, event: &SecurityEvent) -> Result<LedgerWrite, LedgerError> {
        let args = self.invoke_args(event)?;
        let output = self.command(&args).output().await?;

        // peer reports the invoke result on stderr
        let mut raw_output = String::from_utf8_lossy(&output.stdout).into_owned();
        raw_output.push_str(&String::from_utf8_lossy(&output.stderr));
        let raw_output = raw_output.trim().to_string();

        let accepted = output.status.success() && raw_output.contains(&self.accept_marker);
        Ok(LedgerWrite {
            accepted,
            raw_output,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
