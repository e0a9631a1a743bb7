//! Configuration module
//!
//! Everything is read from environment variables (optionally via `.env`),
//! each with a default from `constants.rs`.

use std::env;
use std::path::PathBuf;

use crate::constants;

/// Which transport the ledger client uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    /// Hyperledger Fabric `peer` CLI
    Fabric,
    /// HTTP ledger gateway
    Http,
    /// Append-only JSONL file
    File,
    /// No ledger; every event goes to the local store
    None,
}

impl LedgerBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "fabric" => Some(Self::Fabric),
            "http" => Some(Self::Http),
            "file" => Some(Self::File),
            "none" | "disabled" | "" => Some(Self::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fabric => "fabric",
            Self::Http => "http",
            Self::File => "file",
            Self::None => "none",
        }
    }
}

/// One endorsing peer for Fabric invocations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FabricPeer {
    pub address: String,
    pub tls_root_cert: String,
}

/// Fabric `peer` CLI settings
#[derive(Debug, Clone)]
pub struct FabricConfig {
    pub peer_bin: String,
    pub workdir: Option<PathBuf>,
    pub orderer: String,
    pub orderer_host: String,
    pub orderer_ca: Option<String>,
    pub channel: String,
    pub chaincode: String,
    pub peers: Vec<FabricPeer>,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            peer_bin: "peer".to_string(),
            workdir: None,
            orderer: constants::DEFAULT_FABRIC_ORDERER.to_string(),
            orderer_host: constants::DEFAULT_FABRIC_ORDERER_HOST.to_string(),
            orderer_ca: None,
            channel: constants::DEFAULT_FABRIC_CHANNEL.to_string(),
            chaincode: constants::DEFAULT_FABRIC_CHAINCODE.to_string(),
            peers: Vec::new(),
        }
    }
}

/// Ledger client settings
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    pub accept_marker: String,
    pub probe_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub http_url: Option<String>,
    pub file_path: PathBuf,
    pub fabric: FabricConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::None,
            accept_marker: constants::DEFAULT_LEDGER_ACCEPT_MARKER.to_string(),
            probe_timeout_secs: constants::DEFAULT_LEDGER_PROBE_TIMEOUT,
            write_timeout_secs: constants::DEFAULT_LEDGER_WRITE_TIMEOUT,
            http_url: None,
            file_path: constants::default_ledger_file(),
            fabric: FabricConfig::default(),
        }
    }
}

/// Analysis stage service settings
#[derive(Debug, Clone)]
pub struct StageConfig {
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            url: constants::DEFAULT_OLLAMA_URL.to_string(),
            model: constants::DEFAULT_OLLAMA_MODEL.to_string(),
            timeout_secs: constants::DEFAULT_STAGE_TIMEOUT,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Run the staged pipeline (false = rule-based classifier only)
    pub pipeline_enabled: bool,

    /// Analysis stage service
    pub stage: StageConfig,

    /// Ledger client
    pub ledger: LedgerConfig,

    /// Directory of the local fallback store
    pub local_events_dir: PathBuf,

    /// Upper bound for one local write
    pub local_write_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline_enabled: true,
            stage: StageConfig::default(),
            ledger: LedgerConfig::default(),
            local_events_dir: constants::default_local_events_dir(),
            local_write_timeout_secs: constants::DEFAULT_LOCAL_WRITE_TIMEOUT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let parse_u64 = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let backend = match lookup("LEDGER_BACKEND") {
            Some(raw) => LedgerBackend::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown LEDGER_BACKEND '{}', ledger disabled", raw);
                LedgerBackend::None
            }),
            None => LedgerBackend::None,
        };

        let fabric_defaults = FabricConfig::default();
        let fabric = FabricConfig {
            peer_bin: lookup("FABRIC_PEER_BIN").unwrap_or(fabric_defaults.peer_bin),
            workdir: lookup("FABRIC_WORKDIR").map(PathBuf::from),
            orderer: lookup("FABRIC_ORDERER").unwrap_or(fabric_defaults.orderer),
            orderer_host: lookup("FABRIC_ORDERER_HOST").unwrap_or(fabric_defaults.orderer_host),
            orderer_ca: lookup("FABRIC_ORDERER_CA"),
            channel: lookup("FABRIC_CHANNEL").unwrap_or(fabric_defaults.channel),
            chaincode: lookup("FABRIC_CHAINCODE").unwrap_or(fabric_defaults.chaincode),
            peers: lookup("FABRIC_PEERS")
                .map(|raw| parse_peers(&raw))
                .unwrap_or_default(),
        };

        let ledger = LedgerConfig {
            backend,
            accept_marker: lookup("LEDGER_ACCEPT_MARKER")
                .unwrap_or(defaults.ledger.accept_marker),
            probe_timeout_secs: parse_u64("LEDGER_PROBE_TIMEOUT_SECS", defaults.ledger.probe_timeout_secs),
            write_timeout_secs: parse_u64("LEDGER_WRITE_TIMEOUT_SECS", defaults.ledger.write_timeout_secs),
            http_url: lookup("LEDGER_HTTP_URL"),
            file_path: lookup("LEDGER_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger.file_path),
            fabric,
        };

        Self {
            pipeline_enabled: lookup("TRIAGE_PIPELINE_ENABLED")
                .map(|s| parse_bool(&s))
                .unwrap_or(defaults.pipeline_enabled),
            stage: StageConfig {
                url: lookup("OLLAMA_URL").unwrap_or(defaults.stage.url),
                model: lookup("OLLAMA_MODEL").unwrap_or(defaults.stage.model),
                timeout_secs: parse_u64("STAGE_TIMEOUT_SECS", defaults.stage.timeout_secs),
            },
            ledger,
            local_events_dir: lookup("LOCAL_EVENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_events_dir),
            local_write_timeout_secs: parse_u64("LOCAL_WRITE_TIMEOUT_SECS", defaults.local_write_timeout_secs),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v != "false" && v != "0" && v != "no" && v != "off"
}

/// Parse `addr=cert,addr=cert` into peer entries, skipping malformed pairs
pub fn parse_peers(raw: &str) -> Vec<FabricPeer> {
    raw.split(',')
        .filter_map(|pair| {
            let (address, cert) = pair.split_once('=')?;
            let address = address.trim();
            let cert = cert.trim();
            if address.is_empty() || cert.is_empty() {
                return None;
            }
            Some(FabricPeer {
                address: address.to_string(),
                tls_root_cert: cert.to_string(),
            })
        })
        .collect()
}
