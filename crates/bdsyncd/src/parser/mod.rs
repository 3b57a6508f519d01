//! Device output parsers and the model registry
//!
//! Each supported device model maps to one [`BridgeDomainParser`], which
//! knows the command to run and how to read its output. Parsers are pure:
//! same text in, same bridge domains out, no I/O.
//!
//! The model tag comes from the device display name prefix ("ASR920-1" →
//! "ASR920"). Tags without a registered parser are an error; there is no
//! default parser.

mod bridge_domain_table;
mod running_config;

pub use bridge_domain_table::BridgeDomainTableParser;
pub use running_config::RunningConfigParser;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;

use kuwaiba_sync_common::{Result, SyncError};

use crate::port_name::split_subinterface;
use crate::types::{BridgeDomain, NetworkInterface};

/// Cisco ASR 920 model tag
pub const MODEL_ASR920: &str = "ASR920";

/// Cisco ME 3600X model tag
pub const MODEL_ME3600: &str = "ME3600";

/// Cisco ASR 1002 model tag
pub const MODEL_ASR1002: &str = "ASR1002";

/// `vfi NAME ...`
static VFI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^vfi\s+(\S+)").expect("Invalid regex pattern"));

/// `BDI100`, `BDI100 (up)`
static BDI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(bdi\d+)(?:\s|$)").expect("Invalid regex pattern"));

/// `Gi0/0/1 service instance 100`, `Gi0/0/1 service-instance 100`
static SERVICE_INSTANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\S+)\s+service[\s-]instance\s+(\d+)").expect("Invalid regex pattern")
});

/// IOS error banner (`% Invalid input detected at '^' marker.`)
static IOS_ERROR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*% (Invalid input|Incomplete command|Ambiguous command)")
        .expect("Invalid regex pattern")
});

/// Strategy reading bridge domains out of one model's command output
pub trait BridgeDomainParser: Send + Sync {
    /// Command whose output this parser reads
    fn command(&self) -> &str;

    /// Extract bridge domains from the command output
    fn parse(&self, output: &str) -> Result<Vec<BridgeDomain>>;
}

/// Derive the model tag from a device display name
///
/// The tag is the part before the first `-`, `_` or space, uppercased.
pub fn model_tag(device_name: &str) -> Option<String> {
    let tag = device_name
        .trim()
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_uppercase())
    }
}

/// Lookup table from model tag to parser
#[derive(Clone)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, Arc<dyn BridgeDomainParser>>,
}

impl ParserRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            parsers: BTreeMap::new(),
        }
    }

    /// Registry with every model supported out of the box
    pub fn with_default_models() -> Self {
        let table: Arc<dyn BridgeDomainParser> = Arc::new(BridgeDomainTableParser::new());
        let mut registry = Self::empty();
        registry.register(MODEL_ASR920, table.clone());
        registry.register(MODEL_ME3600, table);
        registry.register(MODEL_ASR1002, Arc::new(RunningConfigParser::new()));
        registry
    }

    /// Register (or replace) the parser of a model
    pub fn register(&mut self, model: &str, parser: Arc<dyn BridgeDomainParser>) {
        self.parsers.insert(model.to_uppercase(), parser);
    }

    /// Parser for a model tag
    pub fn get(&self, device_name: &str, model: &str) -> Result<Arc<dyn BridgeDomainParser>> {
        self.parsers
            .get(&model.to_uppercase())
            .cloned()
            .ok_or_else(|| SyncError::unsupported_model(device_name, model))
    }

    /// Parser for a device, resolving its tag from the display name
    pub fn for_device(&self, device_name: &str) -> Result<(String, Arc<dyn BridgeDomainParser>)> {
        let model = model_tag(device_name)
            .ok_or_else(|| SyncError::unsupported_model(device_name, ""))?;
        let parser = self.get(device_name, &model)?;
        Ok((model, parser))
    }

    /// Registered model tags, sorted
    pub fn models(&self) -> Vec<&str> {
        self.parsers.keys().map(String::as_str).collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_default_models()
    }
}

/// Read one bridge domain member line
///
/// Returns None for lines that are not members (status lines, table
/// headers, blank lines).
pub(crate) fn parse_member(line: &str) -> Option<NetworkInterface> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(caps) = VFI_RE.captures(line) {
        return Some(NetworkInterface::vfi(&caps[1]));
    }
    if let Some(caps) = BDI_RE.captures(line) {
        return Some(NetworkInterface::bdi(caps[1].to_uppercase()));
    }
    if let Some(caps) = SERVICE_INSTANCE_RE.captures(line) {
        return Some(NetworkInterface::service_instance(&caps[1], &caps[2]));
    }
    let first = line.split_whitespace().next()?;
    let (parent, unit) = split_subinterface(first)?;
    // a sub-interface parent starts with its type name
    if parent.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Some(NetworkInterface::subinterface(parent, unit));
    }
    None
}

/// Fail on IOS error banners instead of returning an empty result
pub(crate) fn check_ios_error(command: &str, output: &str) -> Result<()> {
    match IOS_ERROR_RE.find(output) {
        Some(m) => Err(SyncError::parse(command, m.as_str().trim())),
        None => Ok(()),
    }
}

/// Append a bridge domain, merging members if the name was already seen
pub(crate) fn push_or_merge(domains: &mut Vec<BridgeDomain>, domain: BridgeDomain) {
    match domains.iter_mut().find(|d| d.name == domain.name) {
        Some(existing) => {
            for interface in domain.interfaces {
                existing.add_interface(interface);
            }
        }
        None => domains.push(domain),
    }
}
