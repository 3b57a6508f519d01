//! `show bridge-domain` parser (ASR 920, ME 3600X)
//!
//! Output layout:
//!
//! ```text
//! Bridge-domain 100 (3 ports in all)
//! State: UP                    Mac learning: Enabled
//! Aging-Timer: 300 second(s)
//!     BDI100 (up)
//!     GigabitEthernet0/0/1 service instance 100
//!     vfi VFI100 neighbor 10.1.1.1 100
//!    AED MAC address    Policy  Tag       Age  Pseudoport
//!    0   000c.2934.5d20 forward dynamic   296  GigabitEthernet0/0/1.EFP100
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use kuwaiba_sync_common::Result;

use super::{check_ios_error, parse_member, push_or_merge, BridgeDomainParser};
use crate::types::BridgeDomain;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*bridge-domain\s+(\S+)").expect("Invalid regex pattern"));

/// MAC table header closing the member list of a block
static MAC_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(AED\s+)?MAC address\s").expect("Invalid regex pattern"));

/// Parser for the tabular `show bridge-domain` output
#[derive(Debug, Default)]
pub struct BridgeDomainTableParser;

impl BridgeDomainTableParser {
    pub fn new() -> Self {
        Self
    }
}

impl BridgeDomainParser for BridgeDomainTableParser {
    fn command(&self) -> &str {
        "show bridge-domain"
    }

    fn parse(&self, output: &str) -> Result<Vec<BridgeDomain>> {
        check_ios_error(self.command(), output)?;

        let mut domains = Vec::new();
        let mut current: Option<BridgeDomain> = None;
        let mut in_mac_table = false;

        for line in output.lines() {
            if let Some(caps) = HEADER_RE.captures(line) {
                if let Some(done) = current.take() {
                    push_or_merge(&mut domains, done);
                }
                current = Some(BridgeDomain::new(&caps[1]));
                in_mac_table = false;
                continue;
            }

            let Some(domain) = current.as_mut() else {
                continue;
            };
            if MAC_TABLE_RE.is_match(line) {
                in_mac_table = true;
                continue;
            }
            if in_mac_table {
                continue;
            }
            if let Some(interface) = parse_member(line) {
                domain.add_interface(interface);
            }
        }
        if let Some(done) = current.take() {
            push_or_merge(&mut domains, done);
        }

        Ok(domains)
    }
}
