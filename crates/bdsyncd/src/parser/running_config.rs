//! `show running-config | section bridge-domain` parser (ASR 1002)
//!
//! ```text
//! bridge-domain 100
//!  member GigabitEthernet0/0/1 service-instance 100
//!  member GigabitEthernet0/0/2.200
//!  member vfi VFI100
//!  member BDI100
//! !
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use kuwaiba_sync_common::Result;

use super::{check_ios_error, parse_member, push_or_merge, BridgeDomainParser};
use crate::types::BridgeDomain;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^bridge-domain\s+(\S+)").expect("Invalid regex pattern"));

static MEMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+member\s+(.+)$").expect("Invalid regex pattern"));

/// Parser for the bridge-domain section of the running configuration
#[derive(Debug, Default)]
pub struct RunningConfigParser;

impl RunningConfigParser {
    pub fn new() -> Self {
        Self
    }
}

impl BridgeDomainParser for RunningConfigParser {
    fn command(&self) -> &str {
        "show running-config | section bridge-domain"
    }

    fn parse(&self, output: &str) -> Result<Vec<BridgeDomain>> {
        check_ios_error(self.command(), output)?;

        let mut domains = Vec::new();
        let mut current: Option<BridgeDomain> = None;

        for line in output.lines() {
            if let Some(caps) = HEADER_RE.captures(line) {
                if let Some(done) = current.take() {
                    push_or_merge(&mut domains, done);
                }
                current = Some(BridgeDomain::new(&caps[1]));
                continue;
            }

            // any other top-level line closes the section
            if !line.starts_with(char::is_whitespace) {
                if let Some(done) = current.take() {
                    push_or_merge(&mut domains, done);
                }
                continue;
            }

            if let (Some(domain), Some(caps)) = (current.as_mut(), MEMBER_RE.captures(line)) {
                if let Some(interface) = parse_member(&caps[1]) {
                    domain.add_interface(interface);
                }
            }
        }
        if let Some(done) = current.take() {
            push_or_merge(&mut domains, done);
        }

        Ok(domains)
    }
}
