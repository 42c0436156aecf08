// ── Log-derived audit ──
//
// Recovers the ids of devices and IP addresses a sync created by scanning
// its INFO log for "<Entity> ... with ID <N> successfully added to NetBox".

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SUCCESS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"INFO - (?P<entity>Device|IP address) (?P<subject>.+?) with ID (?P<id>\d+) successfully added to NetBox",
    )
    .expect("success-line pattern is valid")
});

/// Ids of created objects, keyed the way the audit report prints them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditIds {
    #[serde(rename = "device")]
    pub devices: Vec<u64>,
    #[serde(rename = "ip address")]
    pub ip_addresses: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEntity {
    Device,
    IpAddress,
}

/// Classify one log line.
///
/// `Device type <model> with ID <n> ...` lines share the "Device" keyword
/// but are not counted: the result lists device ids only. A plain
/// `^Device .* with ID` match would also collect device-type ids.
pub fn parse_line(line: &str) -> Option<(AuditEntity, u64)> {
    let caps = SUCCESS_LINE.captures(line)?;
    let entity = match &caps["entity"] {
        "Device" if caps["subject"].starts_with("type ") => return None,
        "Device" => AuditEntity::Device,
        _ => AuditEntity::IpAddress,
    };
    let id = caps["id"].parse().ok()?;
    Some((entity, id))
}

pub fn extract_from_reader<R: BufRead>(reader: R) -> io::Result<AuditIds> {
    let mut ids = AuditIds::default();
    for line in reader.split(b'\n') {
        let line = line?;
        match parse_line(&String::from_utf8_lossy(&line)) {
            Some((AuditEntity::Device, id)) => ids.devices.push(id),
            Some((AuditEntity::IpAddress, id)) => ids.ip_addresses.push(id),
            None => {}
        }
    }
    Ok(ids)
}

/// Scan a log file for success lines.
pub fn extract_success_ids(path: &Path) -> io::Result<AuditIds> {
    extract_from_reader(BufReader::new(File::open(path)?))
}
