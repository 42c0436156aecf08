// Records reported by a UniFi controller.

use serde::{Deserialize, Serialize};

/// Port media that maps to a copper gigabit interface template.
pub const GIGABIT_MEDIA: &str = "GE";

/// A site as listed by one controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSite {
    /// Human-facing label (`desc`), used for mapping to NetBox.
    pub display_name: String,
    /// Internal reference used in site-scoped API paths.
    pub internal_name: String,
}

/// One port from a device's port table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub media: Option<String>,
}

impl Port {
    pub fn is_gigabit(&self) -> bool {
        self.media.as_deref() == Some(GIGABIT_MEDIA)
    }
}

/// A physical unit adopted by a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub model: String,
    pub mac: String,
    pub ip: Option<String>,
    pub serial: Option<String>,
    /// Raw access-point flag as the controller reported it.
    pub is_access_point: Option<String>,
    pub ports: Vec<Port>,
}

impl Device {
    /// Case-insensitive `"true"` check on the access-point flag.
    pub fn is_wireless(&self) -> bool {
        self.is_access_point
            .as_deref()
            .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"))
    }

    /// Serial number, treating an empty string as absent.
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(flag: Option<&str>, serial: Option<&str>) -> Device {
        Device {
            name: "ap-lobby".into(),
            model: "U6-Lite".into(),
            mac: "aa:bb:cc:00:00:01".into(),
            ip: Some("10.0.0.10".into()),
            serial: serial.map(Into::into),
            is_access_point: flag.map(Into::into),
            ports: Vec::new(),
        }
    }

    #[test]
    fn access_point_flag_is_case_insensitive() {
        assert!(device(Some("True"), None).is_wireless());
        assert!(device(Some("TRUE"), None).is_wireless());
        assert!(!device(Some("false"), None).is_wireless());
        assert!(!device(Some("yes"), None).is_wireless());
        assert!(!device(None, None).is_wireless());
    }

    #[test]
    fn blank_serial_counts_as_missing() {
        assert_eq!(device(None, Some("")).serial(), None);
        assert_eq!(device(None, Some("  ")).serial(), None);
        assert_eq!(device(None, Some("F09F")).serial(), Some("F09F"));
    }

    #[test]
    fn only_ge_ports_are_gigabit() {
        let ge = Port {
            name: "Port 1".into(),
            media: Some("GE".into()),
        };
        let sfp = Port {
            name: "SFP 1".into(),
            media: Some("SFP+".into()),
        };
        assert!(ge.is_gigabit());
        assert!(!sfp.is_gigabit());
    }
}
