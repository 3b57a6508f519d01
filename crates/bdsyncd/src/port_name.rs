//! Interface name utilities
//!
//! Devices and inventories spell the same port differently
//! ("GigabitEthernet0/0/1", "Gi0/0/1", "gi 0/0/1"). Matching goes through a
//! canonical short form.

/// Vendor interface type prefixes and their canonical short form
const PORT_TYPE_ALIASES: &[(&str, &str)] = &[
    ("hundredgigabitethernet", "hu"),
    ("hundredgige", "hu"),
    ("hu", "hu"),
    ("fortygigabitethernet", "fo"),
    ("fortygige", "fo"),
    ("fo", "fo"),
    ("tengigabitethernet", "te"),
    ("tengige", "te"),
    ("te", "te"),
    ("gigabitethernet", "gi"),
    ("gige", "gi"),
    ("gi", "gi"),
    ("ge", "gi"),
    ("fastethernet", "fa"),
    ("fa", "fa"),
    ("ethernet", "et"),
    ("eth", "et"),
    ("et", "et"),
    ("port-channel", "po"),
    ("portchannel", "po"),
    ("po", "po"),
    ("loopback", "lo"),
    ("lo", "lo"),
    ("tunnel", "tu"),
    ("tu", "tu"),
    ("serial", "se"),
    ("se", "se"),
];

/// Canonical form of an interface name
///
/// Whitespace is removed, the name is lowercased and the alphabetic type
/// prefix is replaced by its short form. Names with an unknown prefix are
/// only lowercased.
///
/// Examples:
/// - "GigabitEthernet0/0/1" → "gi0/0/1"
/// - "Gi 0/0/1" → "gi0/0/1"
/// - "TenGigabitEthernet0/0/24" → "te0/0/24"
/// - "BDI100" → "bdi100"
pub fn normalize_port_name(name: &str) -> String {
    let compact: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    let split = compact
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '-'))
        .unwrap_or(compact.len());
    let (prefix, rest) = compact.split_at(split);

    match PORT_TYPE_ALIASES.iter().find(|(alias, _)| *alias == prefix) {
        Some((_, short)) => format!("{}{}", short, rest),
        None => compact,
    }
}

/// Parse sub-interface name into (parent, unit)
///
/// Examples:
/// - "GigabitEthernet0/0/2.200" → ("GigabitEthernet0/0/2", "200")
/// - "Po1.30" → ("Po1", "30")
///
/// Returns None if the name is not a valid sub-interface
pub fn split_subinterface(name: &str) -> Option<(&str, &str)> {
    let dot_pos = name.rfind('.')?;
    let parent = &name[..dot_pos];
    let unit = &name[dot_pos + 1..];

    if parent.is_empty() || unit.is_empty() || !unit.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((parent, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_and_short_forms_match() {
        assert_eq!(
            normalize_port_name("GigabitEthernet0/0/1"),
            normalize_port_name("gi0/0/1")
        );
        assert_eq!(normalize_port_name("GigabitEthernet0/0/1"), "gi0/0/1");
        assert_eq!(normalize_port_name("TenGigabitEthernet0/0/24"), normalize_port_name("Te0/0/24"));
        assert_eq!(normalize_port_name("Port-channel1"), normalize_port_name("Po1"));
        assert_eq!(normalize_port_name("FastEthernet0/1"), normalize_port_name("fa0/1"));
    }

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(normalize_port_name("  Gi 0/0/1 "), "gi0/0/1");
        assert_eq!(normalize_port_name("GE0/0/1"), "gi0/0/1");
    }

    #[test]
    fn test_unknown_prefix_is_lowercased() {
        assert_eq!(normalize_port_name("BDI100"), "bdi100");
        assert_eq!(normalize_port_name("mgmt0"), "mgmt0");
    }

    #[test]
    fn test_prefix_is_matched_whole() {
        // "gigabitethernet" must not be read as "gi" + "gabitethernet"
        assert_eq!(normalize_port_name("gigabitethernet1"), "gi1");
        assert_ne!(normalize_port_name("Tunnel1"), normalize_port_name("Te1"));
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(normalize_port_name(""), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for name in ["GigabitEthernet0/0/1", "Te0/1", "Loopback0", "weird/1"] {
            let once = normalize_port_name(name);
            assert_eq!(normalize_port_name(&once), once);
        }
    }

    #[test]
    fn test_split_subinterface() {
        assert_eq!(
            split_subinterface("GigabitEthernet0/0/2.200"),
            Some(("GigabitEthernet0/0/2", "200"))
        );
        assert_eq!(split_subinterface("Po1.30"), Some(("Po1", "30")));
        assert!(split_subinterface("GigabitEthernet0/0/2").is_none());
        assert!(split_subinterface("Gi0/0/2.abc").is_none());
        assert!(split_subinterface("Gi0/0/2.").is_none());
        assert!(split_subinterface(".100").is_none());
    }
}
