/// Capability names indexed by bit position
pub const CAPABILITY_NAMES: [&str; 20] = [
    "TCB",
    "CommDD",
    "PowerMgmt",
    "MultimediaDD",
    "ReadDeviceData",
    "WriteDeviceData",
    "DRM",
    "TrustedUI",
    "ProtServ",
    "DiskAdmin",
    "NetworkControl",
    "AllFiles",
    "SwEvent",
    "NetworkServices",
    "LocalServices",
    "ReadUserData",
    "WriteUserData",
    "Location",
    "SurroundingsDD",
    "UserEnvironment",
];

/// The permission bitmask attached to an installable file
///
/// Bits 20 and above are kept in [`bits`](Capabilities::bits) but have no
/// name.
///
/// ```rust
/// use sisinfo::Capabilities;
/// let caps = Capabilities::from_bits((1 << 0) | (1 << 15) | (1 << 25));
/// assert_eq!(caps.names(), &["TCB", "ReadUserData"]);
/// assert_eq!(caps.bits(), 0x0200_8001);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Capabilities {
    bits: u64,
    names: Vec<&'static str>,
}

impl Capabilities {
    pub fn from_bits(bits: u64) -> Self {
        let names = CAPABILITY_NAMES
            .iter()
            .enumerate()
            .filter(|(i, _)| (bits >> i) & 1 == 1)
            .map(|(_, name)| *name)
            .collect();
        Capabilities { bits, names }
    }

    #[inline]
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Names of the set bits, in ascending bit order
    #[inline]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|x| *x == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_bits_zero_and_fifteen() {
        let caps = Capabilities::from_bits((1 << 0) | (1 << 15));
        assert_eq!(caps.names(), &["TCB", "ReadUserData"]);
        assert!(caps.contains("TCB"));
        assert!(!caps.contains("DRM"));
    }

    #[test]
    fn test_all_named_bits() {
        let caps = Capabilities::from_bits(0xf_ffff);
        assert_eq!(caps.names(), &CAPABILITY_NAMES[..]);
    }

    #[quickcheck]
    fn names_follow_low_bits(bits: u64) -> bool {
        let caps = Capabilities::from_bits(bits);
        let expected = (0..20).filter(|i| (bits >> i) & 1 == 1).count();
        caps.names().len() == expected && caps.bits() == bits
    }

    #[quickcheck]
    fn high_bits_have_no_names(bits: u64) -> bool {
        let caps = Capabilities::from_bits(bits);
        caps.names() == Capabilities::from_bits(bits & 0xf_ffff).names()
    }
}
