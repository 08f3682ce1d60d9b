//! IP address and prefix types with scope helpers.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// An IPv4 or IPv6 address as assigned to a device port.
///
/// Serializes as its textual form (`"10.0.0.1"`, `"fe80::1"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpAddress(IpAddr);

impl IpAddress {
    pub const fn new(addr: IpAddr) -> Self {
        IpAddress(addr)
    }

    pub const fn inner(&self) -> IpAddr {
        self.0
    }

    /// Returns true if this is an IPv4 address.
    pub const fn is_ipv4(&self) -> bool {
        matches!(self.0, IpAddr::V4(_))
    }

    /// Returns true if this address has link-local scope
    /// (169.254.0.0/16 for IPv4, fe80::/10 for IPv6).
    pub fn is_link_local(&self) -> bool {
        match self.0 {
            IpAddr::V4(v4) => v4.is_link_local(),
            IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
        }
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IpAddr>()
            .map(IpAddress)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl From<IpAddr> for IpAddress {
    fn from(addr: IpAddr) -> Self {
        IpAddress(addr)
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        IpAddress(IpAddr::V4(addr))
    }
}

impl From<Ipv6Addr> for IpAddress {
    fn from(addr: Ipv6Addr) -> Self {
        IpAddress(IpAddr::V6(addr))
    }
}

impl From<IpAddress> for IpAddr {
    fn from(addr: IpAddress) -> Self {
        addr.0
    }
}

/// An address with prefix length in CIDR notation (e.g., 10.0.0.5/24).
///
/// Used for static port addressing, so the host bits are kept as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpPrefix {
    address: IpAddress,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new IP prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length is invalid for the address type
    /// (>32 for IPv4, >128 for IPv6).
    pub fn new(address: IpAddress, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = if address.is_ipv4() { 32 } else { 128 };

        if prefix_len > max_len {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for address type",
                prefix_len, max_len
            )));
        }

        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Returns the address part of this prefix.
    pub const fn address(&self) -> &IpAddress {
        &self.address
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, len_str) = s
            .rsplit_once('/')
            .ok_or_else(|| ParseError::InvalidIpPrefix(s.to_string()))?;

        let address: IpAddress = addr_str.parse()?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        IpPrefix::new(address, prefix_len)
    }
}

impl TryFrom<String> for IpPrefix {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IpPrefix> for String {
    fn from(prefix: IpPrefix) -> Self {
        prefix.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_link_local_v4() {
        let addr: IpAddress = "169.254.10.1".parse().unwrap();
        assert!(addr.is_link_local());

        let addr: IpAddress = "10.1.2.3".parse().unwrap();
        assert!(!addr.is_link_local());
    }

    #[test]
    fn test_link_local_v6() {
        let link_local: IpAddress = "fe80::1".parse().unwrap();
        assert!(link_local.is_link_local());

        let upper: IpAddress = "febf::1".parse().unwrap();
        assert!(upper.is_link_local());

        let global: IpAddress = "2001:db8::1".parse().unwrap();
        assert!(!global.is_link_local());
    }

    #[test]
    fn test_ip_address_discrimination() {
        let v4: IpAddress = "10.0.0.1".parse().unwrap();
        assert!(v4.is_ipv4());

        let v6: IpAddress = "::1".parse().unwrap();
        assert!(!v6.is_ipv4());
    }

    #[test]
    fn test_invalid_address() {
        assert_eq!(
            "10.0.0".parse::<IpAddress>(),
            Err(ParseError::InvalidIpAddress("10.0.0".to_string()))
        );
    }

    #[test]
    fn test_ip_prefix_parse() {
        let prefix: IpPrefix = "192.168.1.10/24".parse().unwrap();
        assert_eq!(prefix.prefix_len(), 24);
        assert_eq!(prefix.address().to_string(), "192.168.1.10");
        assert_eq!(prefix.to_string(), "192.168.1.10/24");
    }

    #[test]
    fn test_invalid_prefix_length() {
        assert!("10.0.0.0/33".parse::<IpPrefix>().is_err());
        assert!("2001:db8::/129".parse::<IpPrefix>().is_err());
        assert!("10.0.0.0".parse::<IpPrefix>().is_err());
    }

    #[test]
    fn test_serde_text_form() {
        let prefix: IpPrefix = "10.0.0.5/24".parse().unwrap();
        let json = serde_json::to_string(&prefix).unwrap();
        assert_eq!(json, "\"10.0.0.5/24\"");

        let addr: IpAddress = serde_json::from_str("\"fe80::1\"").unwrap();
        assert!(addr.is_link_local());
    }
}
