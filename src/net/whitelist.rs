//! Accept-time IP whitelist.
//!
//! An empty whitelist admits every peer. Otherwise only listed addresses
//! get past accept; everyone else is dropped before any bytes are read.

use std::collections::HashSet;
use std::net::{AddrParseError, IpAddr};

#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    ips: HashSet<IpAddr>,
}

impl Whitelist {
    pub fn new(ips: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            ips: ips.into_iter().map(|ip| ip.to_canonical()).collect(),
        }
    }

    /// Build from configured address strings.
    pub fn from_config(entries: &[String]) -> Result<Self, AddrParseError> {
        let ips = entries
            .iter()
            .map(|s| s.trim().parse::<IpAddr>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(ips))
    }

    pub fn is_enabled(&self) -> bool {
        !self.ips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    pub fn allows(&self, ip: IpAddr) -> bool {
        self.ips.is_empty() || self.ips.contains(&ip.to_canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn empty_allows_everyone() {
        let wl = Whitelist::default();
        assert!(!wl.is_enabled());
        assert!(wl.allows(ip("203.0.113.9")));
        assert!(wl.allows(ip("::1")));
    }

    #[test]
    fn members_only() {
        let wl = Whitelist::from_config(&["10.0.0.1".into(), " 10.0.0.2 ".into()]).unwrap();
        assert!(wl.is_enabled());
        assert_eq!(wl.len(), 2);
        assert!(wl.allows(ip("10.0.0.2")));
        assert!(!wl.allows(ip("10.0.0.3")));
        assert!(!wl.allows(ip("127.0.0.1")));
    }

    #[test]
    fn mapped_v6_matches_v4_entry() {
        let wl = Whitelist::new([ip("192.0.2.1")]);
        assert!(wl.allows(ip("::ffff:192.0.2.1")));
    }

    #[test]
    fn bad_entry_rejected() {
        assert!(Whitelist::from_config(&["10.0.0.1".into(), "nope".into()]).is_err());
    }
}
