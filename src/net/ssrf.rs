// Pure host/IP safety predicates for the outbound client's SSRF guard.
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const BLOCKED_HOST_SUFFIXES: &[&str] = &[".localhost"];
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "metadata.google.internal",
    "0.0.0.0",
    "169.254.169.254",
];

/// Reject hostnames the SSRF guard refuses before any DNS lookup happens.
pub fn is_private_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    if BLOCKED_HOSTS.contains(&host.as_str()) {
        return true;
    }
    if BLOCKED_HOST_SUFFIXES.iter().any(|suffix| host.ends_with(suffix)) {
        return true;
    }
    if let Ok(ip) = host.parse::<IpAddr>() {
        return is_private_ip(ip);
    }
    false
}

/// Reject IP addresses in private, loopback, link-local, or reserved ranges.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_ipv4(v4),
        IpAddr::V6(v6) => is_private_ipv6(v6),
    }
}

fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    let o = ip.octets();
    match o {
        [0, ..] => true,                                   // 0.0.0.0/8
        [10, ..] => true,                                  // 10.0.0.0/8
        [100, b, ..] if (64..=127).contains(&b) => true,   // 100.64.0.0/10
        [127, ..] => true,                                 // 127.0.0.0/8
        [169, 254, ..] => true,                             // 169.254.0.0/16
        [172, b, ..] if (16..=31).contains(&b) => true,     // 172.16.0.0/12
        [192, 0, 0, _] => true,                             // 192.0.0.0/24
        [192, 0, 2, _] => true,                             // 192.0.2.0/24 (TEST-NET-1)
        [192, 168, ..] => true,                             // 192.168.0.0/16
        [198, 18, _, _] | [198, 19, _, _] => true,           // 198.18.0.0/15
        [198, 51, 100, _] => true,                          // 198.51.100.0/24 (TEST-NET-2)
        [203, 0, 113, _] => true,                           // 203.0.113.0/24 (TEST-NET-3)
        [o0, ..] if o0 >= 224 => true,                      // 224.0.0.0/4 multicast + reserved
        _ => false,
    }
}

fn is_private_ipv6(ip: Ipv6Addr) -> bool {
    if ip.is_loopback() {
        return true;
    }
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_ipv4(v4);
    }

    let seg = ip.segments();
    // fc00::/7 (unique local)
    if (seg[0] & 0xfe00) == 0xfc00 {
        return true;
    }
    // fe80::/10 (link-local)
    if (seg[0] & 0xffc0) == 0xfe80 {
        return true;
    }
    // ff00::/8 (multicast)
    if (seg[0] & 0xff00) == 0xff00 {
        return true;
    }
    // 2001:db8::/32 (documentation)
    if seg[0] == 0x2001 && seg[1] == 0x0db8 {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_documented_private_hosts() {
        assert!(is_private_host("localhost"));
        assert!(is_private_host("foo.localhost"));
        assert!(is_private_host("metadata.google.internal"));
        assert!(is_private_host("169.254.169.254"));
        assert!(is_private_host("0.0.0.0"));
    }

    #[test]
    fn rejects_documented_private_ips() {
        for ip in ["127.0.0.1", "10.0.0.1", "169.254.169.254", "::1", "fc00::1", "fe80::1"] {
            let addr: IpAddr = ip.parse().unwrap();
            assert!(is_private_ip(addr), "{ip} should be rejected");
        }
    }

    #[test]
    fn accepts_public_ips() {
        for ip in ["8.8.8.8", "1.1.1.1", "2606:4700:4700::1111"] {
            let addr: IpAddr = ip.parse().unwrap();
            assert!(!is_private_ip(addr), "{ip} should be accepted");
        }
    }

    #[test]
    fn accepts_ordinary_hostnames() {
        assert!(!is_private_host("api.binance.com"));
        assert!(!is_private_host("api.bithumb.com"));
    }

    #[test]
    fn rejects_ipv4_mapped_private_ipv6() {
        let addr: IpAddr = "::ffff:10.0.0.1".parse().unwrap();
        assert!(is_private_ip(addr));
    }
}
