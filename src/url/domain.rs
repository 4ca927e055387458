use std::net::IpAddr;

/// Returns the registrable domain (eTLD+1) of a host
///
/// Uses the Public Suffix List so that `blog.example.co.uk` maps to `example.co.uk`.
/// IP addresses are returned unchanged; hosts unknown to the list fall back to their
/// last two labels.
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.parse::<IpAddr>().is_ok() {
        return host.to_string();
    }

    match psl::domain(host.as_bytes()) {
        Some(domain) => String::from_utf8_lossy(domain.as_bytes()).to_string(),
        None => last_two_labels(host),
    }
}

fn last_two_labels(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}

/// Checks whether `host` equals `root` or is one of its subdomains
pub fn is_within(host: &str, root: &str) -> bool {
    if root.is_empty() {
        return false;
    }
    host == root
        || host
            .strip_suffix(root)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("blog.example.com"), "example.com");
        assert_eq!(registrable_domain("example.com"), "example.com");
        assert_eq!(registrable_domain("a.b.example.co.uk"), "example.co.uk");
    }

    #[test]
    fn test_registrable_domain_ip() {
        assert_eq!(registrable_domain("127.0.0.1"), "127.0.0.1");
        assert_eq!(registrable_domain("[::1]"), "::1");
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("example.com", "example.com"));
        assert!(is_within("blog.example.com", "example.com"));
        assert!(is_within("deep.sub.example.com", "example.com"));
        assert!(!is_within("myexample.com", "example.com"));
        assert!(!is_within("example.com.org", "example.com"));
        assert!(!is_within("example.com", ""));
    }
}
