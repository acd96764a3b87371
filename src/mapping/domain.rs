//! CDN domain validation.
//!
//! A CDN domain is an RFC 3986 authority: optional userinfo, a host (name,
//! IPv4 or bracketed IPv6 literal) and an optional port. Nothing else.

use url::Url;

/// Characters that would introduce a path, query or fragment.
const FORBIDDEN: &[char] = &['/', '\\', '?', '#'];

/// Returns true if `candidate` is a bare authority such as `cdn.example.com`,
/// `10.0.0.1:8080` or `user@[::1]:443`.
pub fn is_valid_domain(candidate: &str) -> bool {
    if candidate.is_empty()
        || candidate.trim() != candidate
        || candidate.contains(FORBIDDEN)
    {
        return false;
    }

    // Add a scheme so that we have a parseable URL.
    match Url::parse(&format!("https://{}", candidate)) {
        Ok(url) => {
            url.host().is_some()
                && url.path() == "/"
                && url.query().is_none()
                && url.fragment().is_none()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_authorities() {
        assert!(is_valid_domain("cdn.com"));
        assert!(is_valid_domain("cdn.example.com"));
        assert!(is_valid_domain("cdn.example.com:8080"));
        assert!(is_valid_domain("127.0.0.1"));
        assert!(is_valid_domain("127.0.0.1:3000"));
        assert!(is_valid_domain("[::1]"));
        assert!(is_valid_domain("[2001:db8::1]:443"));
        assert!(is_valid_domain("user:secret@cdn.example.com"));
        assert!(is_valid_domain("cdn"));
    }

    #[test]
    fn test_rejects_paths_queries_fragments() {
        assert!(!is_valid_domain("cdn.example.com/"));
        assert!(!is_valid_domain("cdn.example.com/files"));
        assert!(!is_valid_domain("cdn.example.com?x=1"));
        assert!(!is_valid_domain("cdn.example.com#top"));
        assert!(!is_valid_domain("//cdn.example.com"));
        assert!(!is_valid_domain("https://cdn.example.com"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain(" cdn.example.com"));
        assert!(!is_valid_domain("cdn.example.com:port"));
        assert!(!is_valid_domain("cdn example.com"));
        assert!(!is_valid_domain("cdn.example.com\\x"));
    }
}
