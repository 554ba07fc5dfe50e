/// A partial-refresh request, identified by its exact serialized URL.
///
/// Two requests are the same request iff their URLs are byte-equal; query
/// parameter order therefore matters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PendingRequest {
    pub url: String,
}

impl PendingRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// `endpoint?query`, or just `endpoint` for an empty query.
    pub fn for_query(endpoint: &str, query: &str) -> Self {
        if query.is_empty() {
            Self::new(endpoint)
        } else {
            Self::new(format!("{endpoint}?{query}"))
        }
    }

    pub fn is(&self, url: &str) -> bool {
        self.url == url
    }
}

#[cfg(test)]
mod tests {
    use super::PendingRequest;

    #[test]
    fn joins_endpoint_and_query() {
        let r = PendingRequest::for_query("/entreprises", "j=boulanger&d=10");
        assert_eq!(r.url, "/entreprises?j=boulanger&d=10");
        assert_eq!(PendingRequest::for_query("/entreprises", "").url, "/entreprises");
    }

    #[test]
    fn identity_is_exact_url() {
        let r = PendingRequest::new("/entreprises?a=1&b=2");
        assert!(r.is("/entreprises?a=1&b=2"));
        assert!(!r.is("/entreprises?b=2&a=1"));
    }
}
