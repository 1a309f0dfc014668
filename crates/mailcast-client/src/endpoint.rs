/// Base URL plus the bearer credential sent on every call.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    token:    String,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    pub fn token(&self) -> &str { &self.token }

    pub fn url(&self, path: &str) -> String { format!("{}/{}", self.base_url, path.trim_start_matches('/')) }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let endpoint = Endpoint::new("https://api.example.com/", "t");
        assert_eq!(endpoint.url("broadcast_mails"), "https://api.example.com/broadcast_mails");
        assert_eq!(endpoint.url("/broadcast_mails/3"), "https://api.example.com/broadcast_mails/3");
    }

    #[test]
    fn test_debug_hides_token() {
        let endpoint = Endpoint::new("http://localhost", "secret");
        assert!(!format!("{endpoint:?}").contains("secret"));
    }
}
