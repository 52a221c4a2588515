#[derive(Debug, Clone)]
pub struct ProxyURL(String);

impl AsRef<str> for ProxyURL {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ProxyURL {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }
}
