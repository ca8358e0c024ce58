/// Environment variable read by [`EnvCredentials::default`].
pub const TOKEN_ENV_VAR: &str = "MEMEFORGE_TOKEN";

/// Source of the bearer credential attached to persistence calls.
///
/// Queried at call time; `None` means the user is not logged in.
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, if any.
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token supplied by the host.
#[derive(Clone, Debug, Default)]
pub struct StaticCredentials(Option<String>);

impl StaticCredentials {
    /// Provider that always returns `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Provider with no credential.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        non_blank(self.0.clone())
    }
}

/// Token read from an environment variable on every call.
#[derive(Clone, Debug)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    /// Provider reading `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

impl CredentialProvider for EnvCredentials {
    fn bearer_token(&self) -> Option<String> {
        non_blank(std::env::var(&self.var).ok())
    }
}

fn non_blank(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
