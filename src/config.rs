use crate::error::{ReportError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable holding the access token used for cloning.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

const ENV_FILE_NAME: &str = ".env";

/// Key/value pairs read from a `.env` style file.
///
/// The values are kept here and handed to [`Credentials::resolve`]; the
/// process environment is never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    path: Option<PathBuf>,
    vars: HashMap<String, String>,
}

impl EnvFile {
    pub fn parse(contents: &str) -> Self {
        let mut vars = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                tracing::debug!(line, "skipping env line without '='");
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            // first definition wins, like an already exported variable
            vars.entry(key.to_string())
                .or_insert_with(|| unquote(value.trim()).to_string());
        }

        Self { path: None, vars }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ReportError::EnvFile {
            path: path.display().to_string(),
            source,
        })?;
        let mut file = Self::parse(&contents);
        file.path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), vars = file.vars.len(), "loaded env file");
        Ok(file)
    }

    /// Load `explicit` if given (a missing file is then an error), otherwise
    /// the first `.env` found in the working directory or next to the
    /// executable. Finding none yields an empty set.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for candidate in default_locations() {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }

        Ok(Self::default())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = Vec::with_capacity(2);
    if let Ok(cwd) = std::env::current_dir() {
        locations.push(cwd.join(ENV_FILE_NAME));
    }
    if let Some(dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        let candidate = dir.join(ENV_FILE_NAME);
        if !locations.contains(&candidate) {
            locations.push(candidate);
        }
    }
    locations
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    token: Option<String>,
}

// keep the token out of debug logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// A variable present in the environment (as seen through `env`) wins
    /// over the same key in `file`. Empty tokens count as absent.
    pub fn resolve<F>(env: F, file: &EnvFile) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = env(TOKEN_VAR)
            .or_else(|| file.get(TOKEN_VAR).map(str::to_string))
            .filter(|t| !t.trim().is_empty());
        Self { token }
    }

    pub fn from_process_env(file: &EnvFile) -> Self {
        Self::resolve(|key| std::env::var(key).ok(), file)
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Embed the token as userinfo for `https://` URLs; anything else is
    /// returned unchanged.
    pub fn clone_url(&self, repo_url: &str) -> String {
        match (&self.token, repo_url.strip_prefix("https://")) {
            (Some(token), Some(rest)) => format!("https://x-access-token:{token}@{rest}"),
            _ => repo_url.to_string(),
        }
    }
}

/// Strip any userinfo from a URL before it is shown or logged.
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://{}", &rest[at + 1..]),
        None => url.to_string(),
    }
}
