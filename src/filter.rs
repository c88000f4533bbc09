/// Suffixes counted when no `--ext` is given. `svelte` has no leading dot,
/// so any path ending in those letters matches.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".py", ".js", ".ts", ".jsx", ".tsx", "svelte", ".html", ".css"];

/// Plain suffix match over a fixed set; no extension parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    suffixes: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn is_target(&self, path: &str) -> bool {
        is_target(path, &self.suffixes)
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

pub fn is_target<S: AsRef<str>>(path: &str, suffixes: &[S]) -> bool {
    suffixes.iter().any(|s| path.ends_with(s.as_ref()))
}
