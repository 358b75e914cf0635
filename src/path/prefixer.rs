//! Path prefixing
//!
//! Maps canonical paths into one backend's namespace (a root directory,
//! a bucket prefix, a remote working directory) and back.

const SEPARATORS: &[char] = &['/', '\\'];

/// Backend-specific trim applied to the remainder of a stripped path.
pub type StripStrategy = fn(&str) -> &str;

fn keep_as_is(path: &str) -> &str {
    path
}

fn trim_leading_slash(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Prefixes and strips one mounted root. Immutable once built.
#[derive(Debug, Clone)]
pub struct PathPrefixer {
    prefix: String,
    separator: String,
    strip_strategy: StripStrategy,
}

impl PathPrefixer {
    /// Builds a prefixer for `prefix` using `/` as separator.
    pub fn new(prefix: &str) -> Self {
        Self::with_separator(prefix, "/")
    }

    pub fn with_separator(prefix: &str, separator: &str) -> Self {
        let trimmed = prefix.trim_end_matches(SEPARATORS);
        // A root of exactly one separator ("/") keeps it.
        let stored = if !trimmed.is_empty() || prefix == separator {
            format!("{trimmed}{separator}")
        } else {
            String::new()
        };

        Self {
            prefix: stored,
            separator: separator.to_string(),
            strip_strategy: keep_as_is,
        }
    }

    /// Prefixer for object stores, whose keys never carry a leading `/`.
    pub fn for_object_store(prefix: &str) -> Self {
        Self::with_separator(prefix.trim_start_matches('/'), "/")
            .with_strip_strategy(trim_leading_slash)
    }

    /// Replaces the trim applied after the stored prefix is cut off.
    pub fn with_strip_strategy(mut self, strategy: StripStrategy) -> Self {
        self.strip_strategy = strategy;
        self
    }

    /// The stored prefix, including its single trailing separator.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn prefix_path(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path.trim_start_matches(SEPARATORS))
    }

    /// Cuts the stored prefix off by length.
    ///
    /// Callers must only pass paths that carry the stored prefix; anything
    /// else yields an unspecified (but non-panicking) slice.
    pub fn strip_prefix<'a>(&self, path: &'a str) -> &'a str {
        let rest = path.get(self.prefix.len()..).unwrap_or("");
        (self.strip_strategy)(rest)
    }

    pub fn prefix_directory_path(&self, path: &str) -> String {
        let prefixed = self.prefix_path(path.trim_end_matches(SEPARATORS));

        if prefixed.is_empty() || prefixed.ends_with(self.separator.as_str()) {
            prefixed
        } else {
            prefixed + &self.separator
        }
    }

    pub fn strip_directory_prefix<'a>(&self, path: &'a str) -> &'a str {
        self.strip_prefix(path).trim_end_matches(SEPARATORS)
    }
}
