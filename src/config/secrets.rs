//! Secret references and their one-time resolution.
//!
//! # Security
//! - Secret values are never logged or serialized
//! - `Secret` redacts itself in `Debug` output
//! - Resolution reads the environment once, at registry load

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Indirection to a secret value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SecretRef {
    /// Read from an environment variable, with an optional fallback.
    Env {
        env: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<String>,
    },
    /// Inline placeholder (explorers that accept any key).
    Literal { literal: String },
}

impl SecretRef {
    /// Reference to an environment variable without a fallback.
    pub fn env(name: impl Into<String>) -> Self {
        SecretRef::Env {
            env: name.into(),
            fallback: None,
        }
    }

    /// Inline placeholder value.
    pub fn literal(value: impl Into<String>) -> Self {
        SecretRef::Literal {
            literal: value.into(),
        }
    }

    /// Resolve against an environment source.
    pub fn resolve(&self, source: &dyn EnvSource) -> Secret {
        match self {
            SecretRef::Env { env, fallback } => match source.var(env) {
                Some(value) if !value.is_empty() => Secret::new(value, SecretOrigin::Env),
                _ => match fallback {
                    Some(value) => {
                        if value.is_empty() {
                            tracing::warn!(
                                env = %env,
                                "Environment variable unset, falling back to an empty value"
                            );
                        }
                        Secret::new(value.clone(), SecretOrigin::Fallback)
                    }
                    None => Secret::new(String::new(), SecretOrigin::Unset),
                },
            },
            SecretRef::Literal { literal } => Secret::new(literal.clone(), SecretOrigin::Literal),
        }
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretRef::Env { env, .. } => write!(f, "${}", env),
            SecretRef::Literal { .. } => write!(f, "<literal>"),
        }
    }
}

/// Where a resolved secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretOrigin {
    Env,
    Fallback,
    Literal,
    Unset,
}

/// A resolved secret value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    value: String,
    origin: SecretOrigin,
}

impl Secret {
    fn new(value: String, origin: SecretOrigin) -> Self {
        Self { value, origin }
    }

    /// The raw value. Callers must not log it.
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// True when the value is empty, whatever its origin.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn origin(&self) -> SecretOrigin {
        self.origin
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("origin", &self.origin)
            .field("value", &if self.is_empty() { "<empty>" } else { "<redacted>" })
            .finish()
    }
}

/// Source of environment variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Load `.env` from the working directory (if any) into the process
    /// environment, then return the source.
    pub fn with_dotenv() -> Self {
        match dotenv::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, ".env file could not be read"),
        }
        ProcessEnv
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
