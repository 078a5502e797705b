//! Rate limit scopes

use std::fmt;

/// Independent cooldown namespace per user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitScope {
    /// Any write
    Global,
    /// Thread creation
    Thread,
    /// Reply creation
    Post,
}

impl RateLimitScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Thread => "thread",
            Self::Post => "post",
        }
    }
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
