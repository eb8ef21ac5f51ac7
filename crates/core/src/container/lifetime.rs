use serde::{Deserialize, Serialize};

/// Binding lifetime enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// Built once, on first resolution, and shared afterwards
    Singleton,
    /// Built anew on every resolution
    Multiple,
}

impl Lifetime {
    /// Check if the lifetime is singleton
    pub fn is_singleton(&self) -> bool {
        matches!(self, Lifetime::Singleton)
    }

    /// Check if the lifetime is multiple (transient)
    pub fn is_multiple(&self) -> bool {
        matches!(self, Lifetime::Multiple)
    }

    /// Get the lifetime name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Multiple => "multiple",
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Lifetime {
    type Err = crate::config::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(Lifetime::Singleton),
            "multiple" | "transient" => Ok(Lifetime::Multiple),
            _ => Err(crate::config::ConfigError::invalid_value(
                "lifetime",
                s,
                "singleton, multiple or transient",
            )),
        }
    }
}
