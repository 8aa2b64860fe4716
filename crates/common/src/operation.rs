//! Remote operations that can be requested against a collection

use crate::SyncError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested remote action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Create a new collection; the service assigns the identifier
    Import,
    /// Replace an existing collection
    Update,
    Fetch,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Import,
        Operation::Update,
        Operation::Fetch,
        Operation::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Import => "import",
            Operation::Update => "update",
            Operation::Fetch => "fetch",
            Operation::Delete => "delete",
        }
    }

    /// Whether the remote call addresses an existing collection by id
    pub fn requires_identifier(&self) -> bool {
        !matches!(self, Operation::Import)
    }

    /// Whether the operation sends a collection document as its body
    pub fn carries_document(&self) -> bool {
        matches!(self, Operation::Import | Operation::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SyncError::UnknownOperation {
                operation: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operation() {
        assert_eq!("import".parse::<Operation>().unwrap(), Operation::Import);
        assert_eq!(" UPDATE ".parse::<Operation>().unwrap(), Operation::Update);
        assert_eq!("Delete".parse::<Operation>().unwrap(), Operation::Delete);
    }

    #[test]
    fn test_parse_unknown_operation() {
        let err = "patch".parse::<Operation>().unwrap_err();
        assert!(matches!(err, SyncError::UnknownOperation { ref operation } if operation == "patch"));
    }

    #[test]
    fn test_identifier_requirements() {
        assert!(!Operation::Import.requires_identifier());
        assert!(Operation::Update.requires_identifier());
        assert!(Operation::Fetch.requires_identifier());
        assert!(Operation::Delete.requires_identifier());
        assert!(Operation::Update.carries_document());
        assert!(!Operation::Fetch.carries_document());
    }
}
