//! Severity classification for notifications
//!
//! - WARNING: capture stalled or brightness jumped; always pushed
//! - INFO: monitor lifecycle (start / stop)

use serde::{Deserialize, Serialize};

/// Severity level for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Severity::Warning => 2,
            Severity::Info => 1,
        }
    }
}

/// 检查 severity 是否满足渠道的最低要求
pub fn severity_meets_threshold(severity: Severity, min_severity: Severity) -> bool {
    severity.rank() >= min_severity.rank()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_meets_threshold() {
        assert!(severity_meets_threshold(Severity::Warning, Severity::Warning));
        assert!(severity_meets_threshold(Severity::Warning, Severity::Info));
        assert!(severity_meets_threshold(Severity::Info, Severity::Info));
        assert!(!severity_meets_threshold(Severity::Info, Severity::Warning));
    }

    #[test]
    fn test_severity_serde() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"WARNING\"");
        let parsed: Severity = serde_json::from_str("\"INFO\"").unwrap();
        assert_eq!(parsed, Severity::Info);
    }
}
