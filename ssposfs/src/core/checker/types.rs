// SPDX-License-Identifier: MIT

use alloc::{string::String, vec::Vec};
use core::fmt;

use bitflags::bitflags;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// One observation made by a checker phase.
#[derive(Clone, Debug)]
pub struct Finding {
    pub sev: Severity,
    /// Stable machine-readable code, e.g. `"BITMAP.LEAK"`.
    pub code: &'static str,
    pub msg: String,
}

impl Finding {
    pub fn info(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Info,
            code,
            msg: msg.into(),
        }
    }
    pub fn warn(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Warn,
            code,
            msg: msg.into(),
        }
    }
    pub fn err(code: &'static str, msg: impl Into<String>) -> Self {
        Self {
            sev: Severity::Error,
            code,
            msg: msg.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct VerifyReport {
    pub findings: Vec<Finding>,
}

impl VerifyReport {
    pub fn has_error(&self) -> bool {
        self.findings.iter().any(|f| f.sev == Severity::Error)
    }

    pub fn first_error(&self) -> Option<&str> {
        self.findings
            .iter()
            .find(|f| f.sev == Severity::Error)
            .map(|f| f.msg.as_str())
    }

    pub fn push(&mut self, f: Finding) {
        self.findings.push(f)
    }

    pub fn count(&self, s: Severity) -> usize {
        self.findings.iter().filter(|f| f.sev == s).count()
    }

    /// True if any finding carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }

    /// Findings at or above `min`.
    pub fn at_least(&self, min: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.sev >= min)
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for it in &self.findings {
            let tag = match it.sev {
                Severity::Info => "INFO",
                Severity::Warn => "WARN",
                Severity::Error => "ERR ",
            };
            writeln!(f, "{tag}: {:<16} {}", it.code, it.msg)?;
        }
        writeln!(
            f,
            "Summary: errors={}  warns={}  infos={}",
            self.count(Severity::Error),
            self.count(Severity::Warn),
            self.count(Severity::Info)
        )
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VerifyPhases: u32 {
        const SUPERBLOCK = 1 << 0;
        const GEOMETRY   = 1 << 1;
        const TREE       = 1 << 2;
        const BITMAP     = 1 << 3;
        const SIZES      = 1 << 4;
        const ALL        = u32::MAX;
    }
}

/// Generic options that the FS can encapsulate/extend.
pub trait VerifierOptionsLike {
    fn phases(&self) -> VerifyPhases {
        VerifyPhases::ALL
    }
    fn fail_fast(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_report_queries() {
        let mut rep = VerifyReport::default();
        assert!(!rep.has_error());

        rep.push(Finding::info("TREE", "2 dirs"));
        rep.push(Finding::warn("TOMBSTONES", "1 tombstone"));
        assert!(!rep.has_error());

        rep.push(Finding::err("BITMAP.LEAK", "block 4100 allocated but unreachable"));
        assert!(rep.has_error());
        assert!(rep.has_code("BITMAP.LEAK"));
        assert_eq!(rep.first_error(), Some("block 4100 allocated but unreachable"));
        assert_eq!(rep.at_least(Severity::Warn).count(), 2);

        let text = rep.to_string();
        assert!(text.contains("ERR : BITMAP.LEAK"));
        assert!(text.contains("Summary: errors=1  warns=1  infos=1"));
    }
}
