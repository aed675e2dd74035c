// SPDX-License-Identifier: MIT

#[cfg(all(not(feature = "std"), feature = "alloc"))]
use alloc::{string::String, vec::Vec};

use core::fmt;

use bitflags::bitflags;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug)]
pub struct Finding {
    pub sev: Severity,
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
        self.findings
            .iter()
            .any(|f| matches!(f.sev, Severity::Error))
    }

    pub fn ok(&self) -> bool {
        !self.has_error()
    }

    pub fn push(&mut self, f: Finding) {
        self.findings.push(f)
    }

    pub fn count(&self, s: Severity) -> usize {
        self.findings.iter().filter(|f| f.sev == s).count()
    }

    /// Display with options (filtering, prefix, summary...)
    pub fn display_with<'a>(&'a self, opts: ReportDisplayOpts) -> ReportDisplay<'a> {
        ReportDisplay { rep: self, opts }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ReportDisplayOpts {
    pub min_level: Severity,
    pub prefix: &'static str,
    pub show_summary: bool,
    pub pad_code: usize,
}

impl Default for ReportDisplayOpts {
    fn default() -> Self {
        Self {
            min_level: Severity::Info,
            prefix: "",
            show_summary: false,
            pad_code: 12,
        }
    }
}

pub struct ReportDisplay<'a> {
    rep: &'a VerifyReport,
    opts: ReportDisplayOpts,
}

impl<'a> fmt::Display for ReportDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut n_info = 0usize;
        let mut n_warn = 0usize;
        let mut n_err = 0usize;

        for it in &self.rep.findings {
            if it.sev < self.opts.min_level {
                continue;
            }
            let tag = match it.sev {
                Severity::Info => "INFO",
                Severity::Warn => "WARN",
                Severity::Error => "ERR ",
            };
            match it.sev {
                Severity::Info => n_info += 1,
                Severity::Warn => n_warn += 1,
                Severity::Error => n_err += 1,
            }

            writeln!(
                f,
                "{}{tag}: {:<width$} {}",
                self.opts.prefix,
                it.code,
                it.msg,
                width = self.opts.pad_code
            )?;
        }

        if self.opts.show_summary {
            writeln!(
                f,
                "{}Summary: errors={}  warns={}  infos={}",
                self.opts.prefix, n_err, n_warn, n_info
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_with(ReportDisplayOpts::default()).fmt(f)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug)]
    pub struct VerifyPhases: u32 {
        const SUPER       = 1 << 0;
        const GEOMETRY    = 1 << 1;
        const DESCRIPTORS = 1 << 2;
        const BITMAPS     = 1 << 3;
        const CUSTOM      = 1 << 4; // free for FS
        const ALL         = u32::MAX;
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
