// SPDX-License-Identifier: MIT

use std::fs::OpenOptions;
use std::path::Path;

use colored::Colorize;
use ebgfs::ext::*;
use ebgio::prelude::StdBlockIO;

pub fn run(path: &Path) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("cannot open {}: {}", path.display(), e))?;

    let mut io = StdBlockIO::new(&mut file);
    // The checker reads the device itself, so a filesystem too corrupt to
    // open still produces findings instead of a hard failure.
    let mut checker = ExtChecker::new(&mut io);
    let report = checker.check_all().map_err(|e| anyhow::anyhow!("{}", e))?;

    for finding in &report.findings {
        let tag = match finding.sev {
            Severity::Info => "INFO".cyan(),
            Severity::Warn => "WARN".yellow(),
            Severity::Error => "ERR ".red().bold(),
        };
        crate::log_normal!("{tag}: {:<12} {}", finding.code, finding.msg);
    }

    let errors = report.count(Severity::Error);
    let warns = report.count(Severity::Warn);
    if errors > 0 {
        anyhow::bail!(
            "{}: {} error(s), {} warning(s)",
            path.display(),
            errors,
            warns
        );
    }
    crate::log_normal!("{}: clean ({} warning(s))", path.display(), warns);
    Ok(())
}
