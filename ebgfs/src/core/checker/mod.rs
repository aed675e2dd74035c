// SPDX-License-Identifier: MIT

mod types;

pub use types::{
    Finding, ReportDisplay, ReportDisplayOpts, Severity, VerifierOptionsLike, VerifyPhases,
    VerifyReport,
};

pub use crate::core::errors::{CheckError, CheckResult};

/// Trait for verifying the integrity of a filesystem.
///
/// Implemented per filesystem family to run its consistency phases
/// (superblock validity, geometry, descriptor checksums, bitmap accounting).
pub trait FsChecker {
    type Options: VerifierOptionsLike + Default;

    fn check_with(&mut self, opt: &Self::Options) -> CheckResult<VerifyReport> {
        let mut rep = VerifyReport::default();
        self.run_phase(opt, &mut rep, VerifyPhases::SUPER, Self::check_super)?;
        self.run_phase(opt, &mut rep, VerifyPhases::GEOMETRY, Self::check_geometry)?;
        self.run_phase(
            opt,
            &mut rep,
            VerifyPhases::DESCRIPTORS,
            Self::check_descriptors,
        )?;
        self.run_phase(opt, &mut rep, VerifyPhases::BITMAPS, Self::check_bitmaps)?;
        self.run_phase(opt, &mut rep, VerifyPhases::CUSTOM, Self::check_custom)?;
        Ok(rep)
    }

    fn check_all(&mut self) -> CheckResult<VerifyReport> {
        self.check_with(&Self::Options::default())
    }

    /// Cheap pass/fail probe, no report.
    fn fast_check(&mut self) -> CheckResult {
        Ok(())
    }

    fn check_super(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> CheckResult<()> {
        Ok(())
    }
    fn check_geometry(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut VerifyReport,
    ) -> CheckResult<()> {
        Ok(())
    }
    fn check_descriptors(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut VerifyReport,
    ) -> CheckResult<()> {
        Ok(())
    }
    fn check_bitmaps(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> CheckResult<()> {
        Ok(())
    }
    fn check_custom(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> CheckResult<()> {
        Ok(())
    }

    fn run_phase<F>(
        &mut self,
        opt: &Self::Options,
        rep: &mut VerifyReport,
        phase: VerifyPhases,
        f: F,
    ) -> CheckResult<()>
    where
        F: Fn(&mut Self, &Self::Options, &mut VerifyReport) -> CheckResult<()>,
    {
        if opt.fail_fast() && rep.has_error() {
            return Ok(());
        }
        if opt.phases().contains(phase) {
            f(self, opt, rep)?;
        }
        Ok(())
    }
}
