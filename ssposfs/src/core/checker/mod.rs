// SPDX-License-Identifier: MIT

mod types;

pub use types::{Finding, Severity, VerifierOptionsLike, VerifyPhases, VerifyReport};

pub use crate::core::errors::{FsCheckerError, FsCheckerResult};

/// Trait for verifying the integrity of a filesystem.
///
/// Each phase pushes [`Finding`]s into the report. A phase returns `Err` only
/// when the volume cannot be read at all; structural problems are findings.
pub trait FsChecker {
    type Options: VerifierOptionsLike + Default;

    fn check_with(&mut self, opt: &Self::Options) -> FsCheckerResult<VerifyReport> {
        let mut rep = VerifyReport::default();
        self.run_phase(opt, &mut rep, VerifyPhases::SUPERBLOCK, Self::check_superblock)?;
        self.run_phase(opt, &mut rep, VerifyPhases::GEOMETRY, Self::check_geometry)?;
        self.run_phase(opt, &mut rep, VerifyPhases::TREE, Self::check_tree)?;
        self.run_phase(opt, &mut rep, VerifyPhases::BITMAP, Self::check_bitmap)?;
        self.run_phase(opt, &mut rep, VerifyPhases::SIZES, Self::check_sizes)?;
        Ok(rep)
    }

    fn check_all(&mut self) -> FsCheckerResult<VerifyReport> {
        self.check_with(&Self::Options::default())
    }

    fn check_superblock(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut VerifyReport,
    ) -> FsCheckerResult {
        Ok(())
    }
    fn check_geometry(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut VerifyReport,
    ) -> FsCheckerResult {
        Ok(())
    }
    fn check_tree(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> FsCheckerResult {
        Ok(())
    }
    fn check_bitmap(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut VerifyReport,
    ) -> FsCheckerResult {
        Ok(())
    }
    fn check_sizes(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> FsCheckerResult {
        Ok(())
    }

    /// Runs `f` if `phase` is enabled. Once an error finding exists and
    /// `fail_fast` is set, later phases are skipped.
    fn run_phase<F>(
        &mut self,
        opt: &Self::Options,
        rep: &mut VerifyReport,
        phase: VerifyPhases,
        f: F,
    ) -> FsCheckerResult
    where
        F: Fn(&mut Self, &Self::Options, &mut VerifyReport) -> FsCheckerResult,
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
