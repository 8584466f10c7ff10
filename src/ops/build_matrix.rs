//! Runs the platform × configuration matrix.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::cmake::{CMakeBuilder, CMakeSettings};
use crate::builder::context::BuildContext;
use crate::builder::plan::{JobPlan, Step};
use crate::core::job::BuildJob;
use crate::core::layout::OutputLayout;
use crate::ops::stage::{stage_built_files, stage_fake_files};
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::shell::Status;

/// CMake target of the host compiler build.
const HOST_COMPILER_TARGET: &str = "hermesc";

/// What a matrix run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatrixReport {
    pub jobs: Vec<BuildJob>,
    /// Files written to the staging tree.
    pub staged: Vec<PathBuf>,
    /// Whether the host compiler was built during this run.
    pub host_compiler_built: bool,
}

/// Sequential driver over the jobs of one invocation.
pub struct BuildMatrix<'a> {
    ctx: &'a BuildContext<'a>,
    layout: OutputLayout,
    settings: CMakeSettings,
    host_compiler_built: bool,
}

impl<'a> BuildMatrix<'a> {
    pub fn new(ctx: &'a BuildContext<'a>) -> Self {
        BuildMatrix {
            ctx,
            layout: ctx.output(),
            settings: ctx.cmake_settings(),
            host_compiler_built: false,
        }
    }

    /// Process every job to completion, in order.
    pub fn run(mut self) -> Result<MatrixReport> {
        let mut report = MatrixReport::default();
        for job in self.ctx.options.jobs() {
            let staged = self.run_job(&job)?;
            report.staged.extend(staged);
            report.jobs.push(job);
        }
        report.host_compiler_built = self.host_compiler_built;
        Ok(report)
    }

    fn host_compiler_ready(&self) -> bool {
        self.host_compiler_built || self.layout.host_compiler().exists()
    }

    fn run_job(&mut self, job: &BuildJob) -> Result<Vec<PathBuf>> {
        let build_dir = self.layout.build_dir(job);
        self.ctx.shell.status(
            Status::Info,
            format!("{} (build path: {})", job, build_dir.display()),
        );

        if self.ctx.options.fake_build {
            let staged = stage_fake_files(&self.layout, job, self.ctx.system_root.as_deref())?;
            self.ctx.shell.status(Status::Staged, format!("placeholders for {}", job));
            return Ok(staged);
        }

        let stages = &self.ctx.options.stages;
        if stages.test && job.is_uwp() {
            self.ctx.shell.status(Status::Skipped, format!("testing for UWP ({})", job));
        }

        let plan = JobPlan::new(
            job,
            stages,
            self.ctx.options.clean.build,
            self.host_compiler_ready(),
        );
        let builder = CMakeBuilder::new(&self.settings, *job, build_dir);

        let mut staged = Vec::new();
        for step in plan.steps()? {
            tracing::debug!("{}: {}", job, step);
            match step {
                Step::Clean => {
                    self.ctx.shell.status(Status::Cleaning, builder.build_dir().display());
                    remove_dir_all_if_exists(builder.build_dir())?;
                }
                Step::HostCompiler => {
                    self.build_host_compiler()?;
                    self.host_compiler_built = true;
                }
                Step::Configure => {
                    let span = self.ctx.shell.span(Status::Configuring, job);
                    builder.configure(self.ctx.runner)?;
                    span.finish();
                }
                Step::Build => staged.extend(self.build_and_stage(&builder, job)?),
                Step::Test => {
                    if !builder.build_dir().exists() {
                        staged.extend(self.build_and_stage(&builder, job)?);
                    }
                    let span = self.ctx.shell.span(Status::Testing, job);
                    builder.test(self.ctx.runner)?;
                    span.finish();
                }
            }
        }
        Ok(staged)
    }

    fn build_and_stage(&self, builder: &CMakeBuilder<'_>, job: &BuildJob) -> Result<Vec<PathBuf>> {
        let span = self.ctx.shell.span(Status::Building, job);
        builder.build(self.ctx.runner)?;
        span.finish();

        let staged = stage_built_files(&self.layout, job)?;
        self.ctx.shell.status(Status::Staged, job);
        Ok(staged)
    }

    /// Build the x64 `hermesc` into the tools directory.
    fn build_host_compiler(&self) -> Result<()> {
        let host = BuildJob::host_compiler();
        let span = self
            .ctx
            .shell
            .span(Status::Building, format!("{} ({})", HOST_COMPILER_TARGET, host));
        CMakeBuilder::new(&self.settings, host, self.layout.tools())
            .target(Some(HOST_COMPILER_TARGET))
            .build(self.ctx.runner)?;
        span.finish();
        Ok(())
    }
}

/// Run every job of the invocation.
pub fn build_matrix(ctx: &BuildContext<'_>) -> Result<MatrixReport> {
    BuildMatrix::new(ctx).run()
}
