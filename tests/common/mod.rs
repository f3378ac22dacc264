// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed target root, a fluent builder to lay
// out files on it, and recording fakes for the executor and installer so
// features can run end to end without touching the host.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use kairos_init::config::{Config, Layout, PackageTables};
use kairos_init::exec::{ExecResult, Executor};
use kairos_init::features::Context;
use kairos_init::logging::{FeatureStatus, Logger};
use kairos_init::resources::package::Installer;
use kairos_init::system::{Architecture, Distro, SystemDescriptor};

/// Executor that records every command line and always succeeds.
#[derive(Debug, Default)]
pub struct FakeExecutor {
    lines: Mutex<Vec<String>>,
}

impl FakeExecutor {
    /// Recorded `program arg…` lines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("lock").clone()
    }

    fn record(&self, program: &str, args: &[&str]) {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.lines.lock().expect("lock").push(line);
    }
}

impl Executor for FakeExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.run_unchecked(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        self.record(program, args);
        Ok(ExecResult {
            success: true,
            code: Some(0),
            ..ExecResult::default()
        })
    }

    fn run_logged(&self, program: &str, args: &[&str], _env: &[(&str, &str)]) -> anyhow::Result<()> {
        self.record(program, args);
        Ok(())
    }

    fn which(&self, _program: &str) -> bool {
        false
    }
}

/// Installer that records each requested package list.
#[derive(Debug, Default)]
pub struct RecordingInstaller {
    installs: Mutex<Vec<Vec<String>>>,
}

impl RecordingInstaller {
    /// Every package list passed to `install`.
    pub fn installs(&self) -> Vec<Vec<String>> {
        self.installs.lock().expect("lock").clone()
    }
}

impl Installer for RecordingInstaller {
    fn install(&self, packages: &[String]) -> anyhow::Result<()> {
        self.installs.lock().expect("lock").push(packages.to_vec());
        Ok(())
    }

    fn remove(&self, _packages: &[String]) -> anyhow::Result<()> {
        Ok(())
    }
}

/// An isolated target root backed by a [`tempfile::TempDir`], plus the
/// fakes wired into every [`Context`] it builds.
pub struct TestRoot {
    /// Temporary directory standing in for `/`.
    pub dir: tempfile::TempDir,
    /// Shared executor.
    pub executor: Arc<FakeExecutor>,
    /// Shared installer.
    pub installer: Arc<RecordingInstaller>,
    /// Shared logger.
    pub log: Arc<Logger>,
    system: SystemDescriptor,
    tables: PackageTables,
}

impl TestRoot {
    /// The target root path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Layout over the target root.
    pub fn layout(&self) -> Layout {
        Layout::new(self.path())
    }

    /// A context for the configured system and tables.
    pub fn context(&self) -> Context {
        let config = Config::new(self.layout(), self.tables.clone());
        let executor: Arc<dyn Executor> = self.executor.clone();
        let installer: Arc<dyn Installer> = self.installer.clone();
        Context::new(
            self.system.clone(),
            Arc::new(config),
            executor,
            installer,
            self.log.clone(),
        )
    }

    /// Sorted file names directly under the image's `/boot`.
    pub fn boot_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.layout().boot_dir())
            .expect("read boot")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// `(name, status)` for every feature recorded by the logger.
    pub fn statuses(&self) -> Vec<(String, FeatureStatus)> {
        self.log
            .entries()
            .into_iter()
            .map(|e| (e.name, e.status))
            .collect()
    }
}

/// Fluent builder for [`TestRoot`].
pub struct TestRootBuilder {
    root: TestRoot,
}

impl TestRootBuilder {
    /// Empty root, Ubuntu 24.04 on amd64, no package tables.
    pub fn new() -> Self {
        Self {
            root: TestRoot {
                dir: tempfile::tempdir().expect("create temp dir"),
                executor: Arc::new(FakeExecutor::default()),
                installer: Arc::new(RecordingInstaller::default()),
                log: Arc::new(Logger::new()),
                system: SystemDescriptor::new(Distro::Ubuntu, "24.04", Architecture::Amd64),
                tables: PackageTables::default(),
            },
        }
    }

    /// Use `system` instead of the default descriptor.
    pub fn with_system(mut self, system: SystemDescriptor) -> Self {
        self.root.system = system;
        self
    }

    /// Use `tables` for package resolution.
    pub fn with_tables(mut self, tables: PackageTables) -> Self {
        self.root.tables = tables;
        self
    }

    /// Write `content` to the absolute image path `path`.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        let full = self.root.layout().path(path);
        std::fs::create_dir_all(full.parent().expect("parent")).expect("create parent");
        std::fs::write(full, content).expect("write file");
        self
    }

    /// Install kernels: a `/lib/modules/<v>` directory and a
    /// `/boot/vmlinuz-<v>` image for each version.
    pub fn with_kernels(mut self, versions: &[&str]) -> Self {
        for v in versions {
            std::fs::create_dir_all(self.root.layout().path(&format!("/lib/modules/{v}")))
                .expect("create modules dir");
            self = self.with_file(&format!("/boot/vmlinuz-{v}"), v);
        }
        self
    }

    /// Write an `os-release` describing `id` at `version_id`.
    pub fn with_os_release(self, id: &str, version_id: &str) -> Self {
        let content = format!(
            "NAME=\"{id}\"\nID={id}\nVERSION_ID=\"{version_id}\"\nPRETTY_NAME=\"{id} {version_id}\"\n"
        );
        self.with_file("/etc/os-release", &content)
    }

    /// Finish building and return the root.
    pub fn build(self) -> TestRoot {
        self.root
    }
}

/// Path of the image file `path` under `root`.
pub fn image_path(root: &TestRoot, path: &str) -> PathBuf {
    root.layout().path(path)
}
