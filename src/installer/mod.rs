//! Installer adapter
//!
//! This module handles:
//! - Building installer argv for `install`, `download`, `hash`, `uninstall` and `freeze`
//! - Running those commands through a [`ProcessRunner`]
//! - Ordered fallback over package sources (see [`sources`])
//! - Parsing installer output (see [`parser`])
//!
//! The installer is the `pip` executable of the target environment, or of the system
//! when running in system mode.

pub mod heuristics;
pub mod parser;
pub mod sources;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::runner::{CommandSpec, ProcessOutput, ProcessRunner};

pub use parser::FrozenPackage;
pub use sources::{Source, for_each_source};

/// What a single `install` call installs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallTarget {
    /// A requirement string, e.g. `requests[socks]==2.31.0`
    Requirement(String),
    /// An editable VCS url, passed as `-e <url>`
    Editable(String),
    /// A requirement file, passed as `-r <path>`
    RequirementFile(PathBuf),
}

impl InstallTarget {
    fn push_args(&self, args: &mut Vec<OsString>) {
        match self {
            InstallTarget::Requirement(requirement) => args.push(requirement.into()),
            InstallTarget::Editable(url) => {
                args.push("-e".into());
                args.push(url.into());
            }
            InstallTarget::RequirementFile(path) => {
                args.push("-r".into());
                args.push(path.into());
            }
        }
    }
}

/// Optional behavior of an `install` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallFlags {
    pub no_deps: bool,
    pub require_hashes: bool,
    pub upgrade: bool,
}

/// Argv (after the program) for one `install` call against one source
pub fn install_args(
    target: &InstallTarget,
    source: Option<&Source>,
    flags: InstallFlags,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["install".into()];
    if flags.upgrade {
        args.push("--upgrade".into());
    }
    target.push_args(&mut args);
    if let Some(source) = source {
        args.push("-i".into());
        args.push(source.url.as_str().into());
    }
    args.push("--exists-action".into());
    args.push("w".into());
    if flags.no_deps {
        args.push("--no-deps".into());
    }
    if flags.require_hashes {
        args.push("--require-hashes".into());
    }
    push_trusted_host(&mut args, source);
    args
}

/// Argv (after the program) for downloading one requirement into `dest`
pub fn download_args(requirement: &str, source: &Source, dest: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "download".into(),
        requirement.into(),
        "-i".into(),
        source.url.as_str().into(),
        "-d".into(),
        dest.into(),
    ];
    push_trusted_host(&mut args, Some(source));
    args
}

fn push_trusted_host(args: &mut Vec<OsString>, source: Option<&Source>) {
    if let Some(host) = source.filter(|s| !s.verify_ssl).and_then(Source::host) {
        args.push("--trusted-host".into());
        args.push(host.into());
    }
}

/// Drives one installer executable
pub struct Installer<'a> {
    runner: &'a dyn ProcessRunner,
    program: PathBuf,
    envs: Vec<(String, String)>,
}

impl<'a> Installer<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, program: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            program: program.into(),
            envs: Vec::new(),
        }
    }

    /// Environment override applied to every installer call
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> CommandSpec {
        self.envs
            .iter()
            .fold(CommandSpec::new(&self.program), |spec, (key, value)| {
                spec.env(key, value)
            })
    }

    pub fn install(
        &self,
        target: &InstallTarget,
        source: Option<&Source>,
        flags: InstallFlags,
    ) -> Result<ProcessOutput> {
        let spec = self.command().args(install_args(target, source, flags));
        self.runner.run(&spec)
    }

    /// Install from the first source that succeeds
    pub fn install_from_sources(
        &self,
        target: &InstallTarget,
        sources: &[Source],
        flags: InstallFlags,
    ) -> Result<ProcessOutput> {
        for_each_source(sources, |source| self.install(target, Some(source), flags))
    }

    pub fn download(&self, requirement: &str, source: &Source, dest: &Path) -> Result<ProcessOutput> {
        let spec = self.command().args(download_args(requirement, source, dest));
        self.runner.run(&spec)
    }

    /// `sha256:<hex>` of a distribution file, if the installer reports one
    pub fn hash(&self, file: &Path) -> Result<Option<String>> {
        let spec = self.command().arg("hash").arg(file);
        let output = self.runner.run(&spec)?;
        if !output.success() {
            tracing::warn!(file = %file.display(), "installer could not hash file");
            return Ok(None);
        }
        Ok(parser::parse_hash_output(&output.stdout))
    }

    pub fn uninstall<S: AsRef<str>>(&self, names: &[S]) -> Result<ProcessOutput> {
        let spec = self
            .command()
            .arg("uninstall")
            .args(names.iter().map(|n| n.as_ref().to_string()))
            .arg("-y");
        self.runner.run(&spec)
    }

    /// Packages currently installed in the environment
    pub fn freeze(&self) -> Result<Vec<FrozenPackage>> {
        let output = self.runner.run(&self.command().arg("freeze"))?;
        Ok(parser::parse_freeze_output(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::ScriptedRunner;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn insecure() -> Source {
        Source {
            name: "internal".to_string(),
            url: "http://pypi.internal:8080/simple".to_string(),
            verify_ssl: false,
        }
    }

    #[test]
    fn test_install_args_order() {
        let args = install_args(
            &InstallTarget::Requirement("requests==2.31.0".to_string()),
            Some(&Source::pypi()),
            InstallFlags {
                no_deps: true,
                ..Default::default()
            },
        );
        assert_eq!(
            strings(&args),
            vec![
                "install",
                "requests==2.31.0",
                "-i",
                "https://pypi.org/simple",
                "--exists-action",
                "w",
                "--no-deps",
            ]
        );
    }

    #[test]
    fn test_install_args_requirement_file_with_hashes() {
        let args = install_args(
            &InstallTarget::RequirementFile(PathBuf::from("/tmp/req.txt")),
            Some(&Source::pypi()),
            InstallFlags {
                no_deps: true,
                require_hashes: true,
                upgrade: false,
            },
        );
        let args = strings(&args);
        assert_eq!(&args[1..3], ["-r", "/tmp/req.txt"]);
        assert!(args.ends_with(&["--no-deps".to_string(), "--require-hashes".to_string()]));
    }

    #[test]
    fn test_install_args_editable_and_upgrade() {
        let args = install_args(
            &InstallTarget::Editable("git+https://github.com/org/tool.git#egg=tool".to_string()),
            None,
            InstallFlags {
                upgrade: true,
                ..Default::default()
            },
        );
        assert_eq!(
            strings(&args),
            vec![
                "install",
                "--upgrade",
                "-e",
                "git+https://github.com/org/tool.git#egg=tool",
                "--exists-action",
                "w",
            ]
        );
    }

    #[test]
    fn test_unverified_source_adds_trusted_host() {
        let args = strings(&install_args(
            &InstallTarget::Requirement("alpha".to_string()),
            Some(&insecure()),
            InstallFlags::default(),
        ));
        assert!(args.ends_with(&["--trusted-host".to_string(), "pypi.internal".to_string()]));

        let args = strings(&download_args("alpha", &insecure(), Path::new("/tmp/d")));
        assert_eq!(
            args,
            vec![
                "download",
                "alpha",
                "-i",
                "http://pypi.internal:8080/simple",
                "-d",
                "/tmp/d",
                "--trusted-host",
                "pypi.internal",
            ]
        );
    }

    #[test]
    fn test_install_from_sources_falls_back() {
        let runner = ScriptedRunner::new(|spec| {
            let args = spec.get_args();
            if args.iter().any(|a| a == "https://first.example/simple") {
                ProcessOutput::new(1, "", "not found")
            } else {
                ProcessOutput::new(0, "Successfully installed alpha", "")
            }
        });
        let installer = Installer::new(&runner, "/env/bin/pip").with_env("PINENV_ACTIVE", "1");
        let sources = [
            Source {
                name: "first".to_string(),
                url: "https://first.example/simple".to_string(),
                verify_ssl: true,
            },
            Source::pypi(),
        ];

        let output = installer
            .install_from_sources(
                &InstallTarget::Requirement("alpha".to_string()),
                &sources,
                InstallFlags::default(),
            )
            .unwrap();

        assert!(output.success());
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].program_name(), "pip");
        assert!(
            calls[1]
                .get_envs()
                .iter()
                .any(|(k, v)| k == "PINENV_ACTIVE" && v == "1")
        );
    }

    #[test]
    fn test_hash_parses_output() {
        let runner =
            ScriptedRunner::new(|_| ProcessOutput::new(0, "alpha-1.0.tar.gz:\n--hash=sha256:aa\n", ""));
        let installer = Installer::new(&runner, "pip");
        assert_eq!(
            installer.hash(Path::new("alpha-1.0.tar.gz")).unwrap().as_deref(),
            Some("sha256:aa")
        );

        let failing = ScriptedRunner::new(|_| ProcessOutput::new(1, "", "no such file"));
        let installer = Installer::new(&failing, "pip");
        assert_eq!(installer.hash(Path::new("missing.whl")).unwrap(), None);
    }

    #[test]
    fn test_uninstall_and_freeze_argv() {
        let runner = ScriptedRunner::new(|spec| {
            if spec.get_args().first().is_some_and(|a| a == "freeze") {
                ProcessOutput::new(0, "alpha==1.0\nbeta==2.0\n", "")
            } else {
                ProcessOutput::new(0, "", "")
            }
        });
        let installer = Installer::new(&runner, "pip");

        installer.uninstall(&["alpha", "beta"]).unwrap();
        let frozen = installer.freeze().unwrap();

        assert_eq!(frozen.len(), 2);
        let calls = runner.calls();
        assert_eq!(calls[0].display(), "pip uninstall alpha beta -y");
        assert_eq!(calls[1].display(), "pip freeze");
    }
}
