//! Update operation
//!
//! `--dry-run` resolves the declared packages again and compares the result with what
//! the environment has installed. A real update purges the environment and installs
//! everything again.

use std::collections::HashMap;

use console::Style;

use super::ProjectContext;
use super::ensure::ensure_latest_installer;
use super::install::{InitOptions, do_init};
use super::uninstall::purge;
use crate::error::Result;
use crate::installer::FrozenPackage;
use crate::manifest::{DependencyGroup, Manifest, canonical_name};
use crate::resolver::{Version, resolve};

/// A package whose resolvable version differs from the installed one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableUpdate {
    pub name: String,
    pub latest: String,
    pub installed: String,
}

/// Updates available for `default` [+ `develop`] packages
///
/// Packages that are not installed are not reported.
pub fn check_updates(
    ctx: &ProjectContext<'_>,
    manifest: &Manifest,
    dev: bool,
) -> Result<Vec<AvailableUpdate>> {
    let mut constraints = manifest.constraints(DependencyGroup::Default)?;
    if dev {
        constraints.extend(manifest.constraints(DependencyGroup::Develop)?);
    }

    let installer = ctx.installer(false);
    let resolution = resolve(&installer, &constraints, &manifest.sources(), false)?;
    let installed = installed_versions(installer.freeze()?);

    Ok(resolution
        .packages
        .iter()
        .filter_map(|(name, locked)| {
            let installed = installed.get(&canonical_name(name))?;
            let latest = locked.bare_version();
            if same_version(latest, installed) {
                return None;
            }
            Some(AvailableUpdate {
                name: name.clone(),
                latest: latest.to_string(),
                installed: installed.clone(),
            })
        })
        .collect())
}

fn installed_versions(frozen: Vec<FrozenPackage>) -> HashMap<String, String> {
    frozen
        .into_iter()
        .filter_map(|package| Some((canonical_name(&package.name), package.version?)))
        .collect()
}

/// `1.0` and `1.0.0` are the same version; unparseable versions compare as text
fn same_version(a: &str, b: &str) -> bool {
    match (a.parse::<Version>(), b.parse::<Version>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Print the available updates; returns whether there were any
pub fn report_updates(updates: &[AvailableUpdate]) -> bool {
    for update in updates {
        println!(
            "{}=={} is available ({} installed)!",
            update.name, update.latest, update.installed
        );
    }
    if updates.is_empty() {
        println!("{}", Style::new().green().apply_to("All good!"));
    }
    !updates.is_empty()
}

/// Upgrade the installer if needed, purge the environment, and reinstall the project
pub fn update(ctx: &ProjectContext<'_>, manifest: &Manifest, dev: bool) -> Result<()> {
    ensure_latest_installer(ctx)?;

    eprintln!(
        "{}",
        Style::new()
            .yellow()
            .apply_to("Updating all dependencies from Pipfile...")
    );
    purge(&ctx.installer(false))?;
    do_init(
        ctx,
        manifest,
        InitOptions {
            dev,
            want_hashes: true,
            ..InitOptions::default()
        },
    )?;

    eprintln!(
        "{}",
        Style::new()
            .yellow()
            .apply_to("All dependencies are now up-to-date!")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::Fixture;
    use crate::runner::{CommandSpec, ProcessOutput};
    use crate::test_fixtures::ScriptedRunner;

    const PIPFILE: &str = "[packages]\nrequests = \"*\"\nflask = \"*\"\n\n[dev-packages]\npytest = \"*\"\n";

    fn args(spec: &CommandSpec) -> Vec<String> {
        spec.get_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Index has requests 2.31.0, flask 3.0.0, pytest 8.0.0
    fn fake_tools(freeze: &'static str) -> ScriptedRunner {
        ScriptedRunner::new(move |spec| {
            let args = args(spec);
            match args.first().map(String::as_str) {
                Some("download") => {
                    let dest = &args[args.iter().position(|a| a == "-d").unwrap() + 1];
                    let file = match args[1].as_str() {
                        "requests" => "requests-2.31.0-py3-none-any.whl",
                        "flask" => "Flask-3.0.0-py3-none-any.whl",
                        _ => "pytest-8.0.0-py3-none-any.whl",
                    };
                    std::fs::write(std::path::Path::new(dest).join(file), "").unwrap();
                    ProcessOutput::new(0, format!("Collecting {}\n  Saved ./{}\n", args[1], file), "")
                }
                Some("freeze") => ProcessOutput::new(0, freeze, ""),
                Some("-c") => ProcessOutput::new(0, "{}", ""),
                _ => ProcessOutput::default(),
            }
        })
    }

    #[test]
    fn test_check_updates_lists_outdated() {
        let fixture = Fixture::new(
            &[("Pipfile", PIPFILE)],
            fake_tools("requests==2.28.0\nFlask==3.0\npytest==7.0.0\n"),
        )
        .with_env();
        let manifest = Manifest::parse(PIPFILE, &fixture.project.manifest_path).unwrap();

        let updates = check_updates(&fixture.ctx(), &manifest, false).unwrap();

        assert_eq!(
            updates,
            vec![AvailableUpdate {
                name: "requests".to_string(),
                latest: "2.31.0".to_string(),
                installed: "2.28.0".to_string(),
            }]
        );
        assert!(report_updates(&updates));
    }

    #[test]
    fn test_check_updates_dev() {
        let fixture = Fixture::new(
            &[("Pipfile", PIPFILE)],
            fake_tools("requests==2.31.0\nflask==3.0.0\npytest==7.0.0\n"),
        )
        .with_env();
        let manifest = Manifest::parse(PIPFILE, &fixture.project.manifest_path).unwrap();

        let ctx = fixture.ctx();
        assert!(check_updates(&ctx, &manifest, false).unwrap().is_empty());
        let updates = check_updates(&ctx, &manifest, true).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].name, "pytest");
    }

    #[test]
    fn test_all_good() {
        assert!(!report_updates(&[]));
    }

    #[test]
    fn test_update_purges_then_reinstalls() {
        let fixture = Fixture::new(&[("Pipfile", PIPFILE)], fake_tools("requests==2.28.0\npip==24.0\n"))
            .with_env();
        let manifest = Manifest::parse(PIPFILE, &fixture.project.manifest_path).unwrap();

        update(&fixture.ctx(), &manifest, false).unwrap();

        let calls: Vec<Vec<String>> = fixture.runner.calls().iter().map(args).collect();
        let uninstall = calls.iter().position(|a| a[0] == "uninstall").unwrap();
        let last_install = calls.iter().rposition(|a| a[0] == "install").unwrap();
        assert!(uninstall < last_install);
        assert_eq!(calls[uninstall], vec!["uninstall", "requests", "-y"]);
        assert!(fixture.project.lock_path.is_file());
    }
}
