//! Host environment markers
//!
//! The lock records the marker values (`python_version`, `sys_platform`, ...) of the
//! interpreter it was generated with. They are read by running a short script in the
//! target environment's interpreter.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, environment};
use crate::runner::{CommandSpec, ProcessRunner};

/// Prints the PEP 508 marker variables as a JSON object
const MARKER_SCRIPT: &str = r#"import json, os, platform, sys
def fmt(info):
    version = '{0.major}.{0.minor}.{0.micro}'.format(info)
    if info.releaselevel != 'final':
        version += info.releaselevel[0] + str(info.serial)
    return version
impl = getattr(sys, 'implementation', None)
print(json.dumps({
    'implementation_name': impl.name if impl else 'cpython',
    'implementation_version': fmt(impl.version) if impl else '0',
    'os_name': os.name,
    'platform_machine': platform.machine(),
    'platform_python_implementation': platform.python_implementation(),
    'platform_release': platform.release(),
    'platform_system': platform.system(),
    'platform_version': platform.version(),
    'python_full_version': platform.python_version(),
    'python_version': '.'.join(platform.python_version_tuple()[:2]),
    'sys_platform': sys.platform,
}))
"#;

/// Marker values of the interpreter at `python`
pub fn read_host_markers(
    runner: &dyn ProcessRunner,
    python: &Path,
) -> Result<BTreeMap<String, String>> {
    let spec = CommandSpec::new(python).arg("-c").arg(MARKER_SCRIPT);
    let output = runner.run(&spec)?;
    if !output.success() {
        return Err(environment::marker_query_failed(output.stderr.trim()));
    }
    parse_markers(&output.stdout)
}

fn parse_markers(stdout: &str) -> Result<BTreeMap<String, String>> {
    serde_json::from_str(stdout.trim())
        .map_err(|e| environment::marker_query_failed(e.to_string()))
}
