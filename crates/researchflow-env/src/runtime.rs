//! Interpreter resolution: find the Python runtime on PATH and check its version.

use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::BootstrapError;
use crate::process::{CommandSpec, ProcessRunner};

/// Extension point for looking up executables by name.
pub trait RuntimeLocator {
    /// Full path of `name` on the execution path, or `None` when it is not resolvable.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Resolves executables through `PATH` (and `PATHEXT` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct WhichLocator;

impl RuntimeLocator for WhichLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

/// Minimum used when the configured one is not a version.
pub const FALLBACK_MIN_VERSION: &str = "3.8";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Parse `3`, `3.8` or `3.8.10`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            major,
            minor,
            patch,
        })
    }

    /// Extract the version from `python --version` output, e.g. `Python 3.11.4`.
    pub fn from_version_output(output: &str) -> Option<Self> {
        static RE: OnceLock<Option<Regex>> = OnceLock::new();
        let re = RE
            .get_or_init(|| Regex::new(r"Python\s+(\d+)\.(\d+)(?:\.(\d+))?").ok())
            .as_ref()?;
        let caps = re.captures(output)?;
        Some(Self {
            major: caps.get(1)?.as_str().parse().ok()?,
            minor: caps.get(2)?.as_str().parse().ok()?,
            patch: caps
                .get(3)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The interpreter every later gate runs with.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedInterpreter {
    /// Candidate name that matched (`python3`, `python`).
    pub name: String,
    pub path: PathBuf,
    /// `None` when `--version` output could not be parsed.
    pub version: Option<Version>,
}

/// Try each candidate in order and return the first one that resolves and meets `min_version`.
///
/// A minimum that does not parse falls back to [`FALLBACK_MIN_VERSION`]. A candidate whose
/// version cannot be determined is accepted with a warning. If nothing
/// qualifies the error names the candidates, the minimum version and, when one was found,
/// the too-old version.
pub fn resolve_interpreter(
    candidates: &[String],
    min_version: &str,
    locator: &dyn RuntimeLocator,
    runner: &dyn ProcessRunner,
) -> Result<ResolvedInterpreter, BootstrapError> {
    let (minimum, min_version) = match Version::parse(min_version) {
        Some(v) => (v, min_version.to_string()),
        None => {
            tracing::warn!(
                "Minimum Python version {:?} does not parse; using {}",
                min_version,
                FALLBACK_MIN_VERSION
            );
            (
                Version::parse(FALLBACK_MIN_VERSION).unwrap_or_default(),
                FALLBACK_MIN_VERSION.to_string(),
            )
        }
    };
    let mut too_old: Option<Version> = None;

    for name in candidates {
        let Some(path) = locator.locate(name) else {
            tracing::debug!("{} not on PATH", name);
            continue;
        };

        let spec = CommandSpec::new(path.clone()).arg("--version").captured();
        let version = match runner.run(&spec) {
            Ok(out) if out.success() => Version::from_version_output(&out.combined_output()),
            Ok(out) => {
                tracing::debug!("{} --version exited {}", path.display(), out.exit_code);
                continue;
            }
            Err(e) => {
                tracing::debug!("{} --version failed: {}", path.display(), e);
                continue;
            }
        };

        match version {
            Some(v) if v < minimum => {
                tracing::warn!("{} is {}, need >= {}", path.display(), v, minimum);
                too_old = too_old.max(Some(v));
                continue;
            }
            None => {
                tracing::warn!(
                    "Could not determine version of {}; assuming it is usable",
                    path.display()
                );
            }
            _ => {}
        }

        return Ok(ResolvedInterpreter {
            name: name.clone(),
            path,
            version,
        });
    }

    Err(BootstrapError::MissingRuntime {
        runtime: candidates.join(" / "),
        min_version,
        found: too_old.map(|v| v.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessOutcome;
    use std::collections::HashMap;

    struct MapLocator(HashMap<&'static str, &'static str>);

    impl RuntimeLocator for MapLocator {
        fn locate(&self, name: &str) -> Option<PathBuf> {
            self.0.get(name).map(PathBuf::from)
        }
    }

    /// Answers `--version` by program path.
    struct VersionRunner(HashMap<&'static str, &'static str>);

    impl ProcessRunner for VersionRunner {
        fn run(&self, spec: &CommandSpec) -> std::io::Result<ProcessOutcome> {
            let key = spec.program_name();
            match self.0.get(key.as_str()) {
                Some(out) => Ok(ProcessOutcome {
                    exit_code: 0,
                    stdout: out.to_string(),
                    stderr: String::new(),
                }),
                None => Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no")),
            }
        }
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_version_parse() {
        assert_eq!(
            Version::parse("3.8"),
            Some(Version { major: 3, minor: 8, patch: 0 })
        );
        assert_eq!(Version::parse("3.10.2").unwrap().to_string(), "3.10.2");
        assert_eq!(Version::parse("3.x"), None);
        assert_eq!(Version::parse("1.2.3.4"), None);
    }

    #[test]
    fn test_version_from_output() {
        let v = Version::from_version_output("Python 3.11.4\n").unwrap();
        assert_eq!(v, Version { major: 3, minor: 11, patch: 4 });
        assert!(Version::from_version_output("garbage").is_none());
        assert!(Version::parse("3.10").unwrap() > Version::parse("3.9.18").unwrap());
    }

    #[test]
    fn test_resolves_first_candidate() {
        let locator = MapLocator(HashMap::from([("python3", "/usr/bin/python3")]));
        let runner = VersionRunner(HashMap::from([("/usr/bin/python3", "Python 3.10.12")]));
        let got = resolve_interpreter(&names(&["python3", "python"]), "3.8", &locator, &runner)
            .unwrap();
        assert_eq!(got.name, "python3");
        assert_eq!(got.path, PathBuf::from("/usr/bin/python3"));
        assert_eq!(got.version.unwrap().minor, 10);
    }

    #[test]
    fn test_skips_too_old_candidate() {
        let locator = MapLocator(HashMap::from([
            ("python3", "/usr/bin/python3"),
            ("python", "/opt/py/python"),
        ]));
        let runner = VersionRunner(HashMap::from([
            ("/usr/bin/python3", "Python 3.6.9"),
            ("/opt/py/python", "Python 3.12.1"),
        ]));
        let got = resolve_interpreter(&names(&["python3", "python"]), "3.8", &locator, &runner)
            .unwrap();
        assert_eq!(got.name, "python");
    }

    #[test]
    fn test_missing_runtime() {
        let locator = MapLocator(HashMap::new());
        let runner = VersionRunner(HashMap::new());
        let err = resolve_interpreter(&names(&["python3"]), "3.8", &locator, &runner).unwrap_err();
        match err {
            BootstrapError::MissingRuntime {
                runtime,
                min_version,
                found,
            } => {
                assert_eq!(runtime, "python3");
                assert_eq!(min_version, "3.8");
                assert!(found.is_none());
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_only_too_old_reports_found_version() {
        let locator = MapLocator(HashMap::from([("python3", "/usr/bin/python3")]));
        let runner = VersionRunner(HashMap::from([("/usr/bin/python3", "Python 2.7.18")]));
        let err = resolve_interpreter(&names(&["python3"]), "3.8", &locator, &runner).unwrap_err();
        assert!(err.to_string().contains("found 2.7.18"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unparseable_minimum_keeps_the_gate() {
        let locator = MapLocator(HashMap::from([("python3", "/usr/bin/python3")]));
        let runner = VersionRunner(HashMap::from([("/usr/bin/python3", "Python 3.6.9")]));
        let err = resolve_interpreter(&names(&["python3"]), "3.x", &locator, &runner).unwrap_err();
        match err {
            BootstrapError::MissingRuntime {
                min_version, found, ..
            } => {
                assert_eq!(min_version, FALLBACK_MIN_VERSION);
                assert_eq!(found.as_deref(), Some("3.6.9"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let runner = VersionRunner(HashMap::from([("/usr/bin/python3", "Python 3.9.1")]));
        assert!(resolve_interpreter(&names(&["python3"]), "3.x", &locator, &runner).is_ok());
    }

    #[test]
    fn test_unparseable_version_is_accepted() {
        let locator = MapLocator(HashMap::from([("python3", "/usr/bin/python3")]));
        let runner = VersionRunner(HashMap::from([("/usr/bin/python3", "PyPy something")]));
        let got = resolve_interpreter(&names(&["python3"]), "3.8", &locator, &runner).unwrap();
        assert!(got.version.is_none());
    }
}
