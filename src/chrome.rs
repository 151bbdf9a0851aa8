//! Detection of the installed Google Chrome / Chromium major version.
//!
//! The probe never fails: a missing binary, a process that cannot be
//! started, or output that cannot be parsed all degrade to
//! [`ChromeVersion::NotFound`] and are logged. No timeout is applied to the
//! child process, so a hung browser blocks the caller.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

/// Executable names searched for on `PATH`, in priority order.
pub const CHROME_BINARY_NAMES: &[&str] = &[
    "google-chrome",
    "chrome",
    "chromium",
    "chromium-browser",
    "google-chrome-stable",
];

/// Install locations checked on Windows when nothing is found on `PATH`.
pub const WINDOWS_FALLBACK_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[allow(clippy::unwrap_used)] // Compile-time constant regex pattern
static MAJOR_VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.").unwrap());

/// Outcome of a Chrome version probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeVersion {
    /// A browser was found and reported this major version.
    Found(u32),
    /// No browser was found or its version could not be determined.
    NotFound,
}

impl ChromeVersion {
    /// Returns the major version, if one was found.
    pub fn major(self) -> Option<u32> {
        match self {
            Self::Found(major) => Some(major),
            Self::NotFound => None,
        }
    }
}

impl fmt::Display for ChromeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(major) => write!(f, "{major}"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

/// Locates executables on the host.
pub trait ExecutableLocator {
    /// Resolves a bare command name against the search path.
    fn find(&self, name: &str) -> Option<PathBuf>;

    /// Returns `path` if it names an existing executable file.
    fn check(&self, path: &Path) -> Option<PathBuf>;
}

/// Runs a browser binary to obtain its version banner.
pub trait VersionCommand {
    /// Runs `binary --version` and returns its standard output.
    fn version_output(&self, binary: &Path) -> io::Result<Vec<u8>>;
}

/// Searches the directories of a `PATH`-style variable.
#[derive(Debug, Clone, Default)]
pub struct PathLocator {
    search_path: Option<OsString>,
}

impl PathLocator {
    /// Creates a locator over the current process's `PATH`.
    pub fn from_env() -> Self {
        Self {
            search_path: env::var_os("PATH"),
        }
    }

    /// Creates a locator over an explicit search path.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

impl ExecutableLocator for PathLocator {
    fn find(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        env::split_paths(search_path).find_map(|dir| {
            let candidate = dir.join(name);
            if cfg!(windows) && candidate.extension().is_none() {
                if let Some(found) = self.check(&candidate.with_extension("exe")) {
                    return Some(found);
                }
            }
            self.check(&candidate)
        })
    }

    fn check(&self, path: &Path) -> Option<PathBuf> {
        is_executable(path).then(|| path.to_path_buf())
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Runs the binary with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemVersionCommand;

impl VersionCommand for SystemVersionCommand {
    fn version_output(&self, binary: &Path) -> io::Result<Vec<u8>> {
        let output = Command::new(binary).arg("--version").output()?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{} --version exited with {}",
                binary.display(),
                output.status
            )));
        }
        Ok(output.stdout)
    }
}

/// Extracts the major version from a `--version` banner.
///
/// Takes the first run of digits followed by a dot, so
/// `"Google Chrome 120.0.6099.109"` yields `120`.
pub fn parse_major_version(output: &str) -> Option<u32> {
    MAJOR_VERSION_PATTERN
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Probes the host for a Chrome or Chromium installation.
pub struct ChromeProbe<L = PathLocator, C = SystemVersionCommand> {
    locator: L,
    command: C,
    fallback_paths: Vec<PathBuf>,
}

impl ChromeProbe {
    /// Creates a probe over the real `PATH` and process spawning, with the
    /// Windows install locations as fallback on Windows hosts.
    pub fn system() -> Self {
        let fallback_paths = if cfg!(windows) {
            WINDOWS_FALLBACK_PATHS.iter().map(PathBuf::from).collect()
        } else {
            Vec::new()
        };
        Self::new(PathLocator::from_env(), SystemVersionCommand, fallback_paths)
    }
}

impl<L: ExecutableLocator, C: VersionCommand> ChromeProbe<L, C> {
    /// Creates a probe from explicit collaborators.
    pub fn new(locator: L, command: C, fallback_paths: Vec<PathBuf>) -> Self {
        Self {
            locator,
            command,
            fallback_paths,
        }
    }

    /// Finds the first available browser binary.
    pub fn locate(&self) -> Option<PathBuf> {
        CHROME_BINARY_NAMES
            .iter()
            .find_map(|name| self.locator.find(name))
            .or_else(|| {
                self.fallback_paths
                    .iter()
                    .find_map(|path| self.locator.check(path))
            })
    }

    /// Detects the installed major version.
    pub fn detect(&self) -> ChromeVersion {
        let Some(binary) = self.locate() else {
            debug!("No Chrome or Chromium binary found");
            return ChromeVersion::NotFound;
        };
        debug!(binary = %binary.display(), "Querying Chrome version");

        let output = match self.command.version_output(&binary) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(binary = %binary.display(), "Could not detect Chrome version: {e}");
                return ChromeVersion::NotFound;
            }
        };

        match parse_major_version(&output) {
            Some(major) => ChromeVersion::Found(major),
            None => {
                warn!(
                    binary = %binary.display(),
                    output = %output.trim(),
                    "Could not detect Chrome version: unrecognised output"
                );
                ChromeVersion::NotFound
            }
        }
    }
}

/// Returns the installed Chrome major version, e.g. `Some(120)`.
pub fn get_chrome_major_version() -> Option<u32> {
    ChromeProbe::system().detect().major()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeLocator {
        on_path: Vec<(&'static str, &'static str)>,
        existing: Vec<PathBuf>,
    }

    impl FakeLocator {
        fn empty() -> Self {
            Self {
                on_path: Vec::new(),
                existing: Vec::new(),
            }
        }

        fn with(name: &'static str, path: &'static str) -> Self {
            Self {
                on_path: vec![(name, path)],
                existing: Vec::new(),
            }
        }
    }

    impl ExecutableLocator for FakeLocator {
        fn find(&self, name: &str) -> Option<PathBuf> {
            self.on_path
                .iter()
                .find(|(candidate, _)| *candidate == name)
                .map(|(_, path)| PathBuf::from(path))
        }

        fn check(&self, path: &Path) -> Option<PathBuf> {
            self.existing
                .iter()
                .find(|existing| existing.as_path() == path)
                .cloned()
        }
    }

    struct FakeCommand {
        result: fn() -> io::Result<Vec<u8>>,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl FakeCommand {
        fn new(result: fn() -> io::Result<Vec<u8>>) -> Self {
            Self {
                result,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl VersionCommand for FakeCommand {
        fn version_output(&self, binary: &Path) -> io::Result<Vec<u8>> {
            self.calls.borrow_mut().push(binary.to_path_buf());
            (self.result)()
        }
    }

    fn chrome_banner() -> io::Result<Vec<u8>> {
        Ok(b"Google Chrome 120.0.6099.109\n".to_vec())
    }

    #[test]
    fn detects_major_version() {
        let command = FakeCommand::new(chrome_banner);
        let probe = ChromeProbe::new(
            FakeLocator::with("google-chrome", "/usr/bin/google-chrome"),
            command,
            Vec::new(),
        );
        assert_eq!(probe.detect(), ChromeVersion::Found(120));
        assert_eq!(
            probe.command.calls.borrow().as_slice(),
            &[PathBuf::from("/usr/bin/google-chrome")]
        );
    }

    #[test]
    fn no_binary_is_not_found() {
        let probe = ChromeProbe::new(
            FakeLocator::empty(),
            FakeCommand::new(chrome_banner),
            Vec::new(),
        );
        assert_eq!(probe.detect(), ChromeVersion::NotFound);
        assert!(probe.command.calls.borrow().is_empty());
    }

    #[test]
    fn command_failure_is_not_found() {
        let probe = ChromeProbe::new(
            FakeLocator::with("chromium", "/usr/bin/chromium"),
            FakeCommand::new(|| Err(io::Error::other("Command failed"))),
            Vec::new(),
        );
        assert_eq!(probe.detect(), ChromeVersion::NotFound);
    }

    #[test]
    fn unparseable_output_is_not_found() {
        let probe = ChromeProbe::new(
            FakeLocator::with("chrome", "/opt/chrome"),
            FakeCommand::new(|| Ok(b"no version here".to_vec())),
            Vec::new(),
        );
        assert_eq!(probe.detect(), ChromeVersion::NotFound);
    }

    #[test]
    fn candidate_names_follow_priority_order() {
        let locator = FakeLocator {
            on_path: vec![
                ("google-chrome-stable", "/usr/bin/google-chrome-stable"),
                ("chromium", "/usr/bin/chromium"),
            ],
            existing: Vec::new(),
        };
        let probe = ChromeProbe::new(locator, FakeCommand::new(chrome_banner), Vec::new());
        assert_eq!(probe.locate(), Some(PathBuf::from("/usr/bin/chromium")));
    }

    #[test]
    fn falls_back_to_install_paths() {
        let fallback = PathBuf::from(WINDOWS_FALLBACK_PATHS[1]);
        let locator = FakeLocator {
            on_path: Vec::new(),
            existing: vec![fallback.clone()],
        };
        let fallback_paths = WINDOWS_FALLBACK_PATHS.iter().map(PathBuf::from).collect();
        let probe = ChromeProbe::new(locator, FakeCommand::new(chrome_banner), fallback_paths);
        assert_eq!(probe.locate(), Some(fallback));
        assert_eq!(probe.detect().major(), Some(120));
    }

    #[test]
    fn parse_major_version_variants() {
        assert_eq!(parse_major_version("Google Chrome 120.0.6099.109"), Some(120));
        assert_eq!(parse_major_version("Chromium 99.0.4844.51 snap"), Some(99));
        assert_eq!(parse_major_version("Chromium"), None);
        assert_eq!(parse_major_version("build 7 only"), None);
    }

    #[test]
    fn display() {
        assert_eq!(ChromeVersion::Found(120).to_string(), "120");
        assert_eq!(ChromeVersion::NotFound.to_string(), "not found");
    }

    #[test]
    fn path_locator_without_path_finds_nothing() {
        let locator = PathLocator::default();
        assert_eq!(locator.find("google-chrome"), None);
    }

    #[cfg(unix)]
    #[test]
    fn path_locator_requires_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("chromium");
        std::fs::write(&binary, "#!/bin/sh\n").unwrap();
        let locator = PathLocator::with_search_path(dir.path());

        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(locator.find("chromium"), None);

        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(locator.find("chromium"), Some(binary));
    }

    #[test]
    fn system_command_reports_missing_binary() {
        let missing = Path::new("/nonexistent/razator/chrome");
        assert!(SystemVersionCommand.version_output(missing).is_err());
    }
}
