//! Converter backed by an external executable (mihomo by default).

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{ConvertTag, RulesetConverter};
use crate::{Behavior, Error, Result};

/// How often a running converter is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Runs `<program> convert-ruleset <behavior> <tag> <input> <output>`.
#[derive(Debug, Clone)]
pub struct ProcessConverter {
    program: PathBuf,
    timeout: Duration,
}

impl ProcessConverter {
    /// Default converter executable name.
    pub const DEFAULT_PROGRAM: &'static str = "mihomo";

    /// Default limit on a single conversion.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a converter for the given executable path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Resolve `program` on `PATH`.
    ///
    /// An executable that cannot be found is kept as given; conversions
    /// then fail with [`Error::ConverterNotFound`] without stopping the run.
    pub fn locate(program: &str) -> Self {
        match which::which(program) {
            Ok(path) => {
                log::debug!("Using ruleset converter {:?}", path);
                Self::new(path)
            }
            Err(e) => {
                log::warn!(
                    "Ruleset converter {:?} not found ({}); mrs sources and outputs will be empty",
                    program,
                    e
                );
                Self::new(program)
            }
        }
    }

    /// Set the conversion timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the executable path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Get the conversion timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ProcessConverter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl RulesetConverter for ProcessConverter {
    fn convert(
        &self,
        behavior: Behavior,
        tag: ConvertTag,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        // Stderr goes to an anonymous file so a chatty converter can never
        // block on a full pipe.
        let mut stderr = tempfile::tempfile()?;

        let spawned = Command::new(&self.program)
            .arg("convert-ruleset")
            .arg(behavior.as_str())
            .arg(tag.as_str())
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr.try_clone()?))
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::ConverterNotFound(self.program.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        log::debug!(
            "Running {:?} convert-ruleset {} {} {:?} {:?}",
            self.program,
            behavior,
            tag,
            input,
            output
        );

        match wait_with_timeout(&mut child, self.timeout)? {
            Some(status) if status.success() => Ok(()),
            Some(status) => Err(Error::ConverterFailed {
                status: status.to_string(),
                stderr: read_stderr(&mut stderr),
            }),
            None => Err(Error::ConverterTimeout(self.timeout)),
        }
    }
}

/// Wait for the child to exit. Returns `None` (after killing it) when the
/// deadline passes first.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_stderr(file: &mut File) -> String {
    let mut buf = Vec::new();
    if file.seek(SeekFrom::Start(0)).is_err() || file.read_to_end(&mut buf).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buf).trim().to_string()
}
