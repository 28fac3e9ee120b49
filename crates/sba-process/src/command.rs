//! Analyzer command line

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// `<interpreter> <script>` pair used to launch the analyzer
///
/// The dataset path and the desired image path are appended as positional
/// arguments on every launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerCommand {
    /// Interpreter executable, resolved through `PATH` when relative
    pub interpreter: PathBuf,
    /// Analyzer script passed as the first argument
    pub script: PathBuf,
}

impl AnalyzerCommand {
    /// Create new analyzer command
    #[inline]
    #[must_use]
    pub fn new(interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }

    /// Interpreter executable
    #[inline]
    #[must_use]
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Analyzer script
    #[inline]
    #[must_use]
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Positional arguments for one launch
    #[must_use]
    pub fn args(&self, dataset: &Path, output: &Path) -> Vec<OsString> {
        vec![
            self.script.clone().into_os_string(),
            dataset.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ]
    }
}

impl Default for AnalyzerCommand {
    fn default() -> Self {
        Self::new("python", "scripts/positioning_matrix.py")
    }
}

impl fmt::Display for AnalyzerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interpreter.display(), self.script.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_are_positional() {
        let cmd = AnalyzerCommand::new("python3", "ball.py");
        let args = cmd.args(Path::new("in.csv"), Path::new("out/matrix.png"));
        assert_eq!(args, vec!["ball.py", "in.csv", "out/matrix.png"]);
    }

    #[test]
    fn display_joins_parts() {
        let cmd = AnalyzerCommand::new("python3", "ball.py");
        assert_eq!(cmd.to_string(), "python3 ball.py");
    }
}
