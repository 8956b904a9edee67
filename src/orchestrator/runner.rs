use crate::core::{Result, SetupError};
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, error};

/// A program invocation, without shell interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

pub trait CommandRunner {
    fn run(&mut self, command: &CommandSpec) -> Result<()>;
}

/// Spawns each command and waits for it; a non-zero exit is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &CommandSpec) -> Result<()> {
        debug!(command = %command, "executing");
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .map_err(|e| SetupError::Command(format!("Failed to start '{}': {}", command, e)))?;

        if !status.success() {
            error!(command = %command, status = %status, "command failed");
            return Err(SetupError::Command(format!("'{}' exited with {}", command, status)));
        }
        Ok(())
    }
}

/// Collects commands instead of running them. Used for dry runs.
#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
    pub commands: Vec<CommandSpec>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    /// Record commands, failing the first one whose program path contains `needle`.
    pub fn failing_on(needle: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            fail_on: Some(needle.into()),
        }
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &CommandSpec) -> Result<()> {
        self.commands.push(command.clone());
        match &self.fail_on {
            Some(needle) if command.program.to_string_lossy().contains(needle.as_str()) => Err(
                SetupError::Command(format!("'{}' exited with exit status: 1", command)),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_arguments_with_spaces() {
        let command = CommandSpec::new("ssh").arg("sdw1").arg("rm -rf /usr/local/greenplum-db");
        assert_eq!(command.to_string(), "ssh sdw1 'rm -rf /usr/local/greenplum-db'");
    }

    #[cfg(unix)]
    #[test]
    fn test_process_runner_exit_status() {
        let mut runner = ProcessRunner;
        assert!(runner.run(&CommandSpec::new("true")).is_ok());

        let err = runner.run(&CommandSpec::new("false")).unwrap_err();
        assert!(matches!(err, SetupError::Command(_)));
    }

    #[test]
    fn test_process_runner_missing_program() {
        let err = ProcessRunner
            .run(&CommandSpec::new("/nonexistent/gpssh-exkeys"))
            .unwrap_err();
        assert!(matches!(err, SetupError::Command(msg) if msg.contains("Failed to start")));
    }
}
