use std::{
    ffi::OsString,
    io,
    path::Path,
    process::{Command, Stdio},
};

/// Exit status and captured output of one external process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Invocation {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Last non-empty line of stderr, falling back to stdout.
    pub fn last_message(&self) -> Option<&str> {
        [&self.stderr, &self.stdout].into_iter().find_map(|stream| {
            stream
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .last()
        })
    }
}

/// Runs a program to completion and captures its output.
///
/// Implementations block until the process exits.
pub trait CommandRunner {
    fn run(&self, program: &Path, args: &[OsString], cwd: &Path) -> io::Result<Invocation>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &Path, args: &[OsString], cwd: &Path) -> io::Result<Invocation> {
        (**self).run(program, args, cwd)
    }
}

/// Spawns real processes with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString], cwd: &Path) -> io::Result<Invocation> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()?;
        Ok(Invocation {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandRunner, Invocation, SystemRunner};
    use std::{io::ErrorKind, path::Path};

    #[test]
    fn test_last_message() {
        let invocation = Invocation {
            exit_code: Some(1),
            stdout: "loading\n".into(),
            stderr: "warning\nno such site file\n\n".into(),
        };
        assert_eq!(invocation.last_message(), Some("no such site file"));
        assert!(!invocation.success());

        let invocation = Invocation {
            stdout: "done\n".into(),
            ..Invocation::default()
        };
        assert_eq!(invocation.last_message(), Some("done"));
    }

    #[test]
    fn test_missing_program() {
        let err = SystemRunner
            .run(
                Path::new("/nonexistent/splat-binary"),
                &[],
                &std::env::temp_dir(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_streams() {
        let invocation = SystemRunner
            .run(
                Path::new("/bin/sh"),
                &["-c".into(), "echo out; echo err >&2; exit 3".into()],
                &std::env::temp_dir(),
            )
            .unwrap();
        assert_eq!(invocation.exit_code, Some(3));
        assert_eq!(invocation.stdout, "out\n");
        assert_eq!(invocation.stderr, "err\n");
    }
}
