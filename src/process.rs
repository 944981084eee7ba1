use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use tracing::debug;

use crate::error::{Result, UpdaterError};
use crate::ui;

/// Runs external commands, capturing their output
///
/// Standard output and standard error are drained on separate threads while
/// the child runs. Standard error is always echoed; standard output only when
/// verbose.
#[derive(Debug, Clone, Copy, Default)]
pub struct Executor {
    verbose: bool,
}

impl Executor {
    pub fn new(verbose: bool) -> Self {
        Executor { verbose }
    }

    /// Run `args` in `dir` and return its standard output
    ///
    /// # Returns
    /// * `Ok(String)` - Captured standard output
    /// * `Err(CommandFailed)` - Non-zero exit, with captured standard error
    pub fn run(&self, args: &[&str], dir: &Path) -> Result<String> {
        self.execute(args, dir, None)
    }

    /// Like [Executor::run], feeding `input` to the child's standard input
    pub fn run_with_input(&self, args: &[&str], dir: &Path, input: &[u8]) -> Result<String> {
        self.execute(args, dir, Some(input))
    }

    fn execute(&self, args: &[&str], dir: &Path, input: Option<&[u8]>) -> Result<String> {
        let command_line = args.join(" ");
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| UpdaterError::config("empty command line"))?;

        if self.verbose {
            ui::display_command(&command_line);
        }
        debug!(command = %command_line, dir = %dir.display(), "running command");

        let mut child = Command::new(program)
            .args(rest)
            .current_dir(dir)
            .env_remove("PAGER")
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| UpdaterError::Launch {
                command: command_line.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let verbose = self.verbose;

        let (stdout_data, stderr_data) = thread::scope(|scope| {
            if let (Some(mut pipe), Some(input)) = (stdin, input) {
                scope.spawn(move || {
                    // A child that exits without reading its input closes the pipe early.
                    let _ = pipe.write_all(input);
                });
            }
            let out = scope.spawn(move || match stdout {
                Some(pipe) => drain(pipe, verbose.then(io::stdout)),
                None => Ok(Vec::new()),
            });
            let err = scope.spawn(move || match stderr {
                Some(pipe) => drain(pipe, Some(io::stderr())),
                None => Ok(Vec::new()),
            });
            (join(out), join(err))
        });

        let status = child.wait()?;
        let stdout_data = stdout_data?;
        let stderr_data = stderr_data?;

        if !status.success() {
            return Err(UpdaterError::CommandFailed {
                command: command_line,
                message: String::from_utf8_lossy(&stderr_data).into_owned(),
                status: exit_status(status),
            });
        }

        Ok(String::from_utf8_lossy(&stdout_data).into_owned())
    }
}

fn drain<R: Read, W: Write>(mut reader: R, mut echo: Option<W>) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            return Ok(data);
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(echo) = echo.as_mut() {
            echo.write_all(&buffer[..n])?;
        }
    }
}

fn join(handle: thread::ScopedJoinHandle<'_, io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "output reader panicked")))
}

/// Exit code, or `128 + signal` for a child killed by a signal
fn exit_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
