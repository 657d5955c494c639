//! Bounded-time subprocess execution
//!
//! Shared by the image converters and the LaTeX compiler: every external
//! tool runs under a deadline and is killed when it expires.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long to wait for output readers after the child is gone
const READER_GRACE: Duration = Duration::from_secs(2);

/// Captured result of a bounded run
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit status, `None` when the process was killed on timeout
    pub status: Option<ExitStatus>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Whether the deadline expired
    pub timed_out: bool,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl ProcessOutput {
    /// Finished in time with a zero exit code
    pub fn success(&self) -> bool {
        !self.timed_out && self.status.map(|s| s.success()).unwrap_or(false)
    }
}

/// Run a command, killing it if it outlives `timeout`
///
/// stdin is closed; stdout and stderr are captured. Spawn failures (tool
/// not installed) surface as `Err`.
pub fn run_with_timeout(command: &mut Command, timeout: Duration) -> io::Result<ProcessOutput> {
    let started = Instant::now();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let (status, timed_out) = wait_deadline(&mut child, started, timeout)?;
    let elapsed = started.elapsed();

    Ok(ProcessOutput {
        status,
        stdout: stdout.recv_timeout(READER_GRACE).unwrap_or_default(),
        stderr: stderr.recv_timeout(READER_GRACE).unwrap_or_default(),
        timed_out,
        elapsed,
    })
}

fn wait_deadline(
    child: &mut Child,
    started: Instant,
    timeout: Duration,
) -> io::Result<(Option<ExitStatus>, bool)> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((Some(status), false));
        }
        if started.elapsed() >= timeout {
            log::debug!("process exceeded {:?}, killing", timeout);
            // The child may exit between try_wait and kill
            let _ = child.kill();
            let _ = child.wait();
            return Ok((None, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        let _ = tx.send(String::from_utf8_lossy(&buffer).into_owned());
    });
    rx
}

/// Whether `program` can be launched, by running it with `args`
///
/// Used to probe optional tools (`--version` style). Any exit status
/// counts as available; only a spawn failure or timeout does not.
pub fn probe_tool(program: &str, args: &[&str], timeout: Duration) -> bool {
    let mut command = Command::new(program);
    command.args(args);
    match run_with_timeout(&mut command, timeout) {
        Ok(output) => !output.timed_out,
        Err(e) => {
            log::debug!("tool '{}' unavailable: {}", program, e);
            false
        }
    }
}
