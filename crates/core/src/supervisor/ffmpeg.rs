//! FFmpeg-based runner implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::plan::{Codec, ExecutionPlan};

use super::config::ToolConfig;
use super::error::SupervisorError;
use super::traits::ToolRunner;
use super::types::{ExecutionOutcome, ExecutionResult};

/// How long to keep draining pipes after the tool is gone. A descendant that
/// escaped the process group could otherwise hold them open forever; bytes
/// read before the grace period ends are kept.
const PIPE_DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Runs plans by spawning ffmpeg as a child process.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    config: ToolConfig,
}

impl FfmpegRunner {
    /// Creates a new FFmpeg runner with the given configuration.
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Creates a runner with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ToolConfig::default())
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Builds the ffmpeg argument list for a plan.
    ///
    /// Order: overwrite and logging flags, inputs in plan order, codecs,
    /// stream maps, filter, extra args, output format, output path.
    pub fn build_args(&self, plan: &ExecutionPlan, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
        ];

        for input in &plan.inputs {
            args.extend(["-i".to_string(), input.to_string_lossy().to_string()]);
        }

        match (&plan.video_codec, &plan.audio_codec) {
            // Plain remux, every selected stream copied
            (Codec::Copy, Some(Codec::Copy)) => {
                args.extend(["-c".to_string(), "copy".to_string()]);
            }
            (video, audio) => {
                push_codec_args(&mut args, "v", video);
                if let Some(audio) = audio {
                    push_codec_args(&mut args, "a", audio);
                }
            }
        }

        for map in &plan.stream_maps {
            args.extend(["-map".to_string(), map.to_arg()]);
        }

        if let Some(filter) = &plan.filter_chain {
            args.extend(["-vf".to_string(), filter.clone()]);
        }

        args.extend(self.config.extra_args.iter().cloned());

        args.extend([
            "-f".to_string(),
            plan.output_format.muxer().to_string(),
        ]);
        args.push(output.to_string_lossy().to_string());

        args
    }

    fn spawn(&self, args: &[String]) -> Result<Child, SupervisorError> {
        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        isolate_process_group(&mut command);

        command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SupervisorError::ToolNotFound {
                    path: self.config.ffmpeg_path.clone(),
                }
            } else {
                SupervisorError::Io(e)
            }
        })
    }
}

fn push_codec_args(args: &mut Vec<String>, stream: &str, codec: &Codec) {
    args.extend([format!("-c:{}", stream), codec.ffmpeg_codec().to_string()]);

    if let Codec::Reencode(params) = codec {
        if let Some(preset) = &params.preset {
            args.extend(["-preset".to_string(), preset.clone()]);
        }
        if let Some(crf) = params.crf {
            args.extend(["-crf".to_string(), crf.to_string()]);
        }
    }
}

/// Bytes read from one pipe so far, plus the task still reading it.
struct Capture {
    bytes: Arc<Mutex<Vec<u8>>>,
    reader: JoinHandle<()>,
}

fn drain<R>(reader: Option<R>) -> Capture
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let bytes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&bytes);
    let reader = tokio::spawn(async move {
        let Some(mut reader) = reader else { return };
        let mut chunk = [0u8; 8192];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => lock(&sink).extend_from_slice(&chunk[..n]),
                // Keep whatever arrived before a read error
                Err(_) => break,
            }
        }
    });
    Capture { bytes, reader }
}

async fn collect(mut capture: Capture, stream: &str) -> String {
    match timeout(PIPE_DRAIN_GRACE, &mut capture.reader).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Reader task for {} failed: {}", stream, e),
        Err(_) => {
            warn!("{} still open after the tool exited, keeping what was read", stream);
            capture.reader.abort();
        }
    }

    let bytes = std::mem::take(&mut *lock(&capture.bytes));
    String::from_utf8_lossy(&bytes).into_owned()
}

fn lock(bytes: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    bytes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Puts the child in its own process group so a timeout can take down ffmpeg
/// and anything it forked.
#[cfg(unix)]
fn isolate_process_group(command: &mut Command) {
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_command: &mut Command) {}

/// Sends SIGKILL to the group led by `group`. An already empty group is fine.
#[cfg(unix)]
fn kill_process_group(group: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = group else { return };
    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!("Failed to kill process group {}: {}", pid, e),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_group: Option<u32>) {}

/// Kills the child's whole process group, then the child itself, and reaps it.
async fn terminate(child: &mut Child, group: Option<u32>) {
    kill_process_group(group);

    if let Err(e) = child.kill().await {
        debug!("Child already gone after group kill: {}", e);
    }
}

#[async_trait]
impl ToolRunner for FfmpegRunner {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn execute(
        &self,
        plan: &ExecutionPlan,
        output: &Path,
        deadline: Duration,
    ) -> Result<ExecutionResult, SupervisorError> {
        plan.validate()?;

        let args = self.build_args(plan, output);
        debug!(
            tool = %self.config.ffmpeg_path.display(),
            args = ?args,
            "Running media tool"
        );

        let start = Instant::now();
        let mut child = self.spawn(&args)?;
        // The id is gone once the child is reaped; the group outlives it
        let group = child.id();

        let stdout_capture = drain(child.stdout.take());
        let stderr_capture = drain(child.stderr.take());

        let waited = timeout(deadline, child.wait()).await;
        let status = match waited {
            Ok(Ok(status)) => {
                // Leftover descendants would keep the pipes open
                kill_process_group(group);
                Some(status)
            }
            Ok(Err(e)) => {
                terminate(&mut child, group).await;
                stdout_capture.reader.abort();
                stderr_capture.reader.abort();
                return Err(SupervisorError::Io(e));
            }
            Err(_) => {
                terminate(&mut child, group).await;
                None
            }
        };

        let (stdout, stderr) = tokio::join!(
            collect(stdout_capture, "stdout"),
            collect(stderr_capture, "stderr")
        );
        let elapsed = start.elapsed();

        let outcome = match status {
            Some(status) if status.success() => {
                info!("Media tool completed in {} ms", elapsed.as_millis());
                ExecutionOutcome::Completed
            }
            Some(status) => {
                error!("Media tool exited with code {:?}", status.code());
                ExecutionOutcome::ToolFailed {
                    exit_code: status.code(),
                    stderr: stderr.clone(),
                }
            }
            None => {
                warn!("Media tool exceeded its {:?} deadline and was killed", deadline);
                ExecutionOutcome::TimedOut { after: deadline }
            }
        };

        Ok(ExecutionResult::new(outcome, stdout, stderr, elapsed))
    }

    async fn validate(&self) -> Result<(), SupervisorError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SupervisorError::ToolNotFound {
                    path: self.config.ffmpeg_path.clone(),
                })
            }
            Err(e) => Err(SupervisorError::Io(e)),
        }
    }
}
