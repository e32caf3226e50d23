//! End-to-end composition scenarios.
//!
//! These tests drive the composer through a real child process: a shell script
//! standing in for ffmpeg that records its argument vector and then either
//! writes the output file, fails with a diagnostic, or hangs past the deadline.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use composer_core::{
    testing::fixtures, ComposeError, ComposeRequest, Composer, CompositionMode, Config,
    ExecutionOutcome, FfmpegRunner, InputSet, OutputFormat, PlanBuilder, ToolConfig, ToolRunner,
    WorkspaceConfig,
};

/// Test helper owning a scratch root and the stand-in tool.
struct TestHarness {
    root: TempDir,
    args_file: PathBuf,
}

impl TestHarness {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let args_file = root.path().join("recorded-args.txt");
        Self { root, args_file }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Writes an executable shell script and returns its path.
    fn install_tool(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write tool");
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// A tool that records its arguments and writes the output file.
    fn recording_tool(&self) -> PathBuf {
        self.install_tool(
            "fake-ffmpeg",
            &format!(
                r#"printf '%s\n' "$@" > '{}'
eval "last=\${{$#}}"
printf 'composed media' > "$last""#,
                self.args_file.display()
            ),
        )
    }

    fn config(&self, tool: PathBuf, timeout_secs: u64) -> Config {
        Config {
            tool: ToolConfig::with_path(tool).with_timeout(timeout_secs),
            workspace: WorkspaceConfig::under(self.path().join("workspace")),
            ..Default::default()
        }
    }

    fn composer(&self, tool: PathBuf) -> Composer<FfmpegRunner> {
        Composer::from_config(self.config(tool, 30))
    }

    fn recorded_args(&self) -> Vec<String> {
        std::fs::read_to_string(&self.args_file)
            .expect("Tool did not record its arguments")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.windows(2)
        .filter(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
        .collect()
}

/// Encodes text as ISO-8859-1; every char must be below U+0100.
fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u32 as u8).collect()
}

#[cfg(target_os = "linux")]
fn is_running(pid: i32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        // Zombies are already dead, just not reaped by their new parent yet
        Ok(stat) => stat
            .rsplit_once(')')
            .map(|(_, rest)| !rest.trim_start().starts_with(['Z', 'X']))
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
async fn wait_until_gone(pid: i32) -> bool {
    for _ in 0..60 {
        if !is_running(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_video_only_is_a_remux() {
    let harness = TestHarness::new();
    let inputs = fixtures::input_set(harness.path(), false, false);
    let composer = harness.composer(harness.recording_tool());

    let output = composer
        .compose(ComposeRequest::new(inputs.clone(), OutputFormat::Mp4))
        .await
        .expect("Composition failed");

    assert_eq!(output.mode, CompositionMode::VideoOnly);
    assert_eq!(output.output_path.extension().unwrap(), "mp4");
    assert_eq!(std::fs::read(&output.output_path).unwrap(), b"composed media");

    let args = harness.recorded_args();
    assert_eq!(args[0], "-y");
    assert_eq!(value_after(&args, "-i"), vec![inputs.video().to_str().unwrap()]);
    assert_eq!(value_after(&args, "-c"), vec!["copy"]);
    assert!(value_after(&args, "-map").is_empty());
    assert!(value_after(&args, "-vf").is_empty());
    assert_eq!(value_after(&args, "-f"), vec!["mp4"]);
    assert_eq!(args.last().unwrap(), output.output_path.to_str().unwrap());
}

#[tokio::test]
async fn test_audio_replacement_maps_video_and_audio_by_input() {
    let harness = TestHarness::new();
    let inputs = fixtures::input_set(harness.path(), true, false);
    let composer = harness.composer(harness.recording_tool());

    let output = composer
        .compose(ComposeRequest::new(inputs.clone(), OutputFormat::Mov))
        .await
        .expect("Composition failed");

    assert_eq!(output.mode, CompositionMode::VideoPlusAudio);
    assert_eq!(output.output_path.extension().unwrap(), "mov");

    let args = harness.recorded_args();
    assert_eq!(
        value_after(&args, "-i"),
        vec![
            inputs.video().to_str().unwrap(),
            inputs.audio().unwrap().to_str().unwrap()
        ]
    );
    assert_eq!(value_after(&args, "-c:v"), vec!["copy"]);
    assert_eq!(value_after(&args, "-c:a"), vec!["aac"]);
    assert_eq!(value_after(&args, "-map"), vec!["0:v:0", "1:a:0"]);
    assert!(value_after(&args, "-vf").is_empty());
}

#[tokio::test]
async fn test_latin1_subtitle_is_burned_from_utf8_copy() {
    let harness = TestHarness::new();
    let inputs = fixtures::input_set(harness.path(), false, false);
    let text = "1\n00:00:01,000 --> 00:00:04,000\nLe café est très chaud, dit l'élève.\n\n\
                2\n00:00:05,000 --> 00:00:08,000\nDéjà vu à la fenêtre, où est la crème brûlée ?\n";
    let subtitle = harness.path().join("french.srt");
    std::fs::write(&subtitle, latin1(text)).unwrap();
    let inputs = InputSet::new(inputs.video()).with_subtitle(&subtitle);

    let mut config = harness.config(harness.recording_tool(), 30);
    config.workspace.keep_temp = true;
    let composer = Composer::from_config(config);

    let output = composer
        .compose(ComposeRequest::new(inputs, OutputFormat::Mp4))
        .await
        .expect("Composition failed");

    assert_eq!(output.mode, CompositionMode::VideoPlusSubtitle);
    let encoding = output.subtitle_encoding.as_deref().unwrap();
    assert_ne!(encoding, "UTF-8");
    assert_ne!(encoding, "unknown");

    let args = harness.recorded_args();
    let inputs_declared = value_after(&args, "-i");
    assert_eq!(inputs_declared.len(), 2);
    let utf8_copy = PathBuf::from(inputs_declared[1]);
    assert_ne!(utf8_copy, subtitle);

    let converted = std::fs::read_to_string(&utf8_copy).expect("UTF-8 copy missing");
    assert!(converted.contains("Le café est très chaud"));
    assert!(converted.contains("crème brûlée"));

    let filter = value_after(&args, "-vf");
    assert_eq!(filter.len(), 1);
    assert!(filter[0].starts_with(&format!("subtitles='{}'", utf8_copy.display())));
    assert!(!filter[0].contains("french.srt"));

    assert_eq!(value_after(&args, "-c:v"), vec!["libx264"]);
    assert_eq!(value_after(&args, "-preset"), vec!["medium"]);
    assert_eq!(value_after(&args, "-crf"), vec!["23"]);
    assert_eq!(value_after(&args, "-c:a"), vec!["copy"]);
    assert!(value_after(&args, "-map").is_empty());
}

#[tokio::test]
async fn test_full_composition_reencodes_both_streams() {
    let harness = TestHarness::new();
    let inputs = fixtures::input_set(harness.path(), true, true);
    let composer = harness.composer(harness.recording_tool());

    let output = composer
        .compose(ComposeRequest::new(inputs, OutputFormat::Avi))
        .await
        .expect("Composition failed");

    assert_eq!(output.mode, CompositionMode::VideoPlusAudioPlusSubtitle);

    let args = harness.recorded_args();
    assert_eq!(value_after(&args, "-i").len(), 3);
    assert_eq!(value_after(&args, "-c:v"), vec!["libx264"]);
    assert_eq!(value_after(&args, "-c:a"), vec!["aac"]);
    assert_eq!(value_after(&args, "-map"), vec!["0:v:0", "1:a:0"]);
    assert_eq!(value_after(&args, "-vf").len(), 1);
    assert_eq!(value_after(&args, "-f"), vec!["avi"]);
}

#[tokio::test]
async fn test_tool_failure_returns_captured_stderr() {
    let harness = TestHarness::new();
    let inputs = fixtures::input_set(harness.path(), true, false);
    let tool = harness.install_tool(
        "failing-ffmpeg",
        r#"echo "Stream map '1:a:0' matches no streams." >&2
exit 1"#,
    );
    let composer = harness.composer(tool);

    let err = composer
        .compose(ComposeRequest::new(inputs, OutputFormat::Mp4))
        .await
        .unwrap_err();

    match err {
        ComposeError::ToolFailed { exit_code, stderr } => {
            assert_eq!(exit_code, Some(1));
            assert_eq!(stderr, "Stream map '1:a:0' matches no streams.\n");
        }
        other => panic!("Expected ToolFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_deadline_exceeded_is_timed_out() {
    let harness = TestHarness::new();
    let inputs = fixtures::input_set(harness.path(), false, false);
    let tool = harness.install_tool("hanging-ffmpeg", "sleep 30");
    let composer = Composer::from_config(harness.config(tool, 1));

    let started = std::time::Instant::now();
    let err = composer
        .compose(ComposeRequest::new(inputs, OutputFormat::Mp4))
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "Expected timeout, got {err:?}");
    assert!(err.to_string().contains("too large"));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_failed_requests_leave_no_output_behind() {
    let harness = TestHarness::new();
    let inputs = fixtures::input_set(harness.path(), false, false);
    let partial = r#"eval "last=\${$#}"
printf 'partial' > "$last""#;

    let hanging = harness.install_tool("stalling-ffmpeg", &format!("{}\nsleep 30", partial));
    let failing = harness.install_tool("crashing-ffmpeg", &format!("{}\nexit 1", partial));

    let timed_out = Composer::from_config(harness.config(hanging, 1));
    let err = timed_out
        .compose(ComposeRequest::new(inputs.clone(), OutputFormat::Mp4))
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    let crashed = harness.composer(failing);
    for _ in 0..3 {
        let err = crashed
            .compose(ComposeRequest::new(inputs.clone(), OutputFormat::Mp4))
            .await
            .unwrap_err();
        assert!(matches!(err, ComposeError::ToolFailed { .. }));
    }

    let output_root = &crashed.config().workspace.output_dir;
    let leftovers: Vec<_> = std::fs::read_dir(output_root)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert!(leftovers.is_empty(), "leftover output dirs: {leftovers:?}");
}

#[tokio::test]
async fn test_stray_descendant_does_not_swallow_stderr() {
    let harness = TestHarness::new();
    let tool = harness.install_tool(
        "forking-ffmpeg",
        r#"(sleep 20) &
echo 'Invalid data found when processing input' >&2
exit 1"#,
    );

    let inputs = InputSet::new(fixtures::input_set(harness.path(), false, false).video());
    let plan = PlanBuilder::with_defaults()
        .build(CompositionMode::VideoOnly, &inputs, None, OutputFormat::Mp4)
        .unwrap();

    let runner = FfmpegRunner::new(ToolConfig::with_path(tool));
    let started = std::time::Instant::now();
    let result = runner
        .execute(&plan, &harness.path().join("out.mp4"), Duration::from_secs(30))
        .await
        .unwrap();

    assert_eq!(
        result.outcome,
        ExecutionOutcome::ToolFailed {
            exit_code: Some(1),
            stderr: "Invalid data found when processing input\n".to_string(),
        }
    );
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_timeout_kills_tool_and_descendants() {
    let harness = TestHarness::new();
    let pid_dir = harness.path().join("pids");
    std::fs::create_dir_all(&pid_dir).unwrap();
    let tool = harness.install_tool(
        "forking-ffmpeg",
        &format!(
            r#"echo $$ > '{dir}/shell.pid'
sleep 30 &
echo $! > '{dir}/child.pid'
wait"#,
            dir = pid_dir.display()
        ),
    );

    let inputs = InputSet::new(fixtures::input_set(harness.path(), false, false).video());
    let mode = CompositionMode::classify(&inputs);
    let plan = PlanBuilder::with_defaults()
        .build(mode, &inputs, None, OutputFormat::Mp4)
        .unwrap();

    let runner = FfmpegRunner::new(ToolConfig::with_path(tool));
    let result = runner
        .execute(
            &plan,
            &harness.path().join("out.mp4"),
            Duration::from_millis(500),
        )
        .await
        .expect("Runner failed to start the tool");

    assert!(!result.success);
    assert_eq!(
        result.outcome,
        ExecutionOutcome::TimedOut {
            after: Duration::from_millis(500)
        }
    );

    for name in ["shell.pid", "child.pid"] {
        let pid: i32 = std::fs::read_to_string(pid_dir.join(name))
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        assert!(wait_until_gone(pid).await, "{name} ({pid}) still running");
    }
}

#[tokio::test]
async fn test_streams_are_captured_in_full() {
    let harness = TestHarness::new();
    let tool = harness.install_tool(
        "chatty-ffmpeg",
        r#"i=0
while [ $i -lt 20000 ]; do
  echo "progress line $i"
  i=$((i+1))
done
echo "done" >&2
eval "last=\${$#}"
printf 'x' > "$last""#,
    );

    let inputs = InputSet::new(fixtures::input_set(harness.path(), false, false).video());
    let plan = PlanBuilder::with_defaults()
        .build(CompositionMode::VideoOnly, &inputs, None, OutputFormat::Mp4)
        .unwrap();

    let runner = FfmpegRunner::new(ToolConfig::with_path(tool));
    let result = runner
        .execute(&plan, &harness.path().join("out.mp4"), Duration::from_secs(30))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.outcome, ExecutionOutcome::Completed);
    assert_eq!(result.stdout.lines().count(), 20000);
    assert!(result.stdout.ends_with("progress line 19999\n"));
    assert_eq!(result.stderr, "done\n");
}

#[tokio::test]
async fn test_concurrent_requests_do_not_collide() {
    let harness = TestHarness::new();
    let inputs = fixtures::input_set(harness.path(), false, true);
    let composer = harness.composer(harness.recording_tool());

    let (a, b) = tokio::join!(
        composer.compose(ComposeRequest::new(inputs.clone(), OutputFormat::Mp4)),
        composer.compose(ComposeRequest::new(inputs.clone(), OutputFormat::Mp4)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.request_id, b.request_id);
    assert_ne!(a.output_path, b.output_path);
    assert!(a.output_path.exists());
    assert!(b.output_path.exists());
}
