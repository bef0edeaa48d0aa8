//! Peak-memory measurement of minified text, run in a separate interpreter.

use async_trait::async_trait;
use cs_core::{MeasurementConfig, MeasurementError, SourceText};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const PEAK_MARKER: &str = "CODESLIM_PEAK_KB=";

/// Executes stdin in a fresh namespace and prints peak RSS in KiB.
const MEASURE_SCRIPT: &str = r#"import resource, sys
src = sys.stdin.read()
exec(compile(src, "<codeslim>", "exec"), {"__name__": "__codeslim__"})
peak = resource.getrusage(resource.RUSAGE_SELF).ru_maxrss
if sys.platform == "darwin":
    peak //= 1024
sys.stdout.write("\nCODESLIM_PEAK_KB=%d\n" % peak)
"#;

#[async_trait]
pub trait MemoryMeter: Send + Sync {
    /// Peak resident memory, in MiB, of executing `code`.
    async fn peak_mib(&self, code: &SourceText) -> Result<f64, MeasurementError>;
}

/// Runs the code with a Python interpreter in isolated mode (`-I`).
pub struct PythonMemoryMeter {
    interpreter: String,
    timeout: Option<Duration>,
}

impl PythonMemoryMeter {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_config(config: &MeasurementConfig) -> Self {
        let meter = Self::new(config.interpreter.clone());
        match config.timeout_ms {
            0 => meter,
            ms => meter.with_timeout(Duration::from_millis(ms)),
        }
    }

    async fn run(&self, code: &str) -> Result<f64, MeasurementError> {
        let mut child = Command::new(&self.interpreter)
            .args(["-I", "-c", MEASURE_SCRIPT])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MeasurementError::Unavailable(format!("spawn {}: {e}", self.interpreter)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(code.as_bytes())
                .await
                .map_err(|e| MeasurementError::Unavailable(format!("stdin: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| MeasurementError::Unavailable(format!("wait: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last = stderr.lines().last().unwrap_or("").trim().to_string();
            return Err(MeasurementError::Unavailable(format!(
                "interpreter exited with {}: {last}",
                output.status
            )));
        }
        parse_peak(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl MemoryMeter for PythonMemoryMeter {
    async fn peak_mib(&self, code: &SourceText) -> Result<f64, MeasurementError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(code.as_str()))
                .await
                .map_err(|_| MeasurementError::TimedOut(limit.as_millis() as u64))?,
            None => self.run(code.as_str()).await,
        }
    }
}

fn parse_peak(stdout: &str) -> Result<f64, MeasurementError> {
    let kb = stdout
        .lines()
        .rev()
        .find_map(|l| l.trim().strip_prefix(PEAK_MARKER))
        .ok_or_else(|| MeasurementError::Unavailable("no sample in output".into()))?
        .parse::<u64>()
        .map_err(|e| MeasurementError::Unavailable(format!("bad sample: {e}")))?;
    Ok(kb as f64 / 1024.0)
}

/// Measure, reporting 0.0 when no sample could be taken.
pub async fn measure_or_zero(meter: &dyn MemoryMeter, code: &SourceText) -> f64 {
    match meter.peak_mib(code).await {
        Ok(mib) => mib,
        Err(e) => {
            tracing::warn!(error = %e, "memory measurement unavailable");
            0.0
        }
    }
}
