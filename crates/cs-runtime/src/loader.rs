//! Python behavior loader — runs a rewritten definition in a child interpreter.

use crate::rewrite::{Behavior, BehaviorLoader};
use anyhow::{anyhow, Context as _};
use cs_core::{CodeslimError, TransformedArtifact};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Defines the code, calls the named function and prints its JSON result.
/// A JSON array of arguments is splatted; anything else is passed as one.
const CALL_SCRIPT: &str = r#"import json, sys
payload = json.loads(sys.stdin.read())
ns = {"__name__": "__codeslim__"}
exec(compile(payload["code"], "<codeslim>", "exec"), ns)
fn = ns[payload["name"]]
args = payload["args"]
result = fn(*args) if isinstance(args, list) else fn(args)
sys.stdout.write("\n" + json.dumps(result) + "\n")
"#;

#[derive(Debug, Clone)]
pub struct PythonLoader {
    interpreter: String,
}

impl PythonLoader {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl Default for PythonLoader {
    fn default() -> Self {
        Self::new("python3")
    }
}

impl<A, R> BehaviorLoader<A, R> for PythonLoader
where
    A: Serialize + 'static,
    R: DeserializeOwned + 'static,
{
    fn load(&self, name: &str, artifact: &TransformedArtifact) -> anyhow::Result<Behavior<A, R>> {
        let interpreter = self.interpreter.clone();
        let code = artifact.text().to_string();
        let name = name.to_string();
        Ok(Arc::new(move |args: A| {
            call_python(&interpreter, &code, &name, &args).map_err(CodeslimError::Load)
        }))
    }
}

fn call_python<A: Serialize, R: DeserializeOwned>(
    interpreter: &str,
    code: &str,
    name: &str,
    args: &A,
) -> anyhow::Result<R> {
    let payload = serde_json::json!({ "code": code, "name": name, "args": args });
    let mut child = Command::new(interpreter)
        .args(["-I", "-c", CALL_SCRIPT])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn {interpreter}"))?;
    // Dropping stdin closes the pipe; the child is always reaped below,
    // even when the write fails because it exited early.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(payload.to_string().as_bytes()),
        None => Ok(()),
    };
    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "{name} failed: {}",
            stderr.lines().last().unwrap_or("no output").trim()
        ));
    }
    written.with_context(|| format!("write payload to {interpreter}"))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| anyhow!("{name} produced no result"))?;
    serde_json::from_str(last).with_context(|| format!("decode result of {name}"))
}
