use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use processo_core::BackendError;

/// Display name of a tool for error messages.
pub(crate) fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("tool")
        .to_string()
}

/// Run `program` with `args` and return its output if it exited successfully.
///
/// A missing executable maps to [`BackendError::ToolNotFound`], a non-zero
/// exit to [`BackendError::ToolFailed`] with the captured stderr.
pub(crate) fn run<I, S>(program: &Path, args: I) -> Result<Output, BackendError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool = tool_name(program);
    let output = Command::new(program).args(args).output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BackendError::ToolNotFound { tool: tool.clone() }
        } else {
            BackendError::Io(e)
        }
    })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!(tool = %tool, code, stderr = %stderr, "tool exited with failure");
        return Err(BackendError::ToolFailed { tool, code, stderr });
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_tool_not_found() {
        let err = run(Path::new("/nonexistent/bin/pdftotext"), ["-v"]).unwrap_err();
        match err {
            BackendError::ToolNotFound { tool } => assert_eq!(tool, "pdftotext"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_tool_failed() {
        let err = run(Path::new("sh"), ["-c", "echo boom >&2; exit 3"]).unwrap_err();
        match err {
            BackendError::ToolFailed { tool, code, stderr } => {
                assert_eq!(tool, "sh");
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
