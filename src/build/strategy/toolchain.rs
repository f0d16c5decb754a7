//! Toolchain invocation shared by the build strategies.

use crate::error::{BuildError, Result, indent};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Maximum number of output lines kept in a compilation failure.
pub const FAILURE_MAX_LINES: usize = 50;

/// Maximum total characters kept in a compilation failure.
pub const FAILURE_MAX_CHARS: usize = 4096;

/// Run a toolchain command in `cwd`, failing with its output on a non-zero exit.
///
/// `program` is the name reported to the user.
pub(crate) fn run_compilation(args: &[String], program: &str, cwd: &Path) -> Result<()> {
    let (tool, tool_args) = args.split_first().ok_or_else(|| BuildError::CompilationFailed {
        program: program.to_string(),
        output: "empty command".to_string(),
    })?;
    check_tool(tool)?;

    debug!(command = %args.join(" "), cwd = %cwd.display(), "running toolchain");
    let output = Command::new(tool)
        .args(tool_args)
        .current_dir(cwd)
        .output()
        .map_err(|e| BuildError::CompilationFailed {
            program: program.to_string(),
            output: format!("failed to execute {}: {}", tool, e),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if output.status.success() {
        if !stderr.trim().is_empty() {
            warn!(program, "{}", stderr.trim_end());
        }
        return Ok(());
    }

    let combined = if !stderr.is_empty() {
        format!("{}\n{}", stdout, stderr)
    } else {
        stdout
    };
    let exit_code = output.status.code().unwrap_or(-1);
    let mut message = format!("Command: {}\nExit code: {}", args.join(" "), exit_code);
    let truncated = truncate_output(combined.trim(), FAILURE_MAX_LINES, FAILURE_MAX_CHARS);
    if !truncated.is_empty() {
        message.push('\n');
        message.push_str(&indent(&truncated));
    }

    Err(BuildError::CompilationFailed {
        program: program.to_string(),
        output: message,
    })
}

/// Prepare a script for execution: validate its shebang, check the
/// interpreter exists and mark the file executable.
pub(crate) fn build_script(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let interpreter = read_shebang(&path, name)?;

    let words = shell_words::split(&interpreter).map_err(|e| {
        BuildError::InvalidScript(format!("Unparsable shebang in {}: {}", name, e))
    })?;
    let Some(first) = words.first() else {
        return Err(BuildError::InvalidScript(format!("Empty shebang in {}", name)));
    };
    check_tool(first)?;
    if first.ends_with("/env")
        && let Some(program) = words.iter().skip(1).find(|w| !w.starts_with('-'))
    {
        check_tool(program)?;
    }

    make_executable(&path)?;
    Ok(PathBuf::from(name))
}

/// Return the interpreter line of a script, without the leading `#!`.
fn read_shebang(path: &Path, name: &str) -> Result<String> {
    let content = fs::read(path)
        .map_err(|e| BuildError::io(format!("failed to read '{}'", path.display()), e))?;
    let first_line_end = content
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(content.len());
    let first_line = String::from_utf8_lossy(&content[..first_line_end]);

    if !first_line.starts_with("#!") {
        return Err(BuildError::InvalidScript(format!("Missing shebang in {}", name)));
    }
    if first_line.ends_with("\r\n") {
        return Err(BuildError::InvalidScript(format!(
            "First line ends with '\\r\\n' in {}",
            name
        )));
    }
    Ok(first_line[2..].trim().to_string())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .map_err(|e| BuildError::io(format!("failed to stat '{}'", path.display()), e))?;
    let mut permissions = metadata.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions).map_err(|e| {
        BuildError::io(
            format!("failed to make '{}' executable", path.display()),
            e,
        )
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Check that a tool exists, either as a path or on `PATH`.
pub(crate) fn check_tool(tool: &str) -> Result<()> {
    let found = if tool.contains('/') {
        Path::new(tool).is_file()
    } else {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(tool))))
            .unwrap_or(false)
    };

    if found {
        Ok(())
    } else {
        Err(BuildError::MissingTool {
            tool: tool.to_string(),
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Keep the last `max_lines` lines, then the last `max_chars` characters.
pub(crate) fn truncate_output(output: &str, max_lines: usize, max_chars: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    let relevant_lines: Vec<&str> = if lines.len() > max_lines {
        lines[lines.len() - max_lines..].to_vec()
    } else {
        lines
    };

    let mut result = relevant_lines.join("\n");

    if result.len() > max_chars {
        let mut start = result.len() - max_chars;
        while !result.is_char_boundary(start) {
            start += 1;
        }
        result = format!("...(truncated)...\n{}", &result[start..]);
    }

    result
}
