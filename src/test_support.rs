use crate::context::CONFIG_FILE;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
static PATH_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Prepends a directory to `PATH` for the lifetime of the guard.
///
/// Tests using it must be `#[serial]`, as must every test that looks tools up
/// on `PATH`.
pub(crate) struct PathGuard {
    original: Option<OsString>,
    _lock: MutexGuard<'static, ()>,
}

impl PathGuard {
    pub(crate) fn prepend(dir: &Path) -> Self {
        let lock = PATH_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::var_os("PATH");

        let mut paths = vec![dir.to_path_buf()];
        if let Some(ref current) = original {
            paths.extend(std::env::split_paths(current));
        }
        let joined = std::env::join_paths(paths).unwrap();
        // SAFETY: serialized by PATH_LOCK and #[serial]; no other test thread reads PATH meanwhile.
        unsafe { std::env::set_var("PATH", joined) };

        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        // SAFETY: see PathGuard::prepend.
        unsafe {
            match &self.original {
                Some(path) => std::env::set_var("PATH", path),
                None => std::env::remove_var("PATH"),
            }
        }
    }
}

/// Create a task directory containing `task.yaml` with the given content.
pub(crate) fn create_test_task(yaml: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE), yaml).unwrap();
    temp_dir
}

/// Write a file relative to `dir`, creating parent directories.
pub(crate) fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Write a `/bin/sh` script relative to `dir`.
pub(crate) fn write_script(dir: &Path, relative: &str, body: &str) -> PathBuf {
    write_file(dir, relative, &format!("#!/bin/sh\n{}\n", body))
}

/// Write an executable fake tool into `bin_dir`.
#[cfg(unix)]
pub(crate) fn write_tool(bin_dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = write_script(bin_dir, name, body);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// A fake compiler: writes a script to the file named after `-o` (or
/// `-o<file>`) that prints `built from <sources>`.
#[cfg(unix)]
pub(crate) fn write_fake_compiler(bin_dir: &Path, name: &str) {
    write_tool(
        bin_dir,
        name,
        r#"out=""
srcs=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    -o*) out="${1#-o}" ;;
    -*) ;;
    *) srcs="$srcs $1" ;;
  esac
  shift
done
printf '#!/bin/sh\necho built from%s\n' "$srcs" > "$out"
chmod +x "$out""#,
    );
}
