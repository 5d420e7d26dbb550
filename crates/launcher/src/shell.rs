//! OS shell integration.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::LaunchError;

/// Bound on every shell operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The write side of the OS.
pub trait Shell: Send + Sync {
    /// Opens a URI or path with the OS handler.
    fn open<'a>(
        &'a self,
        target: &'a str,
        working_dir: Option<&'a Path>,
    ) -> BoxFuture<'a, Result<(), LaunchError>>;

    /// Starts a program detached from this process.
    fn spawn<'a>(
        &'a self,
        program: &'a Path,
        args: &'a [String],
        working_dir: Option<&'a Path>,
    ) -> BoxFuture<'a, Result<(), LaunchError>>;

    /// Forcibly terminates every process with one of the image names.
    fn terminate<'a>(&'a self, image_names: &'a [&'a str]) -> BoxFuture<'a, Result<(), LaunchError>>;

    fn delete_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<(), LaunchError>>;
}

/// [`Shell`] backed by the running system.
#[derive(Debug, Clone)]
pub struct SystemShell {
    timeout: Duration,
}

impl Default for SystemShell {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SystemShell {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Tries each opener `open` knows for this platform until one succeeds.
    async fn open_impl(&self, target: &str, working_dir: Option<&Path>) -> Result<(), LaunchError> {
        let mut last_error = String::from("no opener available");

        for std_command in open::commands(target) {
            let mut command = tokio::process::Command::from(std_command);
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
            if let Some(dir) = working_dir {
                command.current_dir(dir);
            }

            let status = match tokio::time::timeout(self.timeout, command.status()).await {
                Err(_) => return Err(LaunchError::Timeout(format!("opening {target}"))),
                Ok(Err(e)) => {
                    last_error = e.to_string();
                    continue;
                }
                Ok(Ok(status)) => status,
            };

            if status.success() {
                tracing::debug!(target = %target, "opened");
                return Ok(());
            }
            last_error = format!("opener exited with {status}");
        }

        Err(LaunchError::Open {
            target: target.to_string(),
            message: last_error,
        })
    }

    async fn spawn_impl(
        &self,
        program: &Path,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<(), LaunchError> {
        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|e| LaunchError::Spawn {
            program: program.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(program = %program.display(), pid = ?child.id(), "spawned");
        Ok(())
    }

    async fn terminate_impl(&self, image_names: &[&str]) -> Result<(), LaunchError> {
        for image in image_names {
            let mut command = kill_command(image);
            command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

            match tokio::time::timeout(self.timeout, command.status()).await {
                Err(_) => return Err(LaunchError::Timeout(format!("stopping {image}"))),
                Ok(Err(e)) => {
                    tracing::warn!(image = %image, error = %e, "kill command failed to run");
                    return Err(LaunchError::Terminate(image.to_string()));
                }
                // Non-zero exit means nothing was running, which is fine.
                Ok(Ok(status)) => tracing::debug!(image = %image, %status, "terminate"),
            }
        }
        Ok(())
    }

    async fn delete_impl(&self, path: &Path) -> Result<(), LaunchError> {
        let result = tokio::time::timeout(self.timeout, tokio::fs::remove_file(path))
            .await
            .map_err(|_| LaunchError::Timeout(format!("deleting {}", path.display())))?;
        result.map_err(|source| LaunchError::Delete {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(windows)]
fn kill_command(image: &str) -> tokio::process::Command {
    let mut command = tokio::process::Command::new("taskkill");
    command.args(["/F", "/IM", image]);
    command
}

#[cfg(not(windows))]
fn kill_command(image: &str) -> tokio::process::Command {
    let mut command = tokio::process::Command::new("pkill");
    command.args(["-x", image]);
    command
}

impl Shell for SystemShell {
    fn open<'a>(
        &'a self,
        target: &'a str,
        working_dir: Option<&'a Path>,
    ) -> BoxFuture<'a, Result<(), LaunchError>> {
        Box::pin(self.open_impl(target, working_dir))
    }

    fn spawn<'a>(
        &'a self,
        program: &'a Path,
        args: &'a [String],
        working_dir: Option<&'a Path>,
    ) -> BoxFuture<'a, Result<(), LaunchError>> {
        Box::pin(self.spawn_impl(program, args, working_dir))
    }

    fn terminate<'a>(&'a self, image_names: &'a [&'a str]) -> BoxFuture<'a, Result<(), LaunchError>> {
        Box::pin(self.terminate_impl(image_names))
    }

    fn delete_file<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<(), LaunchError>> {
        Box::pin(self.delete_impl(path))
    }
}

/// Working directory to use for a path target: its parent, if any.
pub fn parent_dir(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
