use std::sync::Arc;
use std::time::Duration;

use gamedeck_model::{Game, LaunchCommand};

use crate::shell::{Shell, parent_dir};
use crate::{LaunchError, Notification};

/// A client to terminate and reopen so it refreshes its on-disk state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRelaunch {
    pub name: String,
    pub processes: Vec<String>,
    pub reopen_uri: String,
    /// Pause between terminating and reopening.
    pub settle: Duration,
}

/// Interprets launch commands and reports the outcome.
#[derive(Clone)]
pub struct Dispatcher {
    shell: Arc<dyn Shell>,
}

impl Dispatcher {
    pub fn new(shell: Arc<dyn Shell>) -> Self {
        Self { shell }
    }

    /// Launches `game`. A successful launch asks the caller to dismiss.
    pub async fn launch(&self, game: &Game) -> Notification {
        match self.execute(&game.launch_command).await {
            Ok(()) => {
                tracing::info!(id = %game.id, title = %game.title, "launched");
                Notification::success("Launching", game.title.clone()).dismissing()
            }
            Err(e) => {
                tracing::warn!(id = %game.id, error = %e, "launch failed");
                Notification::failure(format!("Failed to launch {}", game.title), e.to_string())
            }
        }
    }

    /// Uninstalls `game`. Titles without an uninstall command are reported
    /// as unsupported and nothing is executed.
    pub async fn uninstall(&self, game: &Game) -> Notification {
        let Some(command) = &game.uninstall_command else {
            return Notification::unsupported(
                game.title.clone(),
                "Uninstall is not supported for this title",
            );
        };

        match self.execute(command).await {
            Ok(()) => {
                tracing::info!(id = %game.id, destructive = command.is_destructive(), "uninstall started");
                let message = if command.is_destructive() {
                    "Shortcut removed"
                } else {
                    "Uninstaller started"
                };
                Notification::success(game.title.clone(), message)
            }
            Err(e) => {
                tracing::warn!(id = %game.id, error = %e, "uninstall failed");
                Notification::failure(format!("Failed to uninstall {}", game.title), e.to_string())
            }
        }
    }

    /// Terminates a client's processes, waits, then reopens it.
    pub async fn relaunch_client(&self, client: &ClientRelaunch) -> Notification {
        let images: Vec<&str> = client.processes.iter().map(String::as_str).collect();
        if let Err(e) = self.shell.terminate(&images).await {
            tracing::warn!(client = %client.name, error = %e, "terminate failed");
            return Notification::failure(format!("Failed to restart {}", client.name), e.to_string());
        }

        if !client.settle.is_zero() {
            tokio::time::sleep(client.settle).await;
        }

        match self.shell.open(&client.reopen_uri, None).await {
            Ok(()) => Notification::success(format!("Restarting {}", client.name), "Library will refresh"),
            Err(e) => {
                Notification::failure(format!("Failed to restart {}", client.name), e.to_string())
            }
        }
    }

    async fn execute(&self, command: &LaunchCommand) -> Result<(), LaunchError> {
        match command {
            LaunchCommand::Uri { uri } => self.shell.open(uri, None).await,
            LaunchCommand::Executable {
                program,
                args,
                working_dir,
            } => {
                self.shell
                    .spawn(program, args, working_dir.as_deref())
                    .await
            }
            LaunchCommand::Open { path, working_dir } => {
                let dir = working_dir.clone().or_else(|| parent_dir(path));
                let target = path.to_string_lossy();
                self.shell.open(&target, dir.as_deref()).await
            }
            LaunchCommand::DeleteFile { path } => self.shell.delete_file(path.as_path()).await,
        }
    }
}
