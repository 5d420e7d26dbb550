use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors raised while building a launch command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty {0}")]
    Empty(&'static str),
}

/// What the dispatcher should do to launch or uninstall a game.
///
/// Only the dispatcher interprets this; scanners build it and the
/// aggregator passes it through untouched. Deserialization applies the same
/// non-empty checks as the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", try_from = "RawLaunchCommand")]
pub enum LaunchCommand {
    /// A URI handed to the OS protocol handler (`steam://`, `uplay://`, ...).
    Uri { uri: String },

    /// A direct executable invocation.
    #[serde(rename_all = "camelCase")]
    Executable {
        program: PathBuf,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_dir: Option<PathBuf>,
    },

    /// A file opened through the OS shell (shortcuts).
    #[serde(rename_all = "camelCase")]
    Open {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_dir: Option<PathBuf>,
    },

    /// Delete the given file.
    DeleteFile { path: PathBuf },
}

impl LaunchCommand {
    pub fn uri(uri: impl Into<String>) -> Result<Self, CommandError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(CommandError::Empty("uri"));
        }
        Ok(Self::Uri { uri })
    }

    pub fn executable(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
    ) -> Result<Self, CommandError> {
        let program = program.into();
        if is_blank(&program) {
            return Err(CommandError::Empty("program"));
        }
        Ok(Self::Executable {
            program,
            args,
            working_dir,
        })
    }

    /// Opens `path` with its parent directory as the working directory.
    pub fn open_in_place(path: impl Into<PathBuf>) -> Result<Self, CommandError> {
        let path = path.into();
        if is_blank(&path) {
            return Err(CommandError::Empty("path"));
        }
        let working_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Ok(Self::Open { path, working_dir })
    }

    pub fn delete_file(path: impl Into<PathBuf>) -> Result<Self, CommandError> {
        let path = path.into();
        if is_blank(&path) {
            return Err(CommandError::Empty("path"));
        }
        Ok(Self::DeleteFile { path })
    }

    /// Returns `true` if this command removes something instead of running it.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::DeleteFile { .. })
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

/// Unchecked wire form of [`LaunchCommand`].
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum RawLaunchCommand {
    Uri {
        uri: String,
    },
    #[serde(rename_all = "camelCase")]
    Executable {
        program: PathBuf,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        working_dir: Option<PathBuf>,
    },
    #[serde(rename_all = "camelCase")]
    Open {
        path: PathBuf,
        #[serde(default)]
        working_dir: Option<PathBuf>,
    },
    DeleteFile {
        path: PathBuf,
    },
}

impl TryFrom<RawLaunchCommand> for LaunchCommand {
    type Error = CommandError;

    fn try_from(raw: RawLaunchCommand) -> Result<Self, Self::Error> {
        match raw {
            RawLaunchCommand::Uri { uri } => Self::uri(uri),
            RawLaunchCommand::Executable {
                program,
                args,
                working_dir,
            } => Self::executable(program, args, working_dir),
            RawLaunchCommand::Open { path, working_dir } => {
                if is_blank(&path) {
                    return Err(CommandError::Empty("path"));
                }
                Ok(Self::Open { path, working_dir })
            }
            RawLaunchCommand::DeleteFile { path } => Self::delete_file(path),
        }
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri { uri } => write!(f, "{uri}"),
            Self::Executable { program, args, .. } => {
                write!(f, "{}", quote(&program.to_string_lossy()))?;
                for arg in args {
                    write!(f, " {}", quote(arg))?;
                }
                Ok(())
            }
            Self::Open { path, .. } => write!(f, "{}", quote(&path.to_string_lossy())),
            Self::DeleteFile { path } => write!(f, "delete {}", quote(&path.to_string_lossy())),
        }
    }
}

fn quote(s: &str) -> String {
    if s.contains(' ') && !s.starts_with('"') {
        format!("\"{s}\"")
    } else {
        s.to_string()
    }
}
