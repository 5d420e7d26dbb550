//! EA app / Origin titles found by publisher in the uninstall registry.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamedeck_model::{Game, LaunchCommand, Platform, icon};
use gamedeck_registry::{Registry, UninstallEntry, uninstall_entries};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::StoreError;
use crate::cmdline::{split_args, split_command_line};

/// Publisher spellings seen on EA titles.
pub const PUBLISHERS: &[&str] = &[
    "electronic arts",
    "ea games",
    "ea sports",
    "ea digital illusions",
    "ea swiss",
];

const INSTALLER_MANIFEST: &str = r"__Installer/installerdata.xml";

/// A `<launcher>` element of `installerdata.xml`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LauncherEntry {
    pub file_path: String,
    pub parameters: String,
    pub trial: bool,
}

/// Extracts every `runtime/launcher` entry from an installer manifest.
pub fn parse_launchers(xml: &str) -> Result<Vec<LauncherEntry>, StoreError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<LauncherEntry> = None;
    let mut launchers = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                if name == "launcher" && stack.last().is_some_and(|p| p == "runtime") {
                    current = Some(LauncherEntry::default());
                }
                stack.push(name);
            }
            Ok(Event::End(_)) => {
                if let Some(name) = stack.pop()
                    && name == "launcher"
                    && let Some(entry) = current.take()
                {
                    launchers.push(entry);
                }
            }
            Ok(Event::Text(t)) => {
                let (Some(entry), Some(field)) = (current.as_mut(), stack.last()) else {
                    continue;
                };
                let text = t
                    .unescape()
                    .map_err(|e| StoreError::Xml(e.to_string()))?
                    .trim()
                    .to_string();
                match field.as_str() {
                    "filepath" => entry.file_path = text,
                    "parameters" => entry.parameters = text,
                    "trial" => entry.trial = matches!(text.as_str(), "1" | "true"),
                    _ => {}
                }
            }
            Ok(_) => {}
            Err(e) => return Err(StoreError::Xml(e.to_string())),
        }
    }

    Ok(launchers)
}

/// Picks the non-trial launcher, falling back to the first one.
fn preferred(launchers: &[LauncherEntry]) -> Option<&LauncherEntry> {
    let usable = || launchers.iter().filter(|l| !l.file_path.is_empty());
    usable().find(|l| !l.trial).or_else(|| usable().next())
}

/// Resolves a manifest `filePath` against the install location.
///
/// A leading `[HKEY_...]` reference stands for the install directory.
pub fn resolve_launcher_path(file_path: &str, install_dir: &Path) -> PathBuf {
    let rest = match file_path.strip_prefix('[').and_then(|s| s.split_once(']')) {
        Some((_, rest)) => rest,
        None => file_path,
    };
    let rest = rest.trim_start_matches(['\\', '/']);
    if file_path.starts_with('[') || !looks_absolute(rest) {
        install_dir.join(rest)
    } else {
        PathBuf::from(rest)
    }
}

/// Absolute on either Windows or Unix conventions, whatever the host.
fn looks_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/');
    drive || path.starts_with('/') || path.starts_with(r"\\") || Path::new(path).is_absolute()
}

/// Scans the uninstall registry for EA-published titles.
#[derive(Clone)]
pub struct EaScanner {
    registry: Arc<dyn Registry>,
}

impl EaScanner {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    pub fn scan(&self) -> Result<Vec<Game>, StoreError> {
        let mut games = Vec::new();
        for entry in uninstall_entries(self.registry.as_ref()) {
            if !entry.published_by(PUBLISHERS) {
                continue;
            }
            match normalize(&entry) {
                Ok(Some(game)) => games.push(game),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(key = %entry.key_name, error = %e, "skipping EA title");
                }
            }
        }
        Ok(games)
    }
}

fn normalize(entry: &UninstallEntry) -> Result<Option<Game>, StoreError> {
    let Some(location) = &entry.install_location else {
        tracing::debug!(key = %entry.key_name, "EA title without install location");
        return Ok(None);
    };
    let install_dir = PathBuf::from(location);

    let xml = fs::read_to_string(install_dir.join(INSTALLER_MANIFEST))?;
    let launchers = parse_launchers(&xml)?;
    let Some(launcher) = preferred(&launchers) else {
        tracing::debug!(key = %entry.key_name, "installer manifest has no launcher");
        return Ok(None);
    };

    let program = resolve_launcher_path(&launcher.file_path, &install_dir);
    let launch = LaunchCommand::executable(
        &program,
        split_args(&launcher.parameters),
        Some(install_dir.clone()),
    )?;

    let uninstall = entry
        .uninstall_string
        .as_deref()
        .and_then(split_command_line)
        .map(|(program, args)| LaunchCommand::executable(program, args, None))
        .transpose()?;

    let icon = icon::resolve_str(entry.display_icon.as_deref())
        .or_else(|| icon::resolve(Some(&program)).map(|p| p.to_string_lossy().into_owned()))
        .or_else(|| icon::probe_install_dir(&install_dir));

    Ok(Some(
        Game::new(
            Platform::Ea.game_id(&entry.key_name),
            entry.display_name.clone(),
            Platform::Ea.label(),
            launch,
        )
        .with_icon(icon)
        .with_uninstall(uninstall),
    ))
}
