//! Icon resolution.
//!
//! The only decision made here is whether a candidate exists on disk.
//! Nothing in this module fails; a missing icon is simply `None`.

use std::path::{Path, PathBuf};

/// Conventional icon filenames, in probe order.
pub const CONVENTIONAL_ICON_NAMES: &[&str] = &[
    "icon.ico",
    "icon.png",
    "game.ico",
    "app.ico",
    "logo.png",
];

/// Subfolder probed after the install directory itself.
pub const ICON_SUBFOLDER: &str = "icons";

/// Returns the candidate unchanged if it exists on disk.
pub fn resolve(candidate: Option<&Path>) -> Option<PathBuf> {
    let path = candidate?;
    if path.as_os_str().is_empty() {
        return None;
    }
    path.exists().then(|| path.to_path_buf())
}

/// String flavour of [`resolve`], for paths that come out of metadata.
///
/// Strips the `,<index>` resource suffix Windows puts on icon
/// references (`C:\Game\game.exe,0`) and surrounding quotes.
pub fn resolve_str(candidate: Option<&str>) -> Option<String> {
    let raw = candidate?.trim().trim_matches('"');
    let raw = match raw.rsplit_once(',') {
        Some((path, index)) if index.trim().parse::<i32>().is_ok() => path.trim_matches('"'),
        _ => raw,
    };
    resolve(Some(Path::new(raw))).map(|p| p.to_string_lossy().into_owned())
}

/// Probes `names` in `dir`, then in `dir/icons`. First match wins.
pub fn probe(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    let subfolder = dir.join(ICON_SUBFOLDER);
    [dir, subfolder.as_path()]
        .into_iter()
        .flat_map(|base| names.iter().map(move |name| base.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Probes the conventional icon names in an install directory.
pub fn probe_install_dir(dir: &Path) -> Option<String> {
    probe(dir, CONVENTIONAL_ICON_NAMES).map(|p| p.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolve_keeps_existing_path() {
        let tmp = tempfile::tempdir().unwrap();
        let icon = tmp.path().join("a.ico");
        fs::write(&icon, b"ico").unwrap();
        assert_eq!(resolve(Some(&icon)), Some(icon));
    }

    #[test]
    fn resolve_drops_missing_and_empty() {
        assert_eq!(resolve(None), None);
        assert_eq!(resolve(Some(Path::new(""))), None);
        assert_eq!(resolve(Some(Path::new("/definitely/not/here.ico"))), None);
    }

    #[test]
    fn resolve_str_strips_resource_index_and_quotes() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("game.exe");
        fs::write(&exe, b"MZ").unwrap();
        let reference = format!("\"{}\",0", exe.display());
        assert_eq!(
            resolve_str(Some(&reference)),
            Some(exe.to_string_lossy().into_owned())
        );
    }

    #[test]
    fn probe_prefers_root_then_subfolder() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("icons")).unwrap();
        fs::write(tmp.path().join("icons").join("icon.ico"), b"x").unwrap();
        fs::write(tmp.path().join("logo.png"), b"x").unwrap();

        // Root directory wins even with a lower-priority name.
        assert_eq!(
            probe(tmp.path(), CONVENTIONAL_ICON_NAMES),
            Some(tmp.path().join("logo.png"))
        );

        fs::remove_file(tmp.path().join("logo.png")).unwrap();
        assert_eq!(
            probe(tmp.path(), CONVENTIONAL_ICON_NAMES),
            Some(tmp.path().join("icons").join("icon.ico"))
        );
    }

    #[test]
    fn probe_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(probe_install_dir(tmp.path()), None);
    }
}
