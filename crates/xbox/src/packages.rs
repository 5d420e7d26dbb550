//! Locally installed Appx packages.

use std::path::PathBuf;
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::Deserialize;

use crate::XboxError;

/// Default bound on the PowerShell enumeration.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const SCRIPT: &str = "Get-AppxPackage | Select-Object Name,PackageFamilyName,InstallLocation,IsFramework | ConvertTo-Json -Compress";

/// One row of `Get-AppxPackage`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppxPackage {
    pub name: String,
    pub package_family_name: String,
    pub install_location: Option<PathBuf>,
    pub is_framework: bool,
}

/// Source of installed packages.
pub trait PackageSource: Send + Sync {
    fn installed(&self) -> BoxFuture<'_, Result<Vec<AppxPackage>, XboxError>>;
}

/// Parses `ConvertTo-Json` output, which is a bare object for a single
/// package and an array otherwise.
pub fn parse_packages(json: &str) -> Result<Vec<AppxPackage>, XboxError> {
    let json = json.trim().trim_start_matches('\u{feff}');
    if json.is_empty() {
        return Ok(Vec::new());
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<AppxPackage>),
        One(AppxPackage),
    }

    Ok(match serde_json::from_str(json)? {
        OneOrMany::Many(list) => list,
        OneOrMany::One(pkg) => vec![pkg],
    })
}

/// Enumerates packages through `powershell.exe`.
#[derive(Debug, Clone)]
pub struct PowerShellPackages {
    timeout: Duration,
}

impl Default for PowerShellPackages {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PowerShellPackages {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self) -> Result<Vec<AppxPackage>, XboxError> {
        let command = tokio::process::Command::new("powershell")
            .args(["-NoProfile", "-NonInteractive", "-Command", SCRIPT])
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, command)
            .await
            .map_err(|_| XboxError::Timeout)?
            .map_err(|e| XboxError::Packages(format!("failed to start powershell: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(XboxError::Packages(format!(
                "powershell exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_packages(&String::from_utf8_lossy(&output.stdout))
    }
}

impl PackageSource for PowerShellPackages {
    fn installed(&self) -> BoxFuture<'_, Result<Vec<AppxPackage>, XboxError>> {
        Box::pin(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_and_single_object() {
        let many = parse_packages(
            r#"[{"Name":"Microsoft.VCLibs.140.00","PackageFamilyName":"Microsoft.VCLibs.140.00_8wekyb3d8bbwe","InstallLocation":"C:\\Program Files\\WindowsApps\\VCLibs","IsFramework":true},
               {"Name":"Microsoft.Halo","PackageFamilyName":"Microsoft.Halo_8wekyb3d8bbwe","InstallLocation":"C:\\XboxGames\\Halo\\Content","IsFramework":false}]"#,
        )
        .unwrap();
        assert_eq!(many.len(), 2);
        assert!(many[0].is_framework);
        assert_eq!(many[1].package_family_name, "Microsoft.Halo_8wekyb3d8bbwe");

        let one = parse_packages(
            r#"{"Name":"Microsoft.Halo","PackageFamilyName":"Microsoft.Halo_8wekyb3d8bbwe","InstallLocation":null,"IsFramework":false}"#,
        )
        .unwrap();
        assert_eq!(one.len(), 1);
        assert!(one[0].install_location.is_none());
    }

    #[test]
    fn empty_output_is_empty() {
        assert!(parse_packages("  \r\n").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_packages("Get-AppxPackage : not recognized").is_err());
    }
}
