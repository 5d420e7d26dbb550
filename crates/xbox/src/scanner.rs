use std::collections::HashSet;
use std::sync::Arc;

use gamedeck_model::{Game, LaunchCommand, Platform};

use crate::XboxError;
use crate::cache::{Entitlements, ResultCache};
use crate::manifest::read_application_id;
use crate::packages::{AppxPackage, PackageSource, PowerShellPackages};

/// Intersects the cached owned set with locally installed packages.
#[derive(Clone)]
pub struct XboxScanner {
    cache: Arc<dyn ResultCache>,
    packages: Arc<dyn PackageSource>,
}

impl XboxScanner {
    pub fn new(cache: Arc<dyn ResultCache>) -> Self {
        Self::with_source(cache, Arc::new(PowerShellPackages::default()))
    }

    pub fn with_source(cache: Arc<dyn ResultCache>, packages: Arc<dyn PackageSource>) -> Self {
        Self { cache, packages }
    }

    /// An empty owned set returns no games and does not enumerate packages.
    pub async fn scan(&self) -> Result<Vec<Game>, XboxError> {
        let entitlements = Entitlements::load(self.cache.as_ref());
        if entitlements.is_empty() {
            tracing::debug!("no cached Xbox entitlements");
            return Ok(Vec::new());
        }

        let owned: HashSet<&str> = entitlements.owned.iter().map(String::as_str).collect();
        let installed = self.packages.installed().await?;

        let mut games = Vec::new();
        for pkg in installed {
            if pkg.is_framework || !owned.contains(pkg.package_family_name.as_str()) {
                continue;
            }
            games.push(normalize(&pkg, &entitlements)?);
        }
        Ok(games)
    }
}

fn normalize(pkg: &AppxPackage, entitlements: &Entitlements) -> Result<Game, XboxError> {
    let pfn = &pkg.package_family_name;
    let app_id = read_application_id(pkg.install_location.as_deref());
    let launch = LaunchCommand::uri(format!(r"shell:AppsFolder\{pfn}!{app_id}"))?;

    let meta = entitlements.metadata.get(pfn);
    let title = meta
        .map(|m| m.name.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or(&pkg.name);

    Ok(Game::new(Platform::Xbox.game_id(pfn), title, Platform::Xbox.label(), launch)
        .with_icon(meta.and_then(|m| m.image.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, TitleMeta};
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPackages {
        packages: Vec<AppxPackage>,
        calls: AtomicUsize,
    }

    impl PackageSource for FixedPackages {
        fn installed(&self) -> BoxFuture<'_, Result<Vec<AppxPackage>, XboxError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let packages = self.packages.clone();
            Box::pin(async move { Ok(packages) })
        }
    }

    fn package(name: &str, pfn: &str, framework: bool) -> AppxPackage {
        AppxPackage {
            name: name.into(),
            package_family_name: pfn.into(),
            install_location: None,
            is_framework: framework,
        }
    }

    #[tokio::test]
    async fn empty_cache_returns_empty_without_enumerating() {
        let source = Arc::new(FixedPackages {
            packages: vec![package("Microsoft.Halo", "Microsoft.Halo_8wekyb3d8bbwe", false)],
            calls: AtomicUsize::new(0),
        });
        let scanner = XboxScanner::with_source(Arc::new(MemoryCache::new()), source.clone());

        let games = scanner.scan().await.unwrap();
        assert!(games.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn intersects_owned_with_installed() {
        let cache = Arc::new(MemoryCache::new());
        let mut ents = Entitlements {
            owned: vec![
                "Microsoft.Halo_8wekyb3d8bbwe".into(),
                "Not.Installed_1".into(),
                "Microsoft.VCLibs_8wekyb3d8bbwe".into(),
            ],
            ..Default::default()
        };
        ents.metadata.insert(
            "Microsoft.Halo_8wekyb3d8bbwe".into(),
            TitleMeta {
                name: "Halo: The Master Chief Collection".into(),
                image: Some("https://img/halo.png".into()),
            },
        );
        ents.store(cache.as_ref()).unwrap();

        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("AppxManifest.xml"),
            r#"<Package><Applications><Application Id="HaloMCC"/></Applications></Package>"#,
        )
        .unwrap();
        let mut halo = package("Microsoft.Halo", "Microsoft.Halo_8wekyb3d8bbwe", false);
        halo.install_location = Some(tmp.path().to_path_buf());

        let source = Arc::new(FixedPackages {
            packages: vec![
                halo,
                package("Microsoft.VCLibs", "Microsoft.VCLibs_8wekyb3d8bbwe", true),
                package("Some.Unowned", "Some.Unowned_x", false),
            ],
            calls: AtomicUsize::new(0),
        });

        let games = XboxScanner::with_source(cache, source).scan().await.unwrap();
        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.id, "Microsoft.Halo_8wekyb3d8bbwe");
        assert_eq!(game.title, "Halo: The Master Chief Collection");
        assert_eq!(game.platform, "Xbox");
        assert_eq!(
            game.launch_command,
            LaunchCommand::uri(r"shell:AppsFolder\Microsoft.Halo_8wekyb3d8bbwe!HaloMCC").unwrap()
        );
        assert_eq!(game.icon_path.as_deref(), Some("https://img/halo.png"));
        assert!(game.uninstall_command.is_none());
    }

    #[tokio::test]
    async fn enumeration_failure_is_an_error() {
        struct Failing;
        impl PackageSource for Failing {
            fn installed(&self) -> BoxFuture<'_, Result<Vec<AppxPackage>, XboxError>> {
                Box::pin(async { Err(XboxError::Timeout) })
            }
        }

        let cache = Arc::new(MemoryCache::new());
        Entitlements {
            owned: vec!["A_1".into()],
            ..Default::default()
        }
        .store(cache.as_ref())
        .unwrap();

        let result = XboxScanner::with_source(cache, Arc::new(Failing)).scan().await;
        assert!(matches!(result, Err(XboxError::Timeout)));
    }
}
