//! Runs the enabled scanners and merges their output.

use std::sync::Arc;

use futures_util::future::join_all;
use gamedeck_model::{Game, Platform, SortOrder, sort_games};
use gamedeck_registry::Registry;
use gamedeck_steam::SteamScanner;
use gamedeck_stores::{
    EaScanner, EpicScanner, GogScanner, PlayniteScanner, ShortcutScanner, UbisoftScanner,
};
use gamedeck_xbox::{ResultCache, XboxScanner};

use crate::scanner::{Scanner, ScannerSlot};
use crate::settings::Settings;

/// Capabilities threaded into scanner construction.
#[derive(Clone)]
pub struct ScanContext {
    pub registry: Arc<dyn Registry>,
    /// Only the Xbox scanner receives this.
    pub cache: Arc<dyn ResultCache>,
}

impl ScanContext {
    pub fn new(registry: Arc<dyn Registry>, cache: Arc<dyn ResultCache>) -> Self {
        Self { registry, cache }
    }
}

/// What happened to one scanner during a scan cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerOutcome {
    pub platform: Platform,
    /// Number of games found, or a message naming the failure.
    pub result: Result<usize, String>,
}

impl ScannerOutcome {
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub games: Vec<Game>,
    pub outcomes: Vec<ScannerOutcome>,
}

impl ScanReport {
    pub fn failures(&self) -> impl Iterator<Item = &ScannerOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}

pub struct Aggregator {
    slots: Vec<ScannerSlot>,
    order: SortOrder,
}

impl Aggregator {
    pub fn new(scanners: Vec<Scanner>, order: SortOrder) -> Self {
        Self {
            slots: scanners.into_iter().map(ScannerSlot::new).collect(),
            order,
        }
    }

    /// Builds one scanner per enabled platform, in priority order.
    pub fn from_settings(settings: &Settings, ctx: &ScanContext) -> Self {
        let mut scanners = Vec::new();
        for &platform in Platform::all() {
            if !settings.is_enabled(platform) {
                continue;
            }
            let registry = ctx.registry.clone();
            let scanner = match platform {
                Platform::Steam => {
                    let mut s = SteamScanner::new(registry);
                    if let Some(root) = &settings.steam_root {
                        s = s.with_root(root);
                    }
                    Scanner::Steam(s)
                }
                Platform::Epic => Scanner::Epic(EpicScanner::new(registry)),
                Platform::Gog => Scanner::Gog(GogScanner::new(registry)),
                Platform::Ea => Scanner::Ea(EaScanner::new(registry)),
                Platform::Ubisoft => Scanner::Ubisoft(UbisoftScanner::new(registry)),
                Platform::Xbox => Scanner::Xbox(XboxScanner::new(ctx.cache.clone())),
                Platform::Playnite => {
                    let mut s = PlayniteScanner::new(registry);
                    if let Some(dir) = &settings.playnite_data_dir {
                        s = s.with_data_dir(dir);
                    }
                    Scanner::Playnite(s)
                }
                Platform::Shortcuts => {
                    Scanner::Shortcuts(ShortcutScanner::new(settings.shortcut_folders()))
                }
            };
            scanners.push(scanner);
        }
        Self::new(scanners, settings.sort_order)
    }

    pub fn platforms(&self) -> Vec<Platform> {
        self.slots.iter().map(ScannerSlot::platform).collect()
    }

    /// Runs every scanner concurrently. A failing scanner contributes an
    /// outcome but never removes games found by the others.
    pub async fn scan(&mut self) -> ScanReport {
        let results = join_all(self.slots.iter_mut().map(|slot| async move {
            let result = slot.synchronize().await;
            (slot.platform(), result)
        }))
        .await;

        let mut outcomes = Vec::with_capacity(results.len());
        for (platform, result) in results {
            let result = match result {
                Ok(count) => {
                    tracing::debug!(platform = %platform.label(), count, "scanner finished");
                    Ok(count)
                }
                Err(e) => {
                    tracing::warn!(platform = %platform.label(), error = %e, "scanner failed");
                    Err(format!("{} detection failed: {e}", platform.label()))
                }
            };
            outcomes.push(ScannerOutcome { platform, result });
        }

        let mut games: Vec<Game> = self.slots.iter_mut().flat_map(ScannerSlot::take_games).collect();
        sort_games(&mut games, self.order);
        tracing::info!(count = games.len(), order = ?self.order, "scan complete");

        ScanReport { games, outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ShortcutFolderSetting;
    use gamedeck_registry::MemoryRegistry;
    use gamedeck_xbox::MemoryCache;

    fn context() -> ScanContext {
        ScanContext::new(Arc::new(MemoryRegistry::new()), Arc::new(MemoryCache::new()))
    }

    #[test]
    fn from_settings_respects_flags() {
        let settings = Settings {
            epic: false,
            xbox: false,
            ..Default::default()
        };
        let agg = Aggregator::from_settings(&settings, &context());
        assert_eq!(
            agg.platforms(),
            [
                Platform::Steam,
                Platform::Gog,
                Platform::Ea,
                Platform::Ubisoft,
                Platform::Playnite,
            ]
        );
    }

    #[tokio::test]
    async fn empty_sources_yield_empty_report() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings {
            steam: false,
            playnite_data_dir: Some(tmp.path().join("no-playnite")),
            shortcut_folders: vec![ShortcutFolderSetting {
                name: "Games".into(),
                path: tmp.path().join("no-folder"),
                enabled: true,
            }],
            ..Default::default()
        };
        let mut agg = Aggregator::from_settings(&settings, &context());
        assert!(agg.platforms().contains(&Platform::Shortcuts));

        let report = agg.scan().await;
        assert!(report.games.is_empty());
        assert_eq!(report.failures().count(), 0);
        assert_eq!(report.outcomes.len(), agg.platforms().len());
    }

    #[tokio::test]
    async fn games_are_sorted_by_configured_order() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["zelda.lnk", "Alan Wake.lnk", "metro.url"] {
            std::fs::write(tmp.path().join(name), "").unwrap();
        }
        let scanner = Scanner::Shortcuts(ShortcutScanner::new(vec![
            gamedeck_stores::ShortcutFolder::new("Games", tmp.path()),
        ]));
        let mut agg = Aggregator::new(vec![scanner], SortOrder::Alphabetical);

        let report = agg.scan().await;
        let titles: Vec<&str> = report.games.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, ["Alan Wake", "metro", "zelda"]);
        assert_eq!(report.outcomes[0].result, Ok(3));
    }
}
