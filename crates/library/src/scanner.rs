//! The closed set of platform scanners.

use gamedeck_model::{Game, Platform};
use gamedeck_steam::{SteamError, SteamScanner};
use gamedeck_stores::{
    EaScanner, EpicScanner, GogScanner, PlayniteScanner, ShortcutScanner, StoreError, UbisoftScanner,
};
use gamedeck_xbox::{XboxError, XboxScanner};

/// Errors a single scanner can raise. Always caught by the aggregator.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Steam(#[from] SteamError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Xbox(#[from] XboxError),

    #[error("scanner task failed: {0}")]
    Join(String),
}

#[derive(Clone)]
pub enum Scanner {
    Steam(SteamScanner),
    Epic(EpicScanner),
    Gog(GogScanner),
    Ea(EaScanner),
    Ubisoft(UbisoftScanner),
    Xbox(XboxScanner),
    Playnite(PlayniteScanner),
    Shortcuts(ShortcutScanner),
}

impl Scanner {
    pub fn platform(&self) -> Platform {
        match self {
            Scanner::Steam(_) => Platform::Steam,
            Scanner::Epic(_) => Platform::Epic,
            Scanner::Gog(_) => Platform::Gog,
            Scanner::Ea(_) => Platform::Ea,
            Scanner::Ubisoft(_) => Platform::Ubisoft,
            Scanner::Xbox(_) => Platform::Xbox,
            Scanner::Playnite(_) => Platform::Playnite,
            Scanner::Shortcuts(_) => Platform::Shortcuts,
        }
    }

    pub fn name(&self) -> &'static str {
        self.platform().label()
    }

    /// Runs one full scan. Filesystem and registry scanners run on the
    /// blocking pool; the Xbox scanner is natively async.
    pub async fn scan(&self) -> Result<Vec<Game>, ScanError> {
        match self {
            Scanner::Xbox(s) => Ok(s.scan().await?),
            Scanner::Steam(s) => blocking(s.clone(), |s| s.scan().map_err(ScanError::from)).await,
            Scanner::Epic(s) => blocking(s.clone(), |s| s.scan().map_err(ScanError::from)).await,
            Scanner::Gog(s) => blocking(s.clone(), |s| s.scan().map_err(ScanError::from)).await,
            Scanner::Ea(s) => blocking(s.clone(), |s| s.scan().map_err(ScanError::from)).await,
            Scanner::Ubisoft(s) => blocking(s.clone(), |s| s.scan().map_err(ScanError::from)).await,
            Scanner::Playnite(s) => blocking(s.clone(), |s| s.scan().map_err(ScanError::from)).await,
            Scanner::Shortcuts(s) => blocking(s.clone(), |s| s.scan().map_err(ScanError::from)).await,
        }
    }
}

async fn blocking<S, F>(scanner: S, f: F) -> Result<Vec<Game>, ScanError>
where
    S: Send + 'static,
    F: FnOnce(&S) -> Result<Vec<Game>, ScanError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&scanner))
        .await
        .map_err(|e| ScanError::Join(e.to_string()))?
}

/// A scanner together with the result of its most recent run.
///
/// The result is stable until the next [`ScannerSlot::synchronize`]; a
/// failed run clears it so stale games are never reported.
pub struct ScannerSlot {
    scanner: Scanner,
    games: Vec<Game>,
}

impl ScannerSlot {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner,
            games: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.scanner.name()
    }

    pub fn platform(&self) -> Platform {
        self.scanner.platform()
    }

    /// Rescans and stores the result. Zero games is not an error.
    pub async fn synchronize(&mut self) -> Result<usize, ScanError> {
        match self.scanner.scan().await {
            Ok(games) => {
                self.games = games;
                Ok(self.games.len())
            }
            Err(e) => {
                self.games.clear();
                Err(e)
            }
        }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub(crate) fn take_games(&mut self) -> Vec<Game> {
        std::mem::take(&mut self.games)
    }
}
