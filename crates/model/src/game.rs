use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::LaunchCommand;

/// A [`Game`] read back with a blank identifying field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("game record has an empty {0}")]
pub struct EmptyField(&'static str);

/// A normalized, platform-agnostic installed title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGame")]
pub struct Game {
    pub id: String,
    pub title: String,
    pub platform: String,
    /// Filesystem path or opaque image reference. `None` means "no icon".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    pub launch_command: LaunchCommand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstall_command: Option<LaunchCommand>,
    #[serde(flatten)]
    pub details: GameDetails,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGame {
    id: String,
    title: String,
    platform: String,
    #[serde(default)]
    icon_path: Option<String>,
    launch_command: LaunchCommand,
    #[serde(default)]
    uninstall_command: Option<LaunchCommand>,
    #[serde(flatten)]
    details: GameDetails,
}

impl TryFrom<RawGame> for Game {
    type Error = EmptyField;

    fn try_from(raw: RawGame) -> Result<Self, Self::Error> {
        for (field, value) in [("id", &raw.id), ("title", &raw.title), ("platform", &raw.platform)] {
            if value.trim().is_empty() {
                return Err(EmptyField(field));
            }
        }
        Ok(Self {
            id: raw.id,
            title: raw.title,
            platform: raw.platform,
            icon_path: raw.icon_path,
            launch_command: raw.launch_command,
            uninstall_command: raw.uninstall_command,
            details: raw.details,
        })
    }
}

/// Optional enrichment available from richer metadata sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub developers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publishers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Game {
    /// Creates a game with the mandatory fields; everything else is empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        platform: impl Into<String>,
        launch_command: LaunchCommand,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            platform: platform.into(),
            icon_path: None,
            launch_command,
            uninstall_command: None,
            details: GameDetails::default(),
        }
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon_path = icon;
        self
    }

    pub fn with_uninstall(mut self, command: Option<LaunchCommand>) -> Self {
        self.uninstall_command = command;
        self
    }

    pub fn with_details(mut self, details: GameDetails) -> Self {
        self.details = details;
        self
    }

    pub fn can_uninstall(&self) -> bool {
        self.uninstall_command.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Game {
        Game::new(
            "steam-620",
            "Portal 2",
            "Steam",
            LaunchCommand::uri("steam://rungameid/620").unwrap(),
        )
    }

    #[test]
    fn builder_leaves_optionals_empty() {
        let game = sample();
        assert!(game.icon_path.is_none());
        assert!(!game.can_uninstall());
        assert_eq!(game.details, GameDetails::default());
    }

    #[test]
    fn json_field_names() {
        let game = sample().with_icon(Some("/icons/portal2.ico".into()));
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["iconPath"], "/icons/portal2.ico");
        assert_eq!(json["launchCommand"]["kind"], "uri");
        // Empty enrichment is omitted entirely.
        assert!(json.get("favorite").is_none());
        assert!(json.get("developers").is_none());
    }

    #[test]
    fn reading_back_requires_identity() {
        let game = sample().with_details(GameDetails {
            favorite: true,
            ..Default::default()
        });
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(serde_json::from_value::<Game>(json.clone()).unwrap(), game);

        let mut blank_id = json.clone();
        blank_id["id"] = "".into();
        let err = serde_json::from_value::<Game>(blank_id).unwrap_err();
        assert!(err.to_string().contains("empty id"), "{err}");

        let mut blank_target = json;
        blank_target["launchCommand"]["uri"] = " ".into();
        assert!(serde_json::from_value::<Game>(blank_target).is_err());
    }

    #[test]
    fn details_are_flattened() {
        let game = sample().with_details(GameDetails {
            favorite: true,
            genres: vec!["Puzzle".into()],
            ..Default::default()
        });
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["favorite"], true);
        assert_eq!(json["genres"][0], "Puzzle");
    }
}
