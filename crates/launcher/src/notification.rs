use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationStyle {
    Success,
    Failure,
    Unsupported,
}

/// User-facing outcome of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub style: NotificationStyle,
    pub title: String,
    pub message: String,
    /// Whether the presentation layer should close itself.
    pub dismiss: bool,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            style: NotificationStyle::Success,
            title: title.into(),
            message: message.into(),
            dismiss: false,
        }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            style: NotificationStyle::Failure,
            title: title.into(),
            message: message.into(),
            dismiss: false,
        }
    }

    pub fn unsupported(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            style: NotificationStyle::Unsupported,
            title: title.into(),
            message: message.into(),
            dismiss: false,
        }
    }

    pub fn dismissing(mut self) -> Self {
        self.dismiss = true;
        self
    }

    pub fn is_success(&self) -> bool {
        self.style == NotificationStyle::Success
    }
}
