//! Descriptors for the two launcher commands and the actions attached to
//! their result rows.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    History,
    Favorites,
}

impl CommandKind {
    pub fn id(self) -> &'static str {
        match self {
            CommandKind::History => "clippy.history",
            CommandKind::Favorites => "clippy.favorites",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Copy,
    AddToFavorites,
    RemoveFromFavorites,
    RemoveFromHistory,
    ClearHistory,
}

impl HistoryAction {
    /// Label shown in the host's action menu.
    pub fn label(self) -> &'static str {
        match self {
            HistoryAction::Copy => "Copy to clipboard",
            HistoryAction::AddToFavorites => "Add to favourites",
            HistoryAction::RemoveFromFavorites => "Remove from favourites",
            HistoryAction::RemoveFromHistory => "Remove from history",
            HistoryAction::ClearHistory => "Clear history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandAction {
    pub action: HistoryAction,
    pub name: String,
}

impl From<HistoryAction> for CommandAction {
    fn from(action: HistoryAction) -> Self {
        Self {
            action,
            name: action.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    pub id: String,
    pub kind: CommandKind,
    pub name: String,
    pub actions: Vec<CommandAction>,
}

impl CommandDescriptor {
    pub fn has_action(&self, action: HistoryAction) -> bool {
        self.actions.iter().any(|entry| entry.action == action)
    }
}

/// Every clipboard entry, most recent first.
pub fn history_command() -> CommandDescriptor {
    CommandDescriptor {
        id: CommandKind::History.id().to_string(),
        kind: CommandKind::History,
        name: "Clipboard History".to_string(),
        actions: [
            HistoryAction::Copy,
            HistoryAction::AddToFavorites,
            HistoryAction::RemoveFromFavorites,
            HistoryAction::RemoveFromHistory,
            HistoryAction::ClearHistory,
        ]
        .into_iter()
        .map(CommandAction::from)
        .collect(),
    }
}

pub fn favorites_command() -> CommandDescriptor {
    CommandDescriptor {
        id: CommandKind::Favorites.id().to_string(),
        kind: CommandKind::Favorites,
        name: "Clipboard Favourites".to_string(),
        actions: [HistoryAction::Copy, HistoryAction::RemoveFromFavorites]
            .into_iter()
            .map(CommandAction::from)
            .collect(),
    }
}
