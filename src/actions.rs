use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Result, anyhow};
use log::info;
use serde::{Deserialize, Serialize};

use crate::label::GestureLabel;

/// Browser commands a gesture can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Back,
    Forward,
    Reload,
    CloseTab,
    NewTab,
    ScrollUp,
    ScrollDown,
    ScrollTop,
    ScrollBottom,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Back,
        Action::Forward,
        Action::Reload,
        Action::CloseTab,
        Action::NewTab,
        Action::ScrollUp,
        Action::ScrollDown,
        Action::ScrollTop,
        Action::ScrollBottom,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Action::Back => "back",
            Action::Forward => "forward",
            Action::Reload => "reload",
            Action::CloseTab => "closeTab",
            Action::NewTab => "newTab",
            Action::ScrollUp => "scrollUp",
            Action::ScrollDown => "scrollDown",
            Action::ScrollTop => "scrollTop",
            Action::ScrollBottom => "scrollBottom",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    pub fn default_description(self) -> &'static str {
        match self {
            Action::Back => "Go back",
            Action::Forward => "Go forward",
            Action::Reload => "Reload page",
            Action::CloseTab => "Close tab",
            Action::NewTab => "New tab",
            Action::ScrollUp => "Scroll up",
            Action::ScrollDown => "Scroll down",
            Action::ScrollTop => "Scroll to top",
            Action::ScrollBottom => "Scroll to bottom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub action: Action,
    #[serde(default)]
    pub description: String,
}

impl Binding {
    pub fn new(action: Action, description: impl Into<String>) -> Self {
        Self {
            action,
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        if self.description.trim().is_empty() {
            self.action.default_description()
        } else {
            &self.description
        }
    }
}

impl From<Action> for Binding {
    fn from(action: Action) -> Self {
        Self::new(action, action.default_description())
    }
}

/// Read-only view of the user's gesture table.
pub trait ActionLookup {
    fn action_for(&self, label: &GestureLabel) -> Option<&Binding>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionMap {
    bindings: BTreeMap<GestureLabel, Binding>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings installed for a fresh profile.
    pub fn defaults() -> Self {
        let mut map = Self::new();
        for (label, action, description) in [
            ("down-right", Action::CloseTab, "Close current tab"),
            ("left", Action::Back, "Go back"),
            ("right", Action::Forward, "Go forward"),
            ("up-left", Action::NewTab, "Open new tab"),
            ("down-up", Action::Reload, "Reload page"),
        ] {
            if let Ok(label) = label.parse() {
                map.insert(label, Binding::new(action, description));
            }
        }
        map
    }

    pub fn insert(&mut self, label: GestureLabel, binding: Binding) -> Option<Binding> {
        self.bindings.insert(label, binding)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GestureLabel, &Binding)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl ActionLookup for ActionMap {
    fn action_for(&self, label: &GestureLabel) -> Option<&Binding> {
        self.bindings.get(label)
    }
}

impl FromIterator<(GestureLabel, Binding)> for ActionMap {
    fn from_iter<I: IntoIterator<Item = (GestureLabel, Binding)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Executes resolved actions on behalf of the host.
pub trait ActionSink {
    fn dispatch(&mut self, label: &GestureLabel, binding: &Binding) -> Result<()>;
}

/// Writes one JSON command per line for the host to execute.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Non-action lines (previews, discards) share the same stream.
    pub fn emit(&mut self, msg: &serde_json::Value) -> Result<()> {
        writeln!(self.out, "{msg}")
            .and_then(|_| self.out.flush())
            .map_err(|e| anyhow!("failed to write host message: {e}"))
    }
}

impl<W: Write> ActionSink for JsonSink<W> {
    fn dispatch(&mut self, label: &GestureLabel, binding: &Binding) -> Result<()> {
        info!("gesture '{label}' -> {}", binding.action.id());
        self.emit(&serde_json::json!({
            "type": "action",
            "gesture": label,
            "action": binding.action,
            "description": binding.description(),
        }))
    }
}

/// Swallows every action.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ActionSink for NoopSink {
    fn dispatch(&mut self, _label: &GestureLabel, _binding: &Binding) -> Result<()> {
        Ok(())
    }
}
