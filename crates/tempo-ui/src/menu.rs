//! Declarative menu model
//!
//! The controller installs a menu model on the primary window at creation
//! time; rendering it is the backend's concern.

/// Actions a menu entry can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    About,
    ToggleFullscreen,
    Quit,
}

/// A single menu entry.
#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
    pub accelerator: Option<String>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
            accelerator: None,
        }
    }

    pub fn with_accelerator(mut self, accelerator: impl Into<String>) -> Self {
        self.accelerator = Some(accelerator.into());
        self
    }
}

/// A top-level menu with its entries.
#[derive(Debug, Clone)]
pub struct Menu {
    pub title: String,
    pub items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

/// The whole menu bar.
#[derive(Debug, Clone, Default)]
pub struct MenuModel {
    pub menus: Vec<Menu>,
}
