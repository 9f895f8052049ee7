//! Application menu construction

use tempo_ui::menu::{Menu, MenuAction, MenuItem, MenuModel};

/// Build the menu installed on the primary window.
pub(crate) fn build_app_menu() -> MenuModel {
    MenuModel {
        menus: vec![
            Menu::new(
                "tempo",
                vec![
                    MenuItem::new("About tempo", MenuAction::About),
                    MenuItem::new("Quit", MenuAction::Quit).with_accelerator("Ctrl+Q"),
                ],
            ),
            Menu::new(
                "View",
                vec![MenuItem::new("Toggle Full Screen", MenuAction::ToggleFullscreen)
                    .with_accelerator("F11")],
            ),
        ],
    }
}
