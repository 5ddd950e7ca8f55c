//! Context menu model built from a frozen presentation.

use buckytray_app_menu::{AppAction, MenuCommand, MenuIdLayout, Presentation};

/// A single menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Numeric id for backends that need one. `None` for headers,
    /// separators and submenus.
    pub id: Option<u32>,
    /// Display text. Empty for separators.
    pub label: String,
    /// Whether the item is enabled (clickable).
    pub enabled: bool,
    /// Command triggered on click.
    pub command: Option<MenuCommand>,
    /// Submenu entries.
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    fn command(layout: &MenuIdLayout, label: impl Into<String>, command: MenuCommand) -> Self {
        Self {
            id: layout.encode(command),
            label: label.into(),
            enabled: true,
            command: Some(command),
            children: Vec::new(),
        }
    }

    fn submenu(label: impl Into<String>, children: Vec<MenuItem>) -> Self {
        Self {
            id: None,
            label: label.into(),
            enabled: true,
            command: None,
            children,
        }
    }

    fn separator() -> Self {
        Self {
            id: None,
            label: String::new(),
            enabled: false,
            command: None,
            children: Vec::new(),
        }
    }

    pub fn is_separator(&self) -> bool {
        self.label.is_empty() && self.command.is_none() && self.children.is_empty()
    }

    /// Depth-first search for the item carrying `command`.
    pub fn find(items: &[MenuItem], command: MenuCommand) -> Option<&MenuItem> {
        items.iter().find_map(|item| {
            if item.command == Some(command) {
                Some(item)
            } else {
                Self::find(&item.children, command)
            }
        })
    }
}

/// Settings used to build the context menu.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuState {
    pub layout: MenuIdLayout,
}

impl MenuState {
    pub fn new(layout: MenuIdLayout) -> Self {
        Self { layout }
    }

    /// Builds the menu items for `presentation`.
    pub fn build_menu(&self, presentation: &Presentation) -> Vec<MenuItem> {
        let layout = &self.layout;
        let mut items = vec![MenuItem::command(layout, "Home page", MenuCommand::HomePage)];

        for (index, app) in presentation.apps.apps().iter().enumerate() {
            let mut children = Vec::with_capacity(2);
            if !app.home_page_url.is_empty() {
                children.push(MenuItem::command(
                    layout,
                    "Home page",
                    MenuCommand::App {
                        index,
                        action: AppAction::OpenHomePage,
                    },
                ));
            }
            children.push(MenuItem::command(
                layout,
                if app.is_running { "Stop" } else { "Start" },
                MenuCommand::App {
                    index,
                    action: AppAction::ToggleRunning,
                },
            ));
            items.push(MenuItem::submenu(app.display_name.clone(), children));
        }

        items.push(MenuItem::separator());
        let toggle = if presentation.request.system_running {
            "Stop"
        } else {
            "Start"
        };
        items.push(MenuItem::command(layout, toggle, MenuCommand::ToggleSystem));
        items.push(MenuItem::command(layout, "About", MenuCommand::About));
        items.push(MenuItem::command(layout, "Exit", MenuCommand::Exit));

        items
    }

    /// Maps a clicked numeric id back to a command of the menu built for
    /// `presentation`.
    pub fn command_for_id(&self, id: u32, presentation: &Presentation) -> Option<MenuCommand> {
        self.layout.decode(id, presentation.apps.len())
    }
}
