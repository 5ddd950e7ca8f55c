//! Menu commands, numeric id mapping and selection dispatch.

use crate::actions::SystemAction;
use crate::types::Presentation;

/// Per-application menu action. The discriminant is the offset inside the
/// application's id pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppAction {
    OpenHomePage = 0,
    ToggleRunning = 1,
}

impl AppAction {
    const COUNT: u32 = 2;

    fn from_offset(offset: u32) -> Option<Self> {
        match offset {
            0 => Some(AppAction::OpenHomePage),
            1 => Some(AppAction::ToggleRunning),
            _ => None,
        }
    }
}

/// A selectable menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuCommand {
    /// Open the node home page.
    HomePage,
    /// Start or stop the whole system, depending on the running flag
    /// captured with the popup request.
    ToggleSystem,
    About,
    Exit,
    /// Entry of the application at `index` in the presented snapshot.
    App { index: usize, action: AppAction },
}

/// What a resolved selection asks the shell to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Action(SystemAction),
    About,
    Exit,
}

impl Presentation {
    /// Resolves a selection against this frozen presentation.
    ///
    /// Returns `None` when the command refers to an application that is
    /// not part of the presented snapshot or has no URL to open.
    pub fn resolve(&self, command: MenuCommand) -> Option<Dispatch> {
        let action = match command {
            MenuCommand::HomePage => SystemAction::OpenUrl(self.home_page_url.clone()),
            MenuCommand::ToggleSystem => {
                if self.request.system_running {
                    SystemAction::StopSystem
                } else {
                    SystemAction::StartSystem
                }
            }
            MenuCommand::About => return Some(Dispatch::About),
            MenuCommand::Exit => return Some(Dispatch::Exit),
            MenuCommand::App { index, action } => {
                let app = self.apps.get(index)?;
                match action {
                    AppAction::OpenHomePage if app.home_page_url.is_empty() => return None,
                    AppAction::OpenHomePage => SystemAction::OpenUrl(app.home_page_url.clone()),
                    AppAction::ToggleRunning if app.is_running => {
                        SystemAction::StopApp(app.id.clone())
                    }
                    AppAction::ToggleRunning => SystemAction::StartApp(app.id.clone()),
                }
            }
        };
        Some(Dispatch::Action(action))
    }
}

/// Numeric id allocation for backends that identify menu entries by
/// integer.
///
/// Fixed entries sit at small offsets from `base`. Applications get a
/// contiguous range starting at [`app_range_begin`](Self::app_range_begin):
/// `begin + 2 * index + action`. Decoding needs the application count of
/// the presented snapshot, so ids are only meaningful for the menu they
/// were generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuIdLayout {
    pub base: u32,
}

const EXIT_OFFSET: u32 = 2;
const ABOUT_OFFSET: u32 = 3;
const HOME_PAGE_OFFSET: u32 = 4;
const TOGGLE_OFFSET: u32 = 5;
const APP_RANGE_OFFSET: u32 = 6;
/// Application ids guaranteed below `u32::MAX` for bases up to `MAX_BASE`.
const RESERVED_APP_IDS: u32 = 0x1_0000;

impl Default for MenuIdLayout {
    fn default() -> Self {
        Self { base: 0x0400 }
    }
}

impl MenuIdLayout {
    /// Largest base that still leaves room for the fixed entries and a
    /// full application range.
    pub const MAX_BASE: u32 = u32::MAX - APP_RANGE_OFFSET - RESERVED_APP_IDS;

    pub fn new(base: u32) -> Self {
        Self { base }
    }

    /// First application id, or `None` when `base` leaves no room for it.
    pub fn app_range_begin(&self) -> Option<u32> {
        self.base.checked_add(APP_RANGE_OFFSET)
    }

    /// Numeric id for `command`, or `None` if it does not fit in `u32`.
    pub fn encode(&self, command: MenuCommand) -> Option<u32> {
        let offset = match command {
            MenuCommand::Exit => EXIT_OFFSET,
            MenuCommand::About => ABOUT_OFFSET,
            MenuCommand::HomePage => HOME_PAGE_OFFSET,
            MenuCommand::ToggleSystem => TOGGLE_OFFSET,
            MenuCommand::App { index, action } => {
                let index = u32::try_from(index).ok()?;
                return index
                    .checked_mul(AppAction::COUNT)?
                    .checked_add(action as u32)?
                    .checked_add(self.app_range_begin()?);
            }
        };
        self.base.checked_add(offset)
    }

    /// Maps an id back to a command for a menu showing `app_count`
    /// applications.
    pub fn decode(&self, id: u32, app_count: usize) -> Option<MenuCommand> {
        match id.checked_sub(self.base)? {
            EXIT_OFFSET => return Some(MenuCommand::Exit),
            ABOUT_OFFSET => return Some(MenuCommand::About),
            HOME_PAGE_OFFSET => return Some(MenuCommand::HomePage),
            TOGGLE_OFFSET => return Some(MenuCommand::ToggleSystem),
            _ => {}
        }

        let relative = id.checked_sub(self.app_range_begin()?)?;
        let index = (relative / AppAction::COUNT) as usize;
        if index >= app_count {
            return None;
        }
        let action = AppAction::from_offset(relative % AppAction::COUNT)?;
        Some(MenuCommand::App { index, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Anchor, AppRecord, AppSnapshot, PopupRequest};

    fn presentation(running: bool, apps: Vec<AppRecord>) -> Presentation {
        Presentation {
            request: PopupRequest {
                tag: 1,
                anchor: Anchor::default(),
                system_running: running,
            },
            apps: AppSnapshot::new(1, apps),
            home_page_url: "http://127.0.0.1:3180/index.html".into(),
        }
    }

    fn app(id: &str, running: bool) -> AppRecord {
        AppRecord {
            id: id.into(),
            display_name: id.into(),
            icon_ref: String::new(),
            home_page_url: format!("http://{id}.local/"),
            is_running: running,
        }
    }

    #[test]
    fn app_ids_are_contiguous_pairs() {
        let layout = MenuIdLayout::new(100);
        let begin = layout.app_range_begin().unwrap();
        assert_eq!(begin, 106);

        let open = MenuCommand::App {
            index: 2,
            action: AppAction::OpenHomePage,
        };
        let toggle = MenuCommand::App {
            index: 2,
            action: AppAction::ToggleRunning,
        };
        assert_eq!(layout.encode(open), Some(begin + 4));
        assert_eq!(layout.encode(toggle), Some(begin + 5));
    }

    #[test]
    fn decode_inverts_encode_within_range() {
        let layout = MenuIdLayout::default();
        let commands = [
            MenuCommand::HomePage,
            MenuCommand::ToggleSystem,
            MenuCommand::About,
            MenuCommand::Exit,
            MenuCommand::App {
                index: 0,
                action: AppAction::ToggleRunning,
            },
            MenuCommand::App {
                index: 3,
                action: AppAction::OpenHomePage,
            },
        ];
        for command in commands {
            let id = layout.encode(command).unwrap();
            assert_eq!(layout.decode(id, 4), Some(command), "id {id}");
        }
    }

    #[test]
    fn decode_rejects_ids_outside_presented_apps() {
        let layout = MenuIdLayout::default();
        let id = layout
            .encode(MenuCommand::App {
                index: 2,
                action: AppAction::OpenHomePage,
            })
            .unwrap();
        assert!(layout.decode(id, 2).is_none());
        assert!(layout.decode(layout.base, 2).is_none());
        assert!(layout.decode(layout.base - 1, 2).is_none());
    }

    #[test]
    fn base_near_u32_max_yields_no_ids_instead_of_overflowing() {
        let layout = MenuIdLayout::new(u32::MAX - 2);
        let open = MenuCommand::App {
            index: 0,
            action: AppAction::OpenHomePage,
        };
        assert_eq!(layout.app_range_begin(), None);
        assert_eq!(layout.encode(open), None);
        assert_eq!(layout.encode(MenuCommand::Exit), Some(u32::MAX));
        assert_eq!(layout.encode(MenuCommand::About), None);
        assert_eq!(layout.decode(u32::MAX, 1), Some(MenuCommand::Exit));
        assert_eq!(layout.decode(u32::MAX - 1, 1), None);
    }

    #[test]
    fn max_base_keeps_a_full_app_range() {
        let layout = MenuIdLayout::new(MenuIdLayout::MAX_BASE);
        let last = MenuCommand::App {
            index: 32_767,
            action: AppAction::ToggleRunning,
        };
        let id = layout.encode(last).unwrap();
        assert_eq!(layout.decode(id, 32_768), Some(last));
    }

    #[test]
    fn toggle_system_uses_captured_running_flag() {
        let p = presentation(true, vec![]);
        assert_eq!(
            p.resolve(MenuCommand::ToggleSystem),
            Some(Dispatch::Action(SystemAction::StopSystem))
        );
        let p = presentation(false, vec![]);
        assert_eq!(
            p.resolve(MenuCommand::ToggleSystem),
            Some(Dispatch::Action(SystemAction::StartSystem))
        );
    }

    #[test]
    fn app_toggle_follows_app_state() {
        let p = presentation(true, vec![app("a", true), app("b", false)]);
        assert_eq!(
            p.resolve(MenuCommand::App {
                index: 0,
                action: AppAction::ToggleRunning
            }),
            Some(Dispatch::Action(SystemAction::StopApp("a".into())))
        );
        assert_eq!(
            p.resolve(MenuCommand::App {
                index: 1,
                action: AppAction::ToggleRunning
            }),
            Some(Dispatch::Action(SystemAction::StartApp("b".into())))
        );
        assert_eq!(
            p.resolve(MenuCommand::App {
                index: 1,
                action: AppAction::OpenHomePage
            }),
            Some(Dispatch::Action(SystemAction::OpenUrl(
                "http://b.local/".into()
            )))
        );
    }

    #[test]
    fn unknown_app_index_resolves_to_nothing() {
        let p = presentation(true, vec![app("a", true)]);
        assert!(
            p.resolve(MenuCommand::App {
                index: 1,
                action: AppAction::ToggleRunning
            })
            .is_none()
        );
    }

    #[test]
    fn app_without_home_page_cannot_be_opened() {
        let mut record = app("a", true);
        record.home_page_url.clear();
        let p = presentation(true, vec![record]);
        assert!(
            p.resolve(MenuCommand::App {
                index: 0,
                action: AppAction::OpenHomePage
            })
            .is_none()
        );
    }

    #[test]
    fn fixed_entries_resolve() {
        let p = presentation(false, vec![]);
        assert_eq!(p.resolve(MenuCommand::About), Some(Dispatch::About));
        assert_eq!(p.resolve(MenuCommand::Exit), Some(Dispatch::Exit));
        assert_eq!(
            p.resolve(MenuCommand::HomePage),
            Some(Dispatch::Action(SystemAction::OpenUrl(
                "http://127.0.0.1:3180/index.html".into()
            )))
        );
    }
}
