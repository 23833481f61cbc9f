//! Built-in command table
//!
//! The fixed set of commands every catalog starts with, their default
//! bindings (the `TypeA` scheme), default parameters, parameter share pairs
//! and the names retired in earlier releases.
//!
//! The behaviour of each command is supplied by the host through an
//! `ActionProvider`; this table only describes the commands.

use std::rc::Rc;

use tracing::warn;

use crate::core::command::{CommandAction, CommandDefinition, UnboundAction};
use crate::core::gesture::{CommandBindings, GestureSpace};
use crate::core::memento::ObsoleteCommand;
use crate::core::parameter::CommandParameter;
use crate::core::parser::GestureParseError;

/// Supplies the behaviour of built-in commands by name
pub trait ActionProvider {
    fn action_for(&self, name: &str) -> Rc<dyn CommandAction>;
}

impl<F> ActionProvider for F
where
    F: Fn(&str) -> Rc<dyn CommandAction>,
{
    fn action_for(&self, name: &str) -> Rc<dyn CommandAction> {
        self(name)
    }
}

/// Provider for hosts (and tools) that only inspect bindings
#[derive(Clone, Copy, Debug, Default)]
pub struct NoActions;

impl ActionProvider for NoActions {
    fn action_for(&self, _name: &str) -> Rc<dyn CommandAction> {
        Rc::new(UnboundAction)
    }
}

/// `(dependent, owner)`: the dependent reads and writes the owner's parameter
pub const SHARE_PAIRS: &[(&str, &str)] = &[
    ("NextPage", "PrevPage"),
    ("NextOnePage", "PrevOnePage"),
    ("NextScrollPage", "PrevScrollPage"),
    ("NextSizePage", "PrevSizePage"),
    ("NextFolderPage", "PrevFolderPage"),
    ("LastPage", "FirstPage"),
    ("ToggleStretchModeReverse", "ToggleStretchMode"),
    ("SetStretchModeUniformToFill", "SetStretchModeUniform"),
    ("SetStretchModeUniformToSize", "SetStretchModeUniform"),
    ("SetStretchModeUniformToVertical", "SetStretchModeUniform"),
    ("SetStretchModeUniformToHorizontal", "SetStretchModeUniform"),
    ("NextPlaylistItemInBook", "PrevPlaylistItemInBook"),
    ("ViewScrollDown", "ViewScrollUp"),
    ("ViewScrollLeft", "ViewScrollUp"),
    ("ViewScrollRight", "ViewScrollUp"),
    ("ViewScaleDown", "ViewScaleUp"),
    ("ViewRotateRight", "ViewRotateLeft"),
];

/// Names retired in earlier releases
pub const OBSOLETE_COMMANDS: &[ObsoleteCommand] = &[
    ObsoleteCommand {
        obsolete: "ToggleVisibleTitleBar",
        replacement: None,
        version: 39,
    },
    ObsoleteCommand {
        obsolete: "ToggleVisiblePagemarkList",
        replacement: Some("ToggleVisiblePlaylist"),
        version: 39,
    },
    ObsoleteCommand {
        obsolete: "TogglePagemark",
        replacement: Some("TogglePlaylistItem"),
        version: 39,
    },
    ObsoleteCommand {
        obsolete: "PrevPagemark",
        replacement: Some("PrevPlaylistItem"),
        version: 39,
    },
    ObsoleteCommand {
        obsolete: "NextPagemark",
        replacement: Some("NextPlaylistItem"),
        version: 39,
    },
    ObsoleteCommand {
        obsolete: "PrevPagemarkInBook",
        replacement: Some("PrevPlaylistItemInBook"),
        version: 39,
    },
    ObsoleteCommand {
        obsolete: "NextPagemarkInBook",
        replacement: Some("NextPlaylistItemInBook"),
        version: 39,
    },
];

/// One row of the built-in table
struct Builtin {
    name: &'static str,
    group: &'static str,
    text: &'static str,
    keys: &'static str,
    pointer: &'static str,
    touch: &'static str,
    parameter: Option<CommandParameter>,
    cloneable: bool,
}

fn command(group: &'static str, name: &'static str, text: &'static str) -> Builtin {
    Builtin {
        name,
        group,
        text,
        keys: "",
        pointer: "",
        touch: "",
        parameter: None,
        cloneable: false,
    }
}

impl Builtin {
    fn keys(mut self, keys: &'static str) -> Self {
        self.keys = keys;
        self
    }

    fn pointer(mut self, pointer: &'static str) -> Self {
        self.pointer = pointer;
        self
    }

    fn touch(mut self, touch: &'static str) -> Self {
        self.touch = touch;
        self
    }

    fn parameter(mut self, parameter: CommandParameter) -> Self {
        self.parameter = Some(parameter);
        self
    }

    fn cloneable(mut self) -> Self {
        self.cloneable = true;
        self
    }

    /// Parses the default bindings slot by slot; a bad slot is left unbound
    fn bindings(&self) -> CommandBindings {
        let mut bindings = CommandBindings::default();

        match self.keys.parse() {
            Ok(keys) => bindings.keys = keys,
            Err(e) => self.warn_slot(GestureSpace::Key, &e),
        }
        match self.pointer.parse() {
            Ok(pointer) => bindings.pointer = pointer,
            Err(e) => self.warn_slot(GestureSpace::Pointer, &e),
        }
        match self.touch.parse() {
            Ok(touch) => bindings.touch = touch,
            Err(e) => self.warn_slot(GestureSpace::Touch, &e),
        }

        bindings
    }

    fn warn_slot(&self, space: GestureSpace, error: &GestureParseError) {
        warn!(command = self.name, %space, %error, "invalid built-in default binding");
    }

    fn into_definition(self, provider: &dyn ActionProvider) -> CommandDefinition {
        let mut definition =
            CommandDefinition::new(self.name, self.group, self.text, provider.action_for(self.name))
                .with_bindings(self.bindings());
        definition.parameter = self.parameter;
        definition.cloneable = self.cloneable;
        definition
    }
}

fn reversible(is_reverse: bool) -> CommandParameter {
    CommandParameter::Reversible { is_reverse }
}

fn view_scroll() -> CommandParameter {
    CommandParameter::ViewScroll {
        scroll: 25,
        allow_cross_scroll: true,
    }
}

fn view_scale() -> CommandParameter {
    CommandParameter::ViewScale {
        scale: 20,
        is_snap_default_scale: true,
    }
}

fn view_rotate() -> CommandParameter {
    CommandParameter::ViewRotate {
        angle: 45,
        is_stretch: false,
    }
}

fn scroll_page() -> CommandParameter {
    CommandParameter::ScrollPage {
        is_n_scroll: true,
        scroll: 100,
        line_break_stop: false,
    }
}

fn stretch_mode() -> CommandParameter {
    CommandParameter::StretchMode { is_toggle: true }
}

fn table() -> Vec<Builtin> {
    vec![
        command("File", "LoadAs", "Open").keys("Ctrl+O"),
        command("File", "ReLoad", "Reload"),
        command("File", "Unload", "Close"),
        command("File", "OpenExternalApp", "Open in external app")
            .parameter(CommandParameter::ExternalApp {
                command: String::new(),
                arguments: "\"$File\"".to_string(),
                working_directory: None,
            })
            .cloneable(),
        command("File", "OpenExplorer", "Open folder"),
        command("File", "ExportImage", "Export image"),
        command("File", "Print", "Print").keys("Ctrl+P"),
        command("File", "DeleteFile", "Delete file").keys("Delete"),
        command("File", "CopyFile", "Copy file").keys("Ctrl+C"),
        command("File", "Paste", "Paste").keys("Ctrl+V"),
        //
        command("Image", "ToggleStretchMode", "Switch stretch mode")
            .keys("LeftButton+WheelDown")
            .parameter(reversible(false)),
        command("Image", "ToggleStretchModeReverse", "Switch stretch mode (reverse)")
            .parameter(reversible(false)),
        command("Image", "SetStretchModeNone", "Original size"),
        command("Image", "SetStretchModeUniform", "Fit to window").parameter(stretch_mode()),
        command("Image", "SetStretchModeUniformToFill", "Fill window").parameter(stretch_mode()),
        command("Image", "SetStretchModeUniformToSize", "Fit to window area")
            .parameter(stretch_mode()),
        command("Image", "SetStretchModeUniformToVertical", "Fit to window height")
            .parameter(stretch_mode()),
        command("Image", "SetStretchModeUniformToHorizontal", "Fit to window width")
            .parameter(stretch_mode()),
        command("Image", "ToggleBackground", "Switch background"),
        //
        command("Window", "ToggleTopmost", "Keep on top"),
        command("Window", "ToggleHideMenu", "Auto-hide menu"),
        command("Window", "ToggleHidePanel", "Auto-hide panels").touch("TouchCenter"),
        command("Window", "ToggleFullScreen", "Full screen").keys("F11,F12").pointer("U"),
        command("Window", "CancelFullScreen", "Exit full screen").keys("Escape"),
        command("Window", "ToggleSlideShow", "Slideshow").keys("F5"),
        //
        command("Panel", "ToggleVisibleBookshelf", "Bookshelf").keys("B"),
        command("Panel", "ToggleVisiblePageList", "Page list"),
        command("Panel", "ToggleVisibleBookmarkList", "Bookmark list"),
        command("Panel", "ToggleVisiblePlaylist", "Playlist"),
        command("Panel", "ToggleVisibleHistoryList", "History"),
        command("Panel", "ToggleVisibleThumbnailList", "Filmstrip"),
        //
        command("ViewManipulation", "ViewScrollUp", "Scroll up")
            .parameter(view_scroll())
            .cloneable(),
        command("ViewManipulation", "ViewScrollDown", "Scroll down")
            .parameter(view_scroll())
            .cloneable(),
        command("ViewManipulation", "ViewScrollLeft", "Scroll left")
            .parameter(view_scroll())
            .cloneable(),
        command("ViewManipulation", "ViewScrollRight", "Scroll right")
            .parameter(view_scroll())
            .cloneable(),
        command("ViewManipulation", "ViewScaleUp", "Zoom in")
            .keys("RightButton+WheelUp")
            .parameter(view_scale())
            .cloneable(),
        command("ViewManipulation", "ViewScaleDown", "Zoom out")
            .keys("RightButton+WheelDown")
            .parameter(view_scale())
            .cloneable(),
        command("ViewManipulation", "ViewRotateLeft", "Rotate left")
            .parameter(view_rotate())
            .cloneable(),
        command("ViewManipulation", "ViewRotateRight", "Rotate right")
            .parameter(view_rotate())
            .cloneable(),
        command("ViewManipulation", "ViewReset", "Reset view").keys("Ctrl+0"),
        //
        command("Move", "PrevPage", "Previous page")
            .keys("Right,RightClick")
            .pointer("R")
            .touch("TouchR1,TouchR2")
            .parameter(reversible(true)),
        command("Move", "NextPage", "Next page")
            .keys("Left,LeftClick")
            .pointer("L")
            .touch("TouchL1,TouchL2")
            .parameter(reversible(true)),
        command("Move", "PrevOnePage", "Previous single page").parameter(reversible(true)),
        command("Move", "NextOnePage", "Next single page").parameter(reversible(true)),
        command("Move", "PrevScrollPage", "Scroll up / previous page")
            .keys("WheelUp")
            .parameter(scroll_page()),
        command("Move", "NextScrollPage", "Scroll down / next page")
            .keys("WheelDown")
            .parameter(scroll_page()),
        command("Move", "JumpPage", "Go to page").keys("Ctrl+G"),
        command("Move", "PrevSizePage", "Back several pages")
            .parameter(CommandParameter::MovePage { size: 10 })
            .cloneable(),
        command("Move", "NextSizePage", "Forward several pages")
            .parameter(CommandParameter::MovePage { size: 10 })
            .cloneable(),
        command("Move", "PrevFolderPage", "Previous folder page").parameter(reversible(true)),
        command("Move", "NextFolderPage", "Next folder page").parameter(reversible(true)),
        command("Move", "FirstPage", "First page")
            .keys("Ctrl+Right")
            .pointer("UR")
            .parameter(reversible(true)),
        command("Move", "LastPage", "Last page")
            .keys("Ctrl+Left")
            .pointer("UL")
            .parameter(reversible(true)),
        command("Move", "PrevBook", "Previous book").keys("Up").pointer("LU"),
        command("Move", "NextBook", "Next book").keys("Down").pointer("LD"),
        //
        command("PageSetting", "TogglePageMode", "Switch page mode").keys("LeftButton+WheelUp"),
        command("PageSetting", "SetPageModeOne", "Single page").keys("Ctrl+1"),
        command("PageSetting", "SetPageModeTwo", "Two pages").keys("Ctrl+2"),
        command("PageSetting", "ToggleBookReadOrder", "Switch reading direction"),
        //
        command("Playlist", "ToggleBookmark", "Bookmark").keys("Ctrl+D"),
        command("Playlist", "TogglePlaylistItem", "Add to playlist").keys("Ctrl+M"),
        command("Playlist", "PrevPlaylistItem", "Previous playlist item"),
        command("Playlist", "NextPlaylistItem", "Next playlist item"),
        command("Playlist", "PrevPlaylistItemInBook", "Previous playlist item in book")
            .parameter(reversible(false)),
        command("Playlist", "NextPlaylistItemInBook", "Next playlist item in book")
            .parameter(reversible(false)),
        //
        command("Effect", "ToggleEffect", "Image effect"),
        command("Effect", "ToggleIsLoupe", "Loupe"),
        command("Effect", "LoupeScaleUp", "Loupe zoom in"),
        command("Effect", "LoupeScaleDown", "Loupe zoom out"),
        //
        command("Other", "OpenOptionsWindow", "Settings"),
        command("Other", "OpenScriptsFolder", "Open scripts folder"),
        command("Other", "HelpCommandList", "Command list").keys("F1"),
        command("Other", "OpenContextMenu", "Context menu"),
        command("Other", "CloseApplication", "Quit").keys("Alt+F4"),
    ]
}

/// Definitions of all built-in commands, in table order
pub fn builtin_definitions(provider: &dyn ActionProvider) -> Vec<CommandDefinition> {
    table()
        .into_iter()
        .map(|builtin| builtin.into_definition(provider))
        .collect()
}
