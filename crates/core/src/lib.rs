pub mod dock;
pub mod editor_pane;
pub mod main_view;
pub mod notice;

pub use dock::{
    move_focus_left, move_focus_right, next_focus_target, DockHost, DockLayout, DockRegion,
    FocusDirection, FocusState, MoveFocusAction, ParseRegionError,
};
pub use editor_pane::{EditorId, EditorPane, ListenerId, SharedNoticeListener};
pub use main_view::{MainView, MainViewListener, SharedMainViewListener, SplitType};
pub use notice::{NoticeCategory, NoticeListener, NoticeParser, ParserId, ParserNotice};
