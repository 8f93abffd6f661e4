use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::info;

use rtext_core::{
    DockRegion, EditorId, EditorPane, ListenerId, MainView, MainViewListener, SharedNoticeListener,
};

use crate::parser::{TaskTagParser, TASK_PARSER_ID};
use crate::table::{TaskNoticeTableModel, TaskRow};

pub const TASK_WINDOW_NAME: &str = "Tasks";

/// Dockable window listing the tasks found in every open editor.
/// （列出所有開啟檔案中任務的停駐視窗。）
///
/// Registering an editor attaches the shared [`TaskTagParser`] and the table
/// model as a notice listener, then re-parses the editor right away so its
/// current tasks show up without waiting for the next edit.
pub struct TaskWindow {
    model: Rc<RefCell<TaskNoticeTableModel>>,
    parser: Rc<TaskTagParser>,
    subscriptions: HashMap<EditorId, ListenerId>,
    position: DockRegion,
    active: bool,
    visible: bool,
}

impl Default for TaskWindow {
    fn default() -> Self {
        Self::new(TaskTagParser::default())
    }
}

impl TaskWindow {
    pub fn new(parser: TaskTagParser) -> Self {
        Self {
            model: Rc::new(RefCell::new(TaskNoticeTableModel::new())),
            parser: Rc::new(parser),
            subscriptions: HashMap::new(),
            position: DockRegion::Bottom,
            active: true,
            visible: true,
        }
    }

    /// Wraps the window for sharing and hooks it into `view`.
    /// （建立共享視窗並掛載到主視圖。）
    ///
    /// Editors that are already open are registered in their open order.
    pub fn install(window: TaskWindow, view: &mut MainView) -> (Rc<RefCell<TaskWindow>>, ListenerId) {
        let shared = Rc::new(RefCell::new(window));
        {
            let mut window = shared.borrow_mut();
            for id in view.editor_ids().to_vec() {
                if let Some(editor) = view.editor_mut(id) {
                    window.register_editor(editor);
                }
            }
        }
        let listener = view.add_listener(shared.clone());
        (shared, listener)
    }

    /// Detaches the window from `view` and every editor it tracks.
    /// （將視窗自主視圖與所有編輯器卸載。）
    pub fn uninstall(&mut self, view: &mut MainView, listener: ListenerId) {
        view.remove_listener(listener);
        let tracked: Vec<EditorId> = self.subscriptions.keys().copied().collect();
        for id in tracked {
            match view.editor_mut(id) {
                Some(editor) => {
                    self.deregister_editor(editor);
                }
                None => {
                    self.subscriptions.remove(&id);
                    self.model.borrow_mut().deregister(id);
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        TASK_WINDOW_NAME
    }

    pub fn position(&self) -> DockRegion {
        self.position
    }

    pub fn set_position(&mut self, position: DockRegion) {
        self.position = position;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Flips visibility and returns the new state.
    /// （切換顯示狀態並回傳新的狀態。）
    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn model(&self) -> Rc<RefCell<TaskNoticeTableModel>> {
        self.model.clone()
    }

    pub fn rows(&self) -> Vec<TaskRow> {
        self.model.borrow().rows()
    }

    pub fn parser(&self) -> &TaskTagParser {
        &self.parser
    }

    pub fn is_registered(&self, editor: EditorId) -> bool {
        self.subscriptions.contains_key(&editor)
    }

    /// Starts tracking `editor`; returns `false` if it was already tracked.
    /// （開始追蹤編輯器；已追蹤時回傳 `false`。）
    pub fn register_editor(&mut self, editor: &mut EditorPane) -> bool {
        let id = editor.id();
        if self.subscriptions.contains_key(&id) {
            return false;
        }
        info!(
            "event=task_listen module=tasks status=start editor={} name={}",
            id,
            editor.display_name()
        );
        self.model.borrow_mut().register(id, editor.display_name());
        let listener: SharedNoticeListener = self.model.clone();
        let subscription = editor.add_notice_listener(listener);
        self.subscriptions.insert(id, subscription);
        editor.add_parser(self.parser.clone());
        editor.reparse();
        true
    }

    /// Stops tracking `editor` and drops its rows; unknown editors are ignored.
    /// （停止追蹤編輯器並移除其列；未追蹤時忽略。）
    pub fn deregister_editor(&mut self, editor: &mut EditorPane) -> bool {
        let id = editor.id();
        let Some(subscription) = self.subscriptions.remove(&id) else {
            return false;
        };
        info!("event=task_listen module=tasks status=stop editor={}", id);
        editor.remove_parser(TASK_PARSER_ID);
        editor.remove_notice_listener(subscription);
        self.model.borrow_mut().deregister(id);
        true
    }

    /// Swaps in a new parser and re-scans the tracked editors owned by `view`.
    /// （更換解析器並重新掃描主視圖中追蹤的編輯器。）
    ///
    /// Tracked editors that `view` does not own are returned in id order;
    /// pass each of them to [`TaskWindow::refresh_editor`] to pick up the
    /// new parser.
    pub fn set_parser(&mut self, parser: TaskTagParser, view: &mut MainView) -> Vec<EditorId> {
        self.parser = Rc::new(parser);
        let mut tracked: Vec<EditorId> = self.subscriptions.keys().copied().collect();
        tracked.sort();
        let mut unreached = Vec::new();
        for id in tracked {
            match view.editor_mut(id) {
                Some(editor) => {
                    self.refresh_editor(editor);
                }
                None => unreached.push(id),
            }
        }
        if !unreached.is_empty() {
            info!(
                "event=task_parser_swap module=tasks status=partial unreached={}",
                unreached.len()
            );
        }
        unreached
    }

    /// Re-attaches the current parser to a tracked editor and re-scans it.
    /// Returns `false` for editors this window does not track.
    pub fn refresh_editor(&self, editor: &mut EditorPane) -> bool {
        if !self.subscriptions.contains_key(&editor.id()) {
            return false;
        }
        editor.remove_parser(TASK_PARSER_ID);
        editor.add_parser(self.parser.clone());
        editor.reparse();
        true
    }
}

impl MainViewListener for TaskWindow {
    fn text_area_added(&mut self, editor: &mut EditorPane) {
        self.register_editor(editor);
    }

    fn text_area_removed(&mut self, editor: &mut EditorPane) {
        self.deregister_editor(editor);
    }
}
