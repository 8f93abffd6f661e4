use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use log::{info, warn};

use crate::editor_pane::{EditorId, EditorPane, ListenerId};

/// 編輯區分割方式。 / How the editing area is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitType {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// 編輯器生命週期的監聽者。 / Observer of editor lifecycle events.
///
/// Callbacks receive the pane mutably so listeners can attach their own
/// parsers and notice listeners.
pub trait MainViewListener {
    fn text_area_added(&mut self, editor: &mut EditorPane);

    fn text_area_removed(&mut self, editor: &mut EditorPane);
}

pub type SharedMainViewListener = Rc<RefCell<dyn MainViewListener>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Added,
    Removed,
}

/// 因監聽者忙碌而延後的事件。 / Event held back because its listener was borrowed.
#[derive(Debug, Clone, Copy)]
struct PendingDelivery {
    listener: ListenerId,
    editor: EditorId,
    event: Lifecycle,
}

/// 管理所有開啟中的編輯器。 / Owns every open editor and fires lifecycle events.
///
/// A listener that is already borrowed when an event fires gets the event
/// later, from [`MainView::flush_pending`] or the next `open`/`close`.
/// Closed editors stay alive until every pending removal has been delivered.
pub struct MainView {
    editors: HashMap<EditorId, EditorPane>,
    order: Vec<EditorId>,
    current: Option<EditorId>,
    next_editor: u64,
    listeners: Vec<(ListenerId, SharedMainViewListener)>,
    next_listener: u64,
    pending: Vec<PendingDelivery>,
    closing: HashMap<EditorId, EditorPane>,
    split_type: SplitType,
}

impl Default for MainView {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver(listener: &SharedMainViewListener, event: Lifecycle, editor: &mut EditorPane) -> bool {
    match listener.try_borrow_mut() {
        Ok(mut listener) => {
            match event {
                Lifecycle::Added => listener.text_area_added(editor),
                Lifecycle::Removed => listener.text_area_removed(editor),
            }
            true
        }
        Err(_) => false,
    }
}

impl MainView {
    pub fn new() -> Self {
        Self {
            editors: HashMap::new(),
            order: Vec::new(),
            current: None,
            next_editor: 0,
            listeners: Vec::new(),
            next_listener: 0,
            pending: Vec::new(),
            closing: HashMap::new(),
            split_type: SplitType::None,
        }
    }

    pub fn add_listener(&mut self, listener: SharedMainViewListener) -> ListenerId {
        let id = ListenerId::next(&mut self.next_listener);
        self.listeners.push((id, listener));
        id
    }

    /// 移除監聽者並捨棄其延後事件。 / Removes a listener along with its undelivered events.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.pending.retain(|delivery| delivery.listener != id);
        self.release_closed();
        self.listeners.len() != before
    }

    /// 開啟新的編輯器並通知監聽者。 / Opens an editor, makes it current and fires `text_area_added`.
    pub fn open(
        &mut self,
        title: impl Into<String>,
        path: Option<PathBuf>,
        text: impl Into<String>,
    ) -> EditorId {
        self.flush_pending();
        let id = EditorId::from_raw(self.next_editor);
        self.next_editor += 1;
        let pane = EditorPane::new(id, title, path, text);
        info!(
            "event=editor_open module=main_view editor={} name={}",
            id,
            pane.display_name()
        );
        self.editors.insert(id, pane);
        self.order.push(id);
        self.current = Some(id);

        for (listener_id, listener) in &self.listeners {
            let Some(editor) = self.editors.get_mut(&id) else {
                break;
            };
            if !deliver(listener, Lifecycle::Added, editor) {
                warn!(
                    "event=editor_open module=main_view status=deferred editor={} listener={:?} reason=busy",
                    id, listener_id
                );
                self.pending.push(PendingDelivery {
                    listener: *listener_id,
                    editor: id,
                    event: Lifecycle::Added,
                });
            }
        }
        id
    }

    /// 關閉編輯器；不存在時回傳 `false`。 / Fires `text_area_removed`, then drops the editor.
    ///
    /// If a listener is busy the editor is kept until the removal reaches it.
    pub fn close(&mut self, id: EditorId) -> bool {
        self.flush_pending();
        let Some(mut editor) = self.editors.remove(&id) else {
            return false;
        };
        let mut deferred = false;
        for (listener_id, listener) in &self.listeners {
            if self
                .pending
                .iter()
                .any(|delivery| delivery.listener == *listener_id && delivery.editor == id)
            {
                // Keep the added/removed order for a listener that still owes an earlier event.
                self.pending.push(PendingDelivery {
                    listener: *listener_id,
                    editor: id,
                    event: Lifecycle::Removed,
                });
                deferred = true;
                continue;
            }
            if !deliver(listener, Lifecycle::Removed, &mut editor) {
                warn!(
                    "event=editor_close module=main_view status=deferred editor={} listener={:?} reason=busy",
                    id, listener_id
                );
                self.pending.push(PendingDelivery {
                    listener: *listener_id,
                    editor: id,
                    event: Lifecycle::Removed,
                });
                deferred = true;
            }
        }
        if deferred {
            self.closing.insert(id, editor);
        }
        self.order.retain(|&editor_id| editor_id != id);
        if self.current == Some(id) {
            self.current = self.order.last().copied();
        }
        info!(
            "event=editor_close module=main_view editor={} remaining={}",
            id,
            self.order.len()
        );
        true
    }

    /// 重送延後的事件；回傳仍未送達的數量。 / Retries deferred events and returns how many are still waiting.
    pub fn flush_pending(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let queued = std::mem::take(&mut self.pending);
        let mut blocked: Vec<ListenerId> = Vec::new();
        for delivery in queued {
            let Some((_, listener)) = self
                .listeners
                .iter()
                .find(|(listener_id, _)| *listener_id == delivery.listener)
            else {
                continue;
            };
            let editor = match self.editors.get_mut(&delivery.editor) {
                Some(editor) => Some(editor),
                None => self.closing.get_mut(&delivery.editor),
            };
            let Some(editor) = editor else {
                continue;
            };
            if blocked.contains(&delivery.listener)
                || !deliver(listener, delivery.event, editor)
            {
                blocked.push(delivery.listener);
                self.pending.push(delivery);
            }
        }
        self.release_closed();
        self.pending.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn release_closed(&mut self) {
        let pending = &self.pending;
        self.closing.retain(|id, _| {
            pending
                .iter()
                .any(|delivery| delivery.editor == *id && delivery.event == Lifecycle::Removed)
        });
    }

    pub fn editor(&self, id: EditorId) -> Option<&EditorPane> {
        self.editors.get(&id)
    }

    pub fn editor_mut(&mut self, id: EditorId) -> Option<&mut EditorPane> {
        self.editors.get_mut(&id)
    }

    /// 依開啟順序列出編輯器。 / Iterates editors in the order they were opened.
    pub fn editors(&self) -> impl Iterator<Item = &EditorPane> {
        self.order.iter().filter_map(|id| self.editors.get(id))
    }

    pub fn editor_ids(&self) -> &[EditorId] {
        &self.order
    }

    pub fn editor_count(&self) -> usize {
        self.order.len()
    }

    pub fn current(&self) -> Option<&EditorPane> {
        self.current.and_then(|id| self.editors.get(&id))
    }

    pub fn current_mut(&mut self) -> Option<&mut EditorPane> {
        let id = self.current?;
        self.editors.get_mut(&id)
    }

    pub fn set_current(&mut self, id: EditorId) -> bool {
        if self.editors.contains_key(&id) {
            self.current = Some(id);
            true
        } else {
            false
        }
    }

    pub fn split_type(&self) -> SplitType {
        self.split_type
    }

    pub fn set_split_type(&mut self, split_type: SplitType) {
        self.split_type = split_type;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Journal {
        events: Vec<String>,
    }

    impl MainViewListener for Journal {
        fn text_area_added(&mut self, editor: &mut EditorPane) {
            self.events.push(format!("added {}", editor.title()));
        }

        fn text_area_removed(&mut self, editor: &mut EditorPane) {
            self.events.push(format!("removed {}", editor.title()));
        }
    }

    #[test]
    fn open_and_close_fire_lifecycle_events() {
        let mut view = MainView::new();
        let journal = Rc::new(RefCell::new(Journal::default()));
        view.add_listener(journal.clone());

        let a = view.open("a.txt", None, "");
        let b = view.open("b.txt", None, "");
        assert_eq!(view.current().map(EditorPane::id), Some(b));

        assert!(view.close(b));
        assert!(!view.close(b));
        assert_eq!(view.current().map(EditorPane::id), Some(a));
        assert_eq!(
            journal.borrow().events,
            vec!["added a.txt", "added b.txt", "removed b.txt"]
        );
    }

    #[test]
    fn events_for_a_busy_listener_are_deferred_not_lost() {
        let mut view = MainView::new();
        let journal = Rc::new(RefCell::new(Journal::default()));
        view.add_listener(journal.clone());
        let a = view.open("a.txt", None, "");

        let guard = journal.borrow();
        let b = view.open("b.txt", None, "");
        assert!(view.close(a));
        assert!(view.close(b));
        assert_eq!(view.flush_pending(), 3);
        drop(guard);

        assert_eq!(view.flush_pending(), 0);
        assert_eq!(view.pending_count(), 0);
        assert_eq!(
            journal.borrow().events,
            vec!["added a.txt", "added b.txt", "removed a.txt", "removed b.txt"]
        );
        assert_eq!(view.editor_count(), 0);
    }

    #[test]
    fn removing_a_listener_discards_its_deferred_events() {
        let mut view = MainView::new();
        let journal = Rc::new(RefCell::new(Journal::default()));
        let id = view.add_listener(journal.clone());
        let a = view.open("a.txt", None, "");
        {
            let _guard = journal.borrow();
            view.close(a);
        }
        assert_eq!(view.pending_count(), 1);
        assert!(view.remove_listener(id));
        assert_eq!(view.pending_count(), 0);
        assert_eq!(journal.borrow().events, vec!["added a.txt"]);
    }

    #[test]
    fn removed_listener_stops_receiving_events() {
        let mut view = MainView::default();
        let journal = Rc::new(RefCell::new(Journal::default()));
        let id = view.add_listener(journal.clone());
        assert!(view.remove_listener(id));
        view.open("c.txt", None, "");
        assert!(journal.borrow().events.is_empty());
    }

    #[test]
    fn editors_iterate_in_open_order_and_track_split() {
        let mut view = MainView::new();
        let first = view.open("1", None, "");
        let second = view.open("2", None, "");
        assert!(view.set_current(first));
        assert!(!view.set_current(EditorId::from_raw(99)));
        let titles: Vec<_> = view.editors().map(|editor| editor.title()).collect();
        assert_eq!(titles, vec!["1", "2"]);
        assert_eq!(view.editor_ids(), &[first, second]);

        view.set_split_type(SplitType::Vertical);
        assert_eq!(view.split_type(), SplitType::Vertical);
    }
}
