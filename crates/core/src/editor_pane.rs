use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, warn};

use crate::notice::{NoticeListener, NoticeParser, ParserId, ParserNotice};

/// 編輯器識別碼。 / Opaque identifier for an open editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(u64);

impl EditorId {
    pub const fn from_raw(raw: u64) -> Self {
        EditorId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor#{}", self.0)
    }
}

/// 監聽者註冊後取得的識別碼。 / Token returned when a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next(counter: &mut u64) -> Self {
        let id = ListenerId(*counter);
        *counter += 1;
        id
    }
}

pub type SharedNoticeListener = Rc<RefCell<dyn NoticeListener>>;

/// 單一開啟中的編輯器。 / A single open document view.
///
/// The pane owns its text, the parsers attached to it and the notices they
/// last reported. Listeners receive the full notice set after every parse.
pub struct EditorPane {
    id: EditorId,
    title: String,
    path: Option<PathBuf>,
    text: String,
    parsers: Vec<Rc<dyn NoticeParser>>,
    listeners: Vec<(ListenerId, SharedNoticeListener)>,
    next_listener: u64,
    notices: Vec<ParserNotice>,
}

impl fmt::Debug for EditorPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorPane")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("path", &self.path)
            .field("parsers", &self.parsers.len())
            .field("listeners", &self.listeners.len())
            .field("notices", &self.notices)
            .finish()
    }
}

impl EditorPane {
    /// 建立新的編輯器。 / Creates a pane with the given identity and contents.
    pub fn new(
        id: EditorId,
        title: impl Into<String>,
        path: Option<PathBuf>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            path,
            text: text.into(),
            parsers: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
            notices: Vec::new(),
        }
    }

    pub fn id(&self) -> EditorId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 顯示用名稱；優先使用完整路徑。 / Full path when known, otherwise the title.
    pub fn display_name(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => self.title.clone(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 取代內容並重新解析。 / Replaces the text and re-runs every parser.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.reparse();
    }

    /// 目前的訊息集合。 / Notices reported by the last parse.
    pub fn notices(&self) -> &[ParserNotice] {
        &self.notices
    }

    pub fn has_parser(&self, id: ParserId) -> bool {
        self.parsers.iter().any(|parser| parser.id() == id)
    }

    /// 加入解析器；同一識別碼只會加入一次。 / Attaches a parser once per parser id.
    pub fn add_parser(&mut self, parser: Rc<dyn NoticeParser>) -> bool {
        if self.has_parser(parser.id()) {
            return false;
        }
        debug!(
            "event=parser_add module=editor editor={} parser={}",
            self.id,
            parser.id()
        );
        self.parsers.push(parser);
        true
    }

    /// 移除解析器並清掉其訊息。 / Detaches a parser and drops the notices it produced.
    pub fn remove_parser(&mut self, id: ParserId) -> bool {
        let before = self.parsers.len();
        self.parsers.retain(|parser| parser.id() != id);
        if self.parsers.len() == before {
            return false;
        }
        debug!(
            "event=parser_remove module=editor editor={} parser={}",
            self.id, id
        );
        let had_notices = self.notices.iter().any(|notice| notice.parser == id);
        if had_notices {
            self.notices.retain(|notice| notice.parser != id);
            self.notify();
        }
        true
    }

    pub fn add_notice_listener(&mut self, listener: SharedNoticeListener) -> ListenerId {
        let id = ListenerId::next(&mut self.next_listener);
        self.listeners.push((id, listener));
        id
    }

    pub fn remove_notice_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// 執行所有解析器並通知監聽者。 / Runs every parser, replaces the notice set and notifies listeners.
    pub fn reparse(&mut self) {
        self.notices = self
            .parsers
            .iter()
            .flat_map(|parser| parser.parse(self.id, &self.text))
            .collect();
        debug!(
            "event=reparse module=editor editor={} notices={}",
            self.id,
            self.notices.len()
        );
        self.notify();
    }

    fn notify(&self) {
        for (listener_id, listener) in &self.listeners {
            match listener.try_borrow_mut() {
                Ok(mut listener) => listener.notices_changed(self.id, &self.notices),
                Err(_) => warn!(
                    "event=notify module=editor status=skipped editor={} listener={:?} reason=busy",
                    self.id, listener_id
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeCategory;

    struct LineCounter;

    impl NoticeParser for LineCounter {
        fn id(&self) -> ParserId {
            ParserId::new(9)
        }

        fn parse(&self, editor: EditorId, text: &str) -> Vec<ParserNotice> {
            text.lines()
                .enumerate()
                .map(|(idx, line)| {
                    ParserNotice::new(editor, self.id(), idx as i64, line, NoticeCategory::Other)
                })
                .collect()
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(EditorId, usize)>,
    }

    impl NoticeListener for Recorder {
        fn notices_changed(&mut self, editor: EditorId, notices: &[ParserNotice]) {
            self.calls.push((editor, notices.len()));
        }
    }

    #[test]
    fn set_text_reparses_and_notifies() {
        let mut pane = EditorPane::new(EditorId::from_raw(3), "a.txt", None, "");
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        pane.add_notice_listener(recorder.clone());
        assert!(pane.add_parser(Rc::new(LineCounter)));
        assert!(!pane.add_parser(Rc::new(LineCounter)));

        pane.set_text("one\ntwo");
        assert_eq!(pane.notices().len(), 2);
        assert_eq!(recorder.borrow().calls, vec![(EditorId::from_raw(3), 2)]);
    }

    #[test]
    fn removing_parser_drops_its_notices() {
        let mut pane = EditorPane::new(EditorId::from_raw(1), "b.txt", None, "x\ny\nz");
        pane.add_parser(Rc::new(LineCounter));
        pane.reparse();
        assert_eq!(pane.notices().len(), 3);

        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let listener = pane.add_notice_listener(recorder.clone());
        assert!(pane.remove_parser(ParserId::new(9)));
        assert!(pane.notices().is_empty());
        assert_eq!(recorder.borrow().calls.len(), 1);

        assert!(pane.remove_notice_listener(listener));
        assert!(!pane.remove_notice_listener(listener));
        assert!(!pane.remove_parser(ParserId::new(9)));
    }
}
