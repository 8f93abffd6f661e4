use log::debug;

use rtext_core::{EditorId, NoticeListener, ParserNotice};

/// Icon displayed in the first column of a row.
/// （列首顯示的圖示。）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIcon {
    Task,
}

impl RowIcon {
    pub fn resource_name(self) -> &'static str {
        match self {
            RowIcon::Task => "page_white_edit.png",
        }
    }
}

/// One task shown in the Tasks window.
/// （任務視窗中的一列。）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub icon: RowIcon,
    pub editor: EditorId,
    pub file: String,
    /// Zero-based line; negative producer values are stored as 0.
    pub line: usize,
    pub message: String,
}

impl TaskRow {
    fn from_notice(editor: EditorId, notice: &ParserNotice, file: &str) -> Self {
        Self {
            icon: RowIcon::Task,
            editor,
            file: file.to_string(),
            line: notice.clamped_line(),
            message: notice.message.clone(),
        }
    }

    /// One-based line number for display.
    /// （顯示用的行號，從 1 開始。）
    pub fn display_line(&self) -> usize {
        self.line.saturating_add(1)
    }
}

/// Signal emitted whenever the table contents may have changed.
/// （表格內容變更時發出的通知。）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableChange {
    EditorRegistered { editor: EditorId },
    RowsReplaced { editor: EditorId, rows: usize },
    EditorRemoved { editor: EditorId, rows: usize },
}

pub type TableListener = Box<dyn FnMut(&TableChange)>;

struct EditorSlice {
    editor: EditorId,
    file: String,
    rows: Vec<TaskRow>,
}

/// Flattened table of task notices across every registered editor.
/// （彙整所有已註冊編輯器任務訊息的表格模型。）
///
/// Rows are grouped per editor in registration order; inside a group they
/// keep the order the producer reported them in.
#[derive(Default)]
pub struct TaskNoticeTableModel {
    slices: Vec<EditorSlice>,
    listeners: Vec<TableListener>,
    revision: u64,
}

impl TaskNoticeTableModel {
    pub const COLUMN_NAMES: [&'static str; 4] = ["", "File", "Line", "Task"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_names(&self) -> &'static [&'static str] {
        &Self::COLUMN_NAMES
    }

    pub fn add_table_listener(&mut self, listener: impl FnMut(&TableChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Bumped on every change signal.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Starts accepting notices for `editor`. Returns `false` if already tracked.
    /// （開始接受該編輯器的訊息；已註冊時回傳 `false`。）
    pub fn register(&mut self, editor: EditorId, file: impl Into<String>) -> bool {
        if self.is_registered(editor) {
            return false;
        }
        self.slices.push(EditorSlice {
            editor,
            file: file.into(),
            rows: Vec::new(),
        });
        self.fire(TableChange::EditorRegistered { editor });
        true
    }

    /// Drops every row of `editor`; a no-op for unknown editors.
    /// （移除該編輯器的所有列；未註冊時不做任何事。）
    pub fn deregister(&mut self, editor: EditorId) -> bool {
        let Some(index) = self.position(editor) else {
            return false;
        };
        let slice = self.slices.remove(index);
        self.fire(TableChange::EditorRemoved {
            editor,
            rows: slice.rows.len(),
        });
        true
    }

    pub fn is_registered(&self, editor: EditorId) -> bool {
        self.position(editor).is_some()
    }

    /// Replaces the rows of `editor` with its task notices.
    /// （以新的任務訊息取代該編輯器的列。）
    ///
    /// Notices of other categories are skipped. Rows are attributed to
    /// `editor` whatever editor the notice itself names. Updates for editors
    /// that are not registered are discarded and return `false`.
    pub fn update(&mut self, editor: EditorId, notices: &[ParserNotice]) -> bool {
        let Some(index) = self.position(editor) else {
            debug!(
                "event=notices_changed module=tasks status=ignored editor={} reason=unregistered",
                editor
            );
            return false;
        };
        let slice = &mut self.slices[index];
        slice.rows = notices
            .iter()
            .filter(|notice| notice.is_task())
            .map(|notice| TaskRow::from_notice(editor, notice, &slice.file))
            .collect();
        let rows = slice.rows.len();
        self.fire(TableChange::RowsReplaced { editor, rows });
        true
    }

    /// Snapshot of every row in display order.
    /// （依顯示順序複製目前所有列。）
    pub fn rows(&self) -> Vec<TaskRow> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskRow> {
        self.slices.iter().flat_map(|slice| slice.rows.iter())
    }

    pub fn rows_for(&self, editor: EditorId) -> &[TaskRow] {
        self.position(editor)
            .map(|index| self.slices[index].rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn row(&self, index: usize) -> Option<&TaskRow> {
        self.iter().nth(index)
    }

    pub fn row_count(&self) -> usize {
        self.slices.iter().map(|slice| slice.rows.len()).sum()
    }

    pub fn registered_editors(&self) -> impl Iterator<Item = EditorId> + '_ {
        self.slices.iter().map(|slice| slice.editor)
    }

    fn position(&self, editor: EditorId) -> Option<usize> {
        self.slices.iter().position(|slice| slice.editor == editor)
    }

    fn fire(&mut self, change: TableChange) {
        self.revision += 1;
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}

impl NoticeListener for TaskNoticeTableModel {
    fn notices_changed(&mut self, editor: EditorId, notices: &[ParserNotice]) {
        self.update(editor, notices);
    }
}
