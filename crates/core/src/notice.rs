use std::fmt;

use crate::editor_pane::EditorId;

/// 診斷訊息的分類。 / Category of a parser notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeCategory {
    Task,
    Other,
}

/// 產生訊息之解析器的識別碼。 / Identifies the parser that produced a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParserId(u32);

impl ParserId {
    pub const fn new(raw: u32) -> Self {
        ParserId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parser#{}", self.0)
    }
}

/// 編輯器回報的單一訊息。 / A single notice reported for an editor.
///
/// `line` is zero-based and comes straight from the producer, so it may be
/// negative; consumers clamp it with [`ParserNotice::clamped_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserNotice {
    pub editor: EditorId,
    pub parser: ParserId,
    pub line: i64,
    pub message: String,
    pub category: NoticeCategory,
}

impl ParserNotice {
    pub fn new(
        editor: EditorId,
        parser: ParserId,
        line: i64,
        message: impl Into<String>,
        category: NoticeCategory,
    ) -> Self {
        Self {
            editor,
            parser,
            line,
            message: message.into(),
            category,
        }
    }

    /// 將負數行號修正為 0。 / Line number with negative values clamped to zero.
    pub fn clamped_line(&self) -> usize {
        usize::try_from(self.line.max(0)).unwrap_or(usize::MAX)
    }

    pub fn is_task(&self) -> bool {
        self.category == NoticeCategory::Task
    }
}

/// 訊息產生器需實作的 trait。 / Trait implemented by notice producers.
pub trait NoticeParser {
    fn id(&self) -> ParserId;

    fn parse(&self, editor: EditorId, text: &str) -> Vec<ParserNotice>;
}

/// 訊息集合變更的監聽者。 / Observer of an editor's notice set.
///
/// The slice handed over is the editor's complete notice set after a parse,
/// not a delta.
pub trait NoticeListener {
    fn notices_changed(&mut self, editor: EditorId, notices: &[ParserNotice]);
}
