use once_cell::sync::Lazy;
use regex::Regex;

use rtext_core::{EditorId, NoticeCategory, NoticeParser, ParserId, ParserNotice};

/// Identifiers recognised when none are configured.
/// （未設定時使用的預設任務標記。）
pub const DEFAULT_TASK_IDENTIFIERS: &[&str] = &["TODO", "FIXME", "HACK"];

/// Parser id reserved for the task-tag scanner.
/// （任務標記掃描器專用的解析器識別碼。）
pub const TASK_PARSER_ID: ParserId = ParserId::new(1);

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    build_pattern(DEFAULT_TASK_IDENTIFIERS.iter().copied())
        .expect("default task identifiers form a valid pattern")
});

/// Scans document text for task tags such as `TODO` and `FIXME`.
/// （掃描文件中的 `TODO`、`FIXME` 等任務標記。）
///
/// Each matching line yields one [`NoticeCategory::Task`] notice whose
/// message runs from the identifier to the end of the line.
#[derive(Debug, Clone)]
pub struct TaskTagParser {
    identifiers: Vec<String>,
    pattern: Option<Regex>,
}

impl Default for TaskTagParser {
    fn default() -> Self {
        Self {
            identifiers: DEFAULT_TASK_IDENTIFIERS
                .iter()
                .map(|ident| ident.to_string())
                .collect(),
            pattern: Some(DEFAULT_PATTERN.clone()),
        }
    }
}

impl TaskTagParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parser for the given identifiers; an empty list disables it.
    /// （以指定標記建立解析器；空清單代表停用。）
    pub fn with_identifiers<I, S>(identifiers: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parser = Self {
            identifiers: Vec::new(),
            pattern: None,
        };
        parser.set_identifiers(identifiers)?;
        Ok(parser)
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn is_enabled(&self) -> bool {
        self.pattern.is_some()
    }

    /// Replaces the recognised identifiers, leaving the parser untouched on error.
    /// （更新任務標記；失敗時保留原設定。）
    pub fn set_identifiers<I, S>(&mut self, identifiers: I) -> Result<(), regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let identifiers: Vec<String> = identifiers
            .into_iter()
            .map(|ident| ident.as_ref().trim().to_string())
            .filter(|ident| !ident.is_empty())
            .collect();
        let pattern = if identifiers.is_empty() {
            None
        } else {
            Some(build_pattern(identifiers.iter().map(String::as_str))?)
        };
        self.identifiers = identifiers;
        self.pattern = pattern;
        Ok(())
    }
}

impl NoticeParser for TaskTagParser {
    fn id(&self) -> ParserId {
        TASK_PARSER_ID
    }

    fn parse(&self, editor: EditorId, text: &str) -> Vec<ParserNotice> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        text.lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let found = pattern.find(line)?;
                let message = line[found.start()..].trim_end();
                Some(ParserNotice::new(
                    editor,
                    TASK_PARSER_ID,
                    i64::try_from(index).unwrap_or(i64::MAX),
                    message,
                    NoticeCategory::Task,
                ))
            })
            .collect()
    }
}

fn build_pattern<'a>(identifiers: impl Iterator<Item = &'a str>) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = identifiers.map(regex::escape).collect();
    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> EditorId {
        EditorId::from_raw(4)
    }

    #[test]
    fn finds_default_identifiers_per_line() {
        let parser = TaskTagParser::new();
        let source = "fn main() {\n    // TODO: wire up args\n    // nothing here\n    /* FIXME leaks */\n}";
        let notices = parser.parse(editor(), source);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].line, 1);
        assert_eq!(notices[0].message, "TODO: wire up args");
        assert_eq!(notices[1].line, 3);
        assert_eq!(notices[1].message, "FIXME leaks */");
        assert!(notices.iter().all(|notice| notice.is_task()));
        assert!(notices.iter().all(|notice| notice.parser == TASK_PARSER_ID));
    }

    #[test]
    fn identifiers_match_whole_words_only() {
        let parser = TaskTagParser::new();
        let notices = parser.parse(editor(), "let TODOS = 1;\nlet xHACK = 2;\n// HACK");
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].line, 2);
    }

    #[test]
    fn custom_identifiers_replace_defaults() {
        let parser = TaskTagParser::with_identifiers(["XXX", " NOTE "]).unwrap();
        assert_eq!(parser.identifiers(), &["XXX".to_string(), "NOTE".to_string()]);
        let notices = parser.parse(editor(), "// TODO skip\n// NOTE keep");
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "NOTE keep");
    }

    #[test]
    fn empty_identifier_list_disables_parser() {
        let parser = TaskTagParser::with_identifiers(Vec::<String>::new()).unwrap();
        assert!(!parser.is_enabled());
        assert!(parser.parse(editor(), "// TODO").is_empty());
    }

    #[test]
    fn identifiers_are_escaped() {
        let parser = TaskTagParser::with_identifiers(["FIX.ME"]).unwrap();
        assert!(parser.parse(editor(), "// FIXxME").is_empty());
        assert_eq!(parser.parse(editor(), "// FIX.ME now").len(), 1);
    }
}
