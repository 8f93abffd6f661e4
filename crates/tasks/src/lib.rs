pub mod parser;
pub mod table;
pub mod window;

pub use parser::{TaskTagParser, DEFAULT_TASK_IDENTIFIERS, TASK_PARSER_ID};
pub use table::{RowIcon, TableChange, TableListener, TaskNoticeTableModel, TaskRow};
pub use window::{TaskWindow, TASK_WINDOW_NAME};
