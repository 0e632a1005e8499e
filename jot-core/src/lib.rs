//! jot-core: natural-language task parsing and the task model around it.

pub mod due;
pub mod extract;
pub mod normalize;
pub mod parser;
pub mod query;
pub mod record;
pub mod task;
pub mod time;

pub use due::{extract_due, resolve_due, DayMonthOrder, DueOptions, DueRule, DUE_RULES};
pub use extract::{
    extract_category, extract_description, extract_priority, extract_tags, extract_title,
};
pub use normalize::{normalize, Candidate};
pub use parser::{CandidateSource, ParserOptions, RuleBasedParser, TaskParser};
pub use query::{SortKey, StatusFilter, TaskQuery};
pub use record::{TaskPatch, TaskRecord};
pub use task::{Category, ParsedTask, Priority, UNTITLED};
