//! clinalert Parser - condition language compiler
//!
//! This crate turns alert rule text into per-variable condition maps and
//! builds [`Alert`](clinalert_core::ast::Alert)s from rule-table rows.

pub mod alert_parser;
pub mod condition_parser;
pub mod error;
pub mod interval;
pub mod lexer;
pub mod rule_table;

// Re-export main parser types
pub use alert_parser::AlertParser;
pub use condition_parser::{Compiled, ConditionParser};
pub use error::{ParseError, Result};
pub use interval::ReferenceInterval;
pub use lexer::{Lexed, Lexer, Token, TokenKind};
pub use rule_table::{is_deactivated, RuleRow, RuleTable};
