pub mod cli;
pub mod collection;
pub mod commands;
pub mod cursor;
pub mod error;
pub mod models;
pub mod parser;


pub use collection::{FilterQuery, LogCollection};
pub use cursor::Cursor;
pub use error::LogError;
pub use models::{AuthRecord, ParseFailure, RecordFields};
pub use parser::RecordParser;
