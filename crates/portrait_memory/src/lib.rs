pub mod history;
pub mod sqlite;

pub use history::{render_summary, Comparison};
pub use sqlite::SqliteReports;
