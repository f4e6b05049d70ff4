pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{aborted, deleted, entity, error, header, status, success, warn};
pub use table::{counts_table, TableBuilder};
pub use theme::{theme, Theme};
