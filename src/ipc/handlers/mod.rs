pub mod core;
pub mod dashboard;
pub mod draft;
pub mod records;
pub mod reports;
pub mod roster;
pub mod settings;
pub mod sync;
pub mod theme;
