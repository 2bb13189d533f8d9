//! Lorekeep Engine library.
//!
//! ## Structure
//!
//! - `use_cases/` - Access gate, content queries, publishing, notes
//! - `infrastructure/` - Ports, snapshot adapter, clock, configuration
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
