//! Reusable UI components shared by the screens

pub mod data_table;
pub mod form_field;
pub mod status_display;
pub mod tabs;

pub use data_table::TableWidget;
pub use form_field::{Form, FormField, FormFieldType};
pub use status_display::StatusDisplay;
pub use tabs::{Tab, TabBar};
