pub mod dialog;

pub use dialog::{capitalize_first, EditResortDialog, FormView, Resort};
