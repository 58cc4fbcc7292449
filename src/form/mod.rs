//! The form model: a mutable tree of form items driven by the interactive form.

mod definition;
mod item;
mod skip_logic;
mod value;

pub use definition::*;
pub use item::*;
pub use skip_logic::*;
pub use value::*;
