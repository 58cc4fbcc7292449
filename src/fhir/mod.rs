//! Wire-format resources: Questionnaire, QuestionnaireResponse and the
//! datatypes they share.

mod datatypes;
mod questionnaire;
mod response;
mod value;
mod value_set;

pub use datatypes::*;
pub use questionnaire::*;
pub use response::*;
pub use value::*;
pub use value_set::*;
