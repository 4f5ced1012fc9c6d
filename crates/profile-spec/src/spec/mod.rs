pub mod field;
pub mod rule;
pub mod schema;
pub mod step;

pub use field::{ArrayRule, DateRule, FieldKind, FieldSpec, ItemKind, NumberRule, TextRule};
pub use rule::CrossFieldRule;
pub use schema::{ProfileSchema, SchemaDef, SchemaError};
pub use step::StepSpec;
