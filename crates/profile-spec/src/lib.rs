#![allow(missing_docs)]

pub mod date;
pub mod expr;
pub mod messages;
pub mod progress;
pub mod requirement;
pub mod snapshot_schema;
pub mod spec;
pub mod tenant;
pub mod validate;
pub mod values;

pub use date::{DateIssue, format_profile_date, parse_profile_date, today_local};
pub use expr::Expr;
pub use messages::{MessageMap, interpolate, resolve_message};
pub use progress::{ProfileProgress, step_percentage};
pub use requirement::{is_applicable, resolve_required, resolve_requirements};
pub use snapshot_schema::generate as snapshot_schema;
pub use spec::{
    ArrayRule, CrossFieldRule, DateRule, FieldKind, FieldSpec, ItemKind, NumberRule,
    ProfileSchema, SchemaDef, SchemaError, StepSpec, TextRule,
};
pub use tenant::{household_size, tenant_profile, tenant_profile_definition};
pub use validate::{ValidationError, Validator, validate_all, validate_fields};
pub use values::{FormValues, as_number, is_empty_value};
