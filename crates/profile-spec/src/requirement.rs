use crate::spec::{FieldSpec, ProfileSchema};
use crate::values::FormValues;

/// `required OR required_if(values)`. An undecidable condition counts as false.
///
/// Evaluated fresh on every call; the triggering field may have changed since the last pass.
pub fn resolve_required(field: &FieldSpec, values: &FormValues) -> bool {
    field.required
        || field
            .required_if
            .as_ref()
            .and_then(|condition| condition.evaluate_bool(values))
            .unwrap_or(false)
}

/// Names of every field that is effectively required for `values`, in registry order.
pub fn resolve_requirements<'a>(schema: &'a ProfileSchema, values: &FormValues) -> Vec<&'a str> {
    schema
        .fields()
        .iter()
        .filter(|field| resolve_required(field, values))
        .map(|field| field.name.as_str())
        .collect()
}

/// Conditional fields only apply while their condition holds.
pub fn is_applicable(field: &FieldSpec, values: &FormValues) -> bool {
    match &field.required_if {
        None => true,
        Some(condition) => field.required || condition.evaluate_bool(values) == Some(true),
    }
}
