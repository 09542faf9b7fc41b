use validator::ValidationErrors;

/// Flattens `validator` errors into a single `"; "`-separated message.
///
/// Only errors carrying a `message` are included; field order follows the
/// underlying map, so callers should not rely on it.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
