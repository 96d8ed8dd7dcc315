//! `{{KEY}}` placeholder substitution.

use crate::store::EnvVar;

/// Replace every literal `{{key}}` occurrence with the variable's value.
///
/// Variables apply in list order and matching is exact and case-sensitive.
/// When two variables share a key, the first one consumes every occurrence
/// of its placeholder, so the first definition wins. Text without
/// placeholders and an empty variable list are both identity. There is no
/// second pass: a placeholder introduced by a value is only resolved if a
/// variable later in the list matches it.
pub fn substitute(text: &str, vars: &[EnvVar]) -> String {
    if text.is_empty() || vars.is_empty() {
        return text.to_string();
    }
    let mut result = text.to_string();
    for var in vars {
        if var.key.is_empty() {
            continue;
        }
        let placeholder = format!("{{{{{}}}}}", var.key);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &var.value);
        }
    }
    result
}
