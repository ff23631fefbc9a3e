/// Check if the honeypot field is filled. Returns true if spam detected.
pub fn is_spam(fields: &[(String, String)], honeypot_field: Option<&str>) -> bool {
    let Some(field) = honeypot_field.filter(|f| !f.is_empty()) else {
        return false;
    };

    fields
        .iter()
        .any(|(k, v)| k == field && !v.trim().is_empty())
}
