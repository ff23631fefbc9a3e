use chrono::{DateTime, SecondsFormat, Utc};

use super::payload::{CREATED_AT, FORM_TYPE, PAGE};
use super::{FormSource, SubmissionPayload};

pub const DEFAULT_FORM_TYPE: &str = "general";
pub const DEFAULT_PAGE: &str = "index.html";

/// Build the provider-agnostic payload for a form submitted at `location`.
pub fn normalize<F: FormSource + ?Sized>(form: &F, location: &str) -> SubmissionPayload {
    normalize_at(form, location, Utc::now())
}

pub fn normalize_at<F: FormSource + ?Sized>(
    form: &F,
    location: &str,
    now: DateTime<Utc>,
) -> SubmissionPayload {
    let fields = form.field_values();
    let mut payload = SubmissionPayload::with_capacity(fields.len() + 3);

    for (name, value) in fields {
        payload.insert(name, value.trim().to_string());
    }

    let form_type = form
        .marker()
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_FORM_TYPE);
    payload.insert(FORM_TYPE, form_type.to_string());
    payload.insert(PAGE, page_name(location));
    payload.insert(CREATED_AT, now.to_rfc3339_opts(SecondsFormat::Millis, true));

    payload
}

/// Last path segment of a location, or `index.html` for a directory path.
///
/// `location` may be a bare path or an absolute URL; only the URL's path is
/// considered.
pub fn page_name(location: &str) -> String {
    match reqwest::Url::parse(location) {
        Ok(url) if url.has_host() => last_segment(url.path()).to_string(),
        _ => last_segment(location.split(['?', '#']).next().unwrap_or_default()).to_string(),
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_PAGE)
}
