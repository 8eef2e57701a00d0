use crate::config::ArtifactKind;
use crate::error::ForensicsError;
use fluent_templates::fluent_bundle::FluentValue;
use fluent_templates::{static_loader, Loader};
use std::borrow::Cow;
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

static_loader! {
    static LOCALES = {
        locales: "locales",
        fallback_language: "en-US",
    };
}

const FALLBACK_LANGUAGE: &str = "en-US";

pub fn localize_error(err: &ForensicsError) -> String {
    let langid = resolve_language();
    match err {
        ForensicsError::Io(detail) => message_with_detail(&langid, "error-io", &detail.to_string()),
        ForensicsError::Sqlite(detail) => {
            message_with_detail(&langid, "error-sqlite", &detail.to_string())
        }
        ForensicsError::Json(detail) => {
            message_with_detail(&langid, "error-json", &detail.to_string())
        }
        ForensicsError::Config(detail) => message_with_detail(&langid, "error-config", detail),
        ForensicsError::Snapshot(detail) => message_with_detail(&langid, "error-snapshot", detail),
        ForensicsError::TableAbsent(table) => {
            message_with_detail(&langid, "error-table-absent", table)
        }
        ForensicsError::MalformedRow(detail) => {
            message_with_detail(&langid, "error-malformed-row", detail)
        }
        ForensicsError::Oracle(detail) => message_with_detail(&langid, "error-oracle", detail),
        ForensicsError::Sink(detail) => message_with_detail(&langid, "error-sink", detail),
        ForensicsError::PermissionDenied(detail) => {
            message_with_detail(&langid, "error-permission-denied", detail)
        }
        ForensicsError::FileNotFound(detail) => {
            message_with_detail(&langid, "error-file-not-found", detail)
        }
        ForensicsError::Cancelled => LOCALES.lookup(&langid, "error-cancelled"),
    }
}

/// Look up a plain message in the user's language.
pub fn message(key: &str) -> String {
    LOCALES.lookup(&resolve_language(), key)
}

/// Look up a message taking string arguments.
pub fn message_with(key: &str, args: &[(&'static str, &str)]) -> String {
    let args: HashMap<Cow<'static, str>, FluentValue> = args
        .iter()
        .map(|(name, value)| (Cow::Borrowed(*name), FluentValue::from(*value)))
        .collect();
    LOCALES.lookup_with_args(&resolve_language(), key, &args)
}

/// Help text attached to the summary of a run over `kind`.
pub fn help_text(kind: ArtifactKind) -> String {
    message(&format!("help-{}", kind.id()))
}

fn message_with_detail(langid: &LanguageIdentifier, key: &str, detail: &str) -> String {
    let mut args = HashMap::new();
    args.insert(Cow::Borrowed("detail"), FluentValue::from(detail));
    LOCALES.lookup_with_args(langid, key, &args)
}

fn resolve_language() -> LanguageIdentifier {
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(key) {
            if let Some(lang) = normalize_lang(value) {
                if let Ok(langid) = lang.parse::<LanguageIdentifier>() {
                    return langid;
                }
            }
        }
    }
    FALLBACK_LANGUAGE.parse().unwrap_or_default()
}

fn normalize_lang(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == "C" || value == "POSIX" {
        return None;
    }
    let value = value.split('.').next().unwrap_or(value);
    let value = value.replace('_', "-");
    Some(value)
}
