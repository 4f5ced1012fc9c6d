use std::collections::BTreeMap;

/// Message overrides keyed by `field`, `field.code`, `field.label`, `rule.<id>` or
/// `step.<id>`, optionally prefixed by a locale (`nl:bio` or `nl/bio`).
pub type MessageMap = BTreeMap<String, String>;

pub fn resolve_message<'a>(
    messages: &'a MessageMap,
    key: &str,
    locale: Option<&str>,
) -> Option<&'a str> {
    if let Some(locale) = locale {
        if let Some(value) = messages.get(&format!("{}:{}", locale, key)) {
            return Some(value);
        }
        if let Some(value) = messages.get(&format!("{}/{}", locale, key)) {
            return Some(value);
        }
    }
    messages.get(key).map(String::as_str)
}

/// Replaces `{name}` tokens in `template`.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut output = template.to_string();
    for (name, value) in args {
        let token = format!("{{{}}}", name);
        output = output.replace(&token, value);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_prefixed_keys_win_over_plain_keys() {
        let mut messages = MessageMap::new();
        messages.insert("bio".into(), "Bio is required".into());
        messages.insert("nl:bio".into(), "Bio is verplicht".into());
        messages.insert("en/motivation".into(), "Motivation is required".into());

        assert_eq!(resolve_message(&messages, "bio", Some("nl")), Some("Bio is verplicht"));
        assert_eq!(resolve_message(&messages, "bio", None), Some("Bio is required"));
        assert_eq!(
            resolve_message(&messages, "motivation", Some("en")),
            Some("Motivation is required")
        );
        assert_eq!(resolve_message(&messages, "motivation", Some("nl")), None);
    }

    #[test]
    fn interpolation_replaces_every_token() {
        let text = interpolate("{label} is verplicht ({label})", &[("label", "Voornaam")]);
        assert_eq!(text, "Voornaam is verplicht (Voornaam)");
    }
}
