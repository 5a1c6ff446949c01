//! Model selection for launch requests.

/// Separator between provider prefix and model alias in caller model ids
/// (e.g. `claude-code::sonnet-4.5`).
const MODEL_ID_SEPARATOR: &str = "::";

/// Per-request configuration supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelConfig {
    /// Model identifier in `<provider>::<alias>` form.
    pub model_id: String,
    /// Optional system prompt forwarded with the launch request.
    pub system_prompt: Option<String>,
}

impl ModelConfig {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            system_prompt: None,
        }
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Maps a caller model id to the CLI's canonical model name.
///
/// Only the substring after `::` is considered. Unknown aliases and ids
/// without a separator resolve to `None`, which means no override: the
/// external tool picks its own default.
pub fn resolve_model_alias(model_id: &str) -> Option<&'static str> {
    let (_, alias) = model_id.split_once(MODEL_ID_SEPARATOR)?;
    match alias {
        "opus" | "opus-4.5" => Some("opus"),
        "sonnet" | "sonnet-4.5" => Some("sonnet"),
        "haiku" => Some("haiku"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies every known alias maps to its canonical name.
    #[test]
    fn test_known_aliases_map_canonically() {
        assert_eq!(resolve_model_alias("claude-code::opus"), Some("opus"));
        assert_eq!(resolve_model_alias("claude-code::opus-4.5"), Some("opus"));
        assert_eq!(resolve_model_alias("claude-code::sonnet"), Some("sonnet"));
        assert_eq!(
            resolve_model_alias("claude-code::sonnet-4.5"),
            Some("sonnet")
        );
        assert_eq!(resolve_model_alias("claude-code::haiku"), Some("haiku"));
    }

    /// Verifies unknown aliases fall through to "no override" without panicking.
    #[test]
    fn test_unknown_alias_means_no_override() {
        assert_eq!(resolve_model_alias("claude-code::gpt-4"), None);
        assert_eq!(resolve_model_alias("claude-code::"), None);
    }

    /// Verifies ids without the separator never override the model.
    #[test]
    fn test_missing_separator_means_no_override() {
        assert_eq!(resolve_model_alias("sonnet"), None);
        assert_eq!(resolve_model_alias(""), None);
    }

    /// Verifies only the portion after the separator is mapped.
    #[test]
    fn test_provider_prefix_is_ignored() {
        assert_eq!(resolve_model_alias("anything::haiku"), Some("haiku"));
    }
}
