//! 按语言的固定文案：拒绝模板与通用错误提示
//!
//! 拒绝模板必须包含唯一的 `{refusal_reason}` 占位符；请求语言缺模板时回退 english，
//! english 也缺失时视为配置错误。

use std::collections::HashMap;

use crate::core::AgentError;

pub const FALLBACK_LANGUAGE: &str = "english";
pub const REFUSAL_PLACEHOLDER: &str = "{refusal_reason}";

pub const REFUSAL_GENERIC: &[(&str, &str)] = &[
    (
        "english",
        "I'm really sorry, but I'm not able to respond to your message. {refusal_reason}",
    ),
    (
        "polish",
        "Bardzo przepraszam, ale nie mogę odpowiedzieć na Twoją wiadomość. {refusal_reason}",
    ),
    (
        "spanish",
        "Lo siento mucho, pero no puedo responder a tu mensaje. {refusal_reason}",
    ),
    (
        "german",
        "Es tut mir wirklich leid, aber ich kann auf deine Nachricht nicht antworten. {refusal_reason}",
    ),
];

pub const ERROR_GENERIC: &[(&str, &str)] = &[
    ("english", "I'm really sorry I can't give you a clear answer right now."),
    (
        "polish",
        "Naprawdę mi przykro, że nie mogę teraz udzielić Ci jednoznacznej odpowiedzi.",
    ),
    ("spanish", "Lamento mucho no poder darte una respuesta clara en este momento."),
    (
        "german",
        "Es tut mir wirklich leid, dass ich dir im Moment keine klare Antwort geben kann.",
    ),
];

fn lookup<'a>(table: &'a [(&'a str, &'a str)], language: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(lang, _)| lang.eq_ignore_ascii_case(language))
        .map(|(_, text)| *text)
}

/// 通用错误提示；未知语言回退 english
pub fn generic_error_message(language: &str) -> &'static str {
    lookup(ERROR_GENERIC, language)
        .or_else(|| lookup(ERROR_GENERIC, FALLBACK_LANGUAGE))
        .unwrap_or_default()
}

/// 语言 → 拒绝模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefusalTemplates {
    templates: HashMap<String, String>,
}

impl Default for RefusalTemplates {
    fn default() -> Self {
        Self::from_pairs(REFUSAL_GENERIC.iter().copied())
    }
}

impl RefusalTemplates {
    /// 空表（测试或完全自定义时使用）
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            templates: pairs
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
        }
    }

    /// 用配置中的模板覆盖 / 补充默认表
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (lang, template) in overrides {
            if !template.contains(REFUSAL_PLACEHOLDER) {
                tracing::warn!(language = %lang, "refusal template has no {{refusal_reason}} placeholder");
            }
            self.templates.insert(lang.to_lowercase(), template.clone());
        }
        self
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.templates.get(&language.to_lowercase()).map(String::as_str)
    }

    /// 渲染拒绝文案：语言 → english → MissingRefusalTemplate
    pub fn render(&self, language: &str, reason: &str) -> Result<String, AgentError> {
        let template = self
            .get(language)
            .or_else(|| self.get(FALLBACK_LANGUAGE))
            .ok_or_else(|| AgentError::MissingRefusalTemplate(language.to_string()))?;
        Ok(template.replace(REFUSAL_PLACEHOLDER, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_uses_language_template() {
        let templates = RefusalTemplates::default();
        let text = templates.render("German", "Jailbreak.").unwrap();
        assert!(text.starts_with("Es tut mir wirklich leid"));
        assert!(text.ends_with("Jailbreak."));
    }

    #[test]
    fn test_render_falls_back_to_english() {
        let templates = RefusalTemplates::from_pairs([(
            "english",
            "I'm sorry, but I can't respond to that. {refusal_reason}",
        )]);
        assert_eq!(
            templates.render("french", "nope").unwrap(),
            "I'm sorry, but I can't respond to that. nope"
        );
    }

    #[test]
    fn test_render_without_any_template_is_config_error() {
        let templates = RefusalTemplates::from_pairs([("polish", "Nie. {refusal_reason}")]);
        let err = templates.render("french", "nope").unwrap_err();
        assert!(matches!(err, AgentError::MissingRefusalTemplate(lang) if lang == "french"));
        assert!(RefusalTemplates::empty().render("english", "x").is_err());
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let mut overrides = HashMap::new();
        overrides.insert("English".to_string(), "Nope: {refusal_reason}".to_string());
        let templates = RefusalTemplates::default().with_overrides(&overrides);
        assert_eq!(templates.render("english", "x").unwrap(), "Nope: x");
        assert!(templates.get("spanish").is_some());
    }

    #[test]
    fn test_generic_error_message_fallback() {
        assert!(generic_error_message("spanish").starts_with("Lamento"));
        assert_eq!(
            generic_error_message("klingon"),
            "I'm really sorry I can't give you a clear answer right now."
        );
    }
}
