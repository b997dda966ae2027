//! # I18n Unit Tests / I18n 单元测试
//!
//! Locale resolution and localized labels.
//!
//! 语言解析和本地化标签。

use jobmatrix::models::{SkipReason, StepResult};
use jobmatrix::resolve_locale;

#[cfg(test)]
mod locale_resolution_tests {
    use super::*;

    #[test]
    fn test_exact_locale() {
        assert_eq!(resolve_locale(&[Some("zh-CN")]), "zh-CN");
        assert_eq!(resolve_locale(&[Some("en")]), "en");
    }

    #[test]
    fn test_language_part_fallback() {
        assert_eq!(resolve_locale(&[Some("en-US")]), "en");
        assert_eq!(resolve_locale(&[Some("en_GB")]), "en");
    }

    #[test]
    fn test_first_available_candidate_wins() {
        assert_eq!(resolve_locale(&[None, Some("zh-CN")]), "zh-CN");
        assert_eq!(resolve_locale(&[Some("fr-FR"), Some("zh-CN")]), "zh-CN");
        assert_eq!(resolve_locale(&[Some("en"), Some("zh-CN")]), "en");
    }
}

#[cfg(test)]
mod label_tests {
    use super::*;

    #[test]
    fn test_status_labels_are_localized() {
        let skipped = StepResult::skipped("Lint", SkipReason::GuardFalse);
        assert_eq!(skipped.status_str("en"), "Skipped");
        assert_eq!(skipped.status_str("zh-CN"), "跳过");
    }

    #[test]
    fn test_unknown_locale_falls_back_to_english() {
        let skipped = StepResult::skipped("Lint", SkipReason::EarlierFailure);
        assert_eq!(skipped.status_str("xx"), "Skipped");
    }
}
