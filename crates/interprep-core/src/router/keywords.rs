//! Keyword sets backing the router rules.
//!
//! Matching is lowercase substring matching, so Russian stems like
//! "изуч" cover the whole inflection family. The sets are bilingual;
//! the original bot only carried the Russian half.

/// Indicators that free text is a description of the user's skills:
/// technology names, experience phrases, duration phrases.
pub const SKILL_KEYWORDS: &[&str] = &[
    // Technology names
    "python",
    "django",
    "java",
    "javascript",
    "rust",
    "sql",
    "docker",
    // Experience phrases
    "знаю",
    "опыт",
    "работал",
    "владею",
    "умею",
    "know",
    "experience",
    "worked",
    // Duration phrases
    "год",
    "лет",
    "месяц",
    "проект",
    "years",
    "months",
    "project",
];

/// Learning-plan intent.
pub const PLAN_KEYWORDS: &[&str] = &[
    "хочу изучать",
    "научиться",
    "освоить",
    "изуч",
    "обуч",
    "планир",
    "план",
    "learn",
    "study",
    "roadmap",
];

/// Interview-practice intent.
pub const INTERVIEW_KEYWORDS: &[&str] = &["собеседован", "интервью", "вопросы", "mock", "interview"];

/// Code-review intent.
pub const CODE_KEYWORDS: &[&str] = &["код", "решен", "задач", "алгоритм", "code", "review", "algorithm", "snippet"];
