//! 关键词规则表
//!
//! 变量映射和启发式回退共用同一张有序规则表，保证两条路径对相同输入的判断一致。
//! 多条规则同时命中时，按表中顺序取第一条。

/// 规则触发条件，作用于已规范化（小写、拼写纠正）的文本
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// 包含任意一个子串
    AnyOf(&'static [&'static str]),
    /// 包含全部子串
    AllOf(&'static [&'static str]),
}

impl Trigger {
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Trigger::AnyOf(words) => words.iter().any(|w| normalized.contains(w)),
            Trigger::AllOf(words) => words.iter().all(|w| normalized.contains(w)),
        }
    }
}

/// 一条关键词规则
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    /// 回退路径中该规则贡献的变量词
    pub token: &'static str,
    pub trigger: Trigger,
    /// 目标问题原文必须包含的全部子串（不区分大小写）
    pub targets: &'static [&'static str],
}

impl KeywordRule {
    pub fn is_triggered_by(&self, normalized: &str) -> bool {
        self.trigger.matches(normalized)
    }

    pub fn targets_question(&self, question_text: &str) -> bool {
        let text = question_text.to_lowercase();
        self.targets.iter().all(|t| text.contains(&t.to_lowercase()))
    }
}

pub const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        token: "age",
        trigger: Trigger::AnyOf(&["age", "older"]),
        targets: &["older than 35 years old"],
    },
    KeywordRule {
        token: "gender",
        trigger: Trigger::AnyOf(&["gender", "male", "female"]),
        targets: &["male or female"],
    },
    KeywordRule {
        token: "family size",
        trigger: Trigger::AnyOf(&["family", "four"]),
        targets: &["more than four in my family"],
    },
    KeywordRule {
        token: "season",
        trigger: Trigger::AnyOf(&["season", "rainy", "dry"]),
        targets: &["rainy season"],
    },
    KeywordRule {
        token: "climate change",
        trigger: Trigger::AnyOf(&["climate change"]),
        targets: &["climate change"],
    },
    KeywordRule {
        token: "treated last year",
        trigger: Trigger::AllOf(&["treated", "last year"]),
        targets: &["treated", "last year"],
    },
    KeywordRule {
        token: "weather conditions",
        trigger: Trigger::AnyOf(&["weather conditions"]),
        targets: &["weather conditions"],
    },
    KeywordRule {
        token: "prevention tips",
        trigger: Trigger::AnyOf(&["prevention tips"]),
        targets: &["prevention tips"],
    },
    KeywordRule {
        token: "health facility",
        trigger: Trigger::AnyOf(&["health facility", "location"]),
        targets: &["health facility"],
    },
];

/// 受支持的变量词，用于提示词和错误提示
pub fn vocabulary() -> Vec<&'static str> {
    KEYWORD_RULES.iter().map(|r| r.token).collect()
}

/// 输入文本触发的变量词，按规则表顺序
pub fn candidate_tokens(normalized: &str) -> Vec<&'static str> {
    KEYWORD_RULES
        .iter()
        .filter(|rule| rule.is_triggered_by(normalized))
        .map(|rule| rule.token)
        .collect()
}
