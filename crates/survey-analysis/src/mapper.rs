//! 变量映射
//!
//! 把松散的变量短语（"gender"、"climat change"）解析为某疾病下的规范问题原文。
//! 先按关键词规则表匹配，规则都不适用时再按编辑距离做模糊匹配。

use survey_core::utils::{distance, normalize_phrase};
use survey_core::{DiseaseId, Question};
use tracing::debug;

use crate::catalog::CatalogCache;
use crate::rules::KEYWORD_RULES;

/// 模糊匹配的默认接受阈值：最小编辑距离必须严格小于该值
pub const DEFAULT_FUZZY_THRESHOLD: usize = 10;

/// 变量到问题的映射器
#[derive(Debug, Clone, Copy)]
pub struct VariableMapper<'a> {
    catalog: &'a CatalogCache,
    fuzzy_threshold: usize,
}

impl<'a> VariableMapper<'a> {
    pub fn new(catalog: &'a CatalogCache) -> Self {
        Self {
            catalog,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, fuzzy_threshold: usize) -> Self {
        self.fuzzy_threshold = fuzzy_threshold;
        self
    }

    /// 映射为问题原文；无法解析时原样返回输入，由调用方在校验时剔除
    pub fn map_variable_to_question(&self, variable: &str, disease_id: DiseaseId) -> String {
        self.resolve(variable, disease_id)
            .map(|q| q.text.clone())
            .unwrap_or_else(|| variable.to_string())
    }

    /// 解析为该疾病下的具体问题
    pub fn resolve(&self, variable: &str, disease_id: DiseaseId) -> Option<&'a Question> {
        let normalized = normalize_phrase(variable);
        let questions = self.catalog.questions_for(disease_id);

        // 规则按表中顺序尝试，第一条既被触发又能找到目标问题的规则生效
        for rule in KEYWORD_RULES.iter().filter(|r| r.is_triggered_by(&normalized)) {
            if let Some(question) = questions.iter().find(|q| rule.targets_question(&q.text)) {
                debug!(variable, rule = rule.token, question_id = question.id, "Variable mapped by keyword rule");
                return Some(question);
            }
        }

        self.fuzzy_match(&normalized, questions)
    }

    fn fuzzy_match(&self, normalized: &str, questions: &'a [Question]) -> Option<&'a Question> {
        let mut best: Option<(&'a Question, usize)> = None;
        for question in questions {
            let d = distance(normalized, &question.text.to_lowercase());
            if best.map_or(true, |(_, min)| d < min) {
                best = Some((question, d));
            }
        }

        match best {
            Some((question, d)) if d < self.fuzzy_threshold => {
                debug!(normalized, distance = d, question_id = question.id, "Variable mapped by fuzzy match");
                Some(question)
            }
            _ => {
                debug!(normalized, "Variable left unresolved");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, *};
    use crate::rules::KEYWORD_RULES;

    #[test]
    fn test_vocabulary_maps_to_rule_targets() {
        let catalog = fixtures::catalog();
        let mapper = VariableMapper::new(&catalog);

        let cases = [
            ("age", 1, MALARIA_AGE),
            ("gender", 1, MALARIA_GENDER),
            ("climate change", 1, MALARIA_CLIMATE),
            ("health facility", 1, MALARIA_FACILITY),
            ("gender", 2, CHOLERA_GENDER),
            ("age", 2, CHOLERA_AGE),
            ("treated last year", 2, CHOLERA_TREATED),
            ("family size", 2, CHOLERA_FAMILY),
            ("weather conditions", 3, HEAT_WEATHER),
            ("prevention tips", 3, HEAT_TIPS),
            ("season", 3, HEAT_SEASON),
        ];
        for (variable, disease_id, expected) in cases {
            assert_eq!(mapper.map_variable_to_question(variable, disease_id), expected, "{}", variable);
        }
    }

    #[test]
    fn test_trigger_synonyms() {
        let catalog = fixtures::catalog();
        let mapper = VariableMapper::new(&catalog);

        assert_eq!(mapper.map_variable_to_question("Female", 1), MALARIA_GENDER);
        assert_eq!(mapper.map_variable_to_question("older people", 2), CHOLERA_AGE);
        assert_eq!(mapper.map_variable_to_question("dry months", 3), HEAT_SEASON);
        assert_eq!(mapper.map_variable_to_question("location", 1), MALARIA_FACILITY);
        assert_eq!(mapper.map_variable_to_question("four", 2), CHOLERA_FAMILY);
        assert_eq!(mapper.map_variable_to_question("household family", 2), CHOLERA_FAMILY);
    }

    #[test]
    fn test_climat_typo_is_corrected() {
        let catalog = fixtures::catalog();
        let mapper = VariableMapper::new(&catalog);
        assert_eq!(mapper.map_variable_to_question("Climat Change", 1), MALARIA_CLIMATE);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let catalog = fixtures::catalog();
        let mapper = VariableMapper::new(&catalog);

        // season 在规则表中先于 weather conditions
        assert_eq!(mapper.map_variable_to_question("season and weather conditions", 3), HEAT_SEASON);
    }

    #[test]
    fn test_rule_without_target_falls_through_to_next_rule() {
        let catalog = fixtures::catalog();
        let mapper = VariableMapper::new(&catalog);

        // Malaria 没有雨季问题，继续尝试后面的 health facility 规则
        assert_eq!(mapper.map_variable_to_question("rainy season near a health facility", 1), MALARIA_FACILITY);
    }

    #[test]
    fn test_fuzzy_fallback_for_close_phrasing() {
        let catalog = fixtures::catalog();
        let mapper = VariableMapper::new(&catalog);

        assert_eq!(mapper.map_variable_to_question("have you received prevention tip", 3), HEAT_TIPS);
        assert_eq!(mapper.map_variable_to_question("do you live near a health facilty", 1), MALARIA_FACILITY);
    }

    #[test]
    fn test_unresolved_variable_returned_unchanged() {
        let catalog = fixtures::catalog();
        let mapper = VariableMapper::new(&catalog);

        assert_eq!(mapper.map_variable_to_question("gender", 3), "gender");
        assert_eq!(mapper.map_variable_to_question("income", 1), "income");
        assert_eq!(mapper.map_variable_to_question("age", 99), "age");
        assert!(mapper.resolve("income", 1).is_none());
    }

    #[test]
    fn test_threshold_is_overridable() {
        let catalog = fixtures::catalog();
        let strict = VariableMapper::new(&catalog).with_threshold(1);
        assert!(strict.resolve("have you received prevention tip", 3).is_none());
    }

    #[test]
    fn test_rule_table_precedes_fuzzy_match() {
        let catalog = fixtures::catalog();
        let mapper = VariableMapper::new(&catalog);
        for rule in KEYWORD_RULES {
            // 每条规则至少在一个疾病下有目标问题
            assert!(
                catalog
                    .diseases()
                    .iter()
                    .any(|d| catalog.questions_for(d.id).iter().any(|q| rule.targets_question(&q.text))),
                "no fixture question for rule {}",
                rule.token
            );
            for disease in catalog.diseases() {
                let target = catalog
                    .questions_for(disease.id)
                    .iter()
                    .find(|q| rule.targets_question(&q.text));
                if let Some(target) = target {
                    assert_eq!(mapper.map_variable_to_question(rule.token, disease.id), target.text);
                }
            }
        }
    }
}
