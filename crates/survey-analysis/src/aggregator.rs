//! 答复聚合
//!
//! 把原始答复归约为图表数据：每个（问题，选项）一个系列，每个疾病一个数据点。
//! 问题按请求顺序从调色板取基色，选项在基色上做明暗变化。全零系列会被剔除。

use std::collections::HashMap;

use survey_core::{
    ChartDataset, ChartSeries, Choice, ChoiceId, DiseaseId, QuestionId, ResponseRecord, Rgb,
};
use tracing::debug;

use crate::catalog::CatalogCache;

/// 问题基色调色板，按问题序号循环使用
pub const PALETTE: [Rgb; 6] = [
    Rgb::new(0x19, 0x76, 0xd2),
    Rgb::new(0x9c, 0x27, 0xb0),
    Rgb::new(0x2e, 0x7d, 0x32),
    Rgb::new(0xd3, 0x2f, 0x2f),
    Rgb::new(0xed, 0x6c, 0x02),
    Rgb::new(0x02, 0x88, 0xd1),
];

/// 选项变体的明暗幅度（百分比）
pub const SHADE_PERCENT: i32 = 20;

pub const BORDER_WIDTH: u32 = 1;

pub fn question_color(question_index: usize) -> Rgb {
    PALETTE[question_index % PALETTE.len()]
}

/// 第一个选项变暗，第二个选项变亮，其余沿用基色
pub fn choice_color(base: Rgb, choice_index: usize) -> Rgb {
    match choice_index {
        0 => base.shift(-SHADE_PERCENT),
        1 => base.shift(SHADE_PERCENT),
        _ => base,
    }
}

/// 答复聚合器
#[derive(Debug, Clone, Copy)]
pub struct ResponseAggregator<'a> {
    catalog: &'a CatalogCache,
}

impl<'a> ResponseAggregator<'a> {
    pub fn new(catalog: &'a CatalogCache) -> Self {
        Self { catalog }
    }

    pub fn aggregate(
        &self,
        disease_ids: &[DiseaseId],
        question_ids: &[QuestionId],
        responses: &[ResponseRecord],
        choices_by_question: &HashMap<QuestionId, Vec<Choice>>,
    ) -> ChartDataset {
        let labels: Vec<String> = disease_ids
            .iter()
            .map(|id| {
                self.catalog
                    .disease(*id)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| format!("Disease {}", id))
            })
            .collect();

        let mut counts: HashMap<(DiseaseId, QuestionId, ChoiceId), u64> = HashMap::new();
        for r in responses {
            *counts.entry((r.disease_id, r.question_id, r.choice_id)).or_insert(0) += 1;
        }

        let mut question_texts = Vec::with_capacity(question_ids.len());
        let mut series = Vec::new();

        for (q_index, question_id) in question_ids.iter().enumerate() {
            let question_text = self
                .catalog
                .question(*question_id)
                .map(|q| q.text.clone())
                .unwrap_or_else(|| format!("Question {}", question_id));

            let choices = match choices_by_question.get(question_id) {
                Some(stored) if !stored.is_empty() => stored.clone(),
                _ => Choice::default_set(*question_id),
            };

            let base = question_color(q_index);

            for (c_index, choice) in choices.iter().enumerate() {
                let values = disease_ids
                    .iter()
                    .map(|d| counts.get(&(*d, *question_id, choice.id)).copied().unwrap_or(0))
                    .collect();

                series.push(ChartSeries {
                    label: format!("{}: {}", question_text, choice.text),
                    values,
                    color: choice_color(base, c_index),
                    question: question_text.clone(),
                    border_width: BORDER_WIDTH,
                });
            }

            question_texts.push(question_text);
        }

        let total = series.len();
        series.retain(|s| !s.is_all_zero());
        debug!("Aggregated {} series ({} pruned as all-zero)", series.len(), total - series.len());

        ChartDataset {
            labels,
            series,
            question_texts,
        }
    }
}
