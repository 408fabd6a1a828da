//! 通用工具函数

use std::sync::OnceLock;

use regex::Regex;

/// 编辑距离：插入、删除、替换单个字符的最少次数。
///
/// 按字符（而非字节）计算；大小写规范化由调用方负责。
pub fn distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

fn climat_typo() -> &'static Regex {
    static CLIMAT: OnceLock<Regex> = OnceLock::new();
    CLIMAT.get_or_init(|| Regex::new(r"\bclimat\b").expect("static regex"))
}

/// 规范化用户短语：转小写，并把常见拼写错误 "climat" 纠正为 "climate"
pub fn normalize_phrase(text: &str) -> String {
    let lower = text.to_lowercase();
    climat_typo().replace_all(&lower, "climate").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_basic() {
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("", "abc"), 3);
        assert_eq!(distance("abc", ""), 3);
        assert_eq!(distance("", ""), 0);
    }

    #[test]
    fn test_distance_identity_and_symmetry() {
        let samples = ["", "age", "gender", "climate change", "Are you Male or Female?", "héllo"];
        for a in samples {
            assert_eq!(distance(a, a), 0);
            for b in samples {
                assert_eq!(distance(a, b), distance(b, a));
            }
        }
        assert_eq!(distance("", "héllo"), 5);
    }

    #[test]
    fn test_normalize_phrase() {
        assert_eq!(normalize_phrase("Climat Change"), "climate change");
        assert_eq!(normalize_phrase("climate change"), "climate change");
        assert_eq!(normalize_phrase("cholera vs climat"), "cholera vs climate");
        assert_eq!(normalize_phrase("GENDER"), "gender");
    }
}
