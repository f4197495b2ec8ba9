use crate::language::Language;

const ELLIPSIS: &str = "...";

/// First sentence of `content` mentioning any of `terms`, else the whole
/// content, cut to `max_length` chars.
pub fn snippet(content: &str, terms: &[String], language: Language, max_length: usize) -> String {
    let chosen = match language {
        Language::Zh => content
            .split(['。', '！', '？'])
            .find(|s| terms.iter().any(|t| s.contains(t.as_str()))),
        Language::En => {
            let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
            content
                .split(['.', '!', '?'])
                .find(|s| {
                    let s = s.to_lowercase();
                    lowered.iter().any(|t| s.contains(t.as_str()))
                })
        }
    };
    truncate(chosen.map(str::trim).unwrap_or(content), max_length)
}

pub fn truncate(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_matching_sentence() {
        let content = "Birds fly. The Falcon dives fast! Owls hunt at night.";
        let s = snippet(content, &["falcon".into()], Language::En, 200);
        assert_eq!(s, "The Falcon dives fast");
    }

    #[test]
    fn chinese_uses_chinese_terminators() {
        let content = "今天天气很好。人工智能发展迅速！我们很高兴。";
        let s = snippet(content, &["人工智能".into()], Language::Zh, 200);
        assert_eq!(s, "人工智能发展迅速");
    }

    #[test]
    fn falls_back_to_content_and_truncates_by_chars() {
        let content = "没有匹配的句子在这里";
        assert_eq!(snippet(content, &["机器".into()], Language::Zh, 4), "没有匹配...");
        assert_eq!(truncate("short", 10), "short");
    }
}
