use polysearch_core::segment::{JiebaSegmenter, Segmenter};
use polysearch_core::tokenizer::{Stopwords, Tokenizer};
use polysearch_core::Language;
use std::sync::Arc;

fn jieba_tokenizer() -> Tokenizer {
    Tokenizer::new(Arc::new(JiebaSegmenter::new()), Stopwords::builtin())
}

#[test]
fn it_is_deterministic() {
    let t = jieba_tokenizer();
    let text = "我们正在研究自然语言处理和机器学习。Rust makes search engines fast!";
    for lang in [Language::Zh, Language::En] {
        assert_eq!(t.tokenize(text, lang), t.tokenize(text, lang));
    }
}

#[test]
fn it_filters_stopwords() {
    let toks = jieba_tokenizer().tokenize("The quick brown fox and the lazy dog", Language::En);
    assert!(!toks.contains(&"the".to_string()));
    assert!(!toks.contains(&"and".to_string()));
    assert!(toks.contains(&"quick".to_string()));
}

#[test]
fn it_normalizes_full_width_latin() {
    let toks = jieba_tokenizer().tokenize("ＲＵＳＴ ｃｏｍｐｉｌｅｒ", Language::En);
    assert_eq!(toks, vec!["rust", "compiler"]);
}

#[test]
fn jieba_pieces_cover_the_input() {
    let text = "机器学习 AND 深度学习，很好！";
    assert_eq!(JiebaSegmenter::new().segment(text).concat(), text);
}

#[test]
fn chinese_tokens_have_at_least_two_chars() {
    let toks = jieba_tokenizer().tokenize("我爱北京天安门，天安门上太阳升。", Language::Zh);
    assert!(!toks.is_empty());
    assert!(toks.iter().all(|t| t.chars().count() >= 2));
    assert!(toks.contains(&"天安门".to_string()));
}
