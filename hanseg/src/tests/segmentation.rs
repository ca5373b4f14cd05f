//! 分かち書き全体の性質に関するテスト

use crate::dictionary::{AbstractWord, DictionaryBuilder, LexType};
use crate::errors::HansegError;
use crate::tokenizer::Tokenizer;
use crate::tokenizer::config::{EntityRecognition, TokenizerConfig};
use crate::tokenizer::pipeline::Pipeline;
use crate::tokenizer::scorer::Scorer;
use crate::tokenizer::worker::Worker;

use super::{custom_dict, shared_dict};

/// 重みをそのままコストとして使うスコアラー
struct WeightAsCost;

impl Scorer for WeightAsCost {
    fn word_cost(&self, weight: f32) -> i32 {
        weight as i32
    }
}

fn tokenizer_with(entries: &[(&str, f32, &str)]) -> Tokenizer {
    let mut builder = DictionaryBuilder::new();
    builder.extend(entries.iter().copied());
    Tokenizer::new(builder.build().unwrap().0).unwrap()
}

fn words(worker: &Worker) -> Vec<&str> {
    worker.term_iter().map(|t| t.word()).collect()
}

/// 経路が隙間なく重ならずに入力全体を覆っていることを確かめます。
fn assert_covering(worker: &Worker, input: &str) {
    let mut pos = 0;
    let mut surface = String::new();
    for i in 0..worker.num_words() {
        let t = worker.term(i);
        assert_eq!(t.range_char().start, pos, "gap or overlap before {t:?}");
        assert!(t.range_char().end > pos);
        pos = t.range_char().end;
        surface.push_str(t.word());
    }
    assert_eq!(pos, input.chars().count());
    assert_eq!(surface, input);
}

#[test]
fn test_path_example() {
    let tokenizer = tokenizer_with(&[("北京", 8.0, "ns"), ("北京大学", 9.0, "nt"), ("大学", 8.0, "n")]);
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("北京大学生");
    worker.tokenize().unwrap();

    let ranges: Vec<_> = worker.term_iter().map(|t| t.range_char()).collect();
    assert_eq!(ranges, vec![0..4, 4..5]);
    assert_eq!(words(&worker), vec!["北京大学", "生"]);

    // 北京大学: 55, 生: 955 (北京 + 大学 + 生 would be 155 + 155 + 955)
    assert_eq!(worker.wordpath().total_cost(), 1010);
    assert_eq!(worker.term(1).abstract_word(), Some(AbstractWord::Unknown));
}

#[test]
fn test_minimum_cost_is_not_greedy() {
    let tokenizer = Tokenizer::from_shared_dictionary(shared_dict()).unwrap();
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("北京大学生");
    worker.tokenize().unwrap();

    // 北京 + 大学生 (340 + 390) beats 北京大学 + 生 (240 + 1140).
    assert_eq!(words(&worker), vec!["北京", "大学生"]);
    assert_eq!(worker.wordpath().total_cost(), 730);

    let lattice = worker.lattice();
    let hits: Vec<_> = lattice
        .vertices()
        .filter(|(_, v)| v.word_idx.lex_type == LexType::System)
        .map(|(_, v)| (v.start, v.end))
        .collect();
    assert_eq!(hits, vec![(0, 2), (0, 4), (2, 4), (2, 5), (3, 5)]);
}

#[test]
fn test_tie_break_fewer_words() {
    let tokenizer = tokenizer_with(&[("甲乙", 20.0, "x"), ("甲", 10.0, "x"), ("乙", 10.0, "x")])
        .scorer(WeightAsCost);
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("甲乙");
    worker.tokenize().unwrap();
    assert_eq!(words(&worker), vec!["甲乙"]);
    assert_eq!(worker.wordpath().total_cost(), 20);
}

#[test]
fn test_tie_break_enumeration_order() {
    let tokenizer = tokenizer_with(&[
        ("甲乙", 20.0, "x"),
        ("甲", 10.0, "x"),
        ("乙丙", 20.0, "x"),
        ("丙", 10.0, "x"),
    ])
    .scorer(WeightAsCost);
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("甲乙丙");
    worker.tokenize().unwrap();

    // Both paths cost 30 with two words; 乙丙 starts earlier than 丙.
    assert_eq!(words(&worker), vec!["甲", "乙丙"]);
}

#[test]
fn test_whitespace_dropping() {
    let tokenizer = tokenizer_with(&[("a", 5.0, "x"), ("b", 5.0, "x")]);
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("a b");
    worker.tokenize().unwrap();

    assert_covering(&worker, "a b");
    let terms: Vec<_> = worker.term_iter().map(|t| (t.word(), t.offset())).collect();
    assert_eq!(terms, vec![("a", 0), ("b", 2)]);
    assert_eq!(worker.term(1).tag(), "w");
}

#[test]
fn test_empty_input() {
    let tokenizer = Tokenizer::from_shared_dictionary(shared_dict()).unwrap();
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("");
    worker.tokenize().unwrap();
    assert_eq!(worker.num_words(), 0);
    assert_eq!(worker.term_iter().count(), 0);
    assert!(worker.lattice().is_empty());
    assert!(tokenizer.segment("").unwrap().is_empty());
}

#[test]
fn test_coverage() {
    let tokenizer = Tokenizer::from_shared_dictionary(shared_dict()).unwrap();
    let mut worker = tokenizer.new_worker();
    for input in [
        "我在北京大学工作。",
        "联系 me@x.com 或 https://example.com/a?b=1 。",
        "买了3个iPhone15，花了9999.5元",
        "　全角　空白　",
        "南京市长江大桥",
        "x",
        "  ",
    ] {
        worker.reset_sentence(input);
        worker.tokenize().unwrap();
        assert!(worker.lattice().is_covered(), "{input}");
        assert_covering(&worker, input);
        assert!(worker.term_iter().all(|t| !t.is_whitespace()));
    }
}

#[test]
fn test_coverage_with_all_stages() {
    let config = TokenizerConfig::new()
        .entity_recognition(EntityRecognition::all())
        .custom_dictionary(custom_dict(&[("长江大桥", 1.0, "nz"), ("ＡＢ公司", 1.0, "nt")]))
        .unwrap();
    let tokenizer = Tokenizer::with_config(shared_dict(), config).unwrap();
    assert_eq!(tokenizer.stages().names().count(), 8);

    let mut worker = tokenizer.new_worker();
    for input in [
        "王小明在南京市长江大桥联系 me@x.com",
        "南京市长江大桥",
        "阿里巴巴公司的王小明去杭州市买了3个iPhone15",
        "张伟在ab公司，李娜在杭州市长江大桥旁工作",
        "三百个人在长江大桥上",
        "　",
    ] {
        worker.reset_sentence(input);
        worker.tokenize().unwrap();
        assert!(worker.lattice().is_covered(), "{input}");
        assert_covering(&worker, input);

        for word in ["长江大桥", "ab公司"] {
            if !input.contains(word) {
                continue;
            }
            assert!(
                worker
                    .term_iter()
                    .any(|t| t.word() == word && t.lex_type() == LexType::User),
                "{word} in {input}: {:?}",
                words(&worker)
            );
        }
    }
}

#[test]
fn test_determinism() {
    let tokenizer = Tokenizer::from_shared_dictionary(shared_dict()).unwrap();
    let input = "我在南京市长江大桥买了3个人的大学生工作";

    let mut w1 = tokenizer.new_worker();
    w1.reset_sentence(input);
    w1.tokenize().unwrap();
    let first: Vec<_> = w1.term_iter().map(|t| t.to_buf()).collect();

    // Reusing a worker gives the same result as a fresh one.
    w1.reset_sentence("北京");
    w1.tokenize().unwrap();
    w1.reset_sentence(input);
    w1.tokenize().unwrap();
    let again: Vec<_> = w1.term_iter().map(|t| t.to_buf()).collect();

    let mut w2 = tokenizer.clone().new_worker();
    w2.reset_sentence(input);
    w2.tokenize().unwrap();
    let other: Vec<_> = w2.term_iter().map(|t| t.to_buf()).collect();

    assert_eq!(first, again);
    assert_eq!(first, other);
    assert_eq!(first, tokenizer.segment(input).unwrap());
}

#[test]
fn test_full_width_surface() {
    let tokenizer = Tokenizer::from_shared_dictionary(shared_dict()).unwrap();
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("我在ＡＢＣ公司");
    worker.tokenize().unwrap();

    let terms: Vec<_> = worker
        .term_iter()
        .map(|t| (t.word(), t.tag(), t.range_byte()))
        .collect();
    assert_eq!(
        terms,
        vec![
            ("我", "r", 0..3),
            ("在", "p", 3..6),
            ("ＡＢＣ", "nx", 6..15),
            ("公司", "n", 15..21),
        ]
    );
}

#[test]
fn test_reset_sentence_range() {
    let tokenizer = Tokenizer::from_shared_dictionary(shared_dict()).unwrap();
    let mut worker = tokenizer.new_worker();
    let input = "我在北京大学工作";
    worker.reset_sentence_range(input, 2..6).unwrap();
    worker.tokenize().unwrap();

    let terms: Vec<_> = worker.term_iter().map(|t| t.to_buf()).collect();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].word, "北京大学");
    assert_eq!(terms[0].offset, 2);
    assert_eq!(terms[0].range_char, 2..6);
    assert_eq!(&input[terms[0].range_byte.clone()], "北京大学");

    assert!(matches!(
        worker.reset_sentence_range(input, 6..9),
        Err(HansegError::InvalidArgument(_))
    ));
}

#[test]
fn test_without_stages() {
    let tokenizer = Tokenizer::from_shared_dictionary(shared_dict())
        .unwrap()
        .pipeline(Pipeline::default());
    let mut worker = tokenizer.new_worker();
    worker.reset_sentence("3个");
    worker.tokenize().unwrap();
    let terms: Vec<_> = worker.term_iter().map(|t| (t.word(), t.tag())).collect();
    assert_eq!(terms, vec![("3", "m"), ("个", "q")]);
}
