//! 分かち書きの結果
//!
//! このモジュールは、選択された経路上の語を表現する型を提供します。
//! 語はラティス上の頂点への参照を保持し、表層形、品詞タグ、位置情報などへの
//! アクセスを提供します。

use std::iter::FusedIterator;
use std::ops::Range;

use crate::dictionary::{AbstractWord, LexType, WordIdx};
use crate::tokenizer::lattice::Vertex;
use crate::tokenizer::worker::Worker;

/// 分かち書きの結果の語
///
/// この語は[`Worker`]への軽量な参照であり、実際のデータは
/// Workerが保持しています。語はWorkerが生存している間のみ有効です。
///
/// 語からは以下の情報にアクセスできます：
/// - 表層形（元のテキスト中の文字列）
/// - 品詞タグ
/// - 文字位置およびバイト位置
/// - 単語コストおよび累積コスト
pub struct WordTerm<'w> {
    worker: &'w Worker,
    index: usize,
}

impl<'w> WordTerm<'w> {
    #[inline(always)]
    pub(crate) const fn new(worker: &'w Worker, index: usize) -> Self {
        Self { worker, index }
    }

    #[inline(always)]
    fn vertex(&self) -> &'w Vertex {
        let id = self.worker.path.ids()[self.index];
        self.worker.lattice.vertex(id)
    }

    /// 語の表層形（元のテキスト中の文字列）を取得します。
    ///
    /// 正規化前の文字列を返します。
    #[inline(always)]
    pub fn word(&self) -> &'w str {
        self.worker.sent.surface(self.vertex().range_char())
    }

    /// 語の品詞タグを取得します。
    #[inline(always)]
    pub fn tag(&self) -> &'w str {
        self.worker.tokenizer.lexicons().tag(self.word_idx())
    }

    /// 入力全体における語の開始位置（文字単位）を取得します。
    #[inline(always)]
    pub fn offset(&self) -> usize {
        self.worker.sent.base_char() + self.vertex().start
    }

    /// 入力全体における語の文字単位の位置範囲を取得します。
    #[inline(always)]
    pub fn range_char(&self) -> Range<usize> {
        let base = self.worker.sent.base_char();
        let v = self.vertex();
        base + v.start..base + v.end
    }

    /// 入力全体における語のバイト単位の位置範囲を取得します。
    #[inline(always)]
    pub fn range_byte(&self) -> Range<usize> {
        let sent = &self.worker.sent;
        let base = sent.base_byte();
        let v = self.vertex();
        base + sent.byte_position(v.start)..base + sent.byte_position(v.end)
    }

    /// 語の単語インデックスを取得します。
    #[inline(always)]
    pub fn word_idx(&self) -> WordIdx {
        self.vertex().word_idx
    }

    /// 語が由来する語彙の種類を取得します。
    #[inline(always)]
    pub fn lex_type(&self) -> LexType {
        self.word_idx().lex_type
    }

    /// 合成語であれば、その抽象語カテゴリを取得します。
    #[inline(always)]
    pub fn abstract_word(&self) -> Option<AbstractWord> {
        self.worker.tokenizer.lexicons().abstract_word(self.word_idx())
    }

    /// 語の単語コストを取得します。
    #[inline(always)]
    pub fn word_cost(&self) -> i32 {
        self.worker.path.word_cost(self.index)
    }

    /// 文頭からこの語までの累積コストを取得します。
    #[inline(always)]
    pub fn total_cost(&self) -> i32 {
        self.worker.path.total_cost_at(self.index)
    }

    /// 語が空白のみからなる場合に`true`を返します。
    #[inline(always)]
    pub fn is_whitespace(&self) -> bool {
        self.worker.sent.is_whitespace(self.vertex().range_char())
    }

    /// この語を所有型の[`WordTermBuf`]に変換します。
    pub fn to_buf(&self) -> WordTermBuf {
        WordTermBuf {
            word: self.word().to_string(),
            tag: self.tag().to_string(),
            offset: self.offset(),
            range_char: self.range_char(),
            range_byte: self.range_byte(),
            word_idx: self.word_idx(),
            lex_type: self.lex_type(),
            word_cost: self.word_cost(),
            total_cost: self.total_cost(),
        }
    }
}

impl std::fmt::Debug for WordTerm<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordTerm")
            .field("word", &self.word())
            .field("tag", &self.tag())
            .field("range_char", &self.range_char())
            .field("range_byte", &self.range_byte())
            .field("lex_type", &self.lex_type())
            .field("word_idx", &self.word_idx())
            .field("word_cost", &self.word_cost())
            .field("total_cost", &self.total_cost())
            .finish()
    }
}

/// 所有型の語
///
/// [`WordTerm`]の所有型版です。結果を保存したり、スレッド間で送信する際に使用します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTermBuf {
    /// 表層形
    pub word: String,
    /// 品詞タグ
    pub tag: String,
    /// 入力全体における開始位置（文字単位）
    pub offset: usize,
    pub range_char: Range<usize>,
    pub range_byte: Range<usize>,
    pub word_idx: WordIdx,
    pub lex_type: LexType,
    pub word_cost: i32,
    pub total_cost: i32,
}

/// 空白のみの語を除いて、選択された経路上の語を順に返すイテレータ
///
/// 除かれた語も経路上では消費されるため、返された語の範囲と除かれた空白の範囲を
/// 合わせると入力全体を覆います。
pub struct TermIter<'w> {
    worker: &'w Worker,
    front: usize,
    back: usize,
}

impl<'w> TermIter<'w> {
    #[inline(always)]
    pub(crate) fn new(worker: &'w Worker) -> Self {
        Self {
            worker,
            front: 0,
            back: worker.num_words(),
        }
    }
}

impl<'w> Iterator for TermIter<'w> {
    type Item = WordTerm<'w>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let t = WordTerm::new(self.worker, self.front);
            self.front += 1;
            if !t.is_whitespace() {
                return Some(t);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.back - self.front))
    }
}

impl DoubleEndedIterator for TermIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            self.back -= 1;
            let t = WordTerm::new(self.worker, self.back);
            if !t.is_whitespace() {
                return Some(t);
            }
        }
        None
    }
}

impl FusedIterator for TermIter<'_> {}

#[cfg(test)]
mod tests {
    use crate::dictionary::{DictionaryBuilder, LexType};
    use crate::tokenizer::Tokenizer;

    fn tokenizer() -> Tokenizer {
        let mut b = DictionaryBuilder::new();
        b.extend([("你好", 8.0, "l"), ("世界", 8.0, "n")]);
        Tokenizer::new(b.build().unwrap().0).unwrap()
    }

    #[test]
    fn test_drop_whitespace() {
        let mut worker = tokenizer().new_worker();
        worker.reset_sentence("a b");
        worker.tokenize().unwrap();

        assert_eq!(worker.num_words(), 3);
        assert!(worker.term(1).is_whitespace());
        let terms: Vec<_> = worker
            .term_iter()
            .map(|t| (t.word().to_string(), t.offset()))
            .collect();
        assert_eq!(terms, vec![("a".to_string(), 0), ("b".to_string(), 2)]);
    }

    #[test]
    fn test_restartable_and_reversible() {
        let mut worker = tokenizer().new_worker();
        worker.reset_sentence("你好 世界");
        worker.tokenize().unwrap();

        let forward: Vec<_> = worker.term_iter().map(|t| t.word()).collect();
        assert_eq!(forward, vec!["你好", "世界"]);
        assert_eq!(worker.term_iter().count(), 2);
        let backward: Vec<_> = worker.term_iter().rev().map(|t| t.word()).collect();
        assert_eq!(backward, vec!["世界", "你好"]);
    }

    #[test]
    fn test_fields() {
        let mut worker = tokenizer().new_worker();
        worker.reset_sentence("你好，世界");
        worker.tokenize().unwrap();

        let terms: Vec<_> = worker.term_iter().map(|t| t.to_buf()).collect();
        assert_eq!(terms.len(), 3);

        assert_eq!(terms[0].word, "你好");
        assert_eq!(terms[0].tag, "l");
        assert_eq!(terms[0].range_byte, 0..6);
        assert_eq!(terms[0].lex_type, LexType::System);

        assert_eq!(terms[1].word, "，");
        assert_eq!(terms[1].tag, "w");
        assert_eq!(terms[1].lex_type, LexType::Unknown);
        assert_eq!(terms[1].range_char, 2..3);

        assert_eq!(terms[2].offset, 3);
        assert_eq!(terms[2].total_cost, worker.wordpath().total_cost());
        assert_eq!(
            terms.iter().map(|t| t.word_cost).sum::<i32>(),
            terms[2].total_cost
        );
        assert!(format!("{:?}", worker.term(0)).contains("你好"));
    }
}
