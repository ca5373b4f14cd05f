//! 分かち書き処理のためのルーチンを提供するモジュール。
//!
//! ワーカーは内部データ構造を保持し、再利用することで不要なメモリアロケーションを避けます。
use std::ops::Range;

use crate::errors::{HansegError, Result};
use crate::sentence::Sentence;
use crate::term::{TermIter, WordTerm};
use crate::tokenizer::Tokenizer;
use crate::tokenizer::lattice::Lattice;
use crate::tokenizer::path::{PathSelector, Wordpath};

/// 分かち書き処理のためのルーチンを提供する構造体。
///
/// 解析に使用される内部データ構造を保持し、それらを再利用することで
/// 不要なメモリ再割り当てを回避します。ワーカーはスレッド間で共有せず、
/// スレッドごとに[`Tokenizer::new_worker`]で作成してください。
///
/// # 例
///
/// ```
/// use hanseg::dictionary::DictionaryBuilder;
/// use hanseg::Tokenizer;
///
/// let mut builder = DictionaryBuilder::new();
/// builder.push("你好", 5.0, "l");
/// let (dict, _) = builder.build()?;
/// let tokenizer = Tokenizer::new(dict)?;
///
/// let mut worker = tokenizer.new_worker();
/// worker.reset_sentence("你好 世界");
/// worker.tokenize()?;
///
/// for term in worker.term_iter() {
///     println!("{}/{}", term.word(), term.tag());
/// }
/// assert_eq!(worker.num_words(), 4);
/// assert_eq!(worker.term_iter().count(), 3);
/// # Ok::<(), hanseg::errors::HansegError>(())
/// ```
pub struct Worker {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) sent: Sentence,
    pub(crate) lattice: Lattice,
    pub(crate) selector: PathSelector,
    pub(crate) path: Wordpath,
}

impl Worker {
    pub(crate) fn new(tokenizer: Tokenizer) -> Self {
        let selector = PathSelector::new(tokenizer.selected_algorithm());
        Self {
            tokenizer,
            sent: Sentence::new(),
            lattice: Lattice::default(),
            selector,
            path: Wordpath::new(),
        }
    }

    /// 解析する入力文をリセットします。
    ///
    /// 新しい文を設定し、以前の解析結果をクリアします。
    pub fn reset_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.sent.clear();
        self.path.clear();
        let input = input.as_ref();
        if !input.is_empty() {
            self.sent.set_sentence(input);
            self.sent.compile(self.tokenizer.char_normalizer());
        }
    }

    /// 入力文の一部（文字単位の範囲）を解析対象として設定します。
    ///
    /// 解析結果のオフセットは、範囲の先頭からではなく`input`全体での位置になります。
    ///
    /// # エラー
    ///
    /// 範囲が`input`の文字数を超える場合や、`start > end`の場合、
    /// [`HansegError::InvalidArgument`]が返されます。
    pub fn reset_sentence_range<S>(&mut self, input: S, range: Range<usize>) -> Result<()>
    where
        S: AsRef<str>,
    {
        let input = input.as_ref();
        let len_char = input.chars().count();
        if range.start > range.end || range.end > len_char {
            return Err(HansegError::invalid_argument(
                "range",
                format!("{range:?} is out of the input with {len_char} chars"),
            ));
        }
        let byte_at = |pos: usize| {
            input
                .char_indices()
                .nth(pos)
                .map_or(input.len(), |(b, _)| b)
        };
        let begin_byte = byte_at(range.start);
        let end_byte = byte_at(range.end);

        self.reset_sentence(&input[begin_byte..end_byte]);
        self.sent.set_base(range.start, begin_byte);
        Ok(())
    }

    /// 設定された入力文を分かち書きします。
    ///
    /// 結果は内部状態に保存され、[`term_iter()`](Self::term_iter)や
    /// [`term()`](Self::term)でアクセスできます。空の文が設定されている場合は何も行いません。
    ///
    /// # エラー
    ///
    /// ステージがラティスの被覆を壊し、文末に到達する経路が存在しない場合、
    /// [`HansegError::LatticeUnreachable`]が返されます。
    pub fn tokenize(&mut self) -> Result<()> {
        self.path.clear();
        if self.sent.chars().is_empty() {
            self.lattice.reset(0);
            return Ok(());
        }
        self.tokenizer.build_lattice(&self.sent, &mut self.lattice);
        self.selector.select(
            &self.lattice,
            self.tokenizer.lexicons(),
            self.tokenizer.scorer_ref(),
            &mut self.path,
        )
    }

    /// 選択された経路の語数を取得します。空白のみの語も含みます。
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.path.len()
    }

    /// 経路上の`i`番目の語を取得します。
    ///
    /// [`term_iter()`](Self::term_iter)とは異なり、空白のみの語も数えます。
    ///
    /// # パニック
    ///
    /// `i`が[`num_words()`](Self::num_words)以上の場合、パニックします。
    #[inline(always)]
    pub fn term<'w>(&'w self, i: usize) -> WordTerm<'w> {
        assert!(i < self.num_words(), "index {i} out of {} words", self.num_words());
        WordTerm::new(self, i)
    }

    /// 空白のみの語を除いた語のイテレータを作成します。
    ///
    /// 呼び出すたびに先頭から走査する新しいイテレータを返します。
    #[inline(always)]
    pub fn term_iter<'w>(&'w self) -> TermIter<'w> {
        TermIter::new(self)
    }

    /// 選択された経路
    #[inline(always)]
    pub fn wordpath(&self) -> &Wordpath {
        &self.path
    }

    /// 直前の解析で構築されたラティス
    #[inline(always)]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// 現在の入力文
    #[inline(always)]
    pub fn sentence(&self) -> &Sentence {
        &self.sent
    }

    /// ワーカーを作成したトークナイザー
    #[inline(always)]
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }
}
