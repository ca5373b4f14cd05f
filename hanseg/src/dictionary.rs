//! 辞書データ構造とビルダー
//!
//! このモジュールは、分かち書きに用いる辞書を提供します。
//! 辞書は一度構築されると不変であり、`Arc`を通じて複数のスレッドから
//! ロックなしで同時に読み取ることができます。
//!
//! # 主要な型
//!
//! - [`Dictionary`]: 接頭辞インデックス、走査器、エントリ表をまとめた辞書
//! - [`DictionaryBuilder`]: `(単語, 重み, タグ)`の組やCSVから辞書を構築するビルダー
//! - [`PrefixIndex`]: 圧縮トライによる接頭辞インデックス
//! - [`Scanner`]: Aho–Corasick法による多パターン走査器
mod builder;
mod entry;
mod posting;
mod scanner;
mod trie;
mod unknown;

use std::fmt;
use std::sync::Arc;

use crate::dictionary::posting::Postings;
use crate::normalize::CharNormalizer;
use crate::utils::FromU32;

pub use crate::dictionary::builder::DictionaryBuilder;
pub use crate::dictionary::entry::{DictionaryEntry, LexType, WordIdx};
pub use crate::dictionary::scanner::{Hit, Scanner};
pub use crate::dictionary::trie::{CommonPrefixIter, Iter, PrefixIndex};
pub use crate::dictionary::unknown::{AbstractWord, UnkEntry, UnkHandler};

/// 分かち書き用の辞書
///
/// [`DictionaryBuilder`]によって構築されます。
/// 照合キーは構築時の正規化器で正規化済みです。
pub struct Dictionary {
    pub(crate) index: PrefixIndex<u32>,
    pub(crate) scanner: Scanner<u32>,
    pub(crate) postings: Postings,
    pub(crate) entries: Vec<DictionaryEntry>,
    pub(crate) unk_handler: UnkHandler,
    pub(crate) lex_type: LexType,
    pub(crate) log_total: f32,
    pub(crate) normalizer: Arc<dyn CharNormalizer>,
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("lex_type", &self.lex_type)
            .field("len", &self.entries.len())
            .field("log_total", &self.log_total)
            .finish_non_exhaustive()
    }
}

impl Dictionary {
    /// エントリ数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// エントリが1つもない場合に`true`を返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 辞書の種類
    #[inline(always)]
    pub const fn lex_type(&self) -> LexType {
        self.lex_type
    }

    /// 全エントリの重みの対数和 `ln Σ exp(weight)`
    ///
    /// 重みを対数頻度とみなしたときの総頻度の対数で、コスト計算の基準になります。
    #[inline(always)]
    pub const fn log_total(&self) -> f32 {
        self.log_total
    }

    #[inline(always)]
    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    #[inline(always)]
    pub fn entry(&self, id: u32) -> Option<&DictionaryEntry> {
        self.entries.get(usize::from_u32(id))
    }

    /// 単語に完全一致するエントリを列挙します。
    ///
    /// 同じ単語に異なるタグのエントリがある場合はすべて返されます。
    /// `word`は辞書の正規化器で正規化してから照合されます。
    pub fn lookup<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a DictionaryEntry> + 'a {
        let key: String = word
            .chars()
            .map(|c| self.normalizer.normalize_char(c))
            .collect();
        self.index
            .get(&key)
            .into_iter()
            .flat_map(move |&offset| self.postings.ids(usize::from_u32(offset)))
            .map(move |id| &self.entries[usize::from_u32(id)])
    }

    /// 単語とポスティング位置の対応を保持する接頭辞インデックス
    #[inline(always)]
    pub fn prefix_index(&self) -> &PrefixIndex<u32> {
        &self.index
    }

    /// 抽象語カテゴリの表
    #[inline(always)]
    pub fn unk_handler(&self) -> &UnkHandler {
        &self.unk_handler
    }

    /// 照合キーの正規化器
    #[inline(always)]
    pub fn normalizer(&self) -> &Arc<dyn CharNormalizer> {
        &self.normalizer
    }

    /// `input`の先頭から始まるすべての辞書語を、短い順に列挙します。
    ///
    /// `input`は正規化済みの文字列として扱われます。
    pub fn common_prefix_iterator<'a>(
        &'a self,
        input: &'a [char],
    ) -> impl Iterator<Item = LexMatch> + 'a {
        self.index
            .common_prefix_iterator(input)
            .flat_map(move |(end, &offset)| {
                self.postings
                    .ids(usize::from_u32(offset))
                    .map(move |id| self.lex_match(0, end, id))
            })
    }

    /// `input`中のすべての辞書語の出現を列挙します。
    ///
    /// 結果は開始位置、終了位置、エントリIDの昇順に並びます。
    /// `input`は正規化済みの文字列として扱われます。
    pub fn scan(&self, input: &[char]) -> Vec<LexMatch> {
        let hits = self.scanner.scan(input);
        let mut matches = Vec::with_capacity(hits.len());
        for hit in hits {
            for id in self.postings.ids(usize::from_u32(hit.value)) {
                matches.push(self.lex_match(hit.begin, hit.end, id));
            }
        }
        matches
    }

    #[inline(always)]
    fn lex_match(&self, begin: usize, end: usize, id: u32) -> LexMatch {
        LexMatch {
            begin,
            end,
            word_idx: WordIdx::new(self.lex_type, id),
            weight: self.entries[usize::from_u32(id)].weight,
        }
    }
}

/// 辞書語の一致
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LexMatch {
    pub begin: usize,
    pub end: usize,
    pub word_idx: WordIdx,
    pub weight: f32,
}

/// システム辞書とカスタム辞書への読み取り専用ビュー
///
/// [`WordIdx`]から単語のタグや重みを解決するために使用します。
#[derive(Clone, Copy)]
pub struct Lexicons<'a> {
    system: &'a Dictionary,
    user: Option<&'a Dictionary>,
}

impl<'a> Lexicons<'a> {
    pub const fn new(system: &'a Dictionary, user: Option<&'a Dictionary>) -> Self {
        Self { system, user }
    }

    #[inline(always)]
    pub const fn system(&self) -> &'a Dictionary {
        self.system
    }

    #[inline(always)]
    pub const fn user(&self) -> Option<&'a Dictionary> {
        self.user
    }

    #[inline(always)]
    pub fn unk_handler(&self) -> &'a UnkHandler {
        &self.system.unk_handler
    }

    /// 辞書エントリを返します。合成語の場合は`None`です。
    #[inline]
    pub fn entry(&self, word_idx: WordIdx) -> Option<&'a DictionaryEntry> {
        match word_idx.lex_type {
            LexType::System => self.system.entry(word_idx.word_id),
            LexType::User => self.user.and_then(|d| d.entry(word_idx.word_id)),
            LexType::Unknown => None,
        }
    }

    /// 合成語のカテゴリを返します。辞書語の場合は`None`です。
    #[inline]
    pub fn abstract_word(&self, word_idx: WordIdx) -> Option<AbstractWord> {
        match word_idx.lex_type {
            LexType::Unknown => AbstractWord::from_id(word_idx.word_id),
            _ => None,
        }
    }

    /// 品詞タグを返します。
    pub fn tag(&self, word_idx: WordIdx) -> &'a str {
        if let Some(e) = self.entry(word_idx) {
            return e.tag();
        }
        let word = self.abstract_word(word_idx).unwrap_or(AbstractWord::Unknown);
        self.unk_handler().tag(word)
    }

    /// 辞書上の重みを返します。
    pub fn weight(&self, word_idx: WordIdx) -> f32 {
        if let Some(e) = self.entry(word_idx) {
            return e.weight();
        }
        let word = self.abstract_word(word_idx).unwrap_or(AbstractWord::Unknown);
        self.unk_handler().weight(word)
    }
}
