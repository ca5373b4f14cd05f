//! 辞書エントリと単語識別子
//!
//! このモジュールは、辞書に登録される単語エントリと、
//! ラティス上の頂点から単語を引くための識別子を提供します。

/// 単語が由来する語彙の種類
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LexType {
    /// システム辞書
    #[default]
    System,
    /// カスタム辞書
    User,
    /// 辞書に存在しない合成語（抽象語カテゴリ）
    Unknown,
}

/// 単語識別子
///
/// `lex_type`が[`LexType::Unknown`]の場合、`word_id`は
/// [`AbstractWord`](crate::dictionary::AbstractWord)のIDを表します。
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct WordIdx {
    /// 語彙の種類
    pub lex_type: LexType,

    /// 語彙内でのID
    pub word_id: u32,
}

impl Default for WordIdx {
    fn default() -> Self {
        Self::new(LexType::System, u32::MAX)
    }
}

impl WordIdx {
    #[inline(always)]
    pub const fn new(lex_type: LexType, word_id: u32) -> Self {
        Self { lex_type, word_id }
    }
}

/// 辞書エントリ
///
/// 辞書の構築後は変更されません。
#[derive(Clone, Debug, PartialEq)]
pub struct DictionaryEntry {
    pub(crate) word: String,
    pub(crate) weight: f32,
    pub(crate) tag: String,
    pub(crate) index: u32,
}

impl DictionaryEntry {
    /// 表層形
    #[inline(always)]
    pub fn word(&self) -> &str {
        &self.word
    }

    /// 重み（対数頻度）。大きいほど出現しやすい単語です。
    #[inline(always)]
    pub const fn weight(&self) -> f32 {
        self.weight
    }

    /// 品詞タグ
    #[inline(always)]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// 辞書内での序数
    #[inline(always)]
    pub const fn index(&self) -> u32 {
        self.index
    }
}
