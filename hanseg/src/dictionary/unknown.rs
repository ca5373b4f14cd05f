//! 抽象語カテゴリ
//!
//! 辞書に存在しない頂点（1文字のフォールバック、数字列、パイプラインの各ステージが
//! 合成する語など）に品詞タグと重みを与えるための表を提供します。
//! システム辞書に抽象語キー（例: `未##数`）が登録されている場合は、その重みとタグが使われます。

use std::fmt;
use std::str::FromStr;

use crate::dictionary::entry::DictionaryEntry;
use crate::errors::{HansegError, Result};

/// 合成語のカテゴリ
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AbstractWord {
    /// 分類できない1文字
    Unknown = 0,
    /// 空白
    Whitespace = 1,
    /// 記号・句読点
    Punctuation = 2,
    /// 数詞（アラビア数字・漢数字）
    Numeral = 3,
    /// 英字列、または英数字の混在列
    Letter = 4,
    /// 数詞＋量詞
    NumeralQuantifier = 5,
    /// メールアドレスやURLなどのパターン
    Pattern = 6,
    /// 人名
    Person = 7,
    /// 地名
    Place = 8,
    /// 組織名
    Organization = 9,
}

impl AbstractWord {
    pub const ALL: [Self; 10] = [
        Self::Unknown,
        Self::Whitespace,
        Self::Punctuation,
        Self::Numeral,
        Self::Letter,
        Self::NumeralQuantifier,
        Self::Pattern,
        Self::Person,
        Self::Place,
        Self::Organization,
    ];

    #[inline(always)]
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(id).ok()?).copied()
    }

    /// デフォルトの品詞タグ
    pub const fn default_tag(self) -> &'static str {
        match self {
            Self::Unknown => "x",
            Self::Whitespace => "w",
            Self::Punctuation => "w",
            Self::Numeral => "m",
            Self::Letter => "nx",
            Self::NumeralQuantifier => "mq",
            Self::Pattern => "x",
            Self::Person => "nr",
            Self::Place => "ns",
            Self::Organization => "nt",
        }
    }

    /// システム辞書上で重みを引くためのキー
    pub const fn dictionary_key(self) -> &'static str {
        match self {
            Self::Unknown => "未##它",
            Self::Whitespace => "未##空",
            Self::Punctuation => "未##标",
            Self::Numeral => "未##数",
            Self::Letter => "未##串",
            Self::NumeralQuantifier => "未##量",
            Self::Pattern => "未##模",
            Self::Person => "未##人",
            Self::Place => "未##地",
            Self::Organization => "未##团",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Whitespace => "whitespace",
            Self::Punctuation => "punctuation",
            Self::Numeral => "numeral",
            Self::Letter => "letter",
            Self::NumeralQuantifier => "numeral_quantifier",
            Self::Pattern => "pattern",
            Self::Person => "person",
            Self::Place => "place",
            Self::Organization => "organization",
        }
    }
}

impl fmt::Display for AbstractWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AbstractWord {
    type Err = HansegError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|w| w.name() == s)
            .ok_or_else(|| {
                HansegError::invalid_argument("abstract_word", format!("unknown category: {s}"))
            })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnkEntry {
    pub tag: String,
    pub weight: f32,
}

/// 抽象語カテゴリごとのタグと重み
#[derive(Clone, Debug)]
pub struct UnkHandler {
    entries: Vec<UnkEntry>,
}

impl Default for UnkHandler {
    fn default() -> Self {
        Self {
            entries: AbstractWord::ALL
                .into_iter()
                .map(|w| UnkEntry {
                    tag: w.default_tag().to_string(),
                    weight: 0.0,
                })
                .collect(),
        }
    }
}

impl UnkHandler {
    /// 辞書エントリから抽象語キーを探し、見つかったカテゴリの重みとタグを採用します。
    pub(crate) fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a DictionaryEntry>,
    {
        let mut handler = Self::default();
        for e in entries {
            if let Some(w) = AbstractWord::ALL
                .into_iter()
                .find(|w| w.dictionary_key() == e.word())
            {
                handler.set(w, e.tag(), e.weight());
            }
        }
        handler
    }

    pub fn set<S>(&mut self, word: AbstractWord, tag: S, weight: f32)
    where
        S: Into<String>,
    {
        self.entries[word as usize] = UnkEntry {
            tag: tag.into(),
            weight,
        };
    }

    #[inline(always)]
    pub fn entry(&self, word: AbstractWord) -> &UnkEntry {
        &self.entries[word as usize]
    }

    #[inline(always)]
    pub fn tag(&self, word: AbstractWord) -> &str {
        &self.entry(word).tag
    }

    #[inline(always)]
    pub fn weight(&self, word: AbstractWord) -> f32 {
        self.entry(word).weight
    }
}
