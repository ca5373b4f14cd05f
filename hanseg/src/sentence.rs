//! 入力テキストの内部表現を提供するモジュール
//!
//! 入力文字列を文字単位に分割し、正規化後の文字列、文字位置からバイト位置への
//! マッピング、各文字の種別を計算・保持します。

use std::ops::Range;

use crate::dictionary::AbstractWord;
use crate::normalize::CharNormalizer;

/// 文字種別
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharType {
    /// 空白文字
    Whitespace,
    /// ASCII数字
    Digit,
    /// ASCII英字
    Letter,
    /// 漢数字（`零〇一二三四五六七八九十百千万亿两`）
    ChineseNumeral,
    /// 記号・句読点
    Punctuation,
    /// その他（漢字など）
    Other,
}

impl CharType {
    /// 文字の種別を判定します。正規化後の文字を渡すことを想定しています。
    pub fn of(c: char) -> Self {
        if c.is_whitespace() {
            Self::Whitespace
        } else if c.is_ascii_digit() {
            Self::Digit
        } else if c.is_ascii_alphabetic() {
            Self::Letter
        } else if is_chinese_numeral(c) {
            Self::ChineseNumeral
        } else if is_punctuation(c) {
            Self::Punctuation
        } else {
            Self::Other
        }
    }

    /// 辞書語が始まらない位置に置く1文字の頂点のカテゴリ
    pub const fn fallback_word(self) -> AbstractWord {
        match self {
            Self::Whitespace => AbstractWord::Whitespace,
            Self::Digit | Self::ChineseNumeral => AbstractWord::Numeral,
            Self::Letter => AbstractWord::Letter,
            Self::Punctuation => AbstractWord::Punctuation,
            Self::Other => AbstractWord::Unknown,
        }
    }
}

#[inline]
pub(crate) fn is_chinese_numeral(c: char) -> bool {
    matches!(
        c,
        '零' | '〇'
            | '一'
            | '二'
            | '三'
            | '四'
            | '五'
            | '六'
            | '七'
            | '八'
            | '九'
            | '十'
            | '百'
            | '千'
            | '万'
            | '亿'
            | '两'
    )
}

#[inline]
fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{2000}'..='\u{206F}'
                | '\u{3000}'..='\u{303F}'
                | '\u{FE30}'..='\u{FE4F}'
                | '\u{FF00}'..='\u{FF0F}'
                | '\u{FF1A}'..='\u{FF20}'
                | '\u{FF3B}'..='\u{FF40}'
                | '\u{FF5B}'..='\u{FF65}'
        )
}

/// 入力テキストの内部表現を保持する構造体
///
/// # フィールド
///
/// * `input` - 元の入力文字列
/// * `chars` - 正規化後の文字配列。辞書照合に使用されます。
/// * `c2b` - 文字位置から`input`のバイト位置へのマッピング配列
/// * `ctypes` - 各文字の種別
/// * `base_char`, `base_byte` - 入力全体の一部を解析する場合の開始位置
#[derive(Default, Clone, Debug)]
pub struct Sentence {
    input: String,
    chars: Vec<char>,
    c2b: Vec<usize>,
    ctypes: Vec<CharType>,
    base_char: usize,
    base_byte: usize,
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内部状態をクリアします。
    #[inline(always)]
    pub fn clear(&mut self) {
        self.input.clear();
        self.chars.clear();
        self.c2b.clear();
        self.ctypes.clear();
        self.base_char = 0;
        self.base_byte = 0;
    }

    /// 入力文字列を設定します。
    ///
    /// 解析を行うには [`compile`](Self::compile) を呼び出す必要があります。
    pub fn set_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        self.clear();
        self.input.push_str(input.as_ref());
    }

    /// 入力全体における開始位置を設定します。
    ///
    /// 出力されるオフセットはこの位置からの相対値ではなく、入力全体での値になります。
    pub(crate) const fn set_base(&mut self, base_char: usize, base_byte: usize) {
        self.base_char = base_char;
        self.base_byte = base_byte;
    }

    /// 入力文字列を解析し、内部データ構造を構築します。
    pub fn compile(&mut self, normalizer: &dyn CharNormalizer) {
        self.compute_basic();
        normalizer.normalize(&mut self.chars);
        self.compute_types();
    }

    fn compute_basic(&mut self) {
        for (bi, ch) in self.input.char_indices() {
            self.chars.push(ch);
            self.c2b.push(bi);
        }
        self.c2b.push(self.input.len());
    }

    fn compute_types(&mut self) {
        self.ctypes.reserve(self.chars.len());
        for &c in &self.chars {
            self.ctypes.push(CharType::of(c));
        }
    }

    /// 元の入力文字列
    #[inline(always)]
    pub fn raw(&self) -> &str {
        &self.input
    }

    /// 正規化後の文字配列
    #[inline(always)]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// 文字数
    #[inline(always)]
    pub fn len_char(&self) -> usize {
        self.chars.len()
    }

    /// 指定された文字位置に対応する`raw()`上のバイト位置を返します。
    #[inline(always)]
    pub fn byte_position(&self, pos_char: usize) -> usize {
        self.c2b[pos_char]
    }

    #[inline(always)]
    pub fn char_type(&self, pos_char: usize) -> CharType {
        self.ctypes[pos_char]
    }

    #[inline(always)]
    pub fn char_types(&self) -> &[CharType] {
        &self.ctypes
    }

    /// 文字範囲に対応する元の文字列
    #[inline(always)]
    pub fn surface(&self, range: Range<usize>) -> &str {
        &self.input[self.c2b[range.start]..self.c2b[range.end]]
    }

    #[inline(always)]
    pub const fn base_char(&self) -> usize {
        self.base_char
    }

    #[inline(always)]
    pub const fn base_byte(&self) -> usize {
        self.base_byte
    }

    /// 文字範囲内の文字がすべて空白の場合に`true`を返します。
    pub fn is_whitespace(&self, range: Range<usize>) -> bool {
        self.ctypes[range]
            .iter()
            .all(|&t| t == CharType::Whitespace)
    }
}
