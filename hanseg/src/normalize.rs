//! 文字正規化
//!
//! 辞書照合の前に、入力文字列の各文字を1対1で変換します。
//! 文字数は変わらないため、正規化後の文字位置は元の文字列の文字位置と一致します。

/// 文字単位の正規化器
///
/// 実装は1文字を必ず1文字に写す必要があります。
pub trait CharNormalizer: Send + Sync {
    /// 1文字を正規化します。
    fn normalize_char(&self, c: char) -> char;

    /// 文字列をその場で正規化します。
    fn normalize(&self, chars: &mut [char]) {
        for c in chars {
            *c = self.normalize_char(*c);
        }
    }
}

/// デフォルトの正規化器
///
/// - 全角ASCII（`U+FF01`〜`U+FF5E`）を半角に変換
/// - 全角スペース（`U+3000`）を半角スペースに変換
/// - ASCII英字を小文字に変換
///
/// # 例
///
/// ```
/// use hanseg::normalize::{CharNormalizer, DefaultNormalizer};
///
/// let mut chars: Vec<char> = "ＡＢｃ１２　北京".chars().collect();
/// DefaultNormalizer.normalize(&mut chars);
/// assert_eq!(chars.iter().collect::<String>(), "abc12 北京");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNormalizer;

impl CharNormalizer for DefaultNormalizer {
    #[inline]
    fn normalize_char(&self, c: char) -> char {
        let c = match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(u32::from(c) - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        };
        c.to_ascii_lowercase()
    }
}

/// 何も変換しない正規化器
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityNormalizer;

impl CharNormalizer for IdentityNormalizer {
    #[inline(always)]
    fn normalize_char(&self, c: char) -> char {
        c
    }
}
