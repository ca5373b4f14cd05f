//! 正規表現によるパターン語のステージ
use regex::Regex;

use crate::dictionary::AbstractWord;
use crate::errors::Result;
use crate::tokenizer::lattice::Lattice;
use crate::tokenizer::pipeline::{Stage, StageContext, detach_crossing};

/// メールアドレス
pub const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9\-]+(?:\.[a-zA-Z0-9\-]+)*\.[a-zA-Z]{2,}";
/// URL
pub const URL_PATTERN: &str =
    r"(?:https?|ftp)://[a-zA-Z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+|www\.[a-zA-Z0-9\-]+(?:\.[a-zA-Z0-9\-]+)+[a-zA-Z0-9\-._~:/?#\[\]@!$&'()*+,;=%]*";

/// 正規表現に一致する範囲をそれぞれ1つの頂点として追加し、
/// その境界をまたぐ頂点を削除します。
///
/// 照合は正規化後の文字列に対して行われます。
pub struct CommonPatternStage {
    patterns: Vec<Regex>,
}

impl CommonPatternStage {
    /// メールアドレスとURLを認識するステージを作成します。
    pub fn new() -> Result<Self> {
        Self::with_patterns(&[EMAIL_PATTERN, URL_PATTERN])
    }

    /// 任意の正規表現を認識するステージを作成します。
    ///
    /// # エラー
    ///
    /// 正規表現が不正な場合、[`HansegError::Regex`](crate::errors::HansegError::Regex)が返されます。
    pub fn with_patterns(patterns: &[&str]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }
}

impl Stage for CommonPatternStage {
    fn name(&self) -> &'static str {
        "common_pattern"
    }

    fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
        let chars = ctx.sentence().chars();
        if chars.is_empty() {
            return;
        }
        let text: String = chars.iter().collect();
        let mut offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        offsets.push(text.len());

        for re in &self.patterns {
            for m in re.find_iter(&text) {
                let (Ok(begin), Ok(end)) = (
                    offsets.binary_search(&m.start()),
                    offsets.binary_search(&m.end()),
                ) else {
                    continue;
                };
                if begin == end {
                    continue;
                }
                lattice.insert_unique(ctx.synthetic(begin, end, AbstractWord::Pattern));
                detach_crossing(lattice, ctx, begin, end);
            }
        }
    }
}
