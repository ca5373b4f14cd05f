//! 同種の文字の連続をまとめるステージ
use crate::dictionary::AbstractWord;
use crate::sentence::CharType;
use crate::tokenizer::lattice::Lattice;
use crate::tokenizer::pipeline::{Stage, StageContext};

/// 数字（途中の`.`を含む）、英字、漢数字、空白の連続をそれぞれ1つの頂点として追加します。
///
/// 2文字以上の連続のみが対象です。
#[derive(Clone, Copy, Debug, Default)]
pub struct AtomStage;

impl Stage for AtomStage {
    fn name(&self) -> &'static str {
        "atom"
    }

    fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
        let sent = ctx.sentence();
        let chars = sent.chars();
        let types = sent.char_types();

        let mut p = 0;
        while p < types.len() {
            let (end, word) = match types[p] {
                CharType::Digit => (digit_run_end(chars, types, p), AbstractWord::Numeral),
                CharType::Letter => (run_end(types, p), AbstractWord::Letter),
                CharType::ChineseNumeral => (run_end(types, p), AbstractWord::Numeral),
                CharType::Whitespace => (run_end(types, p), AbstractWord::Whitespace),
                _ => {
                    p += 1;
                    continue;
                }
            };
            if end - p >= 2 {
                lattice.insert_unique(ctx.synthetic(p, end, word));
            }
            p = end;
        }
    }
}

fn run_end(types: &[CharType], start: usize) -> usize {
    let t = types[start];
    types[start..]
        .iter()
        .position(|&x| x != t)
        .map_or(types.len(), |n| start + n)
}

// A '.' is kept only between two digits.
fn digit_run_end(chars: &[char], types: &[CharType], start: usize) -> usize {
    let mut end = start;
    while end < types.len() {
        if types[end] == CharType::Digit {
            end += 1;
        } else if chars[end] == '.'
            && end + 1 < types.len()
            && types[end + 1] == CharType::Digit
        {
            end += 1;
        } else {
            break;
        }
    }
    end
}
