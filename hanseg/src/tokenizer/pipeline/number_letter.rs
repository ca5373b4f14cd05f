//! 英数字の混在列をまとめるステージ
use crate::dictionary::AbstractWord;
use crate::sentence::CharType;
use crate::tokenizer::lattice::Lattice;
use crate::tokenizer::pipeline::{Stage, StageContext};

/// 数字と英字の両方を含むASCII英数字の最長の連続を、1つの頂点として追加します。
///
/// 例えば`iphone15`や`4g`などです。
#[derive(Clone, Copy, Debug, Default)]
pub struct NumberLetterStage;

impl Stage for NumberLetterStage {
    fn name(&self) -> &'static str {
        "number_letter"
    }

    fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
        let types = ctx.sentence().char_types();
        let mut p = 0;
        while p < types.len() {
            if !is_alnum(types[p]) {
                p += 1;
                continue;
            }
            let end = types[p..]
                .iter()
                .position(|&t| !is_alnum(t))
                .map_or(types.len(), |n| p + n);
            let run = &types[p..end];
            if run.contains(&CharType::Digit) && run.contains(&CharType::Letter) {
                lattice.insert_unique(ctx.synthetic(p, end, AbstractWord::Letter));
            }
            p = end;
        }
    }
}

#[inline(always)]
fn is_alnum(t: CharType) -> bool {
    matches!(t, CharType::Digit | CharType::Letter)
}
