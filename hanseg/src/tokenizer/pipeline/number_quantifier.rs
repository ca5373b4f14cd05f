//! 数詞と量詞を結合するステージ
use crate::dictionary::AbstractWord;
use crate::tokenizer::lattice::{Lattice, Vertex};
use crate::tokenizer::pipeline::{Stage, StageContext};

/// 数詞の品詞タグ
pub const NUMERAL_TAG: &str = "m";
/// 量詞の品詞タグ
pub const QUANTIFIER_TAG: &str = "q";

/// 数詞の頂点`[b, e)`の直後に量詞の頂点`[e, f)`が続く場合、
/// `[b, f)`を覆う数量詞の頂点を追加します。
#[derive(Clone, Copy, Debug, Default)]
pub struct NumberQuantifierStage;

impl NumberQuantifierStage {
    fn is_numeral(ctx: &StageContext<'_>, v: &Vertex) -> bool {
        ctx.abstract_word(v) == Some(AbstractWord::Numeral) || ctx.tag(v) == NUMERAL_TAG
    }
}

impl Stage for NumberQuantifierStage {
    fn name(&self) -> &'static str {
        "number_quantifier"
    }

    fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
        let len_char = lattice.len_char();
        let mut merged = vec![];
        for (_, v) in lattice.vertices() {
            if v.end >= len_char || !Self::is_numeral(ctx, v) {
                continue;
            }
            for q in lattice.starting_at(v.end) {
                if ctx.tag(q) == QUANTIFIER_TAG {
                    merged.push(ctx.synthetic(v.start, q.end, AbstractWord::NumeralQuantifier));
                }
            }
        }
        for v in merged {
            lattice.insert_unique(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tokenizer::pipeline::AtomStage;
    use crate::tokenizer::pipeline::test_utils::{Fixture, vertices};

    #[test]
    fn test_merge() {
        let f = Fixture::new(&[("个", 5.0, "q"), ("三", 5.0, "m"), ("人", 5.0, "n")], "30个人三个");
        let ctx = f.ctx();
        let mut lattice = f.lattice();
        AtomStage.apply(&mut lattice, &ctx);
        NumberQuantifierStage.apply(&mut lattice, &ctx);

        let mq: Vec<_> = vertices(&lattice, &ctx)
            .into_iter()
            .filter(|(_, _, tag)| tag == "mq")
            .map(|(s, e, _)| (s, e))
            .collect();
        assert_eq!(mq, vec![(0, 3), (1, 3), (4, 6)]);
    }

    #[test]
    fn test_no_quantifier() {
        let f = Fixture::new(&[("人", 5.0, "n")], "3人");
        let ctx = f.ctx();
        let mut lattice = f.lattice();
        NumberQuantifierStage.apply(&mut lattice, &ctx);
        assert_eq!(lattice.num_vertices(), 2);
    }
}
