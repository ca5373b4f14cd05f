//! カスタム辞書を優先して適用するステージ
use crate::dictionary::LexMatch;
use crate::tokenizer::lattice::{Lattice, Vertex};
use crate::tokenizer::pipeline::{Stage, StageContext, detach_crossing};

/// カスタム辞書の語を、他の候補より優先してラティスに適用します。
///
/// カスタム辞書の一致から、左から順に最長で互いに重ならないものを選びます。
/// 選ばれた語ごとに頂点を追加し、同じ位置から始まる他の頂点と、
/// 語の境界をまたぐ頂点を削除します。これにより、経路は必ずその語を通ります。
///
/// カスタム辞書が設定されていない場合は何もしません。
#[derive(Clone, Copy, Debug, Default)]
pub struct CustomDictionaryStage;

impl Stage for CustomDictionaryStage {
    fn name(&self) -> &'static str {
        "custom_dictionary"
    }

    fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
        let Some(user) = ctx.lexicons().user() else {
            return;
        };
        let matches = user.scan(ctx.sentence().chars());
        for m in leftmost_longest(&matches) {
            let vertex = Vertex::new(m.begin, m.end, m.word_idx, m.weight);
            lattice.insert(vertex);
            lattice.retain_at(m.begin, |v| v.end == m.end && v.word_idx == m.word_idx);
            detach_crossing(lattice, ctx, m.begin, m.end);
        }
    }
}

/// 開始位置、終了位置の昇順に並んだ一致から、左から順に最長で重ならないものを選びます。
///
/// 同じ範囲に複数のエントリがある場合は先に並んでいるものを選びます。
fn leftmost_longest(matches: &[LexMatch]) -> Vec<LexMatch> {
    let mut selected = vec![];
    let mut cursor = 0;
    let mut i = 0;
    while i < matches.len() {
        let begin = matches[i].begin;
        let group_len = matches[i..]
            .iter()
            .position(|m| m.begin != begin)
            .unwrap_or(matches.len() - i);
        let group = &matches[i..i + group_len];
        if begin >= cursor {
            let longest = group[group_len - 1].end;
            if let Some(m) = group.iter().find(|m| m.end == longest) {
                selected.push(*m);
                cursor = m.end;
            }
        }
        i += group_len;
    }
    selected
}
