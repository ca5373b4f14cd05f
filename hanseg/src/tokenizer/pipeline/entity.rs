//! 規則に基づく固有表現の候補を追加するステージ
//!
//! いずれのステージも候補の頂点を追加するだけで、既存の頂点は削除しません。
//! 候補が採用されるかどうかは経路選択によって決まります。
use crate::dictionary::AbstractWord;
use crate::sentence::{CharType, Sentence};
use crate::tokenizer::lattice::{Lattice, Vertex};
use crate::tokenizer::pipeline::{Stage, StageContext};

const SURNAMES: &str = "王李张刘陈杨黄赵吴周徐孙马朱胡郭何高林罗郑梁谢宋唐许韩冯邓曹彭曾肖田董袁潘于蒋蔡余杜叶程苏魏吕丁任沈姚卢姜崔钟谭陆汪范金石廖贾夏韦付方白邹孟熊秦邱江尹薛闫段雷侯龙史陶黎贺顾毛郝龚邵万钱严覃武戴莫孔向汤欧";

const PLACE_SUFFIXES: &str = "省市县区镇村州路街";

const ORGANIZATION_SUFFIXES: &[&str] = &["公司", "大学", "银行", "集团", "协会", "医院", "研究所"];

#[inline(always)]
fn is_name_char(sent: &Sentence, pos: usize) -> bool {
    sent.char_type(pos) == CharType::Other
}

fn is_name_span(sent: &Sentence, start: usize, end: usize) -> bool {
    (start..end).all(|p| is_name_char(sent, p))
}

/// 人名の候補を追加します。
///
/// 1文字の姓に1〜2文字の名が続く範囲を`nr`の頂点とします。
#[derive(Clone, Copy, Debug, Default)]
pub struct PersonStage;

impl Stage for PersonStage {
    fn name(&self) -> &'static str {
        "person"
    }

    fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
        let sent = ctx.sentence();
        let chars = sent.chars();
        for p in 0..chars.len() {
            if !SURNAMES.contains(chars[p]) {
                continue;
            }
            for given in 1..=2 {
                let end = p + 1 + given;
                if end > chars.len() || !is_name_span(sent, p + 1, end) {
                    break;
                }
                lattice.insert_unique(ctx.synthetic(p, end, AbstractWord::Person));
            }
        }
    }
}

/// 地名の候補を追加します。
///
/// 1〜3文字に地名の接尾辞（`省`、`市`、`县`など）が続く範囲を`ns`の頂点とします。
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceStage;

impl Stage for PlaceStage {
    fn name(&self) -> &'static str {
        "place"
    }

    fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
        let sent = ctx.sentence();
        let chars = sent.chars();
        for q in 1..chars.len() {
            if !PLACE_SUFFIXES.contains(chars[q]) {
                continue;
            }
            for len in 1..=3 {
                let Some(start) = q.checked_sub(len) else {
                    break;
                };
                if !is_name_char(sent, start) {
                    break;
                }
                lattice.insert_unique(ctx.synthetic(start, q + 1, AbstractWord::Place));
            }
        }
    }
}

/// 組織名の候補を追加します。
///
/// 組織名の接尾辞（`公司`、`大学`、`银行`など）の直前にある1〜2語を含む範囲を
/// `nt`の頂点とします。直前の語はラティス上の頂点から選びます。
#[derive(Clone, Debug)]
pub struct OrganizationStage {
    suffixes: Vec<Vec<char>>,
}

impl Default for OrganizationStage {
    fn default() -> Self {
        Self {
            suffixes: ORGANIZATION_SUFFIXES
                .iter()
                .map(|s| s.chars().collect())
                .collect(),
        }
    }
}

impl OrganizationStage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for OrganizationStage {
    fn name(&self) -> &'static str {
        "organization"
    }

    fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
        let sent = ctx.sentence();
        let chars = sent.chars();
        let ends = lattice.ends();

        let mut candidates: Vec<Vertex> = vec![];
        for q in 1..chars.len() {
            for suffix in &self.suffixes {
                if !chars[q..].starts_with(suffix) {
                    continue;
                }
                let end = q + suffix.len();
                for &first in &ends[q] {
                    let w1 = lattice.vertex(first);
                    if !is_name_span(sent, w1.start, w1.end) {
                        continue;
                    }
                    candidates.push(ctx.synthetic(w1.start, end, AbstractWord::Organization));
                    for &second in &ends[w1.start] {
                        let w2 = lattice.vertex(second);
                        if is_name_span(sent, w2.start, w2.end) {
                            candidates.push(ctx.synthetic(
                                w2.start,
                                end,
                                AbstractWord::Organization,
                            ));
                        }
                    }
                }
            }
        }
        for v in candidates {
            lattice.insert_unique(v);
        }
    }
}
