//! ラティスを変更するステージの連鎖
//!
//! 経路選択の前に、設定された順序で各[`Stage`]をラティスに適用します。
//! 各ステージはそれ以前のステージによる変更をすべて見ることができます。
//!
//! ステージは頂点の追加と、ラティスの被覆を壊さない削除のみを行えます。
mod atom;
mod custom_dict;
mod entity;
mod number_letter;
mod number_quantifier;
mod pattern;

use std::sync::Arc;

use crate::dictionary::{AbstractWord, Lexicons, UnkHandler};
use crate::errors::Result;
use crate::sentence::Sentence;
use crate::tokenizer::config::StageKind;
use crate::tokenizer::lattice::{Lattice, Vertex};

pub use crate::tokenizer::pipeline::atom::AtomStage;
pub use crate::tokenizer::pipeline::custom_dict::CustomDictionaryStage;
pub use crate::tokenizer::pipeline::entity::{OrganizationStage, PersonStage, PlaceStage};
pub use crate::tokenizer::pipeline::number_letter::NumberLetterStage;
pub use crate::tokenizer::pipeline::number_quantifier::NumberQuantifierStage;
pub use crate::tokenizer::pipeline::pattern::CommonPatternStage;

/// ラティスを変更するステージ
///
/// ステージは読み取り専用の共有資源のみを保持し、複数のスレッドから同時に適用されます。
pub trait Stage: Send + Sync {
    /// 設定で使用される識別子
    fn name(&self) -> &'static str;

    /// ラティスを変更します。
    fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>);
}

/// ステージに渡される入力文と語彙
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    sentence: &'a Sentence,
    lexicons: Lexicons<'a>,
}

impl<'a> StageContext<'a> {
    pub const fn new(sentence: &'a Sentence, lexicons: Lexicons<'a>) -> Self {
        Self { sentence, lexicons }
    }

    #[inline(always)]
    pub const fn sentence(&self) -> &'a Sentence {
        self.sentence
    }

    #[inline(always)]
    pub const fn lexicons(&self) -> Lexicons<'a> {
        self.lexicons
    }

    #[inline(always)]
    pub fn unk_handler(&self) -> &'a UnkHandler {
        self.lexicons.unk_handler()
    }

    /// 頂点の品詞タグ
    #[inline(always)]
    pub fn tag(&self, v: &Vertex) -> &'a str {
        self.lexicons.tag(v.word_idx)
    }

    /// 頂点の抽象語カテゴリ。辞書語の場合は`None`です。
    #[inline(always)]
    pub fn abstract_word(&self, v: &Vertex) -> Option<AbstractWord> {
        self.lexicons.abstract_word(v.word_idx)
    }

    /// 抽象語カテゴリの頂点を作成します。
    #[inline(always)]
    pub fn synthetic(&self, start: usize, end: usize, word: AbstractWord) -> Vertex {
        Vertex::synthetic(start, end, word, self.unk_handler())
    }

    /// 位置`start`の1文字の頂点を作成します。
    #[inline(always)]
    pub fn fallback(&self, start: usize) -> Vertex {
        let word = self.sentence.char_type(start).fallback_word();
        self.synthetic(start, start + 1, word)
    }
}

/// `[begin, end)`の境界をまたぐ頂点を削除します。
///
/// 削除によって空になる行には、先に1文字の頂点を追加します。
pub(crate) fn detach_crossing(
    lattice: &mut Lattice,
    ctx: &StageContext<'_>,
    begin: usize,
    end: usize,
) -> usize {
    for start in 0..end.min(lattice.len_char()) {
        let row = lattice.starting_at(start);
        if !row.is_empty() && row.iter().all(|v| v.crosses(begin, end)) {
            lattice.insert(ctx.fallback(start));
        }
    }
    lattice.remove_crossing(begin, end)
}

/// ステージの連鎖
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Box<dyn Stage>]>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(vec![])
    }
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages: stages.into(),
        }
    }

    /// ステージの種類の列からパイプラインを作成します。
    ///
    /// # エラー
    ///
    /// ステージの初期化に失敗した場合にエラーを返します。
    pub fn from_kinds(kinds: &[StageKind]) -> Result<Self> {
        let stages = kinds
            .iter()
            .map(|kind| kind.build())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(stages))
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// ステージの識別子を適用順に列挙します。
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|s| s.name())
    }

    /// すべてのステージを順に適用します。
    pub fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
        let debug = log::log_enabled!(log::Level::Debug);
        for stage in self.stages.iter() {
            let before = if debug { lattice.num_vertices() } else { 0 };
            stage.apply(lattice, ctx);
            if debug {
                log::debug!(
                    "[hanseg] Stage {}: {} -> {} vertices",
                    stage.name(),
                    before,
                    lattice.num_vertices()
                );
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::dictionary::{Dictionary, DictionaryBuilder, Lexicons};
    use crate::normalize::DefaultNormalizer;
    use crate::sentence::Sentence;
    use crate::tokenizer::lattice::Lattice;

    use super::StageContext;

    pub struct Fixture {
        pub dict: Dictionary,
        pub user: Option<Dictionary>,
        pub sent: Sentence,
    }

    impl Fixture {
        pub fn new(entries: &[(&str, f32, &str)], input: &str) -> Self {
            let mut b = DictionaryBuilder::new();
            b.extend(entries.iter().copied());
            let (dict, _) = b.build().unwrap();
            let mut sent = Sentence::new();
            sent.set_sentence(input);
            sent.compile(&DefaultNormalizer);
            Self {
                dict,
                user: None,
                sent,
            }
        }

        pub fn with_user(mut self, entries: &[(&str, f32, &str)]) -> Self {
            let mut b = DictionaryBuilder::custom();
            b.extend(entries.iter().copied());
            self.user = Some(b.build().unwrap().0);
            self
        }

        pub fn ctx(&self) -> StageContext<'_> {
            StageContext::new(&self.sent, Lexicons::new(&self.dict, self.user.as_ref()))
        }

        pub fn lattice(&self) -> Lattice {
            let mut lattice = Lattice::default();
            lattice.build(
                &self.sent,
                &self.dict.scan(self.sent.chars()),
                self.dict.unk_handler(),
            );
            lattice
        }
    }

    /// `(start, end, tag)` of every vertex in enumeration order.
    pub fn vertices(lattice: &Lattice, ctx: &StageContext<'_>) -> Vec<(usize, usize, String)> {
        lattice
            .vertices()
            .map(|(_, v)| (v.start, v.end, ctx.tag(v).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::Fixture;
    use super::*;

    struct Recorder(&'static str);

    impl Stage for Recorder {
        fn name(&self) -> &'static str {
            self.0
        }

        fn apply(&self, lattice: &mut Lattice, ctx: &StageContext<'_>) {
            // Each stage sees the vertices added by the previous ones.
            let len = lattice.num_vertices();
            let end = len.min(lattice.len_char());
            lattice.insert(ctx.synthetic(0, end, AbstractWord::Pattern));
        }
    }

    #[test]
    fn test_stages_in_order() {
        let f = Fixture::new(&[], "abcdef");
        let ctx = f.ctx();
        let mut lattice = f.lattice();
        let pipeline = Pipeline::new(vec![Box::new(Recorder("first")), Box::new(Recorder("second"))]);
        assert_eq!(pipeline.names().collect::<Vec<_>>(), vec!["first", "second"]);

        pipeline.apply(&mut lattice, &ctx);
        let ends: Vec<_> = lattice.starting_at(0).iter().map(|v| v.end).collect();
        assert_eq!(ends, vec![1, 6, 6]);
    }

    #[test]
    fn test_detach_crossing_keeps_coverage() {
        let f = Fixture::new(&[("bc", 5.0, "n")], "abcd");
        let ctx = f.ctx();
        let mut lattice = f.lattice();
        // Row 1 only has "bc", which crosses the boundary at 2.
        assert_eq!(lattice.starting_at(1).len(), 1);

        let removed = detach_crossing(&mut lattice, &ctx, 2, 4);
        assert_eq!(removed, 1);
        assert!(lattice.is_covered());
        let row: Vec<_> = lattice.starting_at(1).iter().map(|v| v.end).collect();
        assert_eq!(row, vec![2]);
    }

    #[test]
    fn test_from_kinds() {
        let pipeline = Pipeline::from_kinds(&[StageKind::Atom, StageKind::CommonPattern]).unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(
            pipeline.names().collect::<Vec<_>>(),
            vec!["atom", "common_pattern"]
        );
        assert!(Pipeline::default().is_empty());
    }
}
