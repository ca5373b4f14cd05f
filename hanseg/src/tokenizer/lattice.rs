//! ラティス（単語網）構造の実装モジュール。
//!
//! ラティスは1つの入力に対するすべての候補語（頂点）を保持します。
//! 頂点は開始位置ごとの行に格納され、`(開始位置, スロット)`の組で参照されます。
//! スロットは行内での挿入順です。
//!
//! 文字数`N`の入力に対して、`[0, N)`のすべての位置に少なくとも1つの頂点が
//! 始まっていることが保証されます。頂点の削除はこの保証を壊さない操作を通してのみ行えます。
use std::ops::Range;

use crate::dictionary::{AbstractWord, LexMatch, LexType, UnkHandler, WordIdx};
use crate::sentence::Sentence;

/// 頂点の識別子。
///
/// 頂点の削除によってスロットがずれるため、ラティスが変更されるまでの間だけ有効です。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId {
    /// 開始位置（文字単位）。
    pub start: usize,
    /// 行内での位置。
    pub slot: usize,
}

impl VertexId {
    #[inline(always)]
    pub const fn new(start: usize, slot: usize) -> Self {
        Self { start, slot }
    }
}

/// ラティス内の頂点。
///
/// `[start, end)`の範囲を覆う候補語を表します。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// 開始位置（文字単位）。
    pub start: usize,
    /// 終了位置（文字単位）。
    pub end: usize,
    /// 単語インデックス。タグはこれを通して解決されます。
    pub word_idx: WordIdx,
    /// 重み（対数頻度）。
    pub weight: f32,
}

impl Vertex {
    #[inline(always)]
    pub const fn new(start: usize, end: usize, word_idx: WordIdx, weight: f32) -> Self {
        Self {
            start,
            end,
            word_idx,
            weight,
        }
    }

    /// 抽象語カテゴリの頂点を作成します。
    #[inline(always)]
    pub fn synthetic(start: usize, end: usize, word: AbstractWord, unk: &UnkHandler) -> Self {
        Self::new(
            start,
            end,
            WordIdx::new(LexType::Unknown, word.id()),
            unk.weight(word),
        )
    }

    #[inline(always)]
    pub const fn len_char(&self) -> usize {
        self.end - self.start
    }

    #[inline(always)]
    pub const fn range_char(&self) -> Range<usize> {
        self.start..self.end
    }

    /// `[begin, end)`の境界をまたぐ場合に`true`を返します。
    #[inline(always)]
    pub const fn crosses(&self, begin: usize, end: usize) -> bool {
        (self.start < begin && begin < self.end) || (self.start < end && end < self.end)
    }
}

/// 1つの入力に対するラティス。
#[derive(Default, Debug)]
pub struct Lattice {
    starts: Vec<Vec<Vertex>>,
    len_char: usize, // needed for avoiding to free starts
}

impl Lattice {
    /// ラティスをリセットし、新しい文の処理を準備します。
    pub fn reset(&mut self, len_char: usize) {
        for v in self.starts.iter_mut() {
            v.clear();
        }
        let cur_len = self.starts.len();
        if cur_len < len_char {
            self.starts.reserve(len_char - cur_len);
            for _ in cur_len..len_char {
                self.starts.push(Vec::with_capacity(8));
            }
        }
        self.len_char = len_char;
    }

    /// 辞書語の一致と1文字のフォールバックからラティスを構築します。
    ///
    /// 一致は与えられた順に挿入されます。辞書語が始まらない位置には、
    /// 文字種別に応じた抽象語カテゴリの1文字の頂点が追加されます。
    /// 同じ範囲の頂点の重複は除去しません。
    pub fn build(&mut self, sent: &Sentence, matches: &[LexMatch], unk: &UnkHandler) {
        self.reset(sent.len_char());
        for m in matches {
            self.insert(Vertex::new(m.begin, m.end, m.word_idx, m.weight));
        }
        let mut num_fallbacks = 0;
        for p in 0..self.len_char {
            if self.starts[p].is_empty() {
                let word = sent.char_type(p).fallback_word();
                self.starts[p].push(Vertex::synthetic(p, p + 1, word, unk));
                num_fallbacks += 1;
            }
        }
        log::debug!(
            "[hanseg] Built a lattice: {} chars, {} matches, {} fallbacks",
            self.len_char,
            matches.len(),
            num_fallbacks
        );
    }

    /// 文字数
    #[inline(always)]
    pub const fn len_char(&self) -> usize {
        self.len_char
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len_char == 0
    }

    /// 頂点を行の末尾に追加します。
    pub fn insert(&mut self, vertex: Vertex) -> VertexId {
        debug_assert!(vertex.start < vertex.end);
        debug_assert!(vertex.end <= self.len_char);
        let row = &mut self.starts[vertex.start];
        row.push(vertex);
        VertexId::new(vertex.start, row.len() - 1)
    }

    /// 同じ範囲・同じ単語の頂点がまだなければ追加します。
    pub fn insert_unique(&mut self, vertex: Vertex) -> Option<VertexId> {
        if self.contains(vertex.start, vertex.end, vertex.word_idx) {
            return None;
        }
        Some(self.insert(vertex))
    }

    #[inline(always)]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.starts[id.start][id.slot]
    }

    /// `start`から始まる頂点
    #[inline(always)]
    pub fn starting_at(&self, start: usize) -> &[Vertex] {
        &self.starts[start][..]
    }

    /// `[start, end)`に単語`word_idx`の頂点が存在するかどうか
    pub fn contains(&self, start: usize, end: usize, word_idx: WordIdx) -> bool {
        self.starts[start]
            .iter()
            .any(|v| v.end == end && v.word_idx == word_idx)
    }

    /// すべての頂点を`(開始位置, スロット)`の順に列挙します。
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.starts[..self.len_char]
            .iter()
            .enumerate()
            .flat_map(|(start, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(slot, v)| (VertexId::new(start, slot), v))
            })
    }

    pub fn num_vertices(&self) -> usize {
        self.starts[..self.len_char].iter().map(Vec::len).sum()
    }

    /// 終了位置ごとの頂点の一覧を作成します。
    ///
    /// 各位置の頂点は`(開始位置, スロット)`の順に並びます。
    pub fn ends(&self) -> Vec<Vec<VertexId>> {
        let mut ends = vec![vec![]; self.len_char + 1];
        for (id, v) in self.vertices() {
            ends[v.end].push(id);
        }
        ends
    }

    /// `start`から始まる頂点のうち、`keep`が`false`を返すものを削除します。
    ///
    /// 行が空になる場合は何も削除せずに0を返します。
    /// `keep`は同じ頂点に対して複数回呼ばれることがあります。
    ///
    /// # 戻り値
    ///
    /// 削除された頂点の数
    pub fn retain_at<F>(&mut self, start: usize, mut keep: F) -> usize
    where
        F: FnMut(&Vertex) -> bool,
    {
        let row = &mut self.starts[start];
        if row.is_empty() {
            return 0;
        }
        if !row.iter().any(&mut keep) {
            log::warn!(
                "[hanseg] Refused to remove all {} vertices starting at {start}",
                row.len()
            );
            return 0;
        }
        let before = row.len();
        row.retain(|v| keep(v));
        before - row.len()
    }

    /// `[begin, end)`の境界をまたぐ頂点を削除します。
    ///
    /// [`retain_at`](Self::retain_at)と同様に、行を空にする削除は行いません。
    pub fn remove_crossing(&mut self, begin: usize, end: usize) -> usize {
        let mut removed = 0;
        for start in 0..end.min(self.len_char) {
            removed += self.retain_at(start, |v| !v.crosses(begin, end));
        }
        removed
    }

    /// すべての位置に頂点が始まっているかどうか
    pub fn is_covered(&self) -> bool {
        self.starts[..self.len_char].iter().all(|row| !row.is_empty())
    }

    /// 行を直接空にします。ラティスの不変条件を壊すため、テストでのみ使用します。
    #[cfg(test)]
    pub(crate) fn clear_row(&mut self, start: usize) {
        self.starts[start].clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::DictionaryBuilder;
    use crate::normalize::DefaultNormalizer;

    fn sentence(input: &str) -> Sentence {
        let mut sent = Sentence::new();
        sent.set_sentence(input);
        sent.compile(&DefaultNormalizer);
        sent
    }

    #[test]
    fn test_build_with_fallbacks() {
        let mut b = DictionaryBuilder::new();
        b.extend([("北京", 5.0, "ns"), ("北京大学", 6.0, "nt"), ("大学", 5.0, "n")]);
        let (dict, _) = b.build().unwrap();

        let sent = sentence("北京大学生");
        let mut lattice = Lattice::default();
        lattice.build(&sent, &dict.scan(sent.chars()), dict.unk_handler());

        assert!(lattice.is_covered());
        let spans: Vec<_> = lattice.vertices().map(|(_, v)| (v.start, v.end)).collect();
        assert_eq!(spans, vec![(0, 2), (0, 4), (1, 2), (2, 4), (3, 4), (4, 5)]);

        let fallback = lattice.starting_at(4)[0];
        assert_eq!(fallback.word_idx.lex_type, LexType::Unknown);
        assert_eq!(fallback.word_idx.word_id, AbstractWord::Unknown.id());
    }

    #[test]
    fn test_empty() {
        let sent = sentence("");
        let (dict, _) = DictionaryBuilder::new().build().unwrap();
        let mut lattice = Lattice::default();
        lattice.build(&sent, &[], dict.unk_handler());
        assert!(lattice.is_empty());
        assert_eq!(lattice.num_vertices(), 0);
        assert_eq!(lattice.ends(), vec![Vec::<VertexId>::new()]);
    }

    #[test]
    fn test_reuse_buffers() {
        let (dict, _) = DictionaryBuilder::new().build().unwrap();
        let mut lattice = Lattice::default();
        lattice.build(&sentence("abcdef"), &[], dict.unk_handler());
        assert_eq!(lattice.num_vertices(), 6);
        lattice.build(&sentence("xy"), &[], dict.unk_handler());
        assert_eq!(lattice.num_vertices(), 2);
        assert_eq!(lattice.vertices().count(), 2);
    }

    #[test]
    fn test_ends_view() {
        let (dict, _) = DictionaryBuilder::new().build().unwrap();
        let unk = dict.unk_handler();
        let mut lattice = Lattice::default();
        lattice.build(&sentence("abc"), &[], unk);
        lattice.insert(Vertex::synthetic(0, 3, AbstractWord::Letter, unk));
        let ends = lattice.ends();
        assert_eq!(ends[0], vec![]);
        assert_eq!(ends[1], vec![VertexId::new(0, 0)]);
        assert_eq!(ends[3], vec![VertexId::new(0, 1), VertexId::new(2, 0)]);
    }

    #[test]
    fn test_guarded_removal() {
        let (dict, _) = DictionaryBuilder::new().build().unwrap();
        let unk = dict.unk_handler();
        let mut lattice = Lattice::default();
        lattice.build(&sentence("abcd"), &[], unk);
        lattice.insert(Vertex::synthetic(1, 3, AbstractWord::Letter, unk));

        assert_eq!(lattice.retain_at(0, |_| false), 0);
        assert_eq!(lattice.starting_at(0).len(), 1);

        assert_eq!(lattice.retain_at(1, |v| v.len_char() == 1), 1);
        assert_eq!(lattice.starting_at(1).len(), 1);
        assert!(lattice.is_covered());
    }

    #[test]
    fn test_remove_crossing() {
        let (dict, _) = DictionaryBuilder::new().build().unwrap();
        let unk = dict.unk_handler();
        let mut lattice = Lattice::default();
        lattice.build(&sentence("abcde"), &[], unk);
        lattice.insert(Vertex::synthetic(0, 2, AbstractWord::Letter, unk));
        lattice.insert(Vertex::synthetic(2, 5, AbstractWord::Letter, unk));
        lattice.insert(Vertex::synthetic(1, 3, AbstractWord::Letter, unk));

        // [1, 3) crosses the boundary at 2 of [2, 4); [2, 5) crosses 4.
        let removed = lattice.remove_crossing(2, 4);
        assert_eq!(removed, 2);
        assert!(!lattice.starting_at(1).iter().any(|v| v.end == 3));
        assert!(!lattice.starting_at(2).iter().any(|v| v.end == 5));
        assert!(lattice.starting_at(0).iter().any(|v| v.end == 2));
        assert!(lattice.is_covered());
    }

    #[test]
    fn test_insert_unique() {
        let (dict, _) = DictionaryBuilder::new().build().unwrap();
        let unk = dict.unk_handler();
        let mut lattice = Lattice::default();
        lattice.build(&sentence("ab"), &[], unk);
        let v = Vertex::synthetic(0, 2, AbstractWord::Letter, unk);
        assert_eq!(lattice.insert_unique(v), Some(VertexId::new(0, 1)));
        assert_eq!(lattice.insert_unique(v), None);
    }
}
