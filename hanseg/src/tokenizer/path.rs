//! 最良経路の選択
//!
//! ラティス上の動的計画法により、位置0から文末までを隙間なく覆う最良の経路を求めます。
//!
//! 頂点`v`の最良スコアは、`v`の開始位置で終わる頂点`u`のうち
//! `best(u) + transition(tag(u), tag(v)) + cost(v)`が最小となるものから求めます。
//! 位置0から始まる頂点の前には文頭があるものとします。
//! 頂点は開始位置の昇順に処理されるため、前の頂点はすべて先に確定しています。
//!
//! スコアは`(総コスト, 頂点数)`の組です。[`PathAlgorithm::Viterbi`]は
//! この順に辞書式で比較し、[`PathAlgorithm::FewestWords`]は`(頂点数, 総コスト)`の順に比較します。
//! 完全に同点の場合は、`(開始位置, スロット)`の順で先に列挙された候補を残します。
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::dictionary::Lexicons;
use crate::errors::{HansegError, Result};
use crate::tokenizer::lattice::{Lattice, VertexId};
use crate::tokenizer::scorer::Scorer;

/// 経路選択のアルゴリズム
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PathAlgorithm {
    /// 総コスト最小の経路。同点の場合は頂点数の少ない経路を選びます。
    #[default]
    Viterbi,
    /// 頂点数最小の経路。同点の場合は総コストの小さい経路を選びます。
    FewestWords,
}

impl PathAlgorithm {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viterbi => "viterbi",
            Self::FewestWords => "fewest_words",
        }
    }

    #[inline(always)]
    fn compare(self, a: Score, b: Score) -> Ordering {
        match self {
            Self::Viterbi => (a.cost, a.count).cmp(&(b.cost, b.count)),
            Self::FewestWords => (a.count, a.cost).cmp(&(b.count, b.cost)),
        }
    }
}

impl fmt::Display for PathAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathAlgorithm {
    type Err = HansegError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "viterbi" => Ok(Self::Viterbi),
            "fewest_words" => Ok(Self::FewestWords),
            _ => Err(HansegError::invalid_argument(
                "path_algorithm",
                format!("must be viterbi or fewest_words, got {s:?}"),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Score {
    cost: i32,
    count: u32,
}

#[derive(Clone, Copy, Debug)]
struct Cell {
    score: Score,
    word_cost: i32,
    prev: Option<VertexId>,
}

/// 選択された経路
///
/// 頂点は位置0から文末まで順に並び、互いに重ならず隙間もありません。
#[derive(Clone, Debug, Default)]
pub struct Wordpath {
    ids: Vec<VertexId>,
    word_costs: Vec<i32>,
    total_costs: Vec<i32>,
    total_cost: i32,
}

impl Wordpath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.word_costs.clear();
        self.total_costs.clear();
        self.total_cost = 0;
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// 経路上の頂点
    #[inline(always)]
    pub fn ids(&self) -> &[VertexId] {
        &self.ids
    }

    /// `i`番目の頂点自身のコスト
    #[inline(always)]
    pub fn word_cost(&self, i: usize) -> i32 {
        self.word_costs[i]
    }

    /// 文頭から`i`番目の頂点までの累積コスト
    #[inline(always)]
    pub fn total_cost_at(&self, i: usize) -> i32 {
        self.total_costs[i]
    }

    /// 文末への接続コストを含む経路全体のコスト
    #[inline(always)]
    pub const fn total_cost(&self) -> i32 {
        self.total_cost
    }
}

/// 経路選択器
///
/// 作業領域を保持し、呼び出し間で再利用します。
#[derive(Debug, Default)]
pub struct PathSelector {
    algorithm: PathAlgorithm,
    row_offsets: Vec<usize>,
    cells: Vec<Option<Cell>>,
}

impl PathSelector {
    pub fn new(algorithm: PathAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    #[inline(always)]
    pub const fn algorithm(&self) -> PathAlgorithm {
        self.algorithm
    }

    #[inline(always)]
    fn cell_index(&self, id: VertexId) -> usize {
        self.row_offsets[id.start] + id.slot
    }

    /// 最良経路を求めて`path`に格納します。
    ///
    /// # エラー
    ///
    /// 文末で終わる頂点に位置0から到達できない場合、
    /// [`HansegError::LatticeUnreachable`]が返されます。
    pub fn select(
        &mut self,
        lattice: &Lattice,
        lexicons: Lexicons<'_>,
        scorer: &dyn Scorer,
        path: &mut Wordpath,
    ) -> Result<()> {
        path.clear();
        let len_char = lattice.len_char();
        if len_char == 0 {
            return Ok(());
        }

        self.row_offsets.clear();
        let mut total = 0;
        for start in 0..len_char {
            self.row_offsets.push(total);
            total += lattice.starting_at(start).len();
        }
        self.cells.clear();
        self.cells.resize(total, None);

        let ends = lattice.ends();

        for (id, v) in lattice.vertices() {
            let tag = lexicons.tag(v.word_idx);
            let word_cost = scorer.word_cost(v.weight);

            let mut best: Option<Cell> = None;
            if v.start == 0 {
                let cost = scorer
                    .transition_cost(None, Some(tag))
                    .saturating_add(word_cost);
                best = Some(Cell {
                    score: Score { cost, count: 1 },
                    word_cost,
                    prev: None,
                });
            } else {
                for &uid in &ends[v.start] {
                    let Some(u) = self.cells[self.cell_index(uid)] else {
                        continue;
                    };
                    let left = lexicons.tag(lattice.vertex(uid).word_idx);
                    let cost = u
                        .score
                        .cost
                        .saturating_add(scorer.transition_cost(Some(left), Some(tag)))
                        .saturating_add(word_cost);
                    let score = Score {
                        cost,
                        count: u.score.count + 1,
                    };
                    if best.is_none_or(|b| self.algorithm.compare(score, b.score).is_lt()) {
                        best = Some(Cell {
                            score,
                            word_cost,
                            prev: Some(uid),
                        });
                    }
                }
            }
            let idx = self.cell_index(id);
            self.cells[idx] = best;
        }

        let mut last: Option<(VertexId, Score)> = None;
        for &uid in &ends[len_char] {
            let Some(u) = self.cells[self.cell_index(uid)] else {
                continue;
            };
            let left = lexicons.tag(lattice.vertex(uid).word_idx);
            let score = Score {
                cost: u
                    .score
                    .cost
                    .saturating_add(scorer.transition_cost(Some(left), None)),
                count: u.score.count,
            };
            if last.is_none_or(|(_, b)| self.algorithm.compare(score, b).is_lt()) {
                last = Some((uid, score));
            }
        }

        let Some((last_id, last_score)) = last else {
            log::error!("[hanseg] No path reaches the end of a {len_char}-char lattice");
            return Err(HansegError::lattice_unreachable(len_char));
        };

        let mut cur = Some(last_id);
        while let Some(id) = cur {
            let Some(cell) = self.cells[self.cell_index(id)] else {
                break;
            };
            path.ids.push(id);
            path.word_costs.push(cell.word_cost);
            path.total_costs.push(cell.score.cost);
            cur = cell.prev;
        }
        path.ids.reverse();
        path.word_costs.reverse();
        path.total_costs.reverse();
        path.total_cost = last_score.cost;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::{AbstractWord, Dictionary, DictionaryBuilder, LexType, WordIdx};
    use crate::normalize::DefaultNormalizer;
    use crate::sentence::Sentence;
    use crate::tokenizer::lattice::Vertex;
    use crate::tokenizer::scorer::{TransitionTable, WeightScorer};

    // Uses the weight itself as the cost.
    struct RawScorer;

    impl Scorer for RawScorer {
        fn word_cost(&self, weight: f32) -> i32 {
            weight as i32
        }
    }

    fn sentence(input: &str) -> Sentence {
        let mut sent = Sentence::new();
        sent.set_sentence(input);
        sent.compile(&DefaultNormalizer);
        sent
    }

    fn empty_dict() -> Dictionary {
        DictionaryBuilder::new().build().unwrap().0
    }

    fn spans(lattice: &Lattice, path: &Wordpath) -> Vec<(usize, usize)> {
        path.ids()
            .iter()
            .map(|&id| {
                let v = lattice.vertex(id);
                (v.start, v.end)
            })
            .collect()
    }

    fn letter(start: usize, end: usize, cost: f32) -> Vertex {
        Vertex::new(
            start,
            end,
            WordIdx::new(LexType::Unknown, AbstractWord::Letter.id()),
            cost,
        )
    }

    /// Builds a lattice from explicit vertices without fallbacks.
    fn lattice_of(len_char: usize, vertices: &[Vertex]) -> Lattice {
        let mut lattice = Lattice::default();
        lattice.reset(len_char);
        for &v in vertices {
            lattice.insert(v);
        }
        lattice
    }

    #[test]
    fn test_prefers_longer_word() {
        let mut b = DictionaryBuilder::new();
        b.extend([("北京", 5.0, "ns"), ("北京大学", 6.0, "nt"), ("大学", 5.0, "n")]);
        let (dict, _) = b.build().unwrap();

        let sent = sentence("北京大学生");
        let mut lattice = Lattice::default();
        lattice.build(&sent, &dict.scan(sent.chars()), dict.unk_handler());

        let scorer = WeightScorer::new(dict.log_total());
        let mut selector = PathSelector::new(PathAlgorithm::Viterbi);
        let mut path = Wordpath::new();
        selector
            .select(&lattice, Lexicons::new(&dict, None), &scorer, &mut path)
            .unwrap();

        assert_eq!(spans(&lattice, &path), vec![(0, 4), (4, 5)]);
        assert_eq!(path.total_cost(), path.total_cost_at(1));
        assert_eq!(path.total_cost(), path.word_cost(0) + path.word_cost(1));
    }

    #[test]
    fn test_prefers_lower_cost() {
        let dict = empty_dict();
        let lattice = lattice_of(
            3,
            &[
                letter(0, 3, 100.0),
                letter(0, 1, 10.0),
                letter(1, 2, 10.0),
                letter(2, 3, 10.0),
            ],
        );
        let mut selector = PathSelector::default();
        let mut path = Wordpath::new();
        selector
            .select(&lattice, Lexicons::new(&dict, None), &RawScorer, &mut path)
            .unwrap();
        assert_eq!(spans(&lattice, &path), vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(path.total_cost(), 30);
    }

    #[test]
    fn test_tie_break_fewer_vertices() {
        let dict = empty_dict();
        let lattice = lattice_of(
            2,
            &[letter(0, 1, 5.0), letter(0, 2, 10.0), letter(1, 2, 5.0)],
        );
        let mut selector = PathSelector::default();
        let mut path = Wordpath::new();
        selector
            .select(&lattice, Lexicons::new(&dict, None), &RawScorer, &mut path)
            .unwrap();
        assert_eq!(spans(&lattice, &path), vec![(0, 2)]);
        assert_eq!(path.total_cost(), 10);
    }

    #[test]
    fn test_tie_break_enumeration_order() {
        let dict = empty_dict();
        let first = Vertex::new(
            0,
            2,
            WordIdx::new(LexType::Unknown, AbstractWord::Letter.id()),
            10.0,
        );
        let second = Vertex::new(
            0,
            2,
            WordIdx::new(LexType::Unknown, AbstractWord::Pattern.id()),
            10.0,
        );
        let lattice = lattice_of(2, &[first, second]);
        let mut selector = PathSelector::default();
        let mut path = Wordpath::new();
        selector
            .select(&lattice, Lexicons::new(&dict, None), &RawScorer, &mut path)
            .unwrap();
        assert_eq!(path.ids(), &[VertexId::new(0, 0)]);

        let lattice = lattice_of(2, &[second, first]);
        selector
            .select(&lattice, Lexicons::new(&dict, None), &RawScorer, &mut path)
            .unwrap();
        assert_eq!(path.ids(), &[VertexId::new(0, 0)]);
        assert_eq!(
            lattice.vertex(path.ids()[0]).word_idx.word_id,
            AbstractWord::Pattern.id()
        );
    }

    #[test]
    fn test_tie_break_earliest_predecessor() {
        let dict = empty_dict();
        // Two equal-cost predecessors end at 2; the one enumerated first wins.
        let pattern = Vertex::new(
            0,
            2,
            WordIdx::new(LexType::Unknown, AbstractWord::Pattern.id()),
            10.0,
        );
        let lattice = lattice_of(3, &[pattern, letter(0, 2, 10.0), letter(2, 3, 1.0)]);
        let mut selector = PathSelector::default();
        let mut path = Wordpath::new();
        selector
            .select(&lattice, Lexicons::new(&dict, None), &RawScorer, &mut path)
            .unwrap();
        assert_eq!(path.ids(), &[VertexId::new(0, 0), VertexId::new(2, 0)]);
        assert_eq!(path.total_cost(), 11);
    }

    #[test]
    fn test_fewest_words() {
        let dict = empty_dict();
        let lattice = lattice_of(
            3,
            &[
                letter(0, 3, 100.0),
                letter(0, 1, 10.0),
                letter(1, 2, 10.0),
                letter(2, 3, 10.0),
            ],
        );
        let mut selector = PathSelector::new(PathAlgorithm::FewestWords);
        let mut path = Wordpath::new();
        selector
            .select(&lattice, Lexicons::new(&dict, None), &RawScorer, &mut path)
            .unwrap();
        assert_eq!(spans(&lattice, &path), vec![(0, 3)]);
    }

    #[test]
    fn test_transitions() {
        let mut b = DictionaryBuilder::new();
        b.extend([("ab", 1.0, "x1"), ("a", 1.0, "y1"), ("b", 1.0, "y2")]);
        let (dict, _) = b.build().unwrap();

        let sent = sentence("ab");
        let mut lattice = Lattice::default();
        lattice.build(&sent, &dict.scan(sent.chars()), dict.unk_handler());
        let lexicons = Lexicons::new(&dict, None);

        let mut selector = PathSelector::default();
        let mut path = Wordpath::new();

        let scorer = WeightScorer::new(dict.log_total());
        selector.select(&lattice, lexicons, &scorer, &mut path).unwrap();
        assert_eq!(spans(&lattice, &path), vec![(0, 2)]);

        let mut table = TransitionTable::new();
        table.insert("BOS", "x1", 1000);
        table.insert("y1", "y2", -1000);
        let scorer = WeightScorer::new(dict.log_total()).with_transitions(table);
        selector.select(&lattice, lexicons, &scorer, &mut path).unwrap();
        assert_eq!(spans(&lattice, &path), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_unreachable() {
        let dict = empty_dict();
        let sent = sentence("abc");
        let mut lattice = Lattice::default();
        lattice.build(&sent, &[], dict.unk_handler());
        lattice.clear_row(1);

        let mut selector = PathSelector::default();
        let mut path = Wordpath::new();
        let result = selector.select(&lattice, Lexicons::new(&dict, None), &RawScorer, &mut path);
        match result {
            Err(HansegError::LatticeUnreachable(e)) => assert_eq!(e.len_char(), 3),
            _ => panic!("expected LatticeUnreachable"),
        }
    }

    #[test]
    fn test_empty() {
        let dict = empty_dict();
        let lattice = lattice_of(0, &[]);
        let mut selector = PathSelector::default();
        let mut path = Wordpath::new();
        selector
            .select(&lattice, Lexicons::new(&dict, None), &RawScorer, &mut path)
            .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("viterbi".parse::<PathAlgorithm>().unwrap(), PathAlgorithm::Viterbi);
        assert_eq!(
            "fewest_words".parse::<PathAlgorithm>().unwrap(),
            PathAlgorithm::FewestWords
        );
        assert!(matches!(
            "dijkstra".parse::<PathAlgorithm>(),
            Err(HansegError::InvalidArgument(_))
        ));
    }
}
