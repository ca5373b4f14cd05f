//! 多パターン走査器
//!
//! [`PrefixIndex`]の内容からAho–Corasickオートマトンを構築し、
//! 文字列を左から右へ一度だけ走査して、辞書語のすべての出現位置を報告します。
//! 走査時間は入力長とヒット数の和に比例します。

use crate::dictionary::trie::PrefixIndex;
use crate::errors::Result;
use crate::utils::FromU32;

const ROOT: u32 = 0;
const NONE: u32 = u32::MAX;

/// 走査で見つかった辞書語の出現
///
/// `begin..end`は走査対象の文字バッファ上の半開区間（文字単位）です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit<V> {
    /// 開始位置
    pub begin: usize,
    /// 終了位置
    pub end: usize,
    /// 単語に対応する値
    pub value: V,
    /// インデックス内での単語の序数（辞書順）
    pub index: u32,
}

#[derive(Clone, Debug)]
struct State {
    // Sorted by character.
    next: Vec<(char, u32)>,
    fail: u32,
    depth: u32,
    // Ordinal of the word ending at this state.
    output: Option<u32>,
    // Nearest state on the failure chain that has an output.
    dict_link: u32,
}

impl State {
    const fn new(depth: u32) -> Self {
        Self {
            next: vec![],
            fail: ROOT,
            depth,
            output: None,
            dict_link: NONE,
        }
    }
}

/// Aho–Corasick法による多パターン走査器
///
/// 構築後は不変であり、複数のスレッドから同時に読み取ることができます。
#[derive(Clone, Debug)]
pub struct Scanner<V> {
    states: Vec<State>,
    values: Vec<V>,
}

impl<V> Scanner<V>
where
    V: Clone,
{
    /// 接頭辞インデックスの内容から走査器を構築します。
    ///
    /// 各単語の序数は[`PrefixIndex::iter`]の列挙順に従います。
    pub fn new(index: &PrefixIndex<V>) -> Result<Self> {
        let mut states = vec![State::new(0)];
        let mut values = Vec::with_capacity(index.len());

        for (ordinal, (word, value)) in index.iter().enumerate() {
            let mut s = ROOT;
            for (depth, c) in word.chars().enumerate() {
                s = match Self::goto_in(&states, s, c) {
                    Some(t) => t,
                    None => {
                        let t = u32::try_from(states.len())?;
                        states.push(State::new(u32::try_from(depth + 1)?));
                        let next = &mut states[usize::from_u32(s)].next;
                        let at = next.partition_point(|&(k, _)| k < c);
                        next.insert(at, (c, t));
                        t
                    }
                };
            }
            states[usize::from_u32(s)].output = Some(u32::try_from(ordinal)?);
            values.push(value.clone());
        }

        // Breadth-first construction of failure and dictionary-suffix links.
        let mut queue = std::collections::VecDeque::new();
        for &(_, t) in &states[usize::from_u32(ROOT)].next {
            queue.push_back(t);
        }
        while let Some(s) = queue.pop_front() {
            let edges = states[usize::from_u32(s)].next.clone();
            for (c, t) in edges {
                let mut f = states[usize::from_u32(s)].fail;
                let fail = loop {
                    if s == ROOT {
                        break ROOT;
                    }
                    if let Some(u) = Self::goto_in(&states, f, c) {
                        break u;
                    }
                    if f == ROOT {
                        break ROOT;
                    }
                    f = states[usize::from_u32(f)].fail;
                };
                let fail_state = &states[usize::from_u32(fail)];
                let dict_link = if fail_state.output.is_some() {
                    fail
                } else {
                    fail_state.dict_link
                };
                let target = &mut states[usize::from_u32(t)];
                target.fail = fail;
                target.dict_link = dict_link;
                queue.push_back(t);
            }
        }

        Ok(Self { states, values })
    }

    /// 登録されている単語数を返します。
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.values.len()
    }

    /// `input`中のすべての辞書語の出現を列挙します。
    ///
    /// 結果は開始位置の昇順、同じ開始位置では終了位置の昇順に並びます。
    /// 重なり合う出現もすべて含まれます。
    pub fn scan(&self, input: &[char]) -> Vec<Hit<V>> {
        let mut raw = vec![];
        self.scan_with(input, |hit| raw.push(hit));

        // `raw` is ordered by end. A stable counting sort on begin yields
        // (begin, end) order in linear time.
        let mut offsets = vec![0usize; input.len() + 1];
        for hit in &raw {
            offsets[hit.begin + 1] += 1;
        }
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }
        let mut slots: Vec<Option<Hit<V>>> = (0..raw.len()).map(|_| None).collect();
        for hit in raw {
            let pos = &mut offsets[hit.begin];
            slots[*pos] = Some(hit);
            *pos += 1;
        }
        slots.into_iter().flatten().collect()
    }

    /// `input`を走査し、見つかった出現ごとに`f`を呼び出します。
    ///
    /// 呼び出し順は終了位置の昇順で、同じ終了位置では長い単語が先になります。
    pub fn scan_with<F>(&self, input: &[char], mut f: F)
    where
        F: FnMut(Hit<V>),
    {
        let mut s = ROOT;
        for (i, &c) in input.iter().enumerate() {
            loop {
                if let Some(t) = self.goto(s, c) {
                    s = t;
                    break;
                }
                if s == ROOT {
                    break;
                }
                s = self.state(s).fail;
            }

            let mut o = if self.state(s).output.is_some() {
                s
            } else {
                self.state(s).dict_link
            };
            while o != NONE {
                let state = self.state(o);
                if let Some(ordinal) = state.output {
                    f(Hit {
                        begin: i + 1 - usize::from_u32(state.depth),
                        end: i + 1,
                        value: self.values[usize::from_u32(ordinal)].clone(),
                        index: ordinal,
                    });
                }
                o = state.dict_link;
            }
        }
    }

    #[inline(always)]
    fn state(&self, s: u32) -> &State {
        &self.states[usize::from_u32(s)]
    }

    #[inline(always)]
    fn goto(&self, s: u32, c: char) -> Option<u32> {
        Self::goto_in(&self.states, s, c)
    }

    #[inline(always)]
    fn goto_in(states: &[State], s: u32, c: char) -> Option<u32> {
        let next = &states[usize::from_u32(s)].next;
        next.binary_search_by_key(&c, |&(k, _)| k)
            .ok()
            .map(|i| next[i].1)
    }
}
