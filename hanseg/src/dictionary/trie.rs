//! 圧縮トライによる接頭辞インデックス
//!
//! 単一の子を持つノードの連鎖を1本のラベル（テール）に圧縮したパトリシア木です。
//! すべてのラベルは1つの連結された文字バッファ上のスライスとして保持され、
//! ノードの分割はバッファをコピーせずにスライスを切り直すだけで行われます。

use std::fmt;

use crate::errors::{HansegError, Result};
use crate::utils::FromU32;

const ROOT: u32 = 0;

#[derive(Clone, Debug, Default)]
struct PrefixNode {
    // Label of the edge from the parent, as a slice of `PrefixIndex::tails`.
    // Only the root has an empty label.
    tail_start: u32,
    tail_len: u32,
    // Sorted by the leading character of each child's label.
    children: Vec<u32>,
    value: Option<u32>,
}

/// 単語から値への対応を保持する圧縮トライ
///
/// 同じ単語を再度挿入した場合は後勝ちで値が置き換えられます。
/// 構築後は読み取り専用で共有されることを想定しています。
///
/// # 例
///
/// ```
/// use hanseg::dictionary::PrefixIndex;
///
/// let mut index = PrefixIndex::new();
/// index.insert("北京", 1)?;
/// index.insert("北京大学", 2)?;
///
/// assert_eq!(index.get("北京"), Some(&1));
/// assert_eq!(index.get("北"), None);
///
/// let input: Vec<char> = "北京大学生".chars().collect();
/// let matches: Vec<_> = index.common_prefix_iterator(&input).collect();
/// assert_eq!(matches, vec![(2, &1), (4, &2)]);
/// # Ok::<(), hanseg::errors::HansegError>(())
/// ```
#[derive(Clone)]
pub struct PrefixIndex<V> {
    nodes: Vec<PrefixNode>,
    tails: Vec<char>,
    values: Vec<V>,
}

impl<V> Default for PrefixIndex<V> {
    fn default() -> Self {
        Self {
            nodes: vec![PrefixNode::default()],
            tails: vec![],
            values: vec![],
        }
    }
}

impl<V> PrefixIndex<V> {
    /// 空のインデックスを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録されている単語数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 単語が1つも登録されていない場合に`true`を返します。
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// ルートを含む内部ノード数を返します。
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 単語と値の対応を追加します。
    ///
    /// すでに登録されている単語の場合は値を置き換え、以前の値を返します。
    ///
    /// # エラー
    ///
    /// 空の単語は[`HansegError::InvalidEntry`]として拒否され、インデックスは変更されません。
    pub fn insert(&mut self, word: &str, value: V) -> Result<Option<V>> {
        if word.is_empty() {
            return Err(HansegError::invalid_entry(word, "a word must not be empty"));
        }
        let key: Vec<char> = word.chars().collect();

        let mut node = ROOT;
        let mut pos = 0;
        loop {
            if pos == key.len() {
                return self.set_value(node, value);
            }
            match self.find_child(node, key[pos]) {
                Err(insert_at) => {
                    let leaf = self.push_node(&key[pos..], value)?;
                    self.nodes[usize::from_u32(node)]
                        .children
                        .insert(insert_at, leaf);
                    return Ok(None);
                }
                Ok(i) => {
                    let child = self.nodes[usize::from_u32(node)].children[i];
                    let label = self.label(child);
                    let common = label
                        .iter()
                        .zip(&key[pos..])
                        .take_while(|(a, b)| a == b)
                        .count();
                    debug_assert!(common >= 1);
                    if common == label.len() {
                        node = child;
                    } else {
                        let mid = self.split(child, common)?;
                        self.nodes[usize::from_u32(node)].children[i] = mid;
                        node = mid;
                    }
                    pos += common;
                }
            }
        }
    }

    /// 単語に完全一致する値を返します。
    pub fn get(&self, word: &str) -> Option<&V> {
        let mut node = ROOT;
        let mut chars = word.chars();
        while let Some(c) = chars.next() {
            let child = self.child(node, c)?;
            for &lc in &self.label(child)[1..] {
                if chars.next()? != lc {
                    return None;
                }
            }
            node = child;
        }
        self.value(node)
    }

    /// 単語が登録されている場合に`true`を返します。
    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    /// `input`の接頭辞となっているすべての単語を短い順に列挙します。
    ///
    /// 各要素は`(一致した文字数, 値)`です。
    #[inline]
    pub fn common_prefix_iterator<'a>(&'a self, input: &'a [char]) -> CommonPrefixIter<'a, V> {
        CommonPrefixIter {
            index: self,
            input,
            node: ROOT,
            pos: 0,
        }
    }

    /// `input`の接頭辞となっている最長の単語を返します。
    #[inline]
    pub fn longest_prefix<'a>(&'a self, input: &'a [char]) -> Option<(usize, &'a V)> {
        self.common_prefix_iterator(input).last()
    }

    /// 登録されているすべての単語と値を、文字の辞書順に列挙します。
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            index: self,
            stack: vec![(ROOT, 0)],
            prefix: vec![],
        }
    }

    #[inline(always)]
    fn label(&self, node: u32) -> &[char] {
        let n = &self.nodes[usize::from_u32(node)];
        let start = usize::from_u32(n.tail_start);
        &self.tails[start..start + usize::from_u32(n.tail_len)]
    }

    #[inline(always)]
    fn value(&self, node: u32) -> Option<&V> {
        self.nodes[usize::from_u32(node)]
            .value
            .map(|i| &self.values[usize::from_u32(i)])
    }

    #[inline(always)]
    fn find_child(&self, node: u32, c: char) -> std::result::Result<usize, usize> {
        self.nodes[usize::from_u32(node)]
            .children
            .binary_search_by_key(&c, |&child| {
                self.tails[usize::from_u32(self.nodes[usize::from_u32(child)].tail_start)]
            })
    }

    #[inline(always)]
    fn child(&self, node: u32, c: char) -> Option<u32> {
        self.find_child(node, c)
            .ok()
            .map(|i| self.nodes[usize::from_u32(node)].children[i])
    }

    fn set_value(&mut self, node: u32, value: V) -> Result<Option<V>> {
        match self.nodes[usize::from_u32(node)].value {
            Some(i) => Ok(Some(std::mem::replace(
                &mut self.values[usize::from_u32(i)],
                value,
            ))),
            None => {
                let i = u32::try_from(self.values.len())?;
                self.values.push(value);
                self.nodes[usize::from_u32(node)].value = Some(i);
                Ok(None)
            }
        }
    }

    fn push_node(&mut self, label: &[char], value: V) -> Result<u32> {
        let id = u32::try_from(self.nodes.len())?;
        let tail_start = u32::try_from(self.tails.len())?;
        self.tails.extend_from_slice(label);
        self.nodes.push(PrefixNode {
            tail_start,
            tail_len: u32::try_from(label.len())?,
            children: vec![],
            value: None,
        });
        self.set_value(id, value)?;
        Ok(id)
    }

    // Splits the label of `node` after `at` characters. The returned node takes
    // the first half and becomes the parent of `node`.
    fn split(&mut self, node: u32, at: usize) -> Result<u32> {
        let at = u32::try_from(at)?;
        let id = u32::try_from(self.nodes.len())?;
        let lower = &mut self.nodes[usize::from_u32(node)];
        debug_assert!(0 < at && at < lower.tail_len);
        let mid = PrefixNode {
            tail_start: lower.tail_start,
            tail_len: at,
            children: vec![node],
            value: None,
        };
        lower.tail_start += at;
        lower.tail_len -= at;
        self.nodes.push(mid);
        Ok(id)
    }
}

impl<K, V> FromIterator<(K, V)> for PrefixIndex<V>
where
    K: AsRef<str>,
{
    /// 単語と値の組からインデックスを構築します。
    ///
    /// 空の単語は読み飛ばされます。
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut index = Self::new();
        for (word, value) in iter {
            if let Err(e) = index.insert(word.as_ref(), value) {
                log::warn!("[hanseg] Skipped an entry while collecting a prefix index: {e}");
            }
        }
        index
    }
}

impl<V> PartialEq for PrefixIndex<V>
where
    V: PartialEq,
{
    /// 内部構造ではなく、単語と値の対応が等しいかどうかを比較します。
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V> fmt::Debug for PrefixIndex<V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// [`PrefixIndex::common_prefix_iterator`]が返すイテレータ
pub struct CommonPrefixIter<'a, V> {
    index: &'a PrefixIndex<V>,
    input: &'a [char],
    node: u32,
    pos: usize,
}

impl<'a, V> Iterator for CommonPrefixIter<'a, V> {
    type Item = (usize, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.input.len() {
            let child = match self.index.child(self.node, self.input[self.pos]) {
                Some(child) => child,
                None => {
                    self.pos = self.input.len();
                    return None;
                }
            };
            let label = self.index.label(child);
            if !self.input[self.pos..].starts_with(label) {
                self.pos = self.input.len();
                return None;
            }
            self.node = child;
            self.pos += label.len();
            if let Some(value) = self.index.value(child) {
                return Some((self.pos, value));
            }
        }
        None
    }
}

/// [`PrefixIndex::iter`]が返すイテレータ
pub struct Iter<'a, V> {
    index: &'a PrefixIndex<V>,
    // (node, length of the prefix above the node's label)
    stack: Vec<(u32, usize)>,
    prefix: Vec<char>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (String, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, base)) = self.stack.pop() {
            self.prefix.truncate(base);
            self.prefix.extend_from_slice(self.index.label(node));
            let depth = self.prefix.len();
            for &child in self.index.nodes[usize::from_u32(node)].children.iter().rev() {
                self.stack.push((child, depth));
            }
            if let Some(value) = self.index.value(node) {
                return Some((self.prefix.iter().collect(), value));
            }
        }
        None
    }
}
