//! 頂点と接続のコスト計算
//!
//! 経路選択器は[`Scorer`]を通して頂点のコストと品詞間の接続コストを求めます。
//! コストは`i32`で、小さいほど好ましい経路になります。
use std::io::Read;

use hashbrown::HashMap;

use crate::errors::{HansegError, Result};
use crate::utils;

/// 文頭を表すタグ名
pub const BOS_TAG: &str = "BOS";
/// 文末を表すタグ名
pub const EOS_TAG: &str = "EOS";

/// コスト計算機能を提供するトレイト
pub trait Scorer: Send + Sync {
    /// 重みを持つ頂点のコスト
    fn word_cost(&self, weight: f32) -> i32;

    /// タグ`left`の頂点の直後にタグ`right`の頂点が続く場合の接続コスト
    ///
    /// `None`は文頭（`left`）または文末（`right`）を表します。
    fn transition_cost(&self, left: Option<&str>, right: Option<&str>) -> i32 {
        let _ = (left, right);
        0
    }
}

/// 重み（対数頻度）に基づくデフォルトのスコアラー
///
/// 頂点のコストは`round((log_total − weight) × 100)`を0以上に切り詰めた値です。
/// ここで`log_total`はシステム辞書の全エントリの重みの対数和です。
/// 品詞接続表が設定されている場合は、その接続コストが加算されます。
#[derive(Clone, Debug, Default)]
pub struct WeightScorer {
    log_total: f32,
    transitions: Option<TransitionTable>,
}

impl WeightScorer {
    pub const fn new(log_total: f32) -> Self {
        Self {
            log_total,
            transitions: None,
        }
    }

    /// 品詞接続表を設定します。
    pub fn with_transitions(mut self, table: TransitionTable) -> Self {
        self.transitions = Some(table);
        self
    }

    #[inline(always)]
    pub const fn log_total(&self) -> f32 {
        self.log_total
    }

    pub const fn transitions(&self) -> Option<&TransitionTable> {
        self.transitions.as_ref()
    }
}

impl Scorer for WeightScorer {
    #[inline]
    fn word_cost(&self, weight: f32) -> i32 {
        // `as` saturates and maps NaN to 0.
        (((self.log_total - weight) * 100.0).round() as i32).max(0)
    }

    #[inline]
    fn transition_cost(&self, left: Option<&str>, right: Option<&str>) -> i32 {
        self.transitions
            .as_ref()
            .map_or(0, |t| t.cost(left.unwrap_or(BOS_TAG), right.unwrap_or(EOS_TAG)))
    }
}

/// 品詞間の接続コスト表
///
/// CSV形式の`左タグ,右タグ,コスト`の行から読み込みます。
/// 文頭と文末はそれぞれ[`BOS_TAG`]と[`EOS_TAG`]で表します。
/// 表にない組み合わせには`default_cost`が使われます。
///
/// # 例
///
/// ```
/// use hanseg::tokenizer::scorer::TransitionTable;
///
/// let table = TransitionTable::from_reader("BOS,nr,-50\nnr,v,10\n".as_bytes())?;
/// assert_eq!(table.cost("BOS", "nr"), -50);
/// assert_eq!(table.cost("nr", "v"), 10);
/// assert_eq!(table.cost("v", "nr"), 0);
/// # Ok::<(), hanseg::errors::HansegError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionTable {
    costs: HashMap<String, HashMap<String, i32>>,
    default_cost: i32,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続表をCSVから読み込みます。
    ///
    /// # エラー
    ///
    /// フィールドが不足している行や、コストが整数として解釈できない行がある場合、
    /// [`HansegError::InvalidFormat`]が返されます。
    pub fn from_reader<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut text = String::new();
        rdr.read_to_string(&mut text)?;

        let mut table = Self::new();
        for (line_no, line) in utils::content_lines(&text) {
            let fields = utils::parse_csv_row(line)?;
            if fields.len() < 3 {
                let msg = format!(
                    "line {line_no}: a row must have three items (left,right,cost), {line:?}"
                );
                return Err(HansegError::invalid_format("transition.csv", msg));
            }
            let cost: i32 = fields[2].trim().parse().map_err(|e| {
                HansegError::invalid_format("transition.csv", format!("line {line_no}: {e}, {line:?}"))
            })?;
            table.insert(fields[0].trim(), fields[1].trim(), cost);
        }
        log::debug!(
            "[hanseg] Loaded a transition table: {} rows",
            table.costs.values().map(HashMap::len).sum::<usize>()
        );
        Ok(table)
    }

    /// 接続コストを設定します。
    pub fn insert<L, R>(&mut self, left: L, right: R, cost: i32)
    where
        L: Into<String>,
        R: Into<String>,
    {
        self.costs
            .entry(left.into())
            .or_default()
            .insert(right.into(), cost);
    }

    /// 表にない組み合わせのコストを設定します。
    pub const fn default_cost(mut self, cost: i32) -> Self {
        self.default_cost = cost;
        self
    }

    /// 接続コストを返します。
    #[inline]
    pub fn cost(&self, left: &str, right: &str) -> i32 {
        self.costs
            .get(left)
            .and_then(|m| m.get(right))
            .copied()
            .unwrap_or(self.default_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::utils::hashmap;

    #[test]
    fn test_word_cost() {
        let scorer = WeightScorer::new(10.0);
        assert_eq!(scorer.word_cost(10.0), 0);
        assert_eq!(scorer.word_cost(8.0), 200);
        assert_eq!(scorer.word_cost(9.996), 0);
        assert_eq!(scorer.word_cost(12.0), 0);
        assert_eq!(scorer.word_cost(f32::NEG_INFINITY), i32::MAX);
        assert_eq!(scorer.transition_cost(None, Some("n")), 0);
    }

    #[test]
    fn test_transition_table() {
        let csv = "# left,right,cost\r\nBOS,nr,-50\r\nnr,v,10\n\n  # tail\nv,EOS,3\r\n";
        let table = TransitionTable::from_reader(csv.as_bytes()).unwrap();
        let expected = hashmap![
            "BOS".to_string() => hashmap!["nr".to_string() => -50],
            "nr".to_string() => hashmap!["v".to_string() => 10],
            "v".to_string() => hashmap!["EOS".to_string() => 3],
        ];
        assert_eq!(table.costs, expected);

        let scorer = WeightScorer::new(0.0).with_transitions(table.default_cost(7));
        assert_eq!(scorer.transition_cost(None, Some("nr")), -50);
        assert_eq!(scorer.transition_cost(Some("v"), None), 3);
        assert_eq!(scorer.transition_cost(Some("n"), Some("n")), 7);
    }

    #[test]
    fn test_transition_table_bad_rows() {
        let result = TransitionTable::from_reader("BOS,nr\n".as_bytes());
        assert!(matches!(result, Err(HansegError::InvalidFormat(_))));

        let result = TransitionTable::from_reader("BOS,nr,low\n".as_bytes());
        assert!(matches!(result, Err(HansegError::InvalidFormat(_))));
    }
}
