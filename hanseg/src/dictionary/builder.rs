//! 辞書構築のためのビルダー
//!
//! `(単語, 重み, タグ)`の組、またはCSV形式のテキストから[`Dictionary`]を構築します。
//! 無効なエントリはビルド全体を中断せずに読み飛ばされ、警告リストとして返されます。

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use crate::dictionary::entry::{DictionaryEntry, LexType};
use crate::dictionary::posting::PostingsBuilder;
use crate::dictionary::scanner::Scanner;
use crate::dictionary::trie::PrefixIndex;
use crate::dictionary::unknown::{AbstractWord, UnkHandler};
use crate::dictionary::Dictionary;
use crate::errors::{HansegError, InvalidEntryError, Result};
use crate::normalize::{CharNormalizer, DefaultNormalizer};
use crate::utils::{self, FromU32};

/// [`Dictionary`]のビルダー
///
/// 同じ単語・同じタグのエントリが複数回追加された場合は後勝ちで重みが更新されます。
/// タグが異なる場合は別のエントリとして保持され、ラティス上で曖昧性が解消されます。
///
/// 照合に使われるキーは、単語を[`normalizer`](Self::normalizer)で正規化したものです
/// （デフォルトは[`DefaultNormalizer`]）。エントリの表層形は元の綴りのまま保持されます。
///
/// # 例
///
/// ```
/// use hanseg::dictionary::DictionaryBuilder;
///
/// let mut builder = DictionaryBuilder::new();
/// builder.push("北京", 8.0, "ns");
/// builder.push("大学", 8.0, "n");
/// builder.push("", 1.0, "x");
///
/// let (dict, warnings) = builder.build()?;
/// assert_eq!(dict.len(), 2);
/// assert_eq!(warnings.len(), 1);
/// # Ok::<(), hanseg::errors::HansegError>(())
/// ```
pub struct DictionaryBuilder {
    lex_type: LexType,
    words: BTreeMap<String, Vec<u32>>,
    entries: Vec<DictionaryEntry>,
    warnings: Vec<InvalidEntryError>,
    abstract_words: Vec<(AbstractWord, String, f32)>,
    normalizer: Arc<dyn CharNormalizer>,
}

impl Default for DictionaryBuilder {
    fn default() -> Self {
        Self::with_lex_type(LexType::System)
    }
}

impl DictionaryBuilder {
    /// システム辞書用のビルダーを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// カスタム辞書用のビルダーを作成します。
    pub fn custom() -> Self {
        Self::with_lex_type(LexType::User)
    }

    fn with_lex_type(lex_type: LexType) -> Self {
        Self {
            lex_type,
            words: BTreeMap::new(),
            entries: vec![],
            warnings: vec![],
            abstract_words: vec![],
            normalizer: Arc::new(DefaultNormalizer),
        }
    }

    /// エントリを追加します。
    ///
    /// 空の単語や有限でない重みを持つエントリは追加されず、警告として記録されます。
    pub fn push<W, T>(&mut self, word: W, weight: f32, tag: T)
    where
        W: Into<String>,
        T: Into<String>,
    {
        let word = word.into();
        let tag = tag.into();

        let rejected = if word.is_empty() {
            Some("a word must not be empty")
        } else if !weight.is_finite() {
            Some("a weight must be a finite number")
        } else {
            None
        };
        if let Some(msg) = rejected {
            log::warn!("[hanseg] Skipped a dictionary entry {word:?}: {msg}");
            self.warnings.push(InvalidEntryError::new(word, msg));
            return;
        }

        let Ok(index) = u32::try_from(self.entries.len()) else {
            log::warn!("[hanseg] Skipped a dictionary entry {word:?}: too many entries");
            self.warnings
                .push(InvalidEntryError::new(word, "too many entries"));
            return;
        };
        let entries = &mut self.entries;
        let ids = self.words.entry(word.clone()).or_default();
        if let Some(&id) = ids
            .iter()
            .find(|&&id| entries[usize::from_u32(id)].tag == tag)
        {
            entries[usize::from_u32(id)].weight = weight;
            return;
        }
        ids.push(index);
        entries.push(DictionaryEntry {
            word,
            weight,
            tag,
            index,
        });
    }

    /// CSV形式のテキストからビルダーを作成します。
    ///
    /// 各行は`単語,重み,タグ`の形式です。空行と`#`で始まる行は無視されます。
    ///
    /// # エラー
    ///
    /// フィールドが不足している行や、重みが数値として解釈できない行がある場合、
    /// [`HansegError::InvalidFormat`]が返されます。
    pub fn from_reader<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut text = String::new();
        rdr.read_to_string(&mut text)?;

        let mut builder = Self::new();
        builder.read_csv(&text, "dictionary.csv")?;
        Ok(builder)
    }

    /// CSV形式のテキストからカスタム辞書用のビルダーを作成します。
    pub fn custom_from_reader<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut text = String::new();
        rdr.read_to_string(&mut text)?;

        let mut builder = Self::custom();
        builder.read_csv(&text, "custom.csv")?;
        Ok(builder)
    }

    fn read_csv(&mut self, text: &str, name: &'static str) -> Result<()> {
        for (line_no, line) in utils::content_lines(text) {
            let fields = utils::parse_csv_row(line)?;
            if fields.len() < 3 {
                let msg = format!(
                    "line {line_no}: a row must have three items (word,weight,tag), {line:?}"
                );
                return Err(HansegError::invalid_format(name, msg));
            }
            let weight: f32 = fields[1].trim().parse().map_err(|e| {
                HansegError::invalid_format(name, format!("line {line_no}: {e}, {line:?}"))
            })?;
            self.push(fields[0].as_str(), weight, fields[2].trim());
        }
        Ok(())
    }

    /// 抽象語カテゴリのタグと重みを指定します。
    ///
    /// 辞書中の抽象語キーから得られた値よりも優先されます。
    pub fn abstract_word<S>(mut self, word: AbstractWord, tag: S, weight: f32) -> Self
    where
        S: Into<String>,
    {
        self.abstract_words.push((word, tag.into(), weight));
        self
    }

    /// 照合キーの正規化器を指定します。
    ///
    /// 入力文と同じ規則で正規化しないと、辞書語は入力に一致しません。
    /// [`Tokenizer`](crate::Tokenizer)はシステム辞書の正規化器を入力文にも使います。
    pub fn normalizer<N>(mut self, normalizer: N) -> Self
    where
        N: CharNormalizer + 'static,
    {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// これまでに記録された警告
    pub fn warnings(&self) -> &[InvalidEntryError] {
        &self.warnings
    }

    /// 辞書を構築します。
    ///
    /// # 戻り値
    ///
    /// 構築された辞書と、読み飛ばされたエントリの警告リスト
    pub fn build(self) -> Result<(Dictionary, Vec<InvalidEntryError>)> {
        // Spellings that normalize to the same key share one posting list.
        let mut keys: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for (word, ids) in &self.words {
            let key: String = word
                .chars()
                .map(|c| self.normalizer.normalize_char(c))
                .collect();
            keys.entry(key).or_default().extend(ids);
        }

        let mut index = PrefixIndex::new();
        let mut postings = PostingsBuilder::new();
        for (key, ids) in &mut keys {
            ids.sort_unstable();
            let offset = postings.push(ids)?;
            index.insert(key, offset)?;
        }
        let scanner = Scanner::new(&index)?;

        let mut unk_handler = UnkHandler::from_entries(&self.entries);
        for (word, tag, weight) in self.abstract_words {
            unk_handler.set(word, tag, weight);
        }

        let log_total = log_sum_exp(self.entries.iter().map(|e| e.weight));

        log::debug!(
            "[hanseg] Built a {:?} dictionary: {} entries, {} words, {} trie nodes, {} skipped",
            self.lex_type,
            self.entries.len(),
            index.len(),
            index.num_nodes(),
            self.warnings.len(),
        );

        let dict = Dictionary {
            index,
            scanner,
            postings: postings.build(),
            entries: self.entries,
            unk_handler,
            lex_type: self.lex_type,
            log_total,
            normalizer: self.normalizer,
        };
        Ok((dict, self.warnings))
    }
}

impl<W, T> Extend<(W, f32, T)> for DictionaryBuilder
where
    W: Into<String>,
    T: Into<String>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (W, f32, T)>,
    {
        for (word, weight, tag) in iter {
            self.push(word, weight, tag);
        }
    }
}

// ln(sum(exp(w))) computed without overflow.
fn log_sum_exp<I>(weights: I) -> f32
where
    I: Iterator<Item = f32> + Clone,
{
    let max = weights.clone().fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        return 0.0;
    }
    let sum: f64 = weights.map(|w| f64::from(w - max).exp()).sum();
    max + sum.ln() as f32
}
