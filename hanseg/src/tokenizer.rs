//! ラティスに基づく分かち書きのトークナイザー。
//!
//! このモジュールは、分かち書きを行うメインのトークナイザーを提供します。
//! 入力文は次の順に処理されます。
//!
//! 1. 文字の正規化（[`CharNormalizer`]）
//! 2. 辞書の走査と、1文字のフォールバックによるラティスの構築
//! 3. パイプラインの各ステージによるラティスの変更
//! 4. 最良経路の選択
//!
//! # 主要な構造体
//!
//! - [`Tokenizer`]: 辞書と設定を保持するトークナイザー
//! - [`Worker`]: トークナイザーのワーカー。実際の解析処理を行う
//!
//! # 例
//!
//! ```
//! use hanseg::dictionary::DictionaryBuilder;
//! use hanseg::Tokenizer;
//!
//! let mut builder = DictionaryBuilder::new();
//! builder.extend([("北京", 8.0, "ns"), ("大学", 8.0, "n"), ("北京大学", 9.0, "nt")]);
//! let (dict, _) = builder.build()?;
//!
//! let tokenizer = Tokenizer::new(dict)?;
//! let mut worker = tokenizer.new_worker();
//!
//! worker.reset_sentence("北京大学生");
//! worker.tokenize()?;
//!
//! let words: Vec<_> = worker.term_iter().map(|t| t.word()).collect();
//! assert_eq!(words, ["北京大学", "生"]);
//! # Ok::<(), hanseg::errors::HansegError>(())
//! ```
pub mod config;
pub mod lattice;
pub mod path;
pub mod pipeline;
pub mod scorer;
pub mod worker;

use std::sync::Arc;

use crate::dictionary::{Dictionary, LexType, Lexicons};
use crate::errors::{HansegError, Result};
use crate::normalize::CharNormalizer;
use crate::sentence::Sentence;
use crate::term::WordTermBuf;
use crate::tokenizer::config::TokenizerConfig;
use crate::tokenizer::lattice::Lattice;
use crate::tokenizer::path::PathAlgorithm;
use crate::tokenizer::pipeline::{Pipeline, StageContext};
use crate::tokenizer::scorer::{Scorer, WeightScorer};
use crate::tokenizer::worker::Worker;

/// 分かち書きを行うトークナイザー。
///
/// `Tokenizer`は辞書、ステージの連鎖、スコアラー、正規化器への共有参照を保持します。
/// 複製は安価で、複数のスレッドから同時に使用できます。
/// 実際の解析は[`Worker`]が行い、ワーカーはスレッドごとに作成します。
///
/// 設定を変更するメソッドは新しい`Tokenizer`を返します。
/// 既存のトークナイザーとそのワーカーは影響を受けません。
#[derive(Clone)]
pub struct Tokenizer {
    dict: Arc<Dictionary>,
    user_dict: Option<Arc<Dictionary>>,
    pipeline: Pipeline,
    scorer: Arc<dyn Scorer>,
    normalizer: Arc<dyn CharNormalizer>,
    path_algorithm: PathAlgorithm,
}

impl Tokenizer {
    /// デフォルトの設定で新しいトークナイザーを作成します。
    ///
    /// 辞書はトークナイザーに所有権が移動します。複数のトークナイザー間で辞書を共有する
    /// 必要がある場合は、[`Tokenizer::from_shared_dictionary`]を使用してください。
    ///
    /// # エラー
    ///
    /// システム辞書でない辞書が渡された場合や、ステージの初期化に失敗した場合に
    /// エラーを返します。
    pub fn new(dict: Dictionary) -> Result<Self> {
        Self::from_shared_dictionary(Arc::new(dict))
    }

    /// 共有された辞書から新しいトークナイザーを作成します。
    ///
    /// # 例
    ///
    /// ```
    /// use std::sync::Arc;
    /// use hanseg::dictionary::DictionaryBuilder;
    /// use hanseg::Tokenizer;
    ///
    /// let (dict, _) = DictionaryBuilder::new().build()?;
    /// let dict = Arc::new(dict);
    /// let tokenizer1 = Tokenizer::from_shared_dictionary(dict.clone())?;
    /// let tokenizer2 = Tokenizer::from_shared_dictionary(dict)?;
    /// # Ok::<(), hanseg::errors::HansegError>(())
    /// ```
    pub fn from_shared_dictionary(dict: Arc<Dictionary>) -> Result<Self> {
        Self::with_config(dict, TokenizerConfig::default())
    }

    /// 設定を指定して新しいトークナイザーを作成します。
    ///
    /// # エラー
    ///
    /// - `dict`がシステム辞書でない場合、[`HansegError::InvalidArgument`]が返されます。
    /// - ステージの初期化に失敗した場合、そのエラーが返されます。
    pub fn with_config(dict: Arc<Dictionary>, config: TokenizerConfig) -> Result<Self> {
        if dict.lex_type() != LexType::System {
            return Err(HansegError::invalid_argument(
                "dict",
                "must be built by DictionaryBuilder::new",
            ));
        }
        let stages = config.resolved_stages();
        let pipeline = Pipeline::from_kinds(&stages)?;
        log::debug!(
            "[hanseg] Tokenizer: stages = [{}], path_algorithm = {}",
            stages
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            config.path_algorithm,
        );
        Ok(Self {
            scorer: Arc::new(WeightScorer::new(dict.log_total())),
            normalizer: dict.normalizer().clone(),
            dict,
            user_dict: config.custom_dictionary,
            pipeline,
            path_algorithm: config.path_algorithm,
        })
    }

    /// カスタム辞書を差し替えます。
    ///
    /// カスタム辞書は`custom_dictionary`ステージによって適用されます。
    /// ステージ構成にこのステージが含まれない場合、カスタム辞書は使用されません。
    ///
    /// # エラー
    ///
    /// [`DictionaryBuilder::custom`](crate::dictionary::DictionaryBuilder::custom)で
    /// 構築されていない辞書が渡された場合、[`HansegError::InvalidArgument`]が返されます。
    pub fn custom_dictionary<D>(mut self, dict: D) -> Result<Self>
    where
        D: Into<Arc<Dictionary>>,
    {
        let dict = dict.into();
        if dict.lex_type() != LexType::User {
            return Err(HansegError::invalid_argument(
                "custom_dictionary",
                "must be built by DictionaryBuilder::custom",
            ));
        }
        if !self.pipeline.names().any(|name| name == "custom_dictionary") {
            log::warn!("[hanseg] A custom dictionary is set, but the custom_dictionary stage is not configured");
        }
        self.user_dict = Some(dict);
        Ok(self)
    }

    /// スコアラーを差し替えます。
    pub fn scorer<S>(mut self, scorer: S) -> Self
    where
        S: Scorer + 'static,
    {
        self.scorer = Arc::new(scorer);
        self
    }

    /// 文字の正規化器を差し替えます。
    ///
    /// デフォルトはシステム辞書の構築に使われた正規化器です。辞書の照合キーは
    /// 構築時に正規化されているため、辞書も同じ規則で構築する必要があります。
    pub fn normalizer<N>(mut self, normalizer: N) -> Self
    where
        N: CharNormalizer + 'static,
    {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// 経路選択のアルゴリズムを指定します。
    pub const fn path_algorithm(mut self, algorithm: PathAlgorithm) -> Self {
        self.path_algorithm = algorithm;
        self
    }

    /// パイプラインを差し替えます。
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// システム辞書
    #[inline(always)]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// カスタム辞書
    #[inline(always)]
    pub fn user_dictionary(&self) -> Option<&Dictionary> {
        self.user_dict.as_deref()
    }

    /// ステージの連鎖
    #[inline(always)]
    pub fn stages(&self) -> &Pipeline {
        &self.pipeline
    }

    #[inline(always)]
    pub(crate) fn scorer_ref(&self) -> &dyn Scorer {
        &*self.scorer
    }

    #[inline(always)]
    pub(crate) const fn selected_algorithm(&self) -> PathAlgorithm {
        self.path_algorithm
    }

    #[inline(always)]
    pub(crate) fn char_normalizer(&self) -> &dyn CharNormalizer {
        &*self.normalizer
    }

    /// システム辞書とカスタム辞書をまとめた語彙
    #[inline(always)]
    pub fn lexicons(&self) -> Lexicons<'_> {
        Lexicons::new(&self.dict, self.user_dict.as_deref())
    }

    /// 新しいワーカーを作成します。
    ///
    /// ワーカーは解析の作業領域を保持します。各ワーカーは独立しているため、
    /// スレッドごとにワーカーを作成すれば複数の文を並列に解析できます。
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }

    /// 文を分かち書きし、空白を除いた語の列を返します。
    ///
    /// 多数の文を処理する場合は、[`Worker`]を再利用する方が効率的です。
    ///
    /// # エラー
    ///
    /// [`Worker::tokenize`]と同じです。
    pub fn segment<S>(&self, input: S) -> Result<Vec<WordTermBuf>>
    where
        S: AsRef<str>,
    {
        let mut worker = self.new_worker();
        worker.reset_sentence(input);
        worker.tokenize()?;
        Ok(worker.term_iter().map(|t| t.to_buf()).collect())
    }

    /// ラティスを構築し、パイプラインを適用します。
    pub(crate) fn build_lattice(&self, sent: &Sentence, lattice: &mut Lattice) {
        let matches = self.dict.scan(sent.chars());
        lattice.build(sent, &matches, self.dict.unk_handler());
        let ctx = StageContext::new(sent, self.lexicons());
        self.pipeline.apply(lattice, &ctx);
    }
}
