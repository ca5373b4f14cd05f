//! トークナイザーの設定
//!
//! パイプラインのステージ構成、経路選択のアルゴリズム、固有表現認識の有効化、
//! カスタム辞書を[`TokenizerConfig`]にまとめます。
//!
//! 設定はコードから組み立てるほか、`キー = 値`形式のテキストからも読み込めます。
//!
//! ```text
//! # 空行と`#`で始まる行は無視されます。
//! stages = atom, number_letter, number_quantifier, common_pattern, custom_dictionary
//! path_algorithm = viterbi
//! entity_recognition = person, place
//! ```
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

use crate::dictionary::{Dictionary, LexType};
use crate::errors::{HansegError, Result};
use crate::tokenizer::path::PathAlgorithm;
use crate::tokenizer::pipeline::{
    AtomStage, CommonPatternStage, CustomDictionaryStage, NumberLetterStage,
    NumberQuantifierStage, OrganizationStage, PersonStage, PlaceStage, Stage,
};
use crate::utils;

/// 組み込みステージの種類
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// 数字・英字・漢数字・空白の連続
    Atom,
    /// 英数字の混在列
    NumberLetter,
    /// 数詞＋量詞
    NumberQuantifier,
    /// メールアドレスとURL
    CommonPattern,
    /// カスタム辞書の優先適用
    CustomDictionary,
    /// 人名
    Person,
    /// 地名
    Place,
    /// 組織名
    Organization,
}

impl StageKind {
    pub const ALL: [Self; 8] = [
        Self::Atom,
        Self::NumberLetter,
        Self::NumberQuantifier,
        Self::CommonPattern,
        Self::CustomDictionary,
        Self::Person,
        Self::Place,
        Self::Organization,
    ];

    /// デフォルトのステージ構成
    pub const DEFAULT: [Self; 5] = [
        Self::Atom,
        Self::NumberLetter,
        Self::NumberQuantifier,
        Self::CommonPattern,
        Self::CustomDictionary,
    ];

    /// 設定で使用される識別子
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Atom => "atom",
            Self::NumberLetter => "number_letter",
            Self::NumberQuantifier => "number_quantifier",
            Self::CommonPattern => "common_pattern",
            Self::CustomDictionary => "custom_dictionary",
            Self::Person => "person",
            Self::Place => "place",
            Self::Organization => "organization",
        }
    }

    /// 固有表現認識のステージであれば`true`を返します。
    pub const fn is_entity(self) -> bool {
        matches!(self, Self::Person | Self::Place | Self::Organization)
    }

    /// ステージを作成します。
    ///
    /// # エラー
    ///
    /// ステージの初期化（正規表現のコンパイルなど）に失敗した場合にエラーを返します。
    pub fn build(self) -> Result<Box<dyn Stage>> {
        let stage: Box<dyn Stage> = match self {
            Self::Atom => Box::new(AtomStage),
            Self::NumberLetter => Box::new(NumberLetterStage),
            Self::NumberQuantifier => Box::new(NumberQuantifierStage),
            Self::CommonPattern => Box::new(CommonPatternStage::new()?),
            Self::CustomDictionary => Box::new(CustomDictionaryStage),
            Self::Person => Box::new(PersonStage),
            Self::Place => Box::new(PlaceStage),
            Self::Organization => Box::new(OrganizationStage::new()),
        };
        Ok(stage)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = HansegError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                HansegError::invalid_argument("stages", format!("unknown stage {s:?}"))
            })
    }
}

/// 有効にする固有表現認識
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityRecognition {
    pub person: bool,
    pub place: bool,
    pub organization: bool,
}

impl EntityRecognition {
    /// すべての認識を有効にします。
    pub const fn all() -> Self {
        Self {
            person: true,
            place: true,
            organization: true,
        }
    }

    /// 有効な認識に対応するステージ
    pub fn kinds(self) -> Vec<StageKind> {
        let mut kinds = vec![];
        if self.person {
            kinds.push(StageKind::Person);
        }
        if self.place {
            kinds.push(StageKind::Place);
        }
        if self.organization {
            kinds.push(StageKind::Organization);
        }
        kinds
    }
}

impl FromStr for EntityRecognition {
    type Err = HansegError;

    /// `person, place`のようなカンマ区切りの列を解釈します。`all`と`none`も使えます。
    fn from_str(s: &str) -> Result<Self> {
        let mut er = Self::default();
        for item in split_list(s) {
            match item {
                "all" => er = Self::all(),
                "none" => er = Self::default(),
                "person" => er.person = true,
                "place" => er.place = true,
                "organization" => er.organization = true,
                _ => {
                    return Err(HansegError::invalid_argument(
                        "entity_recognition",
                        format!("unknown recognizer {item:?}"),
                    ));
                }
            }
        }
        Ok(er)
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|x| !x.is_empty())
}

/// トークナイザーの設定
///
/// # 例
///
/// ```
/// use hanseg::tokenizer::config::{EntityRecognition, StageKind, TokenizerConfig};
///
/// let config = TokenizerConfig::default()
///     .with_stage_ids(["atom", "custom_dictionary"])?
///     .entity_recognition(EntityRecognition { person: true, ..Default::default() });
///
/// assert_eq!(
///     config.resolved_stages(),
///     vec![StageKind::Atom, StageKind::Person, StageKind::CustomDictionary],
/// );
/// # Ok::<(), hanseg::errors::HansegError>(())
/// ```
#[derive(Clone, Debug)]
pub struct TokenizerConfig {
    /// ステージの適用順
    pub stages: Vec<StageKind>,
    /// 経路選択のアルゴリズム
    pub path_algorithm: PathAlgorithm,
    /// 有効にする固有表現認識
    pub entity_recognition: EntityRecognition,
    /// カスタム辞書
    pub custom_dictionary: Option<Arc<Dictionary>>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            stages: StageKind::DEFAULT.to_vec(),
            path_algorithm: PathAlgorithm::default(),
            entity_recognition: EntityRecognition::default(),
            custom_dictionary: None,
        }
    }
}

impl TokenizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// ステージの識別子の列からステージ構成を設定します。
    ///
    /// # エラー
    ///
    /// 未知の識別子が含まれる場合、[`HansegError::InvalidArgument`]が返されます。
    pub fn with_stage_ids<I, S>(mut self, ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stages = ids
            .into_iter()
            .map(|id| id.as_ref().trim().parse())
            .collect::<Result<_>>()?;
        Ok(self)
    }

    pub fn stages(mut self, stages: Vec<StageKind>) -> Self {
        self.stages = stages;
        self
    }

    pub const fn path_algorithm(mut self, algorithm: PathAlgorithm) -> Self {
        self.path_algorithm = algorithm;
        self
    }

    pub const fn entity_recognition(mut self, er: EntityRecognition) -> Self {
        self.entity_recognition = er;
        self
    }

    /// カスタム辞書を設定します。
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
        self.custom_dictionary = Some(dict);
        Ok(self)
    }

    /// 実際に適用されるステージの列を返します。
    ///
    /// 有効な固有表現認識のうち`stages`に含まれないものは、
    /// `custom_dictionary`ステージの直前に挿入されます。
    /// `custom_dictionary`ステージがない場合は末尾に追加されます。
    pub fn resolved_stages(&self) -> Vec<StageKind> {
        let mut stages = self.stages.clone();
        for kind in self.entity_recognition.kinds() {
            if stages.contains(&kind) {
                continue;
            }
            match stages.iter().position(|&k| k == StageKind::CustomDictionary) {
                Some(i) => stages.insert(i, kind),
                None => stages.push(kind),
            }
        }
        stages
    }

    /// `キー = 値`形式のテキストから設定を読み込みます。
    ///
    /// 使用できるキーは`stages`、`path_algorithm`、`entity_recognition`です。
    /// 書かれていないキーはデフォルト値のままです。
    ///
    /// # エラー
    ///
    /// 行の形式が不正な場合は[`HansegError::InvalidFormat`]、
    /// 値が不正な場合は[`HansegError::InvalidArgument`]が返されます。
    pub fn from_reader<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut text = String::new();
        rdr.read_to_string(&mut text)?;

        let mut config = Self::default();
        for (line_no, line) in utils::content_lines(&text) {
            let Some((key, value)) = line.split_once('=') else {
                return Err(HansegError::invalid_format(
                    "tokenizer config",
                    format!("line {line_no}: expected `key = value`, {line:?}"),
                ));
            };
            let value = value.trim();
            match key.trim() {
                "stages" => config = config.with_stage_ids(split_list(value))?,
                "path_algorithm" => config.path_algorithm = value.parse()?,
                "entity_recognition" => config.entity_recognition = value.parse()?,
                key => {
                    return Err(HansegError::invalid_format(
                        "tokenizer config",
                        format!("line {line_no}: unknown key {key:?}"),
                    ));
                }
            }
        }
        Ok(config)
    }
}
