//! エラー型の定義
//!
//! このモジュールは、hansegで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt::{self, Debug};

/// hanseg専用のResult型
///
/// エラー型としてデフォルトで[`HansegError`]を使用します。
pub type Result<T, E = HansegError> = std::result::Result<T, E>;

/// hansegのエラー型
///
/// 各バリアントは特定のエラー条件に対応しています。
#[derive(Debug, thiserror::Error)]
pub enum HansegError {
    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 無効なフォーマットエラー
    ///
    /// [`InvalidFormatError`]のエラーバリアント。
    #[error(transparent)]
    InvalidFormat(InvalidFormatError),

    /// 無効な辞書エントリ
    ///
    /// 空の単語や有限でない重みを持つエントリを登録しようとした場合に発生します。
    /// 辞書構築時にはビルド全体を中断せず、警告リストとして呼び出し元に返されます。
    #[error(transparent)]
    InvalidEntry(InvalidEntryError),

    /// ラティスの終端に到達できないエラー
    ///
    /// パイプラインのステージがカバレッジ不変条件を壊したことを示す設定上の欠陥です。
    /// 入力データの問題ではないため、回復は試みません。
    #[error(transparent)]
    LatticeUnreachable(LatticeUnreachableError),

    /// 整数変換エラー
    #[error(transparent)]
    TryFromInt(std::num::TryFromIntError),

    /// 浮動小数点数パースエラー
    #[error(transparent)]
    ParseFloat(std::num::ParseFloatError),

    /// 整数パースエラー
    #[error(transparent)]
    ParseInt(std::num::ParseIntError),

    /// UTF-8エンコーディングエラー
    #[error(transparent)]
    Utf8(std::str::Utf8Error),

    /// 正規表現のコンパイルエラー
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// I/Oエラー
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HansegError {
    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    /// 無効なフォーマットエラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - フォーマット名
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_format<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidFormat(InvalidFormatError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_entry<W, S>(word: W, msg: S) -> Self
    where
        W: Into<String>,
        S: Into<String>,
    {
        Self::InvalidEntry(InvalidEntryError::new(word, msg))
    }

    pub(crate) const fn lattice_unreachable(len_char: usize) -> Self {
        Self::LatticeUnreachable(LatticeUnreachableError { len_char })
    }
}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

/// 入力フォーマットが無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidFormatError {
    /// フォーマットの名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidFormatError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidFormatError {}

/// 辞書エントリが無効な場合に使用されるエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEntryError {
    pub(crate) word: String,
    pub(crate) msg: String,
}

impl InvalidEntryError {
    pub(crate) fn new<W, S>(word: W, msg: S) -> Self
    where
        W: Into<String>,
        S: Into<String>,
    {
        Self {
            word: word.into(),
            msg: msg.into(),
        }
    }

    /// 拒否されたエントリの単語
    pub fn word(&self) -> &str {
        &self.word
    }

    /// 拒否された理由
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for InvalidEntryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidEntryError: {:?}: {}", self.word, self.msg)
    }
}

impl Error for InvalidEntryError {}

/// 位置0から文末までの経路が存在しない場合に使用されるエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeUnreachableError {
    pub(crate) len_char: usize,
}

impl LatticeUnreachableError {
    /// 対象となった入力の文字数
    pub const fn len_char(&self) -> usize {
        self.len_char
    }
}

impl fmt::Display for LatticeUnreachableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "LatticeUnreachableError: no path covers [0, {}); a pipeline stage broke the coverage invariant",
            self.len_char
        )
    }
}

impl Error for LatticeUnreachableError {}

impl From<std::num::TryFromIntError> for HansegError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::TryFromInt(error)
    }
}

impl From<std::num::ParseFloatError> for HansegError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::ParseFloat(error)
    }
}

impl From<std::num::ParseIntError> for HansegError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::ParseInt(error)
    }
}

impl From<std::str::Utf8Error> for HansegError {
    fn from(error: std::str::Utf8Error) -> Self {
        Self::Utf8(error)
    }
}
