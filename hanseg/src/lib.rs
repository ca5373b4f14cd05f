//! # hanseg
//!
//! hansegは、単語の区切りが明示されない言語（中国語など）のテキストを
//! 品詞タグ付きの語の列に分割する、ラティスに基づく分かち書きエンジンです。
//!
//! ## 概要
//!
//! 入力文は次の順に処理されます。
//!
//! 1. 文字の正規化（全角→半角、英字の小文字化）
//! 2. 辞書の走査（Aho–Corasick法による全出現の列挙）
//! 3. 辞書語と1文字のフォールバックによるラティスの構築
//! 4. パイプラインの各ステージによるラティスの変更
//!    （数字列、数量詞、メールアドレス・URL、カスタム辞書、固有表現）
//! 5. 動的計画法による最良経路の選択
//! 6. 空白を除いた語の列の出力
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use hanseg::dictionary::DictionaryBuilder;
//! use hanseg::Tokenizer;
//!
//! let dictionary_csv = "北京,8.0,ns
//! 大学,8.0,n
//! 北京大学,9.0,nt
//! 个,6.0,q";
//!
//! let (dict, warnings) = DictionaryBuilder::from_reader(dictionary_csv.as_bytes())?.build()?;
//! assert!(warnings.is_empty());
//!
//! let tokenizer = Tokenizer::new(dict)?;
//! let mut worker = tokenizer.new_worker();
//!
//! worker.reset_sentence("北京大学生 3个");
//! worker.tokenize()?;
//!
//! let terms: Vec<_> = worker
//!     .term_iter()
//!     .map(|t| (t.word(), t.tag(), t.offset()))
//!     .collect();
//! assert_eq!(
//!     terms,
//!     [("北京大学", "nt", 0), ("生", "x", 4), ("3个", "mq", 6)],
//! );
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

/// 辞書データ構造とビルダー
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 文字の正規化
pub mod normalize;

/// 文の内部表現
pub mod sentence;

/// 分かち書きの結果の型
pub mod term;

/// トークナイザーの実装
pub mod tokenizer;

mod utils;


// Re-exports
pub use dictionary::{Dictionary, DictionaryBuilder};
pub use term::{WordTerm, WordTermBuf};
pub use tokenizer::Tokenizer;
pub use tokenizer::config::TokenizerConfig;

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
