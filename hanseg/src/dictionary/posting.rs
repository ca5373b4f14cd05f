//! ポスティングリスト
//!
//! 同じ表層形を持つ複数のエントリIDをまとめて管理します。

use crate::errors::Result;
use crate::utils::FromU32;

#[derive(Clone, Debug, Default)]
pub struct Postings {
    // Sets of ids are stored by interleaving their length and values.
    data: Vec<u32>,
}

impl Postings {
    #[inline(always)]
    pub fn ids(&'_ self, i: usize) -> impl Iterator<Item = u32> + '_ {
        let len = usize::from_u32(self.data[i]);
        self.data[i + 1..i + 1 + len].iter().cloned()
    }
}

#[derive(Default)]
pub struct PostingsBuilder {
    data: Vec<u32>,
}

impl PostingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn push(&mut self, ids: &[u32]) -> Result<u32> {
        let offset = u32::try_from(self.data.len())?;
        self.data.push(ids.len().try_into()?);
        self.data.extend_from_slice(ids);
        Ok(offset)
    }

    pub fn build(self) -> Postings {
        Postings { data: self.data }
    }
}
