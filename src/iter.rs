use crate::value::Value;
use crate::{PipeErr, PipeRes};
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;

/// 拉取式游标。一旦返回结束或失败，此后的每次拉取都返回结束，失败详情不会在重试时再次给出。
pub struct Iter {
    iter: Box<dyn Iterator<Item = PipeRes<Value>>>,
    exhausted: bool,
}

impl Iterator for Iter {
    type Item = PipeRes<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.iter.next() {
            Some(Ok(value)) => Some(Ok(value)),
            other => {
                self.exhausted = true;
                other
            }
        }
    }
}

impl FusedIterator for Iter {}

impl Debug for Iter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iter").field("exhausted", &self.exhausted).finish()
    }
}

impl Iter {
    /// 包装已有迭代器。
    pub fn new(iter: impl Iterator<Item = PipeRes<Value>> + 'static) -> Iter {
        Iter { iter: Box::new(iter), exhausted: false }
    }

    pub fn empty() -> Iter {
        Iter { iter: Box::new(std::iter::empty()), exhausted: true }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// 拉取到结束，返回全部元素或首个失败。
    pub fn to_vec(self) -> PipeRes<Vec<Value>> {
        self.collect()
    }

    /// 先产出自身元素，自身正常结束后再产出`other`的元素；自身失败时不会切换。
    pub fn join(self, other: Iter) -> Iter {
        Iter::new(JoinIter { first: self, second: other, switched: false })
    }

    /// 物化后倒序产出，仅适用于有限序列。
    pub fn to_reversed(self) -> PipeRes<Iter> {
        let mut items = self.to_vec()?;
        items.reverse();
        Ok(Iter::new(items.into_iter().map(Ok)))
    }

    /// 物化后无限循环产出，仅适用于有限非空序列。
    pub fn to_cyclic(self) -> PipeRes<Iter> {
        let items = self.to_vec()?;
        if items.is_empty() {
            return Err(PipeErr::iterator("cyclic iterator requires at least one element"));
        }
        Ok(Iter::new(items.into_iter().cycle().map(Ok)))
    }
}

struct JoinIter {
    first: Iter,
    second: Iter,
    switched: bool,
}

impl Iterator for JoinIter {
    type Item = PipeRes<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.switched {
            match self.first.next() {
                None => self.switched = true,
                other => return other,
            }
        }
        self.second.next()
    }
}
