use crate::conv::IntoValue;
use crate::iter::Iter;
use crate::value::Value;
use crate::{Integer, PipeErr, PipeRes};
use std::sync::mpsc::Receiver;

impl Iter {
    /// 由动态值构造：空值为空迭代器，序列和队列逐个产出元素，映射产出键值对，其他值作为单个元素。
    pub fn from_value(value: Value) -> Iter {
        match value {
            Value::Nil => Iter::empty(),
            Value::Array(seq) | Value::List(seq) | Value::Queue(seq) => Iter::new(seq.into_items().into_iter().map(Ok)),
            Value::Map(dict) => Iter::new(dict.into_entries().into_iter().map(|(k, v)| Ok(Value::pair(k, v)))),
            scalar => Iter::once(scalar),
        }
    }

    pub fn once(value: impl IntoValue) -> Iter {
        Iter::new(std::iter::once(Ok(value.into_value())))
    }

    /// 首次拉取即失败的迭代器。
    pub fn error(err: PipeErr) -> Iter {
        Iter::new(std::iter::once(Err(err)))
    }

    /// 由生成函数构造，函数返回`None`表示结束。
    pub fn from_fn(f: impl FnMut() -> Option<PipeRes<Value>> + 'static) -> Iter {
        Iter::new(std::iter::from_fn(f))
    }

    pub fn from_values<T, I>(values: I) -> Iter
    where
        T: IntoValue,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Iter::new(values.into_iter().map(|value| Ok(value.into_value())))
    }

    pub fn from_array<T: IntoValue + 'static, const N: usize>(values: [T; N]) -> Iter {
        Iter::from_values(values)
    }

    /// 映射的每个条目作为键值对产出。
    pub fn from_map<K, V, I>(entries: I) -> Iter
    where
        K: IntoValue,
        V: IntoValue,
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: 'static,
    {
        Iter::new(entries.into_iter().map(|(k, v)| Ok(Value::pair(k.into_value(), v.into_value()))))
    }

    /// 从通道接收元素，拉取时阻塞直到收到元素或发送端全部关闭。
    pub fn from_receiver<T: IntoValue + 'static>(rx: Receiver<T>) -> Iter {
        Iter::new(rx.into_iter().map(|value| Ok(value.into_value())))
    }

    /// 从通道接收元素或失败，通常与`Iter::pump`配对。
    pub fn from_results(rx: Receiver<PipeRes<Value>>) -> Iter {
        Iter::new(rx.into_iter())
    }
}

/// 等差整数序列构造器，默认`[0, 0)`步长为1。
/// 终点按步长方向判断：正步长产出小于终点的值，负步长产出大于终点的值，
/// 如`start(5).stop(0).step(-2)`产出`5, 3, 1`。步长为0时在起点小于终点的情况下重复产出起点。
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RangeBuilder {
    start: Integer,
    stop: Integer,
    step: Integer,
    infinite: bool,
}

impl Default for RangeBuilder {
    fn default() -> Self {
        RangeBuilder { start: 0, stop: 0, step: 1, infinite: false }
    }
}

impl RangeBuilder {
    pub fn new() -> RangeBuilder {
        RangeBuilder::default()
    }

    pub fn start(self, start: Integer) -> RangeBuilder {
        RangeBuilder { start, ..self }
    }

    pub fn stop(self, stop: Integer) -> RangeBuilder {
        RangeBuilder { stop, ..self }
    }

    pub fn step(self, step: Integer) -> RangeBuilder {
        RangeBuilder { step, ..self }
    }

    /// 忽略终点，无限产出。
    pub fn infinite(self) -> RangeBuilder {
        RangeBuilder { infinite: true, ..self }
    }

    pub fn build(self) -> Iter {
        let RangeBuilder { start, stop, step, infinite } = self;
        Iter::new(RangeIter { next: Some(start), stop, step, infinite }.map(|i| Ok(Value::Int(i))))
    }
}

#[derive(Debug, Eq, PartialEq)]
struct RangeIter {
    next: Option<Integer>,
    stop: Integer,
    step: Integer,
    infinite: bool,
}

impl Iterator for RangeIter {
    type Item = Integer;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let in_range = self.infinite || if self.step < 0 { current > self.stop } else { current < self.stop };
        if !in_range {
            self.next = None;
            return None;
        }
        // 溢出即结束
        self.next = current.checked_add(self.step);
        Some(current)
    }
}
