use crate::conv::Strategy;
use crate::func::{Function, Signature};
use crate::value::{Shape, Value};
use crate::{PipeErr, PipeRes};
use std::fmt::{Display, Formatter};

fn single(results: Vec<Value>) -> PipeRes<Value> {
    results.into_iter().next().ok_or_else(|| PipeErr::Call("missing result".to_string()))
}

fn boolean(value: Value) -> PipeRes<bool> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(PipeErr::conversion(other.shape(), &Shape::Bool, "result is not a boolean")),
    }
}

fn invalid(adapter: &'static str, expected: &'static str, sig: &Signature) -> PipeErr {
    PipeErr::InvalidFunction { adapter, expected, actual: sig.clone() }
}

/// 映射函数：`fn(a) -> b`。
#[derive(Debug)]
pub struct Mapper {
    f: Function,
    strategy: Strategy,
}

impl Mapper {
    pub fn new(f: Function) -> PipeRes<Mapper> {
        let sig = f.signature();
        if sig.params.len() == 1 && sig.results.len() == 1 {
            Ok(Mapper { f, strategy: Strategy::default() })
        } else {
            Err(invalid("mapper", "fn(a) -> b", sig))
        }
    }

    pub fn with_strategy(self, strategy: Strategy) -> Mapper {
        Mapper { strategy, ..self }
    }

    pub fn apply(&mut self, x: Value) -> PipeRes<Value> {
        single(self.f.call(vec![x], self.strategy)?)
    }
}

/// 断言函数：`fn(a) -> bool`。
#[derive(Debug)]
pub struct Predicate {
    f: Function,
    strategy: Strategy,
}

impl Predicate {
    pub fn new(f: Function) -> PipeRes<Predicate> {
        let sig = f.signature();
        if sig.params.len() == 1 && sig.results == [Shape::Bool] {
            Ok(Predicate { f, strategy: Strategy::default() })
        } else {
            Err(invalid("predicate", "fn(a) -> bool", sig))
        }
    }

    pub fn with_strategy(self, strategy: Strategy) -> Predicate {
        Predicate { strategy, ..self }
    }

    pub fn apply(&mut self, x: Value) -> PipeRes<bool> {
        boolean(single(self.f.call(vec![x], self.strategy)?)?)
    }
}

/// 聚合函数的分类，决定可用的折叠方式。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AggregatorKind {
    Unknown,
    /// 第二个参数与结果同形状：`fn(x, acc) -> acc`
    Right,
    /// 第一个参数与结果同形状：`fn(acc, x) -> acc`
    Left,
    /// 参数和结果形状全部相同
    Perfect,
}

impl AggregatorKind {
    pub fn classify(sig: &Signature) -> AggregatorKind {
        let (Some(left), Some(right), Some(out)) = (sig.params.first(), sig.params.get(1), sig.results.first()) else {
            return AggregatorKind::Unknown;
        };
        match (left == out, right == out) {
            (true, true) => AggregatorKind::Perfect,
            (false, true) => AggregatorKind::Right,
            (true, false) => AggregatorKind::Left,
            (false, false) => AggregatorKind::Unknown,
        }
    }
}

impl Display for AggregatorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AggregatorKind::Unknown => "unknown",
            AggregatorKind::Right => "right",
            AggregatorKind::Left => "left",
            AggregatorKind::Perfect => "perfect",
        };
        f.write_str(name)
    }
}

/// 聚合函数：`fn(a, b) -> c`，其中至少一个参数与结果同形状。
#[derive(Debug)]
pub struct Aggregator {
    f: Function,
    kind: AggregatorKind,
    strategy: Strategy,
}

impl Aggregator {
    pub fn new(f: Function) -> PipeRes<Aggregator> {
        let sig = f.signature();
        let kind = AggregatorKind::classify(sig);
        if sig.params.len() == 2 && sig.results.len() == 1 && kind != AggregatorKind::Unknown {
            Ok(Aggregator { f, kind, strategy: Strategy::default() })
        } else {
            Err(invalid("aggregator", "fn(acc, x) -> acc | fn(x, acc) -> acc", sig))
        }
    }

    pub fn with_strategy(self, strategy: Strategy) -> Aggregator {
        Aggregator { strategy, ..self }
    }

    pub fn kind(&self) -> AggregatorKind {
        self.kind
    }

    /// 结果形状的零值，作为默认的折叠初始值。
    pub fn zero(&self) -> Value {
        self.f.signature().results.first().map_or(Value::Nil, Shape::zero)
    }

    pub fn apply(&mut self, x: Value, y: Value) -> PipeRes<Value> {
        single(self.f.call(vec![x, y], self.strategy)?)
    }
}

/// 消费函数：`fn(a)`，无返回值。
#[derive(Debug)]
pub struct Consumer {
    f: Function,
    strategy: Strategy,
}

impl Consumer {
    pub fn new(f: Function) -> PipeRes<Consumer> {
        let sig = f.signature();
        if sig.params.len() == 1 && sig.results.is_empty() {
            Ok(Consumer { f, strategy: Strategy::default() })
        } else {
            Err(invalid("consumer", "fn(a)", sig))
        }
    }

    pub fn with_strategy(self, strategy: Strategy) -> Consumer {
        Consumer { strategy, ..self }
    }

    pub fn apply(&mut self, x: Value) -> PipeRes<()> {
        self.f.call(vec![x], self.strategy).map(|_| ())
    }
}

/// 排序比较函数：`fn(a, a) -> bool`，返回第一个参数是否小于第二个。
#[derive(Debug)]
pub struct Sorter {
    f: Function,
    strategy: Strategy,
}

impl Sorter {
    pub fn new(f: Function) -> PipeRes<Sorter> {
        let sig = f.signature();
        if sig.params.len() == 2 && sig.params[0] == sig.params[1] && sig.results == [Shape::Bool] {
            Ok(Sorter { f, strategy: Strategy::default() })
        } else {
            Err(invalid("sorter", "fn(a, a) -> bool", sig))
        }
    }

    pub fn with_strategy(self, strategy: Strategy) -> Sorter {
        Sorter { strategy, ..self }
    }

    pub fn apply(&mut self, x: Value, y: Value) -> PipeRes<bool> {
        boolean(single(self.f.call(vec![x, y], self.strategy)?)?)
    }
}
