use crate::adapter::{Aggregator, AggregatorKind};
use crate::conv::IntoValue;
use crate::iter::Iter;
use crate::op::Executor;
use crate::op::hook::{Hookable, Phase};
use crate::value::Value;
use crate::{PipeErr, PipeRes};
use log::trace;
use std::fmt::{Display, Formatter};

/// 折叠方式，对聚合函数的分类有不同要求。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum FoldType {
    /// `f(x1, f(x2, ... f(xn, acc)))`，要求`Right`或`Perfect`
    #[default]
    Right,
    /// `f(... f(f(acc, x1), x2) ..., xn)`，要求`Left`或`Perfect`
    Left,
    /// 逐轮两两归约直到剩下一个值，要求`Perfect`
    Tree,
    /// `f(x1, Interleaved(pairs(x2..xn)))`，要求`Perfect`
    Interleaved,
}

impl FoldType {
    pub fn accepts(self, kind: AggregatorKind) -> bool {
        match self {
            FoldType::Right => matches!(kind, AggregatorKind::Right | AggregatorKind::Perfect),
            FoldType::Left => matches!(kind, AggregatorKind::Left | AggregatorKind::Perfect),
            FoldType::Tree | FoldType::Interleaved => kind == AggregatorKind::Perfect,
        }
    }

    pub fn fold(
        self,
        f: &mut Aggregator,
        acc: Value,
        iter: impl Iterator<Item = PipeRes<Value>>,
    ) -> PipeRes<Value> {
        match self {
            FoldType::Right => fold_right(f, acc, iter),
            FoldType::Left => fold_left(f, acc, iter),
            FoldType::Tree => fold_tree(f, acc, iter),
            FoldType::Interleaved => fold_interleaved(f, acc, iter),
        }
    }
}

impl Display for FoldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FoldType::Right => "right",
            FoldType::Left => "left",
            FoldType::Tree => "tree",
            FoldType::Interleaved => "interleaved",
        };
        f.write_str(name)
    }
}

/// 折叠配置：方式、初始值（默认为聚合函数结果形状的零值）和观测回调。
#[derive(Debug, Default)]
pub struct FoldConfig {
    kind: FoldType,
    initial: Option<Value>,
    hooks: Hookable,
}

impl FoldConfig {
    pub fn new() -> FoldConfig {
        FoldConfig::default()
    }

    pub fn kind(self, kind: FoldType) -> FoldConfig {
        FoldConfig { kind, ..self }
    }

    pub fn initial(self, initial: impl IntoValue) -> FoldConfig {
        FoldConfig { initial: Some(initial.into_value()), ..self }
    }

    pub fn hooks(self, hooks: Hookable) -> FoldConfig {
        FoldConfig { hooks, ..self }
    }
}

impl From<FoldType> for FoldConfig {
    fn from(kind: FoldType) -> Self {
        FoldConfig::new().kind(kind)
    }
}

/// 折叠执行器，急切。折叠方式与聚合函数分类不匹配时在构造时失败，不拉取任何元素。
#[derive(Debug)]
pub struct FoldExecutor {
    f: Aggregator,
    iter: Iter,
    kind: FoldType,
    initial: Value,
    hooks: Hookable,
}

impl FoldExecutor {
    pub fn new(f: Aggregator, iter: Iter, config: FoldConfig) -> PipeRes<FoldExecutor> {
        let FoldConfig { kind, initial, hooks } = config;
        if !kind.accepts(f.kind()) {
            return Err(PipeErr::FoldType { fold: kind, aggregator: f.kind() });
        }
        let initial = initial.unwrap_or_else(|| f.zero());
        Ok(FoldExecutor { f, iter, kind, initial, hooks })
    }
}

impl Executor for FoldExecutor {
    type Output = PipeRes<Value>;

    fn execute(self) -> PipeRes<Value> {
        let FoldExecutor { mut f, iter, kind, initial, mut hooks } = self;
        hooks.begin();
        let res = {
            let pulled = iter.inspect(|x| {
                if let Ok(x) = x {
                    hooks.execute(Phase::Running, x);
                }
            });
            kind.fold(&mut f, initial, pulled)
        };
        if let Ok(result) = &res {
            hooks.execute(Phase::RunningResult, result);
        }
        hooks.end();
        res
    }
}

/// 右折叠：全部压入显式工作栈，再自栈顶展开`acc = f(x, acc)`。
pub fn fold_right(f: &mut Aggregator, acc: Value, iter: impl Iterator<Item = PipeRes<Value>>) -> PipeRes<Value> {
    let stack = iter.collect::<PipeRes<Vec<_>>>()?;
    stack.into_iter().rev().try_fold(acc, |acc, x| f.apply(x, acc))
}

pub fn fold_left(f: &mut Aggregator, acc: Value, mut iter: impl Iterator<Item = PipeRes<Value>>) -> PipeRes<Value> {
    iter.try_fold(acc, |acc, x| f.apply(acc, x?))
}

/// 树形折叠：逐轮两两归约，奇数个时末尾元素直接进入下一轮。空序列返回初始值，单个元素返回该元素。
pub fn fold_tree(f: &mut Aggregator, acc: Value, iter: impl Iterator<Item = PipeRes<Value>>) -> PipeRes<Value> {
    let mut round = pairs(f, iter)?;
    while round.len() > 1 {
        trace!("Tree fold round of {} values", round.len());
        round = pairs(f, round.into_iter().map(Ok))?;
    }
    Ok(round.into_iter().next().unwrap_or(acc))
}

/// 交错折叠：记下每轮的首元素，其余元素两两归约进入下一轮；最后自最深一轮起展开`acc = f(head, acc)`。
pub fn fold_interleaved(
    f: &mut Aggregator,
    acc: Value,
    mut iter: impl Iterator<Item = PipeRes<Value>>,
) -> PipeRes<Value> {
    let mut heads = vec![];
    let Some(first) = iter.next() else {
        return Ok(acc);
    };
    heads.push(first?);
    let mut round = pairs(f, iter)?;
    while !round.is_empty() {
        trace!("Interleaved fold round of {} values", round.len());
        let mut rest = round.into_iter();
        heads.extend(rest.next());
        round = pairs(f, rest.map(Ok))?;
    }
    heads.into_iter().rev().try_fold(acc, |acc, head| f.apply(head, acc))
}

/// 相邻两两归约一轮，奇数个时保留末尾元素。
fn pairs(f: &mut Aggregator, mut iter: impl Iterator<Item = PipeRes<Value>>) -> PipeRes<Vec<Value>> {
    let mut reduced = vec![];
    while let Some(x) = iter.next() {
        let x = x?;
        match iter.next() {
            Some(y) => reduced.push(f.apply(x, y?)?),
            None => reduced.push(x),
        }
    }
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::IntoFunction;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn concat() -> Aggregator {
        Aggregator::new((|x: String, y: String| format!("({x}{y})")).into_function()).unwrap()
    }

    fn letters(s: &'static str) -> impl Iterator<Item = PipeRes<Value>> {
        s.chars().map(|c| Ok(Value::str(c.to_string())))
    }

    fn fold(kind: FoldType, s: &'static str) -> String {
        kind.fold(&mut concat(), Value::str("_"), letters(s)).unwrap().to_string()
    }

    #[test]
    fn test_fold_shapes() {
        assert_eq!(fold(FoldType::Right, "abc"), "(a(b(c_)))");
        assert_eq!(fold(FoldType::Left, "abc"), "(((_a)b)c)");
        assert_eq!(fold(FoldType::Tree, "abcde"), "(((ab)(cd))e)");
        assert_eq!(fold(FoldType::Interleaved, "abcde"), "(a((bc)((de)_)))");
        assert_eq!(fold(FoldType::Interleaved, "abc"), "(a((bc)_))");
    }

    #[test]
    fn test_fold_edges() {
        for kind in [FoldType::Right, FoldType::Left, FoldType::Tree, FoldType::Interleaved] {
            assert_eq!(fold(kind, ""), "_");
        }
        assert_eq!(fold(FoldType::Tree, "a"), "a");
        assert_eq!(fold(FoldType::Interleaved, "a"), "(a_)");
    }

    #[test]
    fn test_associative_commutative_agree() {
        for n in [0i64, 1, 2, 3, 7, 100] {
            let results = [FoldType::Right, FoldType::Left, FoldType::Tree, FoldType::Interleaved].map(|kind| {
                let mut sum = Aggregator::new((|x: i64, y: i64| x + y).into_function()).unwrap();
                kind.fold(&mut sum, Value::Int(0), (1..=n).map(|i| Ok(Value::Int(i)))).unwrap()
            });
            assert!(results.iter().all(|r| *r == Value::Int(n * (n + 1) / 2)), "{results:?}");
        }
    }

    #[test]
    fn test_long_sequence_right_fold() {
        let mut sum = Aggregator::new((|x: i64, acc: i64| x + acc).into_function()).unwrap();
        let res = FoldType::Right.fold(&mut sum, Value::Int(0), (0..200_000).map(|i| Ok(Value::Int(i % 3))));
        assert_eq!(res, Ok(Value::Int(199_999)));
    }

    #[test]
    fn test_validation_before_pull() {
        let pulled = Rc::new(RefCell::new(0));
        let counter = pulled.clone();
        let source = Iter::from_fn(move || {
            *counter.borrow_mut() += 1;
            Some(Ok(Value::Int(1)))
        });
        let left_only = Aggregator::new((|acc: i64, x: String| acc + x.len() as i64).into_function()).unwrap();
        let err = FoldExecutor::new(left_only, source, FoldType::Tree.into()).unwrap_err();
        assert_eq!(err, PipeErr::FoldType { fold: FoldType::Tree, aggregator: AggregatorKind::Left });
        assert_eq!(*pulled.borrow(), 0);
    }

    #[test]
    fn test_default_initial_is_zero() {
        let count = Aggregator::new((|_: Value, acc: i64| acc + 1).into_function()).unwrap();
        let res = FoldExecutor::new(count, Iter::empty(), FoldConfig::new()).unwrap().execute();
        assert_eq!(res, Ok(Value::Int(0)));

        let count = Aggregator::new((|_: Value, acc: i64| acc + 1).into_function()).unwrap();
        let config = FoldConfig::new().initial(10i64);
        let res = FoldExecutor::new(count, Iter::from_array(["a", "b"]), config).unwrap().execute();
        assert_eq!(res, Ok(Value::Int(12)));
    }

    #[test]
    fn test_fold_hooks() {
        let events = Rc::new(RefCell::new(vec![]));
        let (running, result) = (events.clone(), events.clone());
        let hooks = Hookable::new()
            .on_running(move |x: i64| running.borrow_mut().push(x))
            .on_running_result(move |x: i64| result.borrow_mut().push(-x));
        let sum = Aggregator::new((|x: i64, y: i64| x + y).into_function()).unwrap();
        let config = FoldConfig::new().kind(FoldType::Left).hooks(hooks);
        let res = FoldExecutor::new(sum, Iter::from_array([1i64, 2, 3]), config).unwrap().execute();
        assert_eq!(res, Ok(Value::Int(6)));
        assert_eq!(*events.borrow(), vec![1, 2, 3, -6]);
    }
}
