pub mod consume;
pub mod filter;
pub mod flat;
pub mod fold;
pub mod hook;
pub mod lift;
pub mod map;
pub mod sort;

use crate::func::{Function, IntoFunction};
use crate::op::flat::FlatType;
use crate::op::fold::FoldConfig;
use crate::op::hook::Hookable;
use crate::pipe::Stream;

/// 单个流水线阶段的驱动者，持有一个源迭代器、一个适配器和观测回调。
/// 惰性执行器产出新的`Iter`，急切执行器产出物化结果。
pub trait Executor {
    type Output;

    fn execute(self) -> Self::Output;
}

/// 流水线阶段描述，可先构建再依次套用到流上。
#[derive(Debug)]
pub enum Op {
    /* **************************************** 惰性 **************************************** */
    /// 逐个映射。
    Map { f: Function, hooks: Hookable },
    /// 逐个过滤。
    Filter { f: Function, hooks: Hookable },
    /// 展开一层或递归展开。
    Flat { kind: FlatType, hooks: Hookable },
    /* **************************************** 急切 **************************************** */
    /// 折叠为单个值。
    Fold { f: Function, config: FoldConfig },
    /// 稳定排序。
    Sort { f: Function, hooks: Hookable },
    /// 聚拢为单个序列值。
    Lift { hooks: Hookable },
}

impl Op {
    pub fn new_map<Args>(f: impl IntoFunction<Args>) -> Op {
        Op::Map { f: f.into_function(), hooks: Hookable::new() }
    }

    pub fn new_filter<Args>(f: impl IntoFunction<Args>) -> Op {
        Op::Filter { f: f.into_function(), hooks: Hookable::new() }
    }

    pub fn new_flat(kind: FlatType) -> Op {
        Op::Flat { kind, hooks: Hookable::new() }
    }

    pub fn new_fold<Args>(f: impl IntoFunction<Args>, config: impl Into<FoldConfig>) -> Op {
        Op::Fold { f: f.into_function(), config: config.into() }
    }

    pub fn new_sort<Args>(f: impl IntoFunction<Args>) -> Op {
        Op::Sort { f: f.into_function(), hooks: Hookable::new() }
    }

    pub fn new_lift() -> Op {
        Op::Lift { hooks: Hookable::new() }
    }

    /// 替换阶段的观测回调，折叠阶段替换其配置中的回调。
    pub fn with_hooks(self, hooks: Hookable) -> Op {
        match self {
            Op::Map { f, .. } => Op::Map { f, hooks },
            Op::Filter { f, .. } => Op::Filter { f, hooks },
            Op::Flat { kind, .. } => Op::Flat { kind, hooks },
            Op::Fold { f, config } => Op::Fold { f, config: config.hooks(hooks) },
            Op::Sort { f, .. } => Op::Sort { f, hooks },
            Op::Lift { .. } => Op::Lift { hooks },
        }
    }

    /// 将阶段追加到流上。
    pub fn wrap(self, stream: Stream) -> Stream {
        match self {
            Op::Map { f, hooks } => stream.map_with(f, hooks),
            Op::Filter { f, hooks } => stream.filter_with(f, hooks),
            Op::Flat { kind, hooks } => stream.flat_with(kind, hooks),
            Op::Fold { f, config } => stream.fold_with(f, config),
            Op::Sort { f, hooks } => stream.sort_with(f, hooks),
            Op::Lift { hooks } => stream.lift_with(hooks),
        }
    }
}

/// 依次将各阶段追加到流上。
pub fn build(stream: Stream, ops: impl IntoIterator<Item = Op>) -> Stream {
    ops.into_iter().fold(stream, |stream, op| op.wrap(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::ErrCode;
    use crate::iter::Iter;
    use crate::op::fold::FoldType;
    use crate::value::Value;

    #[test]
    fn test_build() {
        let ops = vec![
            Op::new_filter(|x: i64| x % 2 == 0),
            Op::new_map(|x: i64| x * x),
            Op::new_fold(|x: i64, y: i64| x + y, FoldType::Tree),
        ];
        let stream = build(Stream::new(Iter::from_array([1i64, 2, 3, 4])), ops);
        assert_eq!(stream.to_vec(), Ok(vec![Value::Int(20)]));
    }

    #[test]
    fn test_build_stops_at_first_invalid_stage() {
        let ops = vec![Op::new_map(|x: i64, y: i64| x + y), Op::new_sort(|x: i64, y: i64| x < y)];
        let stream = build(Stream::new(Iter::from_array([1i64])), ops);
        assert_eq!(stream.err().map(|err| err.code()), Some(ErrCode::Map));
    }

    #[test]
    fn test_lift_and_flat_ops() {
        let ops = vec![Op::new_lift(), Op::new_flat(FlatType::Simple)];
        let stream = build(Stream::new(Iter::from_array(["a", "b"])), ops);
        assert_eq!(stream.to_vec(), Ok(vec![Value::str("a"), Value::str("b")]));
    }
}
