use crate::iter::Iter;
use crate::op::Executor;
use crate::op::hook::{Hookable, Phase};
use crate::value::Value;
use crate::PipeRes;

/// 展开方式。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FlatType {
    /// 只展开一层
    #[default]
    Simple,
    /// 递归展开，直到产出的元素都不可迭代
    Perfect,
}

/// 展开执行器，惰性。`Running`在每个源元素被拉取时触发，`RunningResult`在每个产出元素上触发。
#[derive(Debug)]
pub struct FlatExecutor {
    kind: FlatType,
    iter: Iter,
    hooks: Hookable,
}

impl FlatExecutor {
    pub fn new(kind: FlatType, iter: Iter, hooks: Hookable) -> FlatExecutor {
        FlatExecutor { kind, iter, hooks }
    }
}

impl Executor for FlatExecutor {
    type Output = Iter;

    fn execute(self) -> Iter {
        let FlatExecutor { kind, iter, hooks } = self;
        match kind {
            FlatType::Simple => Iter::new(SimpleFlat { source: iter, current: None, hooks }),
            FlatType::Perfect => Iter::new(PerfectFlat { stack: vec![iter], hooks }),
        }
    }
}

struct SimpleFlat {
    source: Iter,
    current: Option<Iter>,
    hooks: Hookable,
}

impl Iterator for SimpleFlat {
    type Item = PipeRes<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.hooks.begin();
        loop {
            if let Some(current) = &mut self.current {
                match current.next() {
                    Some(Ok(x)) => {
                        self.hooks.execute(Phase::RunningResult, &x);
                        return Some(Ok(x));
                    }
                    Some(Err(err)) => {
                        self.hooks.end();
                        return Some(Err(err));
                    }
                    None => self.current = None,
                }
            }
            match self.source.next() {
                Some(Ok(elem)) => {
                    self.hooks.execute(Phase::Running, &elem);
                    self.current = Some(Iter::from_value(elem));
                }
                other => {
                    self.hooks.end();
                    return other;
                }
            }
        }
    }
}

/// 深度优先展开，以栈代替递归。
struct PerfectFlat {
    stack: Vec<Iter>,
    hooks: Hookable,
}

impl Iterator for PerfectFlat {
    type Item = PipeRes<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.hooks.begin();
        loop {
            let from_source = self.stack.len() == 1;
            let Some(top) = self.stack.last_mut() else {
                self.hooks.end();
                return None;
            };
            match top.next() {
                Some(Ok(x)) => {
                    if from_source {
                        self.hooks.execute(Phase::Running, &x);
                    }
                    if x.is_iterable() {
                        self.stack.push(Iter::from_value(x));
                    } else {
                        self.hooks.execute(Phase::RunningResult, &x);
                        return Some(Ok(x));
                    }
                }
                Some(Err(err)) => {
                    self.stack.clear();
                    self.hooks.end();
                    return Some(Err(err));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
