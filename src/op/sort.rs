use crate::adapter::Sorter;
use crate::iter::Iter;
use crate::op::Executor;
use crate::op::hook::{Hookable, Phase};
use crate::value::Value;
use crate::PipeRes;

/// 排序执行器，终结：物化整个源后稳定排序，比较函数首次失败即中止。
#[derive(Debug)]
pub struct SortExecutor {
    f: Sorter,
    iter: Iter,
    hooks: Hookable,
}

impl SortExecutor {
    pub fn new(f: Sorter, iter: Iter, hooks: Hookable) -> SortExecutor {
        SortExecutor { f, iter, hooks }
    }

    fn sort(&mut self) -> PipeRes<Vec<Value>> {
        let items = (&mut self.iter).collect::<PipeRes<Vec<_>>>()?;
        let SortExecutor { f, hooks, .. } = self;
        merge_sort(items, &mut |x, y| {
            if hooks.is_watching(Phase::Running) {
                hooks.execute(Phase::Running, &Value::pair(x.clone(), y.clone()));
            }
            let less = f.apply(x.clone(), y.clone())?;
            hooks.execute(Phase::RunningResult, &Value::Bool(less));
            Ok(less)
        })
    }
}

impl Executor for SortExecutor {
    type Output = PipeRes<Vec<Value>>;

    fn execute(mut self) -> PipeRes<Vec<Value>> {
        self.hooks.begin();
        let res = self.sort();
        self.hooks.end();
        res
    }
}

/// 自底向上的稳定归并排序，比较函数失败时立即返回。
fn merge_sort<T>(items: Vec<T>, less: &mut impl FnMut(&T, &T) -> PipeRes<bool>) -> PipeRes<Vec<T>> {
    let len = items.len();
    let mut items = items;
    let mut width = 1;
    while width < len {
        let mut merged = Vec::with_capacity(len);
        let mut rest = items.into_iter();
        loop {
            let left = rest.by_ref().take(width).collect::<Vec<_>>();
            if left.is_empty() {
                break;
            }
            let right = rest.by_ref().take(width).collect::<Vec<_>>();
            merge(left, right, &mut merged, less)?;
        }
        items = merged;
        width *= 2;
    }
    Ok(items)
}

fn merge<T>(
    left: Vec<T>,
    right: Vec<T>,
    out: &mut Vec<T>,
    less: &mut impl FnMut(&T, &T) -> PipeRes<bool>,
) -> PipeRes<()> {
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        // 仅当右侧严格小于左侧时取右侧，保持稳定
        if less(r, l)? {
            out.extend(right.next());
        } else {
            out.extend(left.next());
        }
    }
    out.extend(left);
    out.extend(right);
    Ok(())
}
