use crate::adapter::Predicate;
use crate::iter::Iter;
use crate::op::Executor;
use crate::op::hook::{Hookable, Phase};
use crate::value::Value;
use crate::PipeRes;

/// 过滤执行器，惰性：拉取源元素直到断言接受或源结束。
#[derive(Debug)]
pub struct FilterExecutor {
    f: Predicate,
    iter: Iter,
    hooks: Hookable,
}

impl FilterExecutor {
    pub fn new(f: Predicate, iter: Iter, hooks: Hookable) -> FilterExecutor {
        FilterExecutor { f, iter, hooks }
    }
}

impl Executor for FilterExecutor {
    type Output = Iter;

    fn execute(self) -> Iter {
        Iter::new(self)
    }
}

impl Iterator for FilterExecutor {
    type Item = PipeRes<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.hooks.begin();
        loop {
            match self.iter.next() {
                Some(Ok(x)) => {
                    self.hooks.execute(Phase::Running, &x);
                    match self.f.apply(x.clone()) {
                        Ok(true) => {
                            self.hooks.execute(Phase::RunningResult, &x);
                            return Some(Ok(x));
                        }
                        Ok(false) => continue,
                        Err(err) => {
                            self.hooks.end();
                            return Some(Err(err));
                        }
                    }
                }
                other => {
                    self.hooks.end();
                    return other;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::IntoFunction;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_filter() {
        let predicate = Predicate::new((|x: i64| x % 2 == 1).into_function()).unwrap();
        let iter = FilterExecutor::new(predicate, Iter::from_array([1i64, 2, 3, 4, 5]), Hookable::new()).execute();
        assert_eq!(iter.to_vec(), Ok(vec![Value::Int(1), Value::Int(3), Value::Int(5)]));
    }

    #[test]
    fn test_filter_hooks() {
        let events = Rc::new(RefCell::new(vec![]));
        let (before, running, result, after) = (events.clone(), events.clone(), events.clone(), events.clone());
        let hooks = Hookable::new()
            .on_before(move || before.borrow_mut().push("before".to_string()))
            .on_running(move |x: i64| running.borrow_mut().push(format!("pull {x}")))
            .on_running_result(move |x: i64| result.borrow_mut().push(format!("keep {x}")))
            .on_after(move || after.borrow_mut().push("after".to_string()));
        let predicate = Predicate::new((|x: i64| x > 1).into_function()).unwrap();
        let iter = FilterExecutor::new(predicate, Iter::from_array([1i64, 2]), hooks).execute();
        assert_eq!(iter.to_vec(), Ok(vec![Value::Int(2)]));
        assert_eq!(*events.borrow(), vec!["before", "pull 1", "pull 2", "keep 2", "after"]);
    }

    #[test]
    fn test_filter_rejects_everything() {
        let predicate = Predicate::new((|_: Value| false).into_function()).unwrap();
        let mut iter = FilterExecutor::new(predicate, Iter::from_array([1i64, 2]), Hookable::new()).execute();
        assert_eq!(iter.next(), None);
    }
}
