use crate::adapter::Mapper;
use crate::iter::Iter;
use crate::op::Executor;
use crate::op::hook::{Hookable, Phase};
use crate::value::Value;
use crate::PipeRes;

/// 映射执行器，惰性：每次拉取一个源元素并映射。
#[derive(Debug)]
pub struct MapExecutor {
    f: Mapper,
    iter: Iter,
    hooks: Hookable,
}

impl MapExecutor {
    pub fn new(f: Mapper, iter: Iter, hooks: Hookable) -> MapExecutor {
        MapExecutor { f, iter, hooks }
    }
}

impl Executor for MapExecutor {
    type Output = Iter;

    fn execute(self) -> Iter {
        Iter::new(self)
    }
}

impl Iterator for MapExecutor {
    type Item = PipeRes<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.hooks.begin();
        match self.iter.next() {
            Some(Ok(x)) => {
                self.hooks.execute(Phase::Running, &x);
                let res = self.f.apply(x);
                match &res {
                    Ok(y) => self.hooks.execute(Phase::RunningResult, y),
                    Err(_) => self.hooks.end(),
                }
                Some(res)
            }
            other => {
                self.hooks.end();
                other
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
    fn test_map() {
        let mapper = Mapper::new((|x: i64| x * 10).into_function()).unwrap();
        let iter = MapExecutor::new(mapper, Iter::from_array([1i64, 2, 3]), Hookable::new()).execute();
        assert_eq!(iter.to_vec(), Ok(vec![Value::Int(10), Value::Int(20), Value::Int(30)]));
    }

    #[test]
    fn test_map_is_lazy() {
        let pulled = Rc::new(RefCell::new(0));
        let counter = pulled.clone();
        let mapper = Mapper::new((|x: i64| x + 1).into_function()).unwrap();
        let hooks = Hookable::new().on_running(move |_: Value| *counter.borrow_mut() += 1);
        let mut iter = MapExecutor::new(mapper, Iter::from_array([1i64, 2, 3]), hooks).execute();
        assert_eq!(*pulled.borrow(), 0);
        assert_eq!(iter.next(), Some(Ok(Value::Int(2))));
        assert_eq!(*pulled.borrow(), 1);
    }

    #[test]
    fn test_map_failure_ends_iteration() {
        let ended = Rc::new(RefCell::new(0));
        let counter = ended.clone();
        let mapper = Mapper::new((|x: i64| if x == 2 { Err("two") } else { Ok(x) }).into_function()).unwrap();
        let hooks = Hookable::new().on_after(move || *counter.borrow_mut() += 1);
        let mut iter = MapExecutor::new(mapper, Iter::from_array([1i64, 2, 3]), hooks).execute();
        assert_eq!(iter.next(), Some(Ok(Value::Int(1))));
        assert!(iter.next().is_some_and(|res| res.is_err()));
        assert_eq!(iter.next(), None);
        assert_eq!(*ended.borrow(), 1);
    }
}
