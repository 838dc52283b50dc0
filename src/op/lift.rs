use crate::conv::convert_full;
use crate::iter::Iter;
use crate::op::Executor;
use crate::op::hook::{Hookable, Phase};
use crate::value::{Seq, Shape, Value};
use crate::PipeRes;
use itertools::Itertools;

/// 聚拢执行器，急切：物化整个源，所有元素形状一致时转为该形状的同构序列，否则保持异构序列。
#[derive(Debug)]
pub struct LiftExecutor {
    iter: Iter,
    hooks: Hookable,
}

impl LiftExecutor {
    pub fn new(iter: Iter, hooks: Hookable) -> LiftExecutor {
        LiftExecutor { iter, hooks }
    }

    fn lift(&mut self) -> PipeRes<Iter> {
        let mut items = vec![];
        for x in &mut self.iter {
            let x = x?;
            self.hooks.execute(Phase::Running, &x);
            items.push(x);
        }
        if items.is_empty() {
            return Ok(Iter::empty());
        }
        let elem = items.iter().map(Value::shape).all_equal_value().unwrap_or(Shape::Any);
        let lifted = convert_full(Value::List(Seq::new(Shape::Any, items)), &Shape::list(elem))?;
        self.hooks.execute(Phase::RunningResult, &lifted);
        Ok(Iter::once(lifted))
    }
}

impl Executor for LiftExecutor {
    type Output = PipeRes<Iter>;

    fn execute(mut self) -> PipeRes<Iter> {
        self.hooks.begin();
        let res = self.lift();
        self.hooks.end();
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_lift_homogeneous() {
        let lifted = LiftExecutor::new(Iter::from_array([1i64, 2]), Hookable::new()).execute().unwrap();
        let expected = Value::List(Seq::new(Shape::Int, vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(lifted.to_vec(), Ok(vec![expected]));
    }

    #[test]
    fn test_lift_heterogeneous() {
        let source = Iter::from_values(vec![Value::Int(1), Value::str("a")]);
        let lifted = LiftExecutor::new(source, Hookable::new()).execute().unwrap().to_vec().unwrap();
        assert_eq!(lifted, vec![Value::list(vec![Value::Int(1), Value::str("a")])]);
        assert_eq!(lifted[0].shape(), Shape::list(Shape::Any));
    }

    #[test]
    fn test_lift_hooks() {
        let events = Rc::new(RefCell::new(vec![]));
        let (before, running, result, after) = (events.clone(), events.clone(), events.clone(), events.clone());
        let hooks = Hookable::new()
            .on_before(move || before.borrow_mut().push("before".to_string()))
            .on_running(move |x: i64| running.borrow_mut().push(format!("pull {x}")))
            .on_running_result(move |x: Vec<i64>| result.borrow_mut().push(format!("lifted {x:?}")))
            .on_after(move || after.borrow_mut().push("after".to_string()));
        LiftExecutor::new(Iter::from_array([1i64, 2]), hooks).execute().unwrap();
        assert_eq!(*events.borrow(), vec!["before", "pull 1", "pull 2", "lifted [1, 2]", "after"]);
    }

    #[test]
    fn test_lift_empty() {
        let mut lifted = LiftExecutor::new(Iter::empty(), Hookable::new()).execute().unwrap();
        assert_eq!(lifted.next(), None);
    }

    #[test]
    fn test_lift_source_failure() {
        let source = Iter::new(vec![Ok(Value::Int(1)), Err(crate::PipeErr::iterator("boom"))].into_iter());
        assert!(LiftExecutor::new(source, Hookable::new()).execute().is_err());
    }
}
