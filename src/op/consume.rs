use crate::adapter::Consumer;
use crate::iter::Iter;
use crate::op::Executor;
use crate::op::hook::{Hookable, Phase};
use crate::value::Value;
use crate::PipeRes;

/// 消费执行器，终结：拉取到结束，逐个交给消费函数，返回首个失败。
#[derive(Debug)]
pub struct ConsumeExecutor {
    f: Consumer,
    iter: Iter,
    hooks: Hookable,
}

impl ConsumeExecutor {
    pub fn new(f: Consumer, iter: Iter, hooks: Hookable) -> ConsumeExecutor {
        ConsumeExecutor { f, iter, hooks }
    }

    fn consume(&mut self) -> PipeRes<()> {
        for x in &mut self.iter {
            let x = x?;
            self.hooks.execute(Phase::Running, &x);
            self.f.apply(x)?;
            self.hooks.execute(Phase::RunningResult, &Value::Nil);
        }
        Ok(())
    }
}

impl Executor for ConsumeExecutor {
    type Output = PipeRes<()>;

    fn execute(mut self) -> PipeRes<()> {
        self.hooks.begin();
        let res = self.consume();
        self.hooks.end();
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PipeErr;
    use crate::func::IntoFunction;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_consume_all() {
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = seen.clone();
        let consumer = Consumer::new((move |x: i64| sink.borrow_mut().push(x)).into_function()).unwrap();
        let res = ConsumeExecutor::new(consumer, Iter::from_array([3i64, 1, 2]), Hookable::new()).execute();
        assert_eq!(res, Ok(()));
        assert_eq!(*seen.borrow(), vec![3, 1, 2]);
    }

    #[test]
    fn test_consumer_failure_stops() {
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = seen.clone();
        let consumer = Consumer::new(
            (move |x: i64| {
                if x < 0 {
                    return Err(format!("negative {x}"));
                }
                sink.borrow_mut().push(x);
                Ok(())
            })
            .into_function(),
        )
        .unwrap();
        let after = Rc::new(RefCell::new(0));
        let counter = after.clone();
        let hooks = Hookable::new().on_after(move || *counter.borrow_mut() += 1);
        let res = ConsumeExecutor::new(consumer, Iter::from_array([1i64, -1, 2]), hooks).execute();
        assert_eq!(res, Err(PipeErr::Call("negative -1".to_string())));
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(*after.borrow(), 1);
    }

    #[test]
    fn test_consume_hooks() {
        let events = Rc::new(RefCell::new(vec![]));
        let (before, running, result, after) = (events.clone(), events.clone(), events.clone(), events.clone());
        let hooks = Hookable::new()
            .on_before(move || before.borrow_mut().push("before".to_string()))
            .on_running(move |x: i64| running.borrow_mut().push(format!("pull {x}")))
            .on_running_result(move |x: Value| result.borrow_mut().push(format!("done {x}")))
            .on_after(move || after.borrow_mut().push("after".to_string()));
        let consumer = Consumer::new((|_: i64| {}).into_function()).unwrap();
        let res = ConsumeExecutor::new(consumer, Iter::from_array([1i64, 2]), hooks).execute();
        assert_eq!(res, Ok(()));
        assert_eq!(*events.borrow(), vec!["before", "pull 1", "done nil", "pull 2", "done nil", "after"]);
    }

    #[test]
    fn test_source_failure_propagates() {
        let consumer = Consumer::new((|_: Value| {}).into_function()).unwrap();
        let source = Iter::error(PipeErr::iterator("closed"));
        let res = ConsumeExecutor::new(consumer, source, Hookable::new()).execute();
        assert_eq!(res, Err(PipeErr::iterator("closed")));
    }
}
