use crate::conv::{FromValue, Typed, convert_shallow};
use crate::value::Value;
use log::trace;
use rustc_hash::FxHashMap;
use std::fmt::{Debug, Formatter};

/// 执行器生命周期阶段。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    /// 首次拉取前，无参数
    Before,
    /// 源结束或失败时，无参数
    After,
    /// 每个被拉取的元素，在变换之前
    Running,
    /// 每个产出的结果
    RunningResult,
}

type Hook = Box<dyn FnMut(&Value)>;

/// 按阶段登记的观测回调，同一阶段按登记顺序执行。
/// 回调参数先浅转换为声明的类型，转换失败的回调被跳过，不影响流水线。
#[derive(Default)]
pub struct Hookable {
    hooks: FxHashMap<Phase, Vec<Hook>>,
    began: bool,
    ended: bool,
}

impl Debug for Hookable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut counts = self.hooks.iter().map(|(phase, hooks)| (*phase, hooks.len())).collect::<Vec<_>>();
        counts.sort_by_key(|(phase, _)| *phase as u8);
        f.debug_struct("Hookable")
            .field("hooks", &counts)
            .field("began", &self.began)
            .field("ended", &self.ended)
            .finish()
    }
}

impl Hookable {
    pub fn new() -> Hookable {
        Hookable::default()
    }

    pub fn on_before(self, mut f: impl FnMut() + 'static) -> Hookable {
        self.add(Phase::Before, Box::new(move |_| f()))
    }

    pub fn on_after(self, mut f: impl FnMut() + 'static) -> Hookable {
        self.add(Phase::After, Box::new(move |_| f()))
    }

    pub fn on_running<A: FromValue>(self, f: impl FnMut(A) + 'static) -> Hookable {
        self.add(Phase::Running, typed(Phase::Running, f))
    }

    pub fn on_running_result<A: FromValue>(self, f: impl FnMut(A) + 'static) -> Hookable {
        self.add(Phase::RunningResult, typed(Phase::RunningResult, f))
    }

    fn add(mut self, phase: Phase, hook: Hook) -> Hookable {
        self.hooks.entry(phase).or_default().push(hook);
        self
    }

    pub fn len(&self, phase: Phase) -> usize {
        self.hooks.get(&phase).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }

    pub fn is_watching(&self, phase: Phase) -> bool {
        self.len(phase) > 0
    }

    pub fn execute(&mut self, phase: Phase, arg: &Value) {
        if let Some(hooks) = self.hooks.get_mut(&phase) {
            for hook in hooks {
                hook(arg);
            }
        }
    }

    /// 触发`Before`，每个生命周期只触发一次。
    pub(crate) fn begin(&mut self) {
        if !self.began {
            self.began = true;
            self.execute(Phase::Before, &Value::Nil);
        }
    }

    /// 触发`After`，每个生命周期只触发一次。
    pub(crate) fn end(&mut self) {
        if !self.ended {
            self.ended = true;
            self.execute(Phase::After, &Value::Nil);
        }
    }
}

fn typed<A: FromValue>(phase: Phase, mut f: impl FnMut(A) + 'static) -> Hook {
    Box::new(move |arg: &Value| match convert_shallow(arg.clone(), &A::shape()).and_then(A::from_value) {
        Ok(a) => f(a),
        Err(err) => trace!("Skip {phase:?} hook expecting `{}`: {err}", <A as Typed>::shape()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_execute_in_order() {
        let log = Rc::new(RefCell::new(vec![]));
        let (first, second) = (log.clone(), log.clone());
        let mut hooks = Hookable::new()
            .on_running(move |x: i64| first.borrow_mut().push(format!("first {x}")))
            .on_running(move |x: i64| second.borrow_mut().push(format!("second {x}")));
        assert_eq!(hooks.len(Phase::Running), 2);
        hooks.execute(Phase::Running, &Value::Int(1));
        assert_eq!(*log.borrow(), vec!["first 1", "second 1"]);
    }

    #[test]
    fn test_mismatched_hook_is_skipped() {
        let seen = Rc::new(RefCell::new(vec![]));
        let (ints, strs) = (seen.clone(), seen.clone());
        let mut hooks = Hookable::new()
            .on_running(move |x: i64| ints.borrow_mut().push(x.to_string()))
            .on_running(move |s: String| strs.borrow_mut().push(s));
        hooks.execute(Phase::Running, &Value::str("a"));
        hooks.execute(Phase::Running, &Value::Int(2));
        assert_eq!(*seen.borrow(), vec!["a", "2"]);
    }

    #[test]
    fn test_before_after_fire_once() {
        let count = Rc::new(RefCell::new((0, 0)));
        let (before, after) = (count.clone(), count.clone());
        let mut hooks =
            Hookable::new().on_before(move || before.borrow_mut().0 += 1).on_after(move || after.borrow_mut().1 += 1);
        hooks.begin();
        hooks.begin();
        hooks.end();
        hooks.end();
        assert_eq!(*count.borrow(), (1, 1));
    }

    #[test]
    fn test_phase_isolation() {
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        let mut hooks = Hookable::new().on_running_result(move |_: Value| *counter.borrow_mut() += 1);
        hooks.execute(Phase::Running, &Value::Nil);
        assert_eq!(*count.borrow(), 0);
        hooks.execute(Phase::RunningResult, &Value::Nil);
        assert_eq!(*count.borrow(), 1);
        assert!(!hooks.is_watching(Phase::Running));
        assert!(!hooks.is_empty());
        assert!(Hookable::new().is_empty());
    }
}
