use crate::adapter::{Aggregator, Consumer, Mapper, Predicate, Sorter};
use crate::config::{Config, is_verbose, strategy};
use crate::err::{ErrCode, PipeErr};
use crate::func::IntoFunction;
use crate::iter::Iter;
use crate::op::Executor;
use crate::op::consume::ConsumeExecutor;
use crate::op::filter::FilterExecutor;
use crate::op::flat::{FlatExecutor, FlatType};
use crate::op::fold::{FoldConfig, FoldExecutor};
use crate::op::hook::Hookable;
use crate::op::lift::LiftExecutor;
use crate::op::map::MapExecutor;
use crate::op::sort::SortExecutor;
use crate::value::Value;
use crate::PipeRes;
use log::{Level, debug, log};

const MSG_INVALID_FUNCTION: &str = "invalid function";
const MSG_CANNOT_CREATE_EXECUTOR: &str = "cannot create executor";
const MSG_CANNOT_EXECUTE: &str = "cannot execute";
const MSG_CANNOT_GET_SLICE: &str = "cannot get slice";
const MSG_CANNOT_COMPARE: &str = "cannot compare";
const MSG_CANNOT_CONVERT: &str = "cannot convert";

/// 可链式组合的流。构建阶段失败时流变为携带该错误的空流，后续阶段原样传递，由调用方通过`err()`检查。
#[derive(Debug)]
pub struct Stream {
    iter: Iter,
    err: Option<PipeErr>,
    configs: Vec<Config>,
}

impl IntoIterator for Stream {
    type Item = PipeRes<Value>;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter
    }
}

impl Stream {
    pub fn new(iter: Iter) -> Stream {
        Stream { iter, err: None, configs: vec![] }
    }

    pub fn with_configs(iter: Iter, configs: impl Into<Vec<Config>>) -> Stream {
        Stream { iter, err: None, configs: configs.into() }
    }

    /// 携带错误的空流。
    pub fn nil(err: PipeErr) -> Stream {
        Stream { iter: Iter::empty(), err: Some(err), configs: vec![] }
    }

    pub fn err(&self) -> Option<&PipeErr> {
        self.err.as_ref()
    }

    pub fn configs(&self) -> &[Config] {
        &self.configs
    }

    fn fail(configs: Vec<Config>, code: ErrCode, msg: &'static str, err: PipeErr) -> Stream {
        debug!("{code} stage turned the stream into a nil stream: {err}");
        Stream { iter: Iter::empty(), err: Some(PipeErr::stage(code, msg, err)), configs }
    }

    pub fn map<Args>(self, f: impl IntoFunction<Args>) -> Stream {
        self.map_with(f, Hookable::new())
    }

    pub fn map_with<Args>(self, f: impl IntoFunction<Args>, hooks: Hookable) -> Stream {
        if self.err.is_some() {
            return self;
        }
        let Stream { iter, configs, .. } = self;
        match Mapper::new(f.into_function()) {
            Ok(mapper) => {
                log_stage(&configs, "map");
                let iter = MapExecutor::new(mapper.with_strategy(strategy(&configs)), iter, hooks).execute();
                Stream { iter, err: None, configs }
            }
            Err(err) => Stream::fail(configs, ErrCode::Map, MSG_INVALID_FUNCTION, err),
        }
    }

    pub fn filter<Args>(self, f: impl IntoFunction<Args>) -> Stream {
        self.filter_with(f, Hookable::new())
    }

    pub fn filter_with<Args>(self, f: impl IntoFunction<Args>, hooks: Hookable) -> Stream {
        if self.err.is_some() {
            return self;
        }
        let Stream { iter, configs, .. } = self;
        match Predicate::new(f.into_function()) {
            Ok(predicate) => {
                log_stage(&configs, "filter");
                let iter = FilterExecutor::new(predicate.with_strategy(strategy(&configs)), iter, hooks).execute();
                Stream { iter, err: None, configs }
            }
            Err(err) => Stream::fail(configs, ErrCode::Filter, MSG_INVALID_FUNCTION, err),
        }
    }

    /// 以默认配置折叠：右折叠，初始值为聚合函数结果形状的零值。
    pub fn fold<Args>(self, f: impl IntoFunction<Args>) -> Stream {
        self.fold_with(f, FoldConfig::new())
    }

    pub fn fold_with<Args>(self, f: impl IntoFunction<Args>, config: impl Into<FoldConfig>) -> Stream {
        if self.err.is_some() {
            return self;
        }
        let Stream { iter, configs, .. } = self;
        let aggregator = match Aggregator::new(f.into_function()) {
            Ok(aggregator) => aggregator.with_strategy(strategy(&configs)),
            Err(err) => return Stream::fail(configs, ErrCode::Fold, MSG_INVALID_FUNCTION, err),
        };
        let executor = match FoldExecutor::new(aggregator, iter, config.into()) {
            Ok(executor) => executor,
            Err(err) => return Stream::fail(configs, ErrCode::Fold, MSG_CANNOT_CREATE_EXECUTOR, err),
        };
        log_stage(&configs, "fold");
        match executor.execute() {
            Ok(result) => Stream { iter: Iter::once(result), err: None, configs },
            Err(err) => Stream::fail(configs, ErrCode::Fold, MSG_CANNOT_EXECUTE, err),
        }
    }

    /// 以`f(x, y)`作为"x小于y"稳定排序，需要物化整个源。
    pub fn sort<Args>(self, f: impl IntoFunction<Args>) -> Stream {
        self.sort_with(f, Hookable::new())
    }

    pub fn sort_with<Args>(self, f: impl IntoFunction<Args>, hooks: Hookable) -> Stream {
        if self.err.is_some() {
            return self;
        }
        let Stream { iter, configs, .. } = self;
        let sorter = match Sorter::new(f.into_function()) {
            Ok(sorter) => sorter.with_strategy(strategy(&configs)),
            Err(err) => return Stream::fail(configs, ErrCode::Sort, MSG_INVALID_FUNCTION, err),
        };
        let items = match iter.to_vec() {
            Ok(items) => items,
            Err(err) => return Stream::fail(configs, ErrCode::Sort, MSG_CANNOT_GET_SLICE, err),
        };
        log_stage(&configs, "sort");
        match SortExecutor::new(sorter, Iter::from_values(items), hooks).execute() {
            Ok(sorted) => Stream { iter: Iter::from_values(sorted), err: None, configs },
            Err(err) => Stream::fail(configs, ErrCode::Sort, MSG_CANNOT_COMPARE, err),
        }
    }

    /// 只展开一层。
    pub fn flat(self) -> Stream {
        self.flat_with(FlatType::Simple, Hookable::new())
    }

    pub fn flat_with(self, kind: FlatType, hooks: Hookable) -> Stream {
        if self.err.is_some() {
            return self;
        }
        let Stream { iter, configs, .. } = self;
        log_stage(&configs, "flat");
        Stream { iter: FlatExecutor::new(kind, iter, hooks).execute(), err: None, configs }
    }

    /// 聚拢为单个序列值，需要物化整个源。
    pub fn lift(self) -> Stream {
        self.lift_with(Hookable::new())
    }

    pub fn lift_with(self, hooks: Hookable) -> Stream {
        if self.err.is_some() {
            return self;
        }
        let Stream { iter, configs, .. } = self;
        let items = match iter.to_vec() {
            Ok(items) => items,
            Err(err) => return Stream::fail(configs, ErrCode::Lift, MSG_CANNOT_GET_SLICE, err),
        };
        log_stage(&configs, "lift");
        match LiftExecutor::new(Iter::from_values(items), hooks).execute() {
            Ok(iter) => Stream { iter, err: None, configs },
            Err(err) => Stream::fail(configs, ErrCode::Lift, MSG_CANNOT_CONVERT, err),
        }
    }

    /// 终结操作：逐个消费，返回流上已有的错误或首个失败。
    pub fn consume<Args>(self, f: impl IntoFunction<Args>) -> PipeRes<()> {
        self.consume_with(f, Hookable::new())
    }

    pub fn consume_with<Args>(self, f: impl IntoFunction<Args>, hooks: Hookable) -> PipeRes<()> {
        if let Some(err) = self.err {
            return Err(err);
        }
        let consumer = Consumer::new(f.into_function())
            .map_err(|err| PipeErr::stage(ErrCode::Consume, MSG_INVALID_FUNCTION, err))?;
        log_stage(&self.configs, "consume");
        ConsumeExecutor::new(consumer.with_strategy(strategy(&self.configs)), self.iter, hooks).execute()
    }

    /// 拉取全部元素，流上已有错误时返回该错误。
    pub fn to_vec(self) -> PipeRes<Vec<Value>> {
        match self.err {
            Some(err) => Err(err),
            None => self.iter.to_vec(),
        }
    }
}

fn log_stage(configs: &[Config], stage: &str) {
    let level = if is_verbose(configs) { Level::Info } else { Level::Debug };
    log!(level, "Build {stage} stage");
}
