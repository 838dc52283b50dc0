//! 惰性、拉取式的数据流水线引擎。
//!
//! 元素是形状在运行时才确定的[`Value`]，用户函数经适配器校验形状后统一调用，参数由转换引擎按函数声明的形状转换。
//!
//! ```
//! use rflow::{Iter, Stream, Value};
//!
//! let stream = Stream::new(Iter::from_array([5i64, 4, 9, 2]))
//!     .filter(|x: i64| x > 2)
//!     .sort(|x: i64, y: i64| x < y);
//! assert_eq!(stream.to_vec(), Ok(vec![Value::Int(4), Value::Int(5), Value::Int(9)]));
//! ```

pub mod adapter;
pub mod config;
pub mod conv;
pub mod err;
pub mod func;
mod input;
pub mod iter;
pub mod op;
mod output;
pub mod pipe;
pub mod value;

pub use crate::adapter::{Aggregator, AggregatorKind, Consumer, Mapper, Predicate, Sorter};
pub use crate::config::Config;
pub use crate::conv::{FromValue, IntoValue, Strategy, Typed};
pub use crate::err::{ErrCode, PipeErr};
pub use crate::func::{Function, IntoFunction, Signature};
pub use crate::input::RangeBuilder;
pub use crate::iter::Iter;
pub use crate::op::flat::FlatType;
pub use crate::op::fold::{FoldConfig, FoldType};
pub use crate::op::hook::{Hookable, Phase};
pub use crate::op::{Executor, Op, build};
pub use crate::pipe::Stream;
pub use crate::value::{Dict, Record, Seq, Shape, Value};

pub type Integer = i64;
pub type Float = f64;
pub type PipeRes<T> = Result<T, PipeErr>;
