use crate::conv::{FromValue, IntoValue, Strategy, convert};
use crate::value::{Shape, Value};
use crate::{PipeErr, PipeRes};
use itertools::Itertools;
use std::fmt::{Debug, Display, Formatter};

/// 函数的形状描述：参数形状和结果形状。
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Signature {
    pub params: Vec<Shape>,
    pub results: Vec<Shape>,
}

impl Signature {
    pub fn new(params: Vec<Shape>, results: Vec<Shape>) -> Signature {
        Signature { params, results }
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn({}) -> ({})", self.params.iter().join(", "), self.results.iter().join(", "))
    }
}

type Body = Box<dyn FnMut(Vec<Value>) -> PipeRes<Vec<Value>>>;

/// 带形状描述的动态函数，参数在调用前按参数形状转换。
pub struct Function {
    sig: Signature,
    body: Body,
}

impl Function {
    /// 以动态形式构造函数，`body`接收已按`sig`转换过的参数。
    pub fn new(sig: Signature, body: impl FnMut(Vec<Value>) -> PipeRes<Vec<Value>> + 'static) -> Function {
        Function { sig, body: Box::new(body) }
    }

    pub fn signature(&self) -> &Signature {
        &self.sig
    }

    pub fn call(&mut self, args: Vec<Value>, strategy: Strategy) -> PipeRes<Vec<Value>> {
        if args.len() != self.sig.params.len() {
            return Err(PipeErr::Call(format!(
                "`{}` expects {} arguments, got {}",
                self.sig,
                self.sig.params.len(),
                args.len()
            )));
        }
        let args = args
            .into_iter()
            .zip(&self.sig.params)
            .map(|(arg, shape)| convert(arg, shape, strategy))
            .collect::<PipeRes<_>>()?;
        let results = (self.body)(args)?;
        if results.len() != self.sig.results.len() {
            return Err(PipeErr::Call(format!(
                "`{}` declares {} results, returned {}",
                self.sig,
                self.sig.results.len(),
                results.len()
            )));
        }
        Ok(results)
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function").field("sig", &self.sig.to_string()).finish()
    }
}

/// 闭包返回值到结果列表的映射：`()`无结果，`IntoValue`一个结果，`Err`转为调用错误。
pub trait IntoResults {
    fn shapes() -> Vec<Shape>;

    fn into_results(self) -> PipeRes<Vec<Value>>;
}

impl IntoResults for () {
    fn shapes() -> Vec<Shape> {
        vec![]
    }

    fn into_results(self) -> PipeRes<Vec<Value>> {
        Ok(vec![])
    }
}

impl<T: IntoValue> IntoResults for T {
    fn shapes() -> Vec<Shape> {
        vec![T::shape()]
    }

    fn into_results(self) -> PipeRes<Vec<Value>> {
        Ok(vec![self.into_value()])
    }
}

impl<R: IntoResults, E: Display> IntoResults for Result<R, E> {
    fn shapes() -> Vec<Shape> {
        R::shapes()
    }

    fn into_results(self) -> PipeRes<Vec<Value>> {
        match self {
            Ok(res) => res.into_results(),
            Err(err) => Err(PipeErr::Call(err.to_string())),
        }
    }
}

/// 可转换为`Function`的类型，形状由参数和返回值类型在编译期确定。
pub trait IntoFunction<Args> {
    fn into_function(self) -> Function;
}

impl IntoFunction<Function> for Function {
    fn into_function(self) -> Function {
        self
    }
}

fn take_args<const N: usize>(args: Vec<Value>) -> PipeRes<[Value; N]> {
    let len = args.len();
    <[Value; N]>::try_from(args).map_err(|_| PipeErr::Call(format!("expects {N} arguments, got {len}")))
}

impl<F, R> IntoFunction<()> for F
where
    F: FnMut() -> R + 'static,
    R: IntoResults,
{
    fn into_function(mut self) -> Function {
        Function::new(Signature::new(vec![], R::shapes()), move |_| self().into_results())
    }
}

impl<F, A, R> IntoFunction<(A,)> for F
where
    F: FnMut(A) -> R + 'static,
    A: FromValue,
    R: IntoResults,
{
    fn into_function(mut self) -> Function {
        Function::new(Signature::new(vec![A::shape()], R::shapes()), move |args| {
            let [a] = take_args(args)?;
            self(A::from_value(a)?).into_results()
        })
    }
}

impl<F, A, B, R> IntoFunction<(A, B)> for F
where
    F: FnMut(A, B) -> R + 'static,
    A: FromValue,
    B: FromValue,
    R: IntoResults,
{
    fn into_function(mut self) -> Function {
        Function::new(Signature::new(vec![A::shape(), B::shape()], R::shapes()), move |args| {
            let [a, b] = take_args(args)?;
            self(A::from_value(a)?, B::from_value(b)?).into_results()
        })
    }
}
