use crate::value::{Dict, Record, Seq, Shape, Value};
use crate::{Float, Integer, PipeErr, PipeRes};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;

/// 非容器叶子值的默认转换策略。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Strategy {
    /// 原样返回，由适配器在调用时判断兼容性
    #[default]
    Shallow,
    /// 强制转换为目标形状
    Full,
}

/// 将值转换为目标形状。容器形状逐元素递归转换，首个元素失败即中止，错误中携带目标形状的零值；
/// 非容器形状按`strategy`处理。
pub fn convert(value: Value, shape: &Shape, strategy: Strategy) -> PipeRes<Value> {
    match shape {
        Shape::Array(elem, len) => convert_array(value, shape, elem, *len, strategy),
        Shape::List(elem) => convert_seq(value, shape, elem, strategy).map(Value::List),
        Shape::Queue(elem) => convert_seq(value, shape, elem, strategy).map(Value::Queue),
        Shape::Map(key, val) => convert_map(value, shape, key, val, strategy),
        Shape::Pair(key, val) => match value {
            Value::Pair(k, v) => convert_pair(*k, *v, shape, key, val, strategy),
            value => leaf(value, shape, strategy),
        },
        _ => leaf(value, shape, strategy),
    }
}

fn leaf(value: Value, shape: &Shape, strategy: Strategy) -> PipeRes<Value> {
    match strategy {
        Strategy::Shallow => Ok(value),
        Strategy::Full => coerce(value, shape),
    }
}

#[inline]
pub fn convert_shallow(value: Value, shape: &Shape) -> PipeRes<Value> {
    convert(value, shape, Strategy::Shallow)
}

#[inline]
pub fn convert_full(value: Value, shape: &Shape) -> PipeRes<Value> {
    convert(value, shape, Strategy::Full)
}

fn convert_items(
    from: &Shape,
    items: Vec<Value>,
    shape: &Shape,
    elem: &Shape,
    strategy: Strategy,
) -> PipeRes<Vec<Value>> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            convert(item, elem, strategy)
                .map_err(|err| PipeErr::conversion(from.clone(), shape, format!("element #{idx}: {err}")))
        })
        .collect()
}

fn convert_seq(value: Value, shape: &Shape, elem: &Shape, strategy: Strategy) -> PipeRes<Seq> {
    let from = value.shape();
    match value.into_seq() {
        Ok(items) => Ok(Seq::new(elem.clone(), convert_items(&from, items, shape, elem, strategy)?)),
        Err(_) => Err(PipeErr::conversion(from, shape, "not a sequence")),
    }
}

fn convert_array(value: Value, shape: &Shape, elem: &Shape, len: usize, strategy: Strategy) -> PipeRes<Value> {
    let from = value.shape();
    match value.into_seq() {
        Ok(mut items) => {
            if items.len() < len {
                return Err(PipeErr::conversion(from, shape, format!("expected {len} elements, got {}", items.len())));
            }
            items.truncate(len);
            Ok(Value::Array(Seq::new(elem.clone(), convert_items(&from, items, shape, elem, strategy)?)))
        }
        Err(_) => Err(PipeErr::conversion(from, shape, "not a sequence")),
    }
}

fn convert_map(value: Value, shape: &Shape, key: &Shape, val: &Shape, strategy: Strategy) -> PipeRes<Value> {
    let from = value.shape();
    let Value::Map(dict) = value else {
        return Err(PipeErr::conversion(from, shape, "not a map"));
    };
    let mut entries = BTreeMap::new();
    for (k, v) in dict.into_entries() {
        let desc = k.to_string();
        let k = convert(k, key, strategy)
            .map_err(|err| PipeErr::conversion(from.clone(), shape, format!("key `{desc}`: {err}")))?;
        let v = convert(v, val, strategy)
            .map_err(|err| PipeErr::conversion(from.clone(), shape, format!("value of `{desc}`: {err}")))?;
        entries.insert(k, v);
    }
    Ok(Value::Map(Dict::with_entries(key.clone(), val.clone(), entries)))
}

fn convert_pair(k: Value, v: Value, shape: &Shape, key: &Shape, val: &Shape, strategy: Strategy) -> PipeRes<Value> {
    let from = Shape::pair(k.shape(), v.shape());
    let k = convert(k, key, strategy).map_err(|err| PipeErr::conversion(from.clone(), shape, format!("key: {err}")))?;
    let v = convert(v, val, strategy).map_err(|err| PipeErr::conversion(from, shape, format!("value: {err}")))?;
    Ok(Value::pair(k, v))
}

/// 完全转换的叶子规则。
fn coerce(value: Value, shape: &Shape) -> PipeRes<Value> {
    if *shape == Shape::Any {
        return Ok(value);
    }
    let from = value.shape();
    if from == *shape {
        return Ok(value);
    }
    match (value, shape) {
        (Value::Nil, _) => Ok(shape.zero()),
        (Value::Int(i), Shape::Float) => Ok(Value::float(i as Float)),
        (Value::Bool(b), Shape::Int) => Ok(Value::Int(b as Integer)),
        (Value::Float(f), Shape::Int) => {
            let f = f.into_inner();
            if f.is_finite() && f >= Integer::MIN as Float && f < Integer::MAX as Float {
                Ok(Value::Int(f.trunc() as Integer))
            } else {
                Err(PipeErr::conversion(from, shape, format!("`{f}` is out of integer range")))
            }
        }
        (value @ (Value::Bool(_) | Value::Int(_) | Value::Float(_)), Shape::Str) => {
            Ok(Value::Str(value.to_string()))
        }
        _ => Err(PipeErr::conversion(from, shape, "incompatible value")),
    }
}

/// 具有静态形状的Rust类型。
pub trait Typed {
    fn shape() -> Shape;
}

/// 从`Value`中取出Rust值，形状不符时返回转换错误。
pub trait FromValue: Typed + Sized {
    fn from_value(value: Value) -> PipeRes<Self>;
}

pub trait IntoValue: Typed {
    fn into_value(self) -> Value;
}

fn mismatch<T: Typed>(value: &Value) -> PipeErr {
    PipeErr::conversion(value.shape(), &T::shape(), "incompatible value")
}

impl Typed for Value {
    fn shape() -> Shape {
        Shape::Any
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> PipeRes<Self> {
        Ok(value)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl Typed for bool {
    fn shape() -> Shape {
        Shape::Bool
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> PipeRes<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch::<bool>(&other)),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! int_value {
    ($($t:ty),*) => {$(
        impl Typed for $t {
            fn shape() -> Shape {
                Shape::Int
            }
        }

        impl FromValue for $t {
            fn from_value(value: Value) -> PipeRes<Self> {
                match value {
                    Value::Int(i) => <$t>::try_from(i).map_err(|_| {
                        PipeErr::conversion(Shape::Int, &Shape::Int, format!("`{i}` overflows {}", stringify!($t)))
                    }),
                    other => Err(mismatch::<$t>(&other)),
                }
            }
        }

        impl IntoValue for $t {
            fn into_value(self) -> Value {
                Value::Int(self as Integer)
            }
        }
    )*};
}

int_value!(i8, i16, i32, i64, u8, u16, u32, isize);

// 可能超出`Integer`范围，仅支持取出
macro_rules! wide_int_value {
    ($($t:ty),*) => {$(
        impl Typed for $t {
            fn shape() -> Shape {
                Shape::Int
            }
        }

        impl FromValue for $t {
            fn from_value(value: Value) -> PipeRes<Self> {
                match value {
                    Value::Int(i) => <$t>::try_from(i).map_err(|_| {
                        PipeErr::conversion(Shape::Int, &Shape::Int, format!("`{i}` overflows {}", stringify!($t)))
                    }),
                    other => Err(mismatch::<$t>(&other)),
                }
            }
        }
    )*};
}

wide_int_value!(u64, usize);

impl Typed for f64 {
    fn shape() -> Shape {
        Shape::Float
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> PipeRes<Self> {
        match value {
            Value::Float(f) => Ok(f.into_inner()),
            other => Err(mismatch::<f64>(&other)),
        }
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::float(self)
    }
}

impl Typed for f32 {
    fn shape() -> Shape {
        Shape::Float
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> PipeRes<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::float(self as Float)
    }
}

impl Typed for String {
    fn shape() -> Shape {
        Shape::Str
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> PipeRes<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch::<String>(&other)),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl Typed for &str {
    fn shape() -> Shape {
        Shape::Str
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::str(self)
    }
}

fn seq_from_value<T: FromValue>(value: Value, shape: &Shape) -> PipeRes<Vec<T>> {
    match value.into_seq() {
        Ok(items) => items.into_iter().map(T::from_value).collect(),
        Err(other) => Err(PipeErr::conversion(other.shape(), shape, "not a sequence")),
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> PipeRes<Self> {
        seq_from_value(value, &Self::shape())
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(Seq::new(T::shape(), self.into_iter().map(T::into_value).collect()))
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn shape() -> Shape {
        Shape::array(T::shape(), N)
    }
}

impl<T: FromValue, const N: usize> FromValue for [T; N] {
    fn from_value(value: Value) -> PipeRes<Self> {
        let from = value.shape();
        let items = seq_from_value::<T>(value, &Self::shape())?;
        let len = items.len();
        <[T; N]>::try_from(items)
            .map_err(|_| PipeErr::conversion(from, &Self::shape(), format!("expected {N} elements, got {len}")))
    }
}

impl<T: IntoValue, const N: usize> IntoValue for [T; N] {
    fn into_value(self) -> Value {
        Value::Array(Seq::new(T::shape(), self.into_iter().map(T::into_value).collect()))
    }
}

impl<T: Typed> Typed for VecDeque<T> {
    fn shape() -> Shape {
        Shape::queue(T::shape())
    }
}

impl<T: FromValue> FromValue for VecDeque<T> {
    fn from_value(value: Value) -> PipeRes<Self> {
        seq_from_value(value, &Self::shape()).map(VecDeque::from)
    }
}

impl<T: IntoValue> IntoValue for VecDeque<T> {
    fn into_value(self) -> Value {
        Value::Queue(Seq::new(T::shape(), self.into_iter().map(T::into_value).collect()))
    }
}

fn entries_from_value<K: FromValue, V: FromValue>(value: Value, shape: &Shape) -> PipeRes<Vec<(K, V)>> {
    match value {
        Value::Map(dict) => {
            dict.into_entries().into_iter().map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?))).collect()
        }
        other => Err(PipeErr::conversion(other.shape(), shape, "not a map")),
    }
}

fn entries_into_value<K: IntoValue, V: IntoValue>(entries: impl IntoIterator<Item = (K, V)>) -> Value {
    let entries = entries.into_iter().map(|(k, v)| (k.into_value(), v.into_value())).collect();
    Value::Map(Dict::with_entries(K::shape(), V::shape(), entries))
}

impl<K: Typed, V: Typed> Typed for HashMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }
}

impl<K: FromValue + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
    fn from_value(value: Value) -> PipeRes<Self> {
        entries_from_value(value, &Self::shape()).map(HashMap::from_iter)
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for HashMap<K, V> {
    fn into_value(self) -> Value {
        entries_into_value(self)
    }
}

impl<K: Typed, V: Typed> Typed for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: Value) -> PipeRes<Self> {
        entries_from_value(value, &Self::shape()).map(BTreeMap::from_iter)
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for BTreeMap<K, V> {
    fn into_value(self) -> Value {
        entries_into_value(self)
    }
}

impl<A: Typed, B: Typed> Typed for (A, B) {
    fn shape() -> Shape {
        Shape::pair(A::shape(), B::shape())
    }
}

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn from_value(value: Value) -> PipeRes<Self> {
        match value {
            Value::Pair(a, b) => Ok((A::from_value(*a)?, B::from_value(*b)?)),
            other => Err(mismatch::<(A, B)>(&other)),
        }
    }
}

impl<A: IntoValue, B: IntoValue> IntoValue for (A, B) {
    fn into_value(self) -> Value {
        Value::pair(self.0.into_value(), self.1.into_value())
    }
}

/// `Nil`对应`None`。
impl<T: Typed> Typed for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> PipeRes<Self> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Nil, T::into_value)
    }
}

/// 任意名称的记录。
impl Typed for Record {
    fn shape() -> Shape {
        Shape::Any
    }
}

impl FromValue for Record {
    fn from_value(value: Value) -> PipeRes<Self> {
        match value {
            Value::Record(record) => Ok(record),
            other => Err(PipeErr::conversion(other.shape(), &Shape::Any, "not a record")),
        }
    }
}

impl IntoValue for Record {
    fn into_value(self) -> Value {
        Value::Record(self)
    }
}
