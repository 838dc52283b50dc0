use crate::{Float, Integer};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// 值的形状，即动态类型描述。容器形状携带元素形状，`Any`表示异构元素。
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Shape {
    Any,
    Nil,
    Bool,
    Int,
    Float,
    Str,
    /// 定长序列
    Array(Box<Shape>, usize),
    /// 变长序列
    List(Box<Shape>),
    /// 先进先出队列
    Queue(Box<Shape>),
    Map(Box<Shape>, Box<Shape>),
    Pair(Box<Shape>, Box<Shape>),
    /// 具名记录，按名称区分
    Record(String),
}

impl Shape {
    pub fn array(elem: Shape, len: usize) -> Shape {
        Shape::Array(Box::new(elem), len)
    }

    pub fn list(elem: Shape) -> Shape {
        Shape::List(Box::new(elem))
    }

    pub fn queue(elem: Shape) -> Shape {
        Shape::Queue(Box::new(elem))
    }

    pub fn map(key: Shape, val: Shape) -> Shape {
        Shape::Map(Box::new(key), Box::new(val))
    }

    pub fn pair(key: Shape, val: Shape) -> Shape {
        Shape::Pair(Box::new(key), Box::new(val))
    }

    pub fn record(name: impl Into<String>) -> Shape {
        Shape::Record(name.into())
    }

    /// 形状的零值。
    pub fn zero(&self) -> Value {
        match self {
            Shape::Any | Shape::Nil => Value::Nil,
            Shape::Bool => Value::Bool(false),
            Shape::Int => Value::Int(0),
            Shape::Float => Value::Float(OrderedFloat(0.0)),
            Shape::Str => Value::Str(String::new()),
            Shape::Array(elem, len) => Value::Array(Seq::new((**elem).clone(), vec![elem.zero(); *len])),
            Shape::List(elem) => Value::List(Seq::new((**elem).clone(), vec![])),
            Shape::Queue(elem) => Value::Queue(Seq::new((**elem).clone(), vec![])),
            Shape::Map(key, val) => Value::Map(Dict::new((**key).clone(), (**val).clone())),
            Shape::Pair(key, val) => Value::pair(key.zero(), val.zero()),
            Shape::Record(name) => Value::Record(Record::new(name.clone())),
        }
    }

    pub fn is_iterable(&self) -> bool {
        matches!(self, Shape::Array(..) | Shape::List(_) | Shape::Queue(_) | Shape::Map(..))
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Any => f.write_str("any"),
            Shape::Nil => f.write_str("nil"),
            Shape::Bool => f.write_str("bool"),
            Shape::Int => f.write_str("int"),
            Shape::Float => f.write_str("float"),
            Shape::Str => f.write_str("str"),
            Shape::Array(elem, len) => write!(f, "[{elem}; {len}]"),
            Shape::List(elem) => write!(f, "[{elem}]"),
            Shape::Queue(elem) => write!(f, "queue<{elem}>"),
            Shape::Map(key, val) => write!(f, "map<{key}, {val}>"),
            Shape::Pair(key, val) => write!(f, "({key}, {val})"),
            Shape::Record(name) => f.write_str(name),
        }
    }
}

/// 流水线中流动的动态值。
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(Integer),
    Float(OrderedFloat<Float>),
    Str(String),
    Array(Seq),
    List(Seq),
    Queue(Seq),
    Map(Dict),
    /// 键值对，映射迭代时产生
    Pair(Box<Value>, Box<Value>),
    Record(Record),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    pub fn float(f: Float) -> Value {
        Value::Float(OrderedFloat(f))
    }

    pub fn pair(key: Value, val: Value) -> Value {
        Value::Pair(Box::new(key), Box::new(val))
    }

    /// 异构变长序列。
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Seq::new(Shape::Any, items))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Seq::new(Shape::Any, items))
    }

    pub fn queue(items: Vec<Value>) -> Value {
        Value::Queue(Seq::new(Shape::Any, items))
    }

    pub fn shape(&self) -> Shape {
        match self {
            Value::Nil => Shape::Nil,
            Value::Bool(_) => Shape::Bool,
            Value::Int(_) => Shape::Int,
            Value::Float(_) => Shape::Float,
            Value::Str(_) => Shape::Str,
            Value::Array(seq) => Shape::array(seq.elem.clone(), seq.len()),
            Value::List(seq) => Shape::list(seq.elem.clone()),
            Value::Queue(seq) => Shape::queue(seq.elem.clone()),
            Value::Map(dict) => Shape::map(dict.key.clone(), dict.val.clone()),
            Value::Pair(key, val) => Shape::pair(key.shape(), val.shape()),
            Value::Record(record) => Shape::Record(record.name.clone()),
        }
    }

    pub fn is_iterable(&self) -> bool {
        matches!(self, Value::Array(_) | Value::List(_) | Value::Queue(_) | Value::Map(_))
    }

    /// 取出序列类值（定长、变长、队列）的元素，其他值原样返回。
    pub fn into_seq(self) -> Result<Vec<Value>, Value> {
        match self {
            Value::Array(seq) | Value::List(seq) | Value::Queue(seq) => Ok(seq.items),
            other => Err(other),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Array(seq) | Value::List(seq) => write!(f, "[{}]", seq.items.iter().join(", ")),
            Value::Queue(seq) => write!(f, "queue[{}]", seq.items.iter().join(", ")),
            Value::Map(dict) => {
                write!(f, "{{{}}}", dict.entries.iter().map(|(k, v)| format!("{k}: {v}")).join(", "))
            }
            Value::Pair(key, val) => write!(f, "({key}, {val})"),
            Value::Record(record) => write!(
                f,
                "{} {{ {} }}",
                record.name,
                record.fields.iter().map(|(name, v)| format!("{name}: {v}")).join(", ")
            ),
        }
    }
}

/// 序列类容器的内容：声明的元素形状和元素。
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Seq {
    elem: Shape,
    items: Vec<Value>,
}

impl Seq {
    pub fn new(elem: Shape, items: Vec<Value>) -> Seq {
        Seq { elem, items }
    }

    pub fn elem(&self) -> &Shape {
        &self.elem
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Dict {
    key: Shape,
    val: Shape,
    entries: BTreeMap<Value, Value>,
}

impl Dict {
    pub fn new(key: Shape, val: Shape) -> Dict {
        Dict { key, val, entries: BTreeMap::new() }
    }

    pub fn with_entries(key: Shape, val: Shape, entries: BTreeMap<Value, Value>) -> Dict {
        Dict { key, val, entries }
    }

    pub fn key(&self) -> &Shape {
        &self.key
    }

    pub fn val(&self) -> &Shape {
        &self.val
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: Value, val: Value) -> Option<Value> {
        self.entries.insert(key, val)
    }

    pub fn entries(&self) -> &BTreeMap<Value, Value> {
        &self.entries
    }

    pub fn into_entries(self) -> BTreeMap<Value, Value> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 具名记录，字段保持插入顺序。用户自定义结构体通过它与`Value`互转。
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Record {
    name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Record {
        Record { name: name.into(), fields: vec![] }
    }

    /// 追加或覆盖字段。
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Record {
        self.set(field, value.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, old)) => *old = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(name, _)| name == field).map(|(_, value)| value)
    }

    /// 移出字段值，字段不存在时为`Nil`。
    pub fn take(&mut self, field: &str) -> Value {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, value)) => std::mem::replace(value, Value::Nil),
            None => Value::Nil,
        }
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Integer> for Value {
    fn from(i: Integer) -> Self {
        Value::Int(i)
    }
}

impl From<Float> for Value {
    fn from(f: Float) -> Self {
        Value::float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(Shape::Int.zero(), Value::Int(0));
        assert_eq!(Shape::Any.zero(), Value::Nil);
        assert_eq!(
            Shape::array(Shape::Bool, 2).zero(),
            Value::Array(Seq::new(Shape::Bool, vec![Value::Bool(false), Value::Bool(false)]))
        );
        assert_eq!(Shape::list(Shape::Int).zero().shape(), Shape::list(Shape::Int));
        assert_eq!(Shape::pair(Shape::Str, Shape::Int).zero(), Value::pair(Value::str(""), Value::Int(0)));
    }

    #[test]
    fn test_shape_of_value() {
        assert_eq!(Value::list(vec![Value::Int(1)]).shape(), Shape::list(Shape::Any));
        assert_eq!(Value::array(vec![Value::Int(1), Value::Nil]).shape(), Shape::array(Shape::Any, 2));
        assert_eq!(Value::pair(Value::str("a"), Value::Int(1)).shape(), Shape::pair(Shape::Str, Shape::Int));
        assert_eq!(Value::Record(Record::new("Person")).shape(), Shape::record("Person"));
    }

    #[test]
    fn test_iterable() {
        assert!(Value::list(vec![]).is_iterable());
        assert!(Value::Map(Dict::new(Shape::Str, Shape::Int)).is_iterable());
        assert!(!Value::Nil.is_iterable());
        assert!(!Value::str("abc").is_iterable());
        assert!(!Value::pair(Value::Nil, Value::Nil).is_iterable());
        assert!(Shape::queue(Shape::Int).is_iterable());
        assert!(!Shape::record("Person").is_iterable());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::map(Shape::Str, Shape::list(Shape::Int)).to_string(), "map<str, [int]>");
        assert_eq!(Shape::array(Shape::Float, 3).to_string(), "[float; 3]");
        assert_eq!(Value::list(vec![Value::Int(1), Value::str("a"), Value::Nil]).to_string(), "[1, a, nil]");
        let record = Record::new("Person").with("name", "John").with("age", 42i64);
        assert_eq!(Value::Record(record).to_string(), "Person { name: John, age: 42 }");
    }

    #[test]
    fn test_record_fields() {
        let mut record = Record::new("Person").with("name", "John").with("region", "north");
        record.set("name", Value::str("Jane"));
        assert_eq!(record.get("name"), Some(&Value::str("Jane")));
        assert_eq!(record.fields().len(), 2);
        assert_eq!(record.take("region"), Value::str("north"));
        assert_eq!(record.get("region"), Some(&Value::Nil));
        assert_eq!(record.take("missing"), Value::Nil);
    }

    #[test]
    fn test_value_ordering() {
        let mut values = vec![Value::Int(3), Value::Nil, Value::Int(1), Value::float(0.5)];
        values.sort();
        assert_eq!(values, vec![Value::Nil, Value::Int(1), Value::Int(3), Value::float(0.5)]);
    }
}
