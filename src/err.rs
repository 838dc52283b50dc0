use crate::adapter::AggregatorKind;
use crate::func::Signature;
use crate::op::fold::FoldType;
use crate::value::{Shape, Value};
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum PipeErr {
    #[error("[Validate] Invalid {adapter} function: requires `{expected}`, got `{actual}`")]
    InvalidFunction { adapter: &'static str, expected: &'static str, actual: Signature },

    #[error("[Conversion] Unable to convert `{from}` into `{to}`: {reason}")]
    Conversion { from: Shape, to: Shape, zero: Value, reason: String },

    #[error("[Iterator] {0}")]
    Iterator(String),

    #[error("[Fold] Fold type `{fold}` is not applicable to {aggregator} aggregator")]
    FoldType { fold: FoldType, aggregator: AggregatorKind },

    #[error("[Call] Function returned error: {0}")]
    Call(String),

    #[error("[{code}] {msg}: {source}")]
    Stage { code: ErrCode, msg: &'static str, source: Box<PipeErr> },
}

/// 错误分类标签，由`PipeErr::code()`给出，包装阶段错误时作为阶段标签。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrCode {
    Validate,
    Conversion,
    Iterator,
    Fold,
    Call,
    Map,
    Filter,
    Sort,
    Flat,
    Lift,
    Consume,
}

impl Display for ErrCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrCode::Validate => "Validate",
            ErrCode::Conversion => "Conversion",
            ErrCode::Iterator => "Iterator",
            ErrCode::Fold => "Fold",
            ErrCode::Call => "Call",
            ErrCode::Map => "Map",
            ErrCode::Filter => "Filter",
            ErrCode::Sort => "Sort",
            ErrCode::Flat => "Flat",
            ErrCode::Lift => "Lift",
            ErrCode::Consume => "Consume",
        };
        f.write_str(name)
    }
}

impl PipeErr {
    /// 构造转换错误，错误中携带目标形状的零值。
    pub fn conversion(from: Shape, to: &Shape, reason: impl Into<String>) -> PipeErr {
        PipeErr::Conversion { from, zero: to.zero(), to: to.clone(), reason: reason.into() }
    }

    pub fn iterator(msg: impl Into<String>) -> PipeErr {
        PipeErr::Iterator(msg.into())
    }

    /// 以阶段标签和信息包装一个错误。
    pub fn stage(code: ErrCode, msg: &'static str, source: PipeErr) -> PipeErr {
        PipeErr::Stage { code, msg, source: Box::new(source) }
    }

    pub fn code(&self) -> ErrCode {
        match self {
            PipeErr::InvalidFunction { .. } => ErrCode::Validate,
            PipeErr::Conversion { .. } => ErrCode::Conversion,
            PipeErr::Iterator(_) => ErrCode::Iterator,
            PipeErr::FoldType { .. } => ErrCode::Fold,
            PipeErr::Call(_) => ErrCode::Call,
            PipeErr::Stage { code, .. } => *code,
        }
    }

    /// 去掉所有阶段包装后的根错误。
    pub fn root(&self) -> &PipeErr {
        let mut err = self;
        while let PipeErr::Stage { source, .. } = err {
            err = source;
        }
        err
    }

    /// 转换错误携带的零值。
    pub fn zero_value(&self) -> Option<&Value> {
        match self.root() {
            PipeErr::Conversion { zero, .. } => Some(zero),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_code_and_root() {
        let err = PipeErr::stage(ErrCode::Map, "cannot execute", PipeErr::Call("boom".to_string()));
        assert_eq!(err.code(), ErrCode::Map);
        assert_eq!(err.root(), &PipeErr::Call("boom".to_string()));
        assert_eq!(err.to_string(), "[Map] cannot execute: [Call] Function returned error: boom");
    }

    #[test]
    fn test_conversion_carries_zero() {
        let err = PipeErr::conversion(Shape::Str, &Shape::Int, "incompatible value");
        assert_eq!(err.code(), ErrCode::Conversion);
        assert_eq!(err.zero_value(), Some(&Value::Int(0)));
        let wrapped = PipeErr::stage(ErrCode::Sort, "cannot compare", err);
        assert_eq!(wrapped.zero_value(), Some(&Value::Int(0)));
        assert_eq!(PipeErr::iterator("x").zero_value(), None);
    }
}
