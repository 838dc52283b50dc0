use crate::conv::Strategy;

/// 流级别的配置，由流上构建的每个阶段继承。
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Config {
    /// 适配器参数完全转换为声明的形状，未指定时浅转换
    Coerce,
    /// 以`info`级别记录阶段构建，未指定时为`debug`
    Verbose,
}

#[inline]
pub(crate) fn strategy(configs: &[Config]) -> Strategy {
    if configs.contains(&Config::Coerce) { Strategy::Full } else { Strategy::Shallow }
}

#[inline]
pub(crate) fn is_verbose(configs: &[Config]) -> bool {
    configs.contains(&Config::Verbose)
}
