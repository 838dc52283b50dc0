use crate::conv::{FromValue, Typed, convert_full};
use crate::iter::Iter;
use crate::pipe::Stream;
use crate::value::Value;
use crate::PipeRes;
use log::debug;
use std::sync::mpsc::SyncSender;

impl Stream {
    /// 物化全部元素，作为一个序列完全转换为`T`的形状后写入`out`。`T`应为容器类型。
    pub fn assign_to<T: FromValue>(self, out: &mut T) -> PipeRes<()> {
        let items = self.to_vec()?;
        let value = convert_full(Value::list(items), &<T as Typed>::shape())?;
        *out = T::from_value(value)?;
        Ok(())
    }

    /// 见`Iter::pump`，流上已有的错误作为唯一一条消息发送。
    pub fn pump(self, tx: &SyncSender<PipeRes<Value>>) {
        match self.err() {
            Some(err) => {
                if tx.send(Err(err.clone())).is_err() {
                    debug!("Receiver dropped before the stream error was delivered");
                }
            }
            None => self.into_iter().pump(tx),
        }
    }
}

impl Iter {
    /// 拉取到结束并逐个发送到通道，失败作为最后一条消息发送。
    /// 通道有界时生产者最多领先消费者通道容量个元素；接收端关闭后停止拉取。
    pub fn pump(self, tx: &SyncSender<PipeRes<Value>>) {
        for res in self {
            if tx.send(res).is_err() {
                debug!("Receiver dropped, stop pumping");
                break;
            }
        }
    }
}
