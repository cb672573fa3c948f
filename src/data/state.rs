//! 请求状态机

use crate::error::FetchError;
use crate::widget::{DataPayload, Records};

/// 单个节点的数据状态
///
/// `Idle -> Loading -> Success | Error`，每次重新请求都回到 `Loading`
/// 并丢弃之前的数据。
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success(Records),
    Error(FetchError),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn records(&self) -> Option<&Records> {
        match self {
            FetchState::Success(records) => Some(records),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// 对应推送给组件的数据
    pub fn payload(&self) -> DataPayload {
        match self {
            FetchState::Loading => DataPayload::Loading,
            FetchState::Success(records) => DataPayload::Records(records.clone()),
            FetchState::Idle | FetchState::Error(_) => DataPayload::NoData,
        }
    }
}
