//! Error types for the tracker

use std::path::PathBuf;

use thiserror::Error;

use crate::forms::ValidationError;
use crate::plan::Day;

/// Errors surfaced by the store and the form handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The database could not be opened or upgraded. Fatal.
    #[error("无法打开数据库 {}: {source}", .path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Form input rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No custom exercise with this id.
    #[error("未找到动作 (id: {0})")]
    NotFound(i64),

    /// No custom exercise with this name on the given day.
    #[error("{day} 没有名为 \"{name}\" 的自定义动作")]
    NoSuchExercise { name: String, day: Day },

    /// Template exercises are read-only.
    #[error("默认动作 \"{0}\" 不可编辑或删除")]
    TemplateLocked(String),

    /// Several custom exercises share the name on one day.
    #[error("{day} 有多个名为 \"{name}\" 的动作, 请用 id 指定: {ids:?}")]
    Ambiguous { name: String, day: Day, ids: Vec<i64> },

    /// Read or write failure after the store was opened.
    #[error("数据库错误: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type AppResult<T> = Result<T, AppError>;
