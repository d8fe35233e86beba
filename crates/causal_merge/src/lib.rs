//! # Causal Merge
//!
//! 因果合并迭代器：以 anchor 流 (通常为 `imu`) 的节拍，把多个不同速率的
//! 遥测流对齐为 `CompositeRecord` 序列。
//!
//! 负责：
//! - 每个 anchor 记录产生一个 `CompositeRecord`
//! - 其他流取 anchor 时间之前 (含) 的最新记录，无新数据时保持上一条
//! - 永不读取 anchor 时间之后的数据
//! - 会话状态 (`Cursors`) 与合并计划 (`CausalMerge`) 分离
//!
//! ## 使用示例
//!
//! ```
//! use causal_merge::CausalMerge;
//! use contracts::{Stream, StreamSet};
//!
//! let streams: StreamSet = [
//!     Stream::from_numeric_rows("imu", &["ax"], [(0.0, [0.0]), (0.1, [0.1])]).unwrap(),
//!     Stream::from_numeric_rows("gps", &["alt"], [(0.05, [300.0])]).unwrap(),
//! ]
//! .into_iter()
//! .collect();
//!
//! let merge = CausalMerge::new(&streams, "imu");
//! let held: Vec<_> = merge
//!     .session()
//!     .map(|c| c.get("gps").map(|r| r.timestamp()))
//!     .collect();
//! assert_eq!(held, vec![None, Some(0.05)]);
//! ```

mod cursor;
mod merge;

pub use cursor::Cursors;
pub use merge::{CausalMerge, MergeSession};

// Re-export contracts types
pub use contracts::{CompositeRecord, MergeStats};
