//! NCX（Navigation Control file for XML）目录模块
//!
//! 此模块提供toc.ncx目录文档的模型定义、自动生成与序列化。
//! 目录树由脊柱引用的内容文件中的标题层级推导而来。

pub mod generator;
pub mod navigation;
pub mod writer;

// 重新导出公共类型以保持API兼容性
pub use navigation::{NavMap, NavPoint, Ncx};
