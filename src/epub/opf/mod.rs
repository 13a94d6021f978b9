//! OPF（Open Packaging Format）包模块
//!
//! 此模块提供content.opf包文件的模型定义、序列化与解析功能，
//! 包括元数据、清单、脊柱与指南。

pub mod guide;
pub mod manifest;
pub mod metadata;
pub mod parser;
pub mod spine;
pub mod writer;

// 重新导出公共类型以保持API兼容性
pub use guide::{Guide, GuideReference, ReferenceType};
pub use manifest::{Manifest, ManifestItem};
pub use metadata::{FieldKind, Metadata, MetadataField, Role, Scheme};
pub use parser::OpfDocument;
pub use spine::{Spine, SpineEntry, TABLE_OF_CONTENTS_ID};

/// 出版物规范版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationVersion {
    /// EPUB 2.0.1
    V2,
    /// EPUB 3.x（仅序列化时写出版本号，不支持EPUB3语义）
    V3,
}

impl PublicationVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationVersion::V2 => "2.0",
            PublicationVersion::V3 => "3.0",
        }
    }

    pub fn from_str(value: &str) -> Option<PublicationVersion> {
        if value.starts_with('2') {
            Some(PublicationVersion::V2)
        } else if value.starts_with('3') {
            Some(PublicationVersion::V3)
        } else {
            None
        }
    }
}
