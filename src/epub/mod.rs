pub mod archive;
pub mod config;
pub mod container;
pub mod error;
pub mod media;
pub mod ncx;
pub mod opf;
pub mod publication;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出容器相关
pub use container::{Container, RootFile};

// 重新导出出版物门面
pub use publication::{Publication, PublicationConfig};

// 重新导出声明式配置
pub use config::{BookConfig, CoverConfig, ItemConfig, TocConfig};

// 重新导出OPF相关
pub use opf::{
    FieldKind,
    Guide,
    GuideReference,
    Manifest,
    ManifestItem,
    Metadata,
    MetadataField,
    OpfDocument,
    PublicationVersion,
    ReferenceType,
    Role,
    Scheme,
    Spine,
    SpineEntry,
};

// 重新导出NCX相关
pub use ncx::{NavMap, NavPoint, Ncx};
