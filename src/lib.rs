pub mod epub;

// === 核心API重新导出 ===

/// 出版物门面（主要接口）
pub use epub::{Publication, PublicationConfig};

/// 错误处理
pub use epub::{EpubError, Result};

/// 声明式装配配置
pub use epub::BookConfig;

// === 数据结构 ===

/// 元数据
pub use epub::{FieldKind, Metadata, MetadataField, Role, Scheme};

/// 清单
pub use epub::{Manifest, ManifestItem};

/// 脊柱与指南
pub use epub::{Guide, GuideReference, ReferenceType, Spine, SpineEntry};

/// NCX目录
pub use epub::{NavMap, NavPoint, Ncx};

// === 底层组件（高级用法） ===

/// 容器组件
pub use epub::{Container, RootFile};

/// OPF包组件
pub use epub::{OpfDocument, PublicationVersion};

// === 库信息 ===

/// EPUBForge库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// EPUBForge库的描述
pub const DESCRIPTION: &str = "一个用于装配和拆解EPUB 2.x出版物的Rust库";

// === 便捷函数 ===

/// 快速解包EPUB文件
///
/// 这是 `Publication::unpack` 的便捷包装函数。
///
/// # 参数
/// * `epub_file` - EPUB文件路径
/// * `destination` - 解包目标目录
///
/// # 返回值
/// * `Result<Publication>` - 由包文件重建的出版物模型
///
/// # 示例
///
/// ```rust,no_run
/// use epubforge;
///
/// let publication = epubforge::unpack("book.epub", "extracted")?;
/// println!("书名: {}", publication.metadata.title().unwrap_or("(未指定)"));
/// # Ok::<(), epubforge::EpubError>(())
/// ```
pub fn unpack<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    epub_file: P,
    destination: Q,
) -> Result<Publication> {
    Publication::unpack(epub_file.as_ref(), destination.as_ref())
}
