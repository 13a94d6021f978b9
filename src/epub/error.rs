use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// Epub相关的错误类型
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML解析错误: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("无效的输入: {0}")]
    InvalidInput(String),

    #[error("无法确定媒体类型: {0}")]
    UnresolvedMediaType(PathBuf),

    #[error("清单标识符冲突: {0}")]
    DuplicateId(String),

    #[error("模型无法序列化: {0}")]
    SerializationError(String),

    #[error("EPUB档案结构损坏: {0}")]
    MalformedArchive(String),

    #[error("OPF包文件损坏: {0}")]
    MalformedPackage(String),

    #[error("目标文件已存在: {0}")]
    DestinationExists(PathBuf),

    #[error("配置文件错误: {0}")]
    ConfigError(String),
}
