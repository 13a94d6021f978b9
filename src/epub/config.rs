//! 声明式装配配置模块
//!
//! 以YAML描述一本书的元数据、封面、目录与内容文件清单，
//! 供命令行工具在不写代码的情况下驱动装配引擎。

use crate::epub::error::{EpubError, Result};
use crate::epub::publication::{Publication, PublicationConfig};
use crate::epub::opf::{Role, Scheme};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}

/// 一条内容文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemConfig {
    /// 要加入的文件路径
    pub file: PathBuf,
    /// 清单项ID，省略时自动推导
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 档案内的目标子目录
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    /// 媒体类型，省略时自动推断
    #[serde(default, rename = "media-type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// 是否进入脊柱（阅读顺序），默认true
    #[serde(default = "default_true")]
    pub spine: bool,
    /// 自动生成目录时是否跳过该文件
    #[serde(default)]
    pub no_toc: bool,
}

/// 封面配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverConfig {
    /// 封面图片路径
    pub image: PathBuf,
    /// 封面页标题
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// 目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocConfig {
    /// 是否自动生成目录，默认true
    #[serde(default = "default_true")]
    pub generate: bool,
    /// 手工编写的NCX文件，指定后不再自动生成
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            generate: true,
            file: None,
        }
    }
}

/// 一本书的装配配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    /// 书名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 作者列表
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<String>,
    /// 主题列表
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    /// 语言代码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// 标识符（ISBN等），作为包的唯一标识符
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// 出版社
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// 描述
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 出版日期
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// 版权信息
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
    /// 封面
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverConfig>,
    /// 目录
    #[serde(default)]
    pub toc: TocConfig,
    /// 内容文件列表，顺序即阅读顺序
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

impl BookConfig {
    /// 从YAML配置文件加载
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    /// * `Result<Self>` - 加载成功返回配置实例，失败返回`ConfigError`
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| EpubError::ConfigError(format!("无法读取配置文件: {}", e)))?;
        serde_yml::from_str(&content)
            .map_err(|e| EpubError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 依据配置构建出版物模型
    ///
    /// 配置中的声明按顺序翻译为对装配引擎的调用；
    /// 缺失的必备元数据在打包时自动补全。
    pub fn build(&self, config: PublicationConfig) -> Result<Publication> {
        let mut publication = Publication::with_config(config);

        if let Some(title) = &self.title {
            publication.add_title(None, None, title);
        }
        for creator in &self.creators {
            publication.add_creator(None, None, creator, Some(Role::Author));
        }
        for subject in &self.subjects {
            publication.add_subject(None, None, subject);
        }
        if let Some(language) = &self.language {
            publication.add_language(None, language);
        }
        if let Some(identifier) = &self.identifier {
            let scheme = if identifier.starts_with("97") {
                Some(Scheme::Isbn)
            } else {
                None
            };
            publication.add_identifier(Some("bookid"), scheme, identifier);
            publication.set_identifier_id("bookid");
        }
        if let Some(publisher) = &self.publisher {
            publication.add_publisher(None, None, publisher);
        }
        if let Some(description) = &self.description {
            publication.add_description(None, None, description);
        }
        if let Some(date) = &self.date {
            publication.add_date(None, date, Some("publication"));
        }
        if let Some(rights) = &self.rights {
            publication.add_rights(None, None, rights);
        }
        if let Some(cover) = &self.cover {
            publication.set_cover(&cover.image, cover.title.as_deref().unwrap_or("Cover"))?;
        }
        publication.set_generate_toc(self.toc.generate);
        if let Some(toc_file) = &self.toc.file {
            publication.set_toc_file(toc_file);
        }
        for item in &self.items {
            publication.add_item(
                item.id.as_deref(),
                &item.file,
                item.dest.as_deref(),
                item.media_type.as_deref(),
                item.spine,
                item.no_toc,
            )?;
        }
        Ok(publication)
    }
}
