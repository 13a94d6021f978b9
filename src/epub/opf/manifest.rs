//! 清单模块
//!
//! 提供出版物文件清单的结构定义与注册表。清单项的id与href
//! 在清单内必须唯一。

use crate::epub::error::{EpubError, Result};
use crate::epub::media::{NCX_MIMETYPE, XHTML_MIMETYPE};
use std::path::PathBuf;

/// 清单项信息
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestItem {
    /// 项目ID
    pub id: String,
    /// 档案内的相对路径
    pub href: String,
    /// 媒体类型
    pub media_type: String,
    /// 打包时的拷贝来源路径
    pub source_path: PathBuf,
    /// 是否在打包过程中生成（生成项不参与内容拷贝）
    pub generated: bool,
    /// 自动生成目录时是否跳过该项
    pub no_toc: bool,
    /// 标题（封面等场合使用）
    pub title: Option<String>,
}

impl ManifestItem {
    /// 创建新的清单项
    pub fn new(id: String, href: String, media_type: String, source_path: PathBuf) -> Self {
        Self {
            id,
            href,
            media_type,
            source_path,
            generated: false,
            no_toc: false,
            title: None,
        }
    }

    /// 检查是否为XHTML内容文件
    pub fn is_xhtml(&self) -> bool {
        self.media_type == XHTML_MIMETYPE
    }

    /// 检查是否为NCX目录文件
    pub fn is_ncx(&self) -> bool {
        self.media_type == NCX_MIMETYPE
    }

    /// 检查是否为图片文件
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// 出版物文件清单
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    items: Vec<ManifestItem>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加清单项
    ///
    /// # 返回值
    /// * `Result<&ManifestItem>` - id或href与现有项冲突时返回`DuplicateId`，
    ///   清单不发生任何改动
    pub fn add(&mut self, item: ManifestItem) -> Result<&ManifestItem> {
        if self.by_id(&item.id).is_some() {
            return Err(EpubError::DuplicateId(format!(
                "id \"{}\" 已存在于清单中",
                item.id
            )));
        }
        if self.by_href(&item.href).is_some() {
            return Err(EpubError::DuplicateId(format!(
                "href \"{}\" 已存在于清单中",
                item.href
            )));
        }
        let index = self.items.len();
        self.items.push(item);
        Ok(&self.items[index])
    }

    /// 根据ID查找清单项
    pub fn by_id(&self, id: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// 根据ID查找清单项（可变引用）
    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut ManifestItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// 根据href查找清单项
    pub fn by_href(&self, href: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.href == href)
    }

    /// 将指定项移动到清单首位（NCX项写出时必须位于首位）
    pub fn move_to_front(&mut self, id: &str) -> bool {
        if let Some(position) = self.items.iter().position(|item| item.id == id) {
            let item = self.items.remove(position);
            self.items.insert(0, item);
            true
        } else {
            false
        }
    }

    pub fn items(&self) -> &[ManifestItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
