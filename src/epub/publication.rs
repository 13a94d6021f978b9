//! 出版物门面模块
//!
//! 提供EPUB出版物的构建入口：元数据登记、清单管理、封面与目录
//! 设置，以及组装(assemble)、打包(pack)与解包(unpack)的完整流程。

use std::fs;
use std::path::{Path, PathBuf};

use crate::epub::archive;
use crate::epub::container::Container;
use crate::epub::error::{EpubError, Result};
use crate::epub::media::{self, NCX_MIMETYPE, XHTML_MIMETYPE};
use crate::epub::ncx::{generator, writer as ncx_writer, Ncx};
use crate::epub::opf::writer::{self as opf_writer, escape_xml};
use crate::epub::opf::{
    FieldKind, Guide, GuideReference, Manifest, ManifestItem, Metadata, MetadataField,
    PublicationVersion, ReferenceType, Role, Scheme, Spine,
};

/// 封面图片的清单项ID
const COVER_IMAGE_ID: &str = "cover-image";

/// 生成的封面页文件名
const COVER_PAGE_NAME: &str = "cover-page.xhtml";

/// 档案内容目录名
const OEBPS_FOLDER: &str = "OEBPS";

/// NCX文档的固定标题
const TOC_DOC_TITLE: &str = "Table of contents";

/// 门面配置，显式传入而非进程级全局状态
#[derive(Debug, Clone)]
pub struct PublicationConfig {
    /// XML文档的输出编码
    pub encoding: String,
    /// 是否输出组装过程信息
    pub verbose: bool,
}

impl Default for PublicationConfig {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            verbose: false,
        }
    }
}

/// 表示一个正在组装或已解包的EPUB出版物
///
/// 每次组装会话创建一个新实例；实例独占自己的工作目录，
/// 不应让两次组装指向同一工作目录。
#[derive(Debug)]
pub struct Publication {
    /// 出版物规范版本
    pub version: PublicationVersion,
    /// 元数据存储
    pub metadata: Metadata,
    /// 文件清单
    pub manifest: Manifest,
    /// 脊柱（阅读顺序）
    pub spine: Spine,
    /// 指南（语义地标）
    pub guide: Guide,
    /// 组装时生成的目录树；使用手工目录文件或尚未组装时为None
    pub ncx: Option<Ncx>,
    config: PublicationConfig,
    generate_toc: bool,
    toc_file: Option<PathBuf>,
    generate_cover_page: bool,
    unpacked_root: Option<PathBuf>,
}

impl Publication {
    /// 创建一个EPUB 2.0.1出版物
    pub fn new() -> Self {
        Self::with_config(PublicationConfig::default())
    }

    /// 使用指定配置创建出版物
    pub fn with_config(config: PublicationConfig) -> Self {
        Self {
            version: PublicationVersion::V2,
            metadata: Metadata::new(),
            manifest: Manifest::new(),
            spine: Spine::new(),
            guide: Guide::new(),
            ncx: None,
            config,
            generate_toc: true,
            toc_file: None,
            generate_cover_page: false,
            unpacked_root: None,
        }
    }

    // === 元数据登记 ===

    fn add_localized(&mut self, kind: FieldKind, id: Option<&str>, lang: Option<&str>, value: &str) {
        self.metadata
            .add(MetadataField::new(kind, value).with_id(id).with_lang(lang));
    }

    /// 添加标题，出版物至少要有一个
    pub fn add_title(&mut self, id: Option<&str>, lang: Option<&str>, title: &str) {
        self.add_localized(FieldKind::Title, id, lang, title);
    }

    /// 添加创建者（作者等）
    pub fn add_creator(
        &mut self,
        id: Option<&str>,
        lang: Option<&str>,
        name: &str,
        role: Option<Role>,
    ) {
        self.metadata.add(
            MetadataField::new(FieldKind::Creator, name)
                .with_id(id)
                .with_lang(lang)
                .with_role(role),
        );
    }

    /// 添加贡献者（编辑、审校等）
    pub fn add_contributor(
        &mut self,
        id: Option<&str>,
        lang: Option<&str>,
        name: &str,
        role: Option<Role>,
    ) {
        self.metadata.add(
            MetadataField::new(FieldKind::Contributor, name)
                .with_id(id)
                .with_lang(lang)
                .with_role(role),
        );
    }

    /// 添加主题
    pub fn add_subject(&mut self, id: Option<&str>, lang: Option<&str>, subject: &str) {
        self.add_localized(FieldKind::Subject, id, lang, subject);
    }

    /// 添加描述
    pub fn add_description(&mut self, id: Option<&str>, lang: Option<&str>, description: &str) {
        self.add_localized(FieldKind::Description, id, lang, description);
    }

    /// 添加出版社
    pub fn add_publisher(&mut self, id: Option<&str>, lang: Option<&str>, publisher: &str) {
        self.add_localized(FieldKind::Publisher, id, lang, publisher);
    }

    /// 添加来源
    pub fn add_source(&mut self, id: Option<&str>, lang: Option<&str>, source: &str) {
        self.add_localized(FieldKind::Source, id, lang, source);
    }

    /// 添加关联
    pub fn add_relation(&mut self, id: Option<&str>, lang: Option<&str>, relation: &str) {
        self.add_localized(FieldKind::Relation, id, lang, relation);
    }

    /// 添加覆盖范围
    pub fn add_coverage(&mut self, id: Option<&str>, lang: Option<&str>, coverage: &str) {
        self.add_localized(FieldKind::Coverage, id, lang, coverage);
    }

    /// 添加版权信息
    pub fn add_rights(&mut self, id: Option<&str>, lang: Option<&str>, rights: &str) {
        self.add_localized(FieldKind::Rights, id, lang, rights);
    }

    /// 添加日期
    ///
    /// # 参数
    /// * `date` - W3C日期时间格式（YYYY[-MM[-DD]]）的日期字符串
    /// * `event` - 可选的事件描述，如creation、publication
    pub fn add_date(&mut self, id: Option<&str>, date: &str, event: Option<&str>) {
        self.metadata.add(
            MetadataField::new(FieldKind::Date, date)
                .with_id(id)
                .with_event(event),
        );
    }

    /// 添加标识符
    pub fn add_identifier(&mut self, id: Option<&str>, scheme: Option<Scheme>, value: &str) {
        self.metadata.add(
            MetadataField::new(FieldKind::Identifier, value)
                .with_id(id)
                .with_scheme(scheme),
        );
    }

    /// 指定作为包唯一标识符的Identifier元素id
    pub fn set_identifier_id(&mut self, identifier_id: &str) {
        self.metadata.set_unique_identifier_id(identifier_id);
    }

    /// 添加语言（RFC-3066语言代码）
    pub fn add_language(&mut self, id: Option<&str>, lang: &str) {
        self.metadata
            .add(MetadataField::new(FieldKind::Language, lang).with_id(id));
    }

    /// 添加出版格式
    pub fn add_format(&mut self, id: Option<&str>, value: &str) {
        self.metadata
            .add(MetadataField::new(FieldKind::Format, value).with_id(id));
    }

    /// 添加Dublin Core类型
    pub fn add_type(&mut self, id: Option<&str>, value: &str) {
        self.metadata
            .add(MetadataField::new(FieldKind::Type, value).with_id(id));
    }

    /// 添加meta标签
    pub fn add_meta(&mut self, name: &str, content: &str) {
        self.metadata
            .add(MetadataField::new(FieldKind::Meta, content).with_name(name));
    }

    // === 清单与结构 ===

    /// 向清单添加一个内容文件
    ///
    /// 脊柱定义阅读顺序，因此调用顺序与`in_spine`取值都有意义。
    /// 进入脊柱的文件都会参与目录的自动生成，除非`no_toc`为true。
    ///
    /// # 参数
    /// * `id` - 清单项ID，省略时按媒体类型前缀与文件名自动推导
    /// * `source_file` - 要加入的文件，必须存在且不能是目录
    /// * `dest` - 档案内的目标子目录，省略时置于内容目录根部
    /// * `media_type` - 媒体类型；省略时脊柱项默认XHTML，
    ///   其余按扩展名再按内容嗅探推断，失败返回`UnresolvedMediaType`
    /// * `in_spine` - 是否追加到脊柱
    /// * `no_toc` - 自动生成目录时是否跳过该文件
    ///
    /// # 返回值
    /// * `Result<ManifestItem>` - 加入清单的项；失败时清单不发生改动
    pub fn add_item(
        &mut self,
        id: Option<&str>,
        source_file: &Path,
        dest: Option<&str>,
        media_type: Option<&str>,
        in_spine: bool,
        no_toc: bool,
    ) -> Result<ManifestItem> {
        if !source_file.exists() {
            return Err(EpubError::InvalidInput(format!(
                "文件 {} 不存在",
                source_file.display()
            )));
        }
        if source_file.is_dir() {
            return Err(EpubError::InvalidInput(format!(
                "{} 是目录而不是文件",
                source_file.display()
            )));
        }
        let file_name = source_file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                EpubError::InvalidInput(format!("无法取得 {} 的文件名", source_file.display()))
            })?;

        let media_type = match media_type {
            Some(explicit) => explicit.to_string(),
            None => {
                if in_spine {
                    XHTML_MIMETYPE.to_string()
                } else {
                    media::detect(source_file)?
                        .ok_or_else(|| {
                            EpubError::UnresolvedMediaType(source_file.to_path_buf())
                        })?
                        .to_string()
                }
            }
        };

        let id = match id {
            Some(explicit) => explicit.to_string(),
            None => derive_item_id(&media_type, &file_name),
        };
        let href = match dest {
            Some(dest) => format!("{}/{}", dest, file_name),
            None => file_name.clone(),
        };

        let mut item = ManifestItem::new(id, href, media_type, source_file.to_path_buf());
        item.no_toc = no_toc;
        let added = self.manifest.add(item)?.clone();
        if in_spine {
            self.spine.push(&added.id);
        }
        if self.config.verbose {
            println!("已将 {} ({}) 加入出版物", file_name, added.media_type);
        }
        Ok(added)
    }

    /// 设置封面
    ///
    /// 封面图片作为清单项加入（不进脊柱、不进目录），同时记录
    /// cover元数据指针，并在打包时自动生成封面页、插入脊柱最前，
    /// 在指南中登记cover地标。
    pub fn set_cover(&mut self, image: &Path, title: &str) -> Result<()> {
        self.add_item(Some(COVER_IMAGE_ID), image, None, None, false, true)?;
        if let Some(cover) = self.manifest.by_id_mut(COVER_IMAGE_ID) {
            cover.title = Some(title.to_string());
        }
        self.add_meta("cover", COVER_IMAGE_ID);
        self.generate_cover_page = true;
        Ok(())
    }

    /// 添加指南引用（语义地标）
    pub fn add_reference(&mut self, href: &str, title: &str, kind: ReferenceType) {
        self.guide
            .add(GuideReference::new(href.to_string(), title.to_string(), kind));
    }

    /// 设置是否自动生成目录
    pub fn set_generate_toc(&mut self, generate_toc: bool) {
        self.generate_toc = generate_toc;
    }

    /// 使用手工编写的NCX文件代替自动生成的目录
    pub fn set_toc_file(&mut self, toc_file: &Path) {
        self.toc_file = Some(toc_file.to_path_buf());
    }

    /// 根据ID查找清单项
    pub fn item_by_id(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.by_id(id)
    }

    /// 目录文件在磁盘上的路径（组装或解包之后可用）
    pub fn toc_path(&self) -> Option<PathBuf> {
        self.manifest
            .by_id(&self.spine.toc_id)
            .map(|item| item.source_path.clone())
    }

    /// 出版物是否由解包重建
    pub fn is_reconstructed(&self) -> bool {
        self.unpacked_root.is_some()
    }

    // === 组装与打包 ===

    /// 在指定工作目录中组装出版物的目录树
    ///
    /// 流程：补全必备元数据 → 写META-INF/container.xml →
    /// 生成封面页（如有）→ 拷贝内容文件 → 写toc.ncx并登记清单 →
    /// 最后写content.opf（前面的步骤还会向模型中插入数据）。
    pub fn assemble(&mut self, working_dir: &Path) -> Result<()> {
        if self.config.verbose {
            println!("在 {} 中组装出版物", working_dir.display());
        }
        self.metadata.add_compulsory_data();
        fs::create_dir_all(working_dir)?;

        let meta_inf = working_dir.join("META-INF");
        fs::create_dir_all(&meta_inf)?;
        fs::write(
            meta_inf.join("container.xml"),
            Container::standard().to_xml(&self.config.encoding),
        )?;

        let oebps = working_dir.join(OEBPS_FOLDER);
        fs::create_dir_all(&oebps)?;
        if self.generate_cover_page {
            self.write_cover_page(&oebps)?;
        }
        self.copy_content(&oebps)?;
        self.write_table_of_contents(&oebps)?;
        self.write_opf(&oebps)?;
        Ok(())
    }

    /// 打包：在进程默认的临时目录中组装后压缩为EPUB文件
    ///
    /// 临时工作目录在返回前尽力删除，但删除并非保证。
    pub fn pack(&mut self, epub_file: &Path) -> Result<()> {
        if epub_file.exists() {
            return Err(EpubError::DestinationExists(epub_file.to_path_buf()));
        }
        let working = tempfile::tempdir()?;
        self.pack_with_dir(epub_file, working.path())
    }

    /// 打包：在指定工作目录中组装后压缩为EPUB文件
    pub fn pack_with_dir(&mut self, epub_file: &Path, working_dir: &Path) -> Result<()> {
        self.assemble(working_dir)?;
        archive::pack(epub_file, working_dir)?;
        if self.config.verbose {
            println!("出版物已打包到 {}", epub_file.display());
        }
        Ok(())
    }

    /// 解包EPUB文件并由其content.opf重建出版物模型
    ///
    /// 目录文件不会被重新解析为导航树，只作为磁盘文件重新暴露
    /// （见[`Publication::toc_path`]）。
    pub fn unpack(epub_file: &Path, destination: &Path) -> Result<Publication> {
        Self::unpack_with_config(epub_file, destination, PublicationConfig::default())
    }

    /// 使用指定配置解包EPUB文件
    pub fn unpack_with_config(
        epub_file: &Path,
        destination: &Path,
        config: PublicationConfig,
    ) -> Result<Publication> {
        archive::unpack(epub_file, destination)?;

        let container_path = destination.join("META-INF").join("container.xml");
        if !container_path.exists() {
            return Err(EpubError::MalformedArchive(
                "缺少META-INF/container.xml".to_string(),
            ));
        }
        let container = Container::parse_xml(&fs::read_to_string(&container_path)?)?;
        let opf_relative = container.get_opf_path().ok_or_else(|| {
            EpubError::MalformedArchive("container.xml中没有找到有效的rootfile".to_string())
        })?;

        let opf_path = destination.join(&opf_relative);
        let opf_content = fs::read_to_string(&opf_path).map_err(|_| {
            EpubError::MalformedPackage(format!("无法读取包文件 {}", opf_relative))
        })?;
        let base_dir = opf_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| destination.to_path_buf());
        let document =
            crate::epub::opf::OpfDocument::parse_xml(&opf_content, &base_dir).map_err(|e| {
                match e {
                    EpubError::Xml(xml_err) => {
                        EpubError::MalformedPackage(format!("XML解析错误: {}", xml_err))
                    }
                    other => other,
                }
            })?;

        if config.verbose {
            println!("出版物已解包到 {}", destination.display());
        }
        Ok(Publication {
            version: document.version,
            metadata: document.metadata,
            manifest: document.manifest,
            spine: document.spine,
            guide: document.guide,
            ncx: None,
            config,
            generate_toc: false,
            toc_file: None,
            generate_cover_page: false,
            unpacked_root: Some(destination.to_path_buf()),
        })
    }

    // === 内部流程 ===

    /// 将全部非生成项拷贝到内容目录
    fn copy_content(&self, oebps: &Path) -> Result<()> {
        for item in self.manifest.items() {
            if item.generated {
                continue;
            }
            let destination = oebps.join(&item.href);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&item.source_path, &destination)?;
        }
        Ok(())
    }

    /// 生成封面页并登记清单项、脊柱首项与指南地标
    fn write_cover_page(&mut self, oebps: &Path) -> Result<()> {
        let Some(cover_image) = self.manifest.by_id(COVER_IMAGE_ID) else {
            return Err(EpubError::SerializationError(
                "要求生成封面页但没有封面图片".to_string(),
            ));
        };
        let image_href = cover_image.href.clone();
        let title = cover_image.title.clone().unwrap_or_default();

        let cover_file = oebps.join(COVER_PAGE_NAME);
        fs::write(
            &cover_file,
            cover_page_xhtml(&image_href, &title, &self.config.encoding),
        )?;

        let added = self.add_item(None, &cover_file, None, Some(XHTML_MIMETYPE), false, false)?;
        if let Some(item) = self.manifest.by_id_mut(&added.id) {
            item.generated = true;
        }
        // 封面页排在阅读顺序最前
        self.spine.insert_front(&added.id);
        self.add_reference(&added.href, &title, ReferenceType::Cover);
        Ok(())
    }

    /// 写出toc.ncx，并保证目录项位于清单首位
    fn write_table_of_contents(&mut self, oebps: &Path) -> Result<()> {
        let ncx_file = oebps.join("toc.ncx");
        match &self.toc_file {
            Some(toc_file) => {
                fs::copy(toc_file, &ncx_file)?;
                self.ncx = None;
            }
            None => {
                let unique = self.metadata.unique_identifier().ok_or_else(|| {
                    EpubError::SerializationError(
                        "unique-identifier没有对应的Identifier元数据".to_string(),
                    )
                })?;
                let uid = unique.value.clone();
                let ncx = if self.generate_toc {
                    generator::generate(&self.spine, &self.manifest, &uid, TOC_DOC_TITLE)?
                } else {
                    Ncx::new(uid, TOC_DOC_TITLE.to_string())
                };
                fs::write(&ncx_file, ncx_writer::serialize(&ncx, &self.config.encoding))?;
                self.ncx = Some(ncx);
            }
        }

        let toc_id = self.spine.toc_id.clone();
        let added =
            self.add_item(Some(toc_id.as_str()), &ncx_file, None, Some(NCX_MIMETYPE), false, false)?;
        if let Some(item) = self.manifest.by_id_mut(&added.id) {
            item.generated = true;
        }
        self.manifest.move_to_front(&toc_id);
        Ok(())
    }

    /// 写出content.opf
    fn write_opf(&self, oebps: &Path) -> Result<()> {
        let opf = opf_writer::serialize(
            &self.metadata,
            &self.manifest,
            &self.spine,
            &self.guide,
            self.version,
            &self.config.encoding,
        )?;
        fs::write(oebps.join("content.opf"), opf)?;
        Ok(())
    }
}

impl Default for Publication {
    fn default() -> Self {
        Self::new()
    }
}

/// 按媒体类型前缀与文件名推导清单项ID（XHTML内容项不加前缀）
fn derive_item_id(media_type: &str, file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    if media_type == XHTML_MIMETYPE {
        stem.to_string()
    } else {
        match media_type.split_once('/') {
            Some((major, _)) => format!("{}-{}", major, stem),
            None => format!("{}{}", media_type, stem),
        }
    }
}

/// 生成居中显示封面图片的最小XHTML封面页
fn cover_page_xhtml(image_href: &str, title: &str, encoding: &str) -> String {
    let mut page = String::new();
    page.push_str(&format!(
        "<?xml version=\"1.0\" encoding=\"{}\" standalone=\"no\"?>\n",
        encoding
    ));
    page.push_str(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.1//EN\" \"http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd\">\n",
    );
    page.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\">\n");
    page.push_str("  <head>\n");
    page.push_str(&format!("    <title>{}</title>\n", escape_xml(title)));
    page.push_str(
        "    <style type=\"text/css\"> #cover-image { text-align: center; } img { max-width: 100%; }</style>\n",
    );
    page.push_str("  </head>\n");
    page.push_str("  <body>\n");
    page.push_str("    <div id=\"cover-image\">\n");
    page.push_str(&format!(
        "      <img src=\"{}\" alt=\"{}\"/>\n",
        escape_xml(image_href),
        escape_xml(title)
    ));
    page.push_str("    </div>\n");
    page.push_str("  </body>\n");
    page.push_str("</html>\n");
    page
}
