//! OPF解析器模块
//!
//! 提供content.opf文件的XML解析功能，将解包出的包文件还原为
//! 元数据、清单、脊柱与指南模型。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::guide::{Guide, GuideReference, ReferenceType};
use crate::epub::opf::manifest::{Manifest, ManifestItem};
use crate::epub::opf::metadata::{FieldKind, Metadata, MetadataField, Role, Scheme};
use crate::epub::opf::spine::{Spine, SpineEntry};
use crate::epub::opf::PublicationVersion;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::path::Path;

/// content.opf文件的解析结果
#[derive(Debug, Clone)]
pub struct OpfDocument {
    /// 出版物规范版本
    pub version: PublicationVersion,
    /// 元数据
    pub metadata: Metadata,
    /// 清单
    pub manifest: Manifest,
    /// 脊柱（阅读顺序）
    pub spine: Spine,
    /// 指南（语义地标）
    pub guide: Guide,
}

impl OpfDocument {
    /// 解析OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - content.opf的XML内容
    /// * `base_dir` - OPF文件所在目录，用于还原清单项的来源路径
    ///
    /// # 返回值
    /// * `Result<OpfDocument>` - 解析后的包模型
    pub fn parse_xml(xml_content: &str, base_dir: &Path) -> Result<OpfDocument> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut version = PublicationVersion::V2;
        let mut metadata = Metadata::new();
        let mut manifest = Manifest::new();
        let mut spine = Spine::new();
        let mut guide = Guide::new();

        let mut buf = Vec::new();
        let mut current_section = String::new();
        let mut text_content = String::new();
        let mut current_attributes = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref()).to_string();

                    match local_name.as_str() {
                        "package" => {
                            Self::parse_package_attributes(e, &mut version, &mut metadata)?;
                        }
                        "metadata" => {
                            current_section = "metadata".to_string();
                        }
                        "manifest" => {
                            current_section = "manifest".to_string();
                        }
                        "spine" => {
                            current_section = "spine".to_string();
                            if let Some(toc_id) = Self::parse_spine_toc(e)? {
                                spine.toc_id = toc_id;
                            }
                        }
                        "guide" => {
                            current_section = "guide".to_string();
                        }
                        "item" if current_section == "manifest" => {
                            Self::parse_manifest_item(e, &mut manifest, base_dir)?;
                        }
                        "itemref" if current_section == "spine" => {
                            Self::parse_spine_entry(e, &mut spine)?;
                        }
                        "reference" if current_section == "guide" => {
                            Self::parse_guide_reference(e, &mut guide)?;
                        }
                        "meta" if current_section == "metadata" => {
                            Self::parse_meta_tag(e, &mut metadata)?;
                        }
                        _ if current_section == "metadata" => {
                            Self::collect_attributes(e, &mut current_attributes)?;
                            text_content.clear();
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref()).to_string();

                    match local_name.as_str() {
                        "metadata" | "manifest" | "spine" | "guide" => {
                            current_section.clear();
                        }
                        _ if current_section == "metadata" => {
                            Self::finish_metadata_element(
                                &local_name,
                                &text_content,
                                &current_attributes,
                                &mut metadata,
                            );
                            text_content.clear();
                            current_attributes.clear();
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    text_content.push_str(&e.unescape()?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(OpfDocument {
            version,
            metadata,
            manifest,
            spine,
            guide,
        })
    }

    /// 解析package元素的version与unique-identifier属性
    fn parse_package_attributes(
        e: &BytesStart,
        version: &mut PublicationVersion,
        metadata: &mut Metadata,
    ) -> Result<()> {
        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|err| EpubError::Xml(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"version" => {
                    let value = String::from_utf8_lossy(&attr.value);
                    if let Some(parsed) = PublicationVersion::from_str(&value) {
                        *version = parsed;
                    }
                }
                b"unique-identifier" => {
                    metadata.set_unique_identifier_id(&String::from_utf8_lossy(&attr.value));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// 解析spine元素的toc属性
    fn parse_spine_toc(e: &BytesStart) -> Result<Option<String>> {
        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|err| EpubError::Xml(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == b"toc" {
                return Ok(Some(String::from_utf8_lossy(&attr.value).to_string()));
            }
        }
        Ok(None)
    }

    /// 收集元数据元素的属性
    fn collect_attributes(
        e: &BytesStart,
        current_attributes: &mut HashMap<String, String>,
    ) -> Result<()> {
        current_attributes.clear();
        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|err| EpubError::Xml(quick_xml::Error::InvalidAttr(err)))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = String::from_utf8_lossy(&attr.value).to_string();
            current_attributes.insert(key, value);
        }
        Ok(())
    }

    /// 结束一个Dublin Core元素，生成元数据条目
    ///
    /// 注意：local_name()会忽略XML命名空间前缀，
    /// 例如<dc:title>会被解析为"title"，xml:lang会被解析为"lang"
    fn finish_metadata_element(
        element_name: &str,
        text_content: &str,
        attributes: &HashMap<String, String>,
        metadata: &mut Metadata,
    ) {
        let Some(kind) = FieldKind::from_tag(element_name) else {
            return;
        };
        if kind == FieldKind::Meta {
            return;
        }
        let mut field = MetadataField::new(kind, text_content.trim());
        field.id = attributes.get("id").cloned();
        field.lang = attributes.get("lang").cloned();
        field.role = attributes.get("role").and_then(|r| Role::from_code(r));
        field.scheme = attributes.get("scheme").and_then(|s| Scheme::from_str(s));
        field.event = attributes.get("event").cloned();
        metadata.add(field);
    }

    /// 解析meta标签（name/content属性形式）
    fn parse_meta_tag(e: &BytesStart, metadata: &mut Metadata) -> Result<()> {
        let mut name = String::new();
        let mut content = String::new();
        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|err| EpubError::Xml(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"name" => {
                    name = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"content" => {
                    content = String::from_utf8_lossy(&attr.value).to_string();
                }
                _ => {}
            }
        }
        if !name.is_empty() {
            metadata.add(MetadataField::new(FieldKind::Meta, &content).with_name(&name));
        }
        Ok(())
    }

    /// 解析清单项
    fn parse_manifest_item(
        e: &BytesStart,
        manifest: &mut Manifest,
        base_dir: &Path,
    ) -> Result<()> {
        let mut id = String::new();
        let mut href = String::new();
        let mut media_type = String::new();

        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|err| EpubError::Xml(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"id" => {
                    id = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"href" => {
                    href = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"media-type" => {
                    media_type = String::from_utf8_lossy(&attr.value).to_string();
                }
                _ => {}
            }
        }

        if !id.is_empty() && !href.is_empty() && !media_type.is_empty() {
            let source_path = base_dir.join(&href);
            manifest.add(ManifestItem::new(id, href, media_type, source_path))?;
        }
        Ok(())
    }

    /// 解析脊柱项
    fn parse_spine_entry(e: &BytesStart, spine: &mut Spine) -> Result<()> {
        let mut idref = String::new();
        let mut linear = true;

        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|err| EpubError::Xml(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"idref" => {
                    idref = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"linear" => {
                    linear = String::from_utf8_lossy(&attr.value) != "no";
                }
                _ => {}
            }
        }

        if !idref.is_empty() {
            spine.push_entry(SpineEntry::with_linear(idref, linear));
        }
        Ok(())
    }

    /// 解析指南引用
    fn parse_guide_reference(e: &BytesStart, guide: &mut Guide) -> Result<()> {
        let mut kind = None;
        let mut title = String::new();
        let mut href = String::new();

        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|err| EpubError::Xml(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"type" => {
                    kind = ReferenceType::from_str(&String::from_utf8_lossy(&attr.value));
                }
                b"title" => {
                    title = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"href" => {
                    href = String::from_utf8_lossy(&attr.value).to_string();
                }
                _ => {}
            }
        }

        if let Some(kind) = kind {
            if !href.is_empty() {
                guide.add(GuideReference::new(href, title, kind));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uuid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title>示例出版物</dc:title>
    <dc:creator opf:role="aut">佚名</dc:creator>
    <dc:date opf:event="creation">2026-08-06</dc:date>
    <dc:identifier id="uuid" opf:scheme="UUID">urn:uuid:0001</dc:identifier>
    <dc:language>zh</dc:language>
    <meta name="cover" content="cover-image"/>
  </metadata>
  <manifest>
    <item id="ncx" media-type="application/x-dtbncx+xml" href="toc.ncx"/>
    <item id="chapter-1" media-type="application/xhtml+xml" href="chapter-1.xhtml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="chapter-1"/>
    <itemref idref="chapter-1" linear="no"/>
  </spine>
  <guide>
    <reference type="cover" title="Cover" href="cover-page.xhtml"/>
  </guide>
</package>"#;

    #[test]
    fn test_parse_full_package() {
        let doc = OpfDocument::parse_xml(SAMPLE_OPF, Path::new("/tmp/OEBPS")).unwrap();

        assert_eq!(doc.version, PublicationVersion::V2);
        assert_eq!(doc.metadata.title(), Some("示例出版物"));
        assert_eq!(doc.metadata.language(), Some("zh"));
        assert_eq!(doc.metadata.unique_identifier_id(), Some("uuid"));

        let unique = doc.metadata.unique_identifier().unwrap();
        assert_eq!(unique.value, "urn:uuid:0001");
        assert_eq!(unique.scheme, Some(Scheme::Uuid));

        let creators = doc.metadata.of_kind(FieldKind::Creator);
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].role, Some(Role::Author));

        let dates = doc.metadata.of_kind(FieldKind::Date);
        assert_eq!(dates[0].event.as_deref(), Some("creation"));

        let metas = doc.metadata.of_kind(FieldKind::Meta);
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].name.as_deref(), Some("cover"));
        assert_eq!(metas[0].value, "cover-image");
    }

    #[test]
    fn test_parse_manifest_and_spine() {
        let doc = OpfDocument::parse_xml(SAMPLE_OPF, Path::new("/tmp/OEBPS")).unwrap();

        assert_eq!(doc.manifest.len(), 2);
        let ncx = doc.manifest.by_id("ncx").unwrap();
        assert_eq!(ncx.href, "toc.ncx");
        assert_eq!(ncx.source_path, PathBuf::from("/tmp/OEBPS/toc.ncx"));

        assert_eq!(doc.spine.toc_id, "ncx");
        assert_eq!(doc.spine.len(), 2);
        assert!(doc.spine.entries()[0].linear);
        assert!(!doc.spine.entries()[1].linear);
    }

    #[test]
    fn test_parse_guide() {
        let doc = OpfDocument::parse_xml(SAMPLE_OPF, Path::new("/tmp/OEBPS")).unwrap();

        assert_eq!(doc.guide.len(), 1);
        let reference = &doc.guide.references()[0];
        assert_eq!(reference.kind, ReferenceType::Cover);
        assert_eq!(reference.href, "cover-page.xhtml");
    }

    #[test]
    fn test_parse_tolerates_incomplete_item() {
        let opf = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uuid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="uuid">urn:uuid:0001</dc:identifier>
  </metadata>
  <manifest>
    <item id="broken" href="missing-media-type.xhtml"/>
    <item id="good" media-type="application/xhtml+xml" href="good.xhtml"/>
  </manifest>
  <spine toc="ncx"/>
</package>"#;

        let doc = OpfDocument::parse_xml(opf, Path::new("/tmp")).unwrap();
        assert_eq!(doc.manifest.len(), 1);
        assert!(doc.manifest.by_id("good").is_some());
    }
}
