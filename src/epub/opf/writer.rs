//! OPF序列化模块
//!
//! 将元数据、清单、脊柱与指南写出为content.opf文档。
//! package的子元素顺序固定为metadata、manifest、spine、guide。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::guide::Guide;
use crate::epub::opf::manifest::Manifest;
use crate::epub::opf::metadata::{FieldKind, Metadata, MetadataField};
use crate::epub::opf::spine::Spine;
use crate::epub::opf::PublicationVersion;

/// metadata内Dublin Core元素的写出顺序
const FIELD_ORDER: [FieldKind; 15] = [
    FieldKind::Title,
    FieldKind::Creator,
    FieldKind::Subject,
    FieldKind::Description,
    FieldKind::Publisher,
    FieldKind::Contributor,
    FieldKind::Date,
    FieldKind::Type,
    FieldKind::Format,
    FieldKind::Identifier,
    FieldKind::Source,
    FieldKind::Language,
    FieldKind::Relation,
    FieldKind::Coverage,
    FieldKind::Rights,
];

/// 转义XML文本与属性值中的特殊字符
pub(crate) fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// 序列化content.opf文档
///
/// # 返回值
/// * `Result<String>` - 唯一标识符无法解析或脊柱引用悬空时
///   返回`SerializationError`
pub fn serialize(
    metadata: &Metadata,
    manifest: &Manifest,
    spine: &Spine,
    guide: &Guide,
    version: PublicationVersion,
    encoding: &str,
) -> Result<String> {
    let unique_id = metadata.unique_identifier_id().ok_or_else(|| {
        EpubError::SerializationError("出版物没有指定unique-identifier".to_string())
    })?;
    if metadata.unique_identifier().is_none() {
        return Err(EpubError::SerializationError(format!(
            "unique-identifier \"{}\" 没有对应的Identifier元数据",
            unique_id
        )));
    }
    for entry in spine.entries() {
        if manifest.by_id(&entry.idref).is_none() {
            return Err(EpubError::SerializationError(format!(
                "脊柱引用的清单项 \"{}\" 不存在",
                entry.idref
            )));
        }
    }

    let mut opf = String::new();
    opf.push_str(&format!("<?xml version=\"1.0\" encoding=\"{}\"?>\n", encoding));
    opf.push_str(&format!(
        "<package xmlns=\"http://www.idpf.org/2007/opf\" version=\"{}\" unique-identifier=\"{}\">\n",
        version.as_str(),
        escape_xml(unique_id)
    ));

    write_metadata(&mut opf, metadata);
    write_manifest(&mut opf, manifest);
    write_spine(&mut opf, spine);
    if !guide.is_empty() {
        write_guide(&mut opf, guide);
    }

    opf.push_str("</package>\n");
    Ok(opf)
}

fn write_metadata(opf: &mut String, metadata: &Metadata) {
    opf.push_str(
        "  <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:opf=\"http://www.idpf.org/2007/opf\">\n",
    );
    for kind in FIELD_ORDER {
        for field in metadata.of_kind(kind) {
            write_dublin_core(opf, field);
        }
    }
    for field in metadata.of_kind(FieldKind::Meta) {
        if let Some(name) = &field.name {
            opf.push_str(&format!(
                "    <meta name=\"{}\" content=\"{}\"/>\n",
                escape_xml(name),
                escape_xml(&field.value)
            ));
        }
    }
    opf.push_str("  </metadata>\n");
}

fn write_dublin_core(opf: &mut String, field: &MetadataField) {
    let tag = field.kind.tag_name();
    let mut attributes = String::new();
    if let Some(id) = &field.id {
        attributes.push_str(&format!(" id=\"{}\"", escape_xml(id)));
    }
    if let Some(lang) = &field.lang {
        attributes.push_str(&format!(" xml:lang=\"{}\"", escape_xml(lang)));
    }
    if let Some(role) = field.role {
        attributes.push_str(&format!(" opf:role=\"{}\"", role.code()));
    }
    if let Some(scheme) = field.scheme {
        attributes.push_str(&format!(" opf:scheme=\"{}\"", scheme.as_str()));
    }
    if let Some(event) = &field.event {
        attributes.push_str(&format!(" opf:event=\"{}\"", escape_xml(event)));
    }
    opf.push_str(&format!(
        "    <dc:{}{}>{}</dc:{}>\n",
        tag,
        attributes,
        escape_xml(&field.value),
        tag
    ));
}

fn write_manifest(opf: &mut String, manifest: &Manifest) {
    opf.push_str("  <manifest>\n");
    for item in manifest.items() {
        opf.push_str(&format!(
            "    <item id=\"{}\" media-type=\"{}\" href=\"{}\"/>\n",
            escape_xml(&item.id),
            escape_xml(&item.media_type),
            escape_xml(&item.href)
        ));
    }
    opf.push_str("  </manifest>\n");
}

fn write_spine(opf: &mut String, spine: &Spine) {
    opf.push_str(&format!("  <spine toc=\"{}\">\n", escape_xml(&spine.toc_id)));
    for entry in spine.entries() {
        if entry.linear {
            opf.push_str(&format!(
                "    <itemref idref=\"{}\"/>\n",
                escape_xml(&entry.idref)
            ));
        } else {
            opf.push_str(&format!(
                "    <itemref idref=\"{}\" linear=\"no\"/>\n",
                escape_xml(&entry.idref)
            ));
        }
    }
    opf.push_str("  </spine>\n");
}

fn write_guide(opf: &mut String, guide: &Guide) {
    opf.push_str("  <guide>\n");
    for reference in guide.references() {
        opf.push_str(&format!(
            "    <reference type=\"{}\" title=\"{}\" href=\"{}\"/>\n",
            reference.kind.as_str(),
            escape_xml(&reference.title),
            escape_xml(&reference.href)
        ));
    }
    opf.push_str("  </guide>\n");
}
