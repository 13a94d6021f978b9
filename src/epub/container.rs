use crate::epub::error::{EpubError, Result};
use crate::epub::media::OPF_MIMETYPE;
use crate::epub::opf::writer::escape_xml;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// container.xml中的rootfile信息
#[derive(Debug, Clone, PartialEq)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// META-INF/container.xml的内存表示
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 创建指向OEBPS/content.opf的标准容器
    pub fn standard() -> Container {
        Container {
            rootfiles: vec![RootFile {
                full_path: "OEBPS/content.opf".to_string(),
                media_type: OPF_MIMETYPE.to_string(),
            }],
        }
    }

    /// 解析container.xml内容
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container>` - 解析后的Container信息
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut rootfiles = Vec::new();
        let mut buf = Vec::new();
        let mut in_rootfiles = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let local_name = e.local_name();
                    match local_name.as_ref() {
                        b"rootfiles" => {
                            in_rootfiles = true;
                        }
                        b"rootfile" if in_rootfiles => {
                            let mut full_path = String::new();
                            let mut media_type = String::new();

                            for attr_result in e.attributes() {
                                let attr = attr_result.map_err(|e| {
                                    EpubError::Xml(quick_xml::Error::InvalidAttr(e))
                                })?;
                                match attr.key.local_name().as_ref() {
                                    b"full-path" => {
                                        full_path = String::from_utf8_lossy(&attr.value).to_string();
                                    }
                                    b"media-type" => {
                                        media_type =
                                            String::from_utf8_lossy(&attr.value).to_string();
                                    }
                                    _ => {}
                                }
                            }

                            if !full_path.is_empty() && !media_type.is_empty() {
                                rootfiles.push(RootFile {
                                    full_path,
                                    media_type,
                                });
                            }
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    if e.local_name().as_ref() == b"rootfiles" {
                        in_rootfiles = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if rootfiles.is_empty() {
            return Err(EpubError::MalformedArchive(
                "container.xml中没有找到任何rootfile条目".to_string(),
            ));
        }

        Ok(Container { rootfiles })
    }

    /// 序列化为container.xml文档
    pub fn to_xml(&self, encoding: &str) -> String {
        let mut xml = String::new();
        xml.push_str(&format!("<?xml version=\"1.0\" encoding=\"{}\"?>\n", encoding));
        xml.push_str(
            "<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n",
        );
        xml.push_str("  <rootfiles>\n");
        for rootfile in &self.rootfiles {
            xml.push_str(&format!(
                "    <rootfile full-path=\"{}\" media-type=\"{}\"/>\n",
                escape_xml(&rootfile.full_path),
                escape_xml(&rootfile.media_type)
            ));
        }
        xml.push_str("  </rootfiles>\n");
        xml.push_str("</container>\n");
        xml
    }

    /// 获取主要的OPF文件路径
    ///
    /// # 返回值
    /// * `Option<String>` - OPF文件的完整路径
    pub fn get_opf_path(&self) -> Option<String> {
        // 查找第一个application/oebps-package+xml类型的rootfile
        for rootfile in &self.rootfiles {
            if rootfile.media_type == OPF_MIMETYPE {
                return Some(rootfile.full_path.clone());
            }
        }

        // 如果没有找到标准类型，返回第一个rootfile
        self.rootfiles.first().map(|rf| rf.full_path.clone())
    }
}
