//! NCX序列化模块
//!
//! 将NCX目录模型递归写出为toc.ncx文档。

use crate::epub::ncx::navigation::{NavPoint, Ncx};
use crate::epub::opf::writer::escape_xml;

/// 序列化toc.ncx文档
pub fn serialize(ncx: &Ncx, encoding: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("<?xml version=\"1.0\" encoding=\"{}\"?>\n", encoding));
    out.push_str(
        "<!DOCTYPE ncx PUBLIC \"-//NISO//DTD ncx 2005-1//EN\" \"http://www.daisy.org/z3986/2005/ncx-2005-1.dtd\">\n",
    );
    out.push_str("<ncx xmlns=\"http://www.daisy.org/z3986/2005/ncx/\" version=\"2005-1\">\n");
    out.push_str("  <head>\n");
    out.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"{}\"/>\n",
        escape_xml(&ncx.uid)
    ));
    out.push_str("  </head>\n");
    out.push_str("  <docTitle>\n");
    out.push_str(&format!("    <text>{}</text>\n", escape_xml(&ncx.doc_title)));
    out.push_str("  </docTitle>\n");
    out.push_str("  <navMap>\n");
    for nav_point in &ncx.nav_map.nav_points {
        write_nav_point(&mut out, nav_point, 2);
    }
    out.push_str("  </navMap>\n");
    out.push_str("</ncx>\n");
    out
}

/// 递归写出navPoint元素
fn write_nav_point(out: &mut String, nav_point: &NavPoint, indent: usize) {
    let pad = "  ".repeat(indent);
    out.push_str(&format!(
        "{}<navPoint id=\"{}\" playOrder=\"{}\">\n",
        pad,
        escape_xml(&nav_point.id),
        nav_point.play_order
    ));
    out.push_str(&format!(
        "{}  <navLabel><text>{}</text></navLabel>\n",
        pad,
        escape_xml(&nav_point.label)
    ));
    out.push_str(&format!(
        "{}  <content src=\"{}\"/>\n",
        pad,
        escape_xml(&nav_point.src)
    ));
    for child in &nav_point.children {
        write_nav_point(out, child, indent + 1);
    }
    out.push_str(&format!("{}</navPoint>\n", pad));
}
