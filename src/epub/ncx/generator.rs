//! 目录生成模块
//!
//! 按脊柱定义的阅读顺序扫描各内容文件，从h1~h6标题构建导航树。
//! 扫描采用拉取式结构事件流，标题的嵌套层级决定导航点的父子关系，
//! playOrder计数器在全部文件间共享、严格递增。
//!
//! 标题元素必须带有id锚点属性才能被链接；没有id的标题整个跳过，
//! 不生成导航点。任何一个文件解析失败都会中止整次目录生成。

use crate::epub::error::{EpubError, Result};
use crate::epub::ncx::navigation::{NavMap, NavPoint, Ncx};
use crate::epub::opf::manifest::Manifest;
use crate::epub::opf::spine::Spine;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs;

/// 跨文件共享的生成状态
struct GeneratorState {
    /// 每个标题级别最近生成的导航点，记录为从根到节点的索引路径
    last_seen: [Option<Vec<usize>>; 6],
    play_order: u32,
}

/// 依据脊柱顺序生成整本出版物的NCX目录
///
/// # 参数
/// * `spine` - 脊柱（阅读顺序）
/// * `manifest` - 清单，用于解析脊柱引用
/// * `uid` - 包的唯一标识符值
/// * `doc_title` - NCX文档标题
///
/// # 返回值
/// * `Result<Ncx>` - 跨越全部内容文件的单一导航树
pub fn generate(spine: &Spine, manifest: &Manifest, uid: &str, doc_title: &str) -> Result<Ncx> {
    let mut ncx = Ncx::new(uid.to_string(), doc_title.to_string());
    let mut state = GeneratorState {
        last_seen: Default::default(),
        play_order: 0,
    };

    for entry in spine.entries() {
        let Some(item) = manifest.by_id(&entry.idref) else {
            continue;
        };
        if item.no_toc {
            continue;
        }
        let content = fs::read_to_string(&item.source_path)?;
        scan_content(&content, &item.href, &mut ncx.nav_map, &mut state)?;
    }
    Ok(ncx)
}

/// 识别h1~h6标题元素，返回标题级别
fn heading_level(name: &[u8]) -> Option<usize> {
    match name {
        b"h1" => Some(1),
        b"h2" => Some(2),
        b"h3" => Some(3),
        b"h4" => Some(4),
        b"h5" => Some(5),
        b"h6" => Some(6),
        _ => None,
    }
}

/// 扫描单个内容文件，将发现的标题挂入导航地图
fn scan_content(
    xml_content: &str,
    href: &str,
    nav_map: &mut NavMap,
    state: &mut GeneratorState,
) -> Result<()> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().expand_empty_elements = true;

    let mut buf = Vec::new();
    // 正在采集的标题：级别、锚点id、文本缓冲
    let mut current: Option<(usize, String, String)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                if let Some(level) = heading_level(e.local_name().as_ref()) {
                    let mut anchor = None;
                    for attr_result in e.attributes() {
                        let attr = attr_result
                            .map_err(|err| EpubError::Xml(quick_xml::Error::InvalidAttr(err)))?;
                        if attr.key.local_name().as_ref() == b"id" {
                            anchor = Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                    // 没有锚点id的标题无法链接，整个跳过
                    if let Some(anchor) = anchor {
                        current = Some((level, anchor, String::new()));
                    }
                }
            }
            Event::Text(e) => {
                if let Some((_, _, text)) = current.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::End(ref e) => {
                if let Some(level) = heading_level(e.local_name().as_ref()) {
                    if let Some((open_level, anchor, text)) = current.take() {
                        if open_level == level {
                            let src = format!("{}#{}", href, anchor);
                            attach(nav_map, state, level, &src, text.trim());
                        } else {
                            current = Some((open_level, anchor, text));
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

/// 将新标题挂到最近的祖先之下，并更新last_seen与playOrder
fn attach(nav_map: &mut NavMap, state: &mut GeneratorState, level: usize, src: &str, label: &str) {
    state.play_order += 1;
    let nav_point = NavPoint::new(
        format!("navpoint{}", state.play_order),
        state.play_order,
        label.to_string(),
        src.to_string(),
    );

    // 从level-1级向下寻找最近的祖先，找不到则挂在树根
    let parent_path: Option<Vec<usize>> = (1..level)
        .rev()
        .find_map(|ancestor| state.last_seen[ancestor - 1].clone());

    let path = match parent_path {
        Some(parent) => {
            let parent_node = node_at_mut(nav_map, &parent);
            parent_node.children.push(nav_point);
            let mut path = parent;
            path.push(parent_node.children.len() - 1);
            path
        }
        None => {
            nav_map.nav_points.push(nav_point);
            vec![nav_map.nav_points.len() - 1]
        }
    };
    state.last_seen[level - 1] = Some(path);
}

/// 按索引路径定位导航点
fn node_at_mut<'a>(nav_map: &'a mut NavMap, path: &[usize]) -> &'a mut NavPoint {
    let mut node = &mut nav_map.nav_points[path[0]];
    for &index in &path[1..] {
        node = &mut node.children[index];
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::media::XHTML_MIMETYPE;
    use crate::epub::opf::manifest::ManifestItem;

    fn scan(xml: &str, href: &str) -> NavMap {
        let mut nav_map = NavMap::new();
        let mut state = GeneratorState {
            last_seen: Default::default(),
            play_order: 0,
        };
        scan_content(xml, href, &mut nav_map, &mut state).unwrap();
        nav_map
    }

    #[test]
    fn test_flat_headings() {
        let xml = r#"<html><body>
            <h1 id="one">第一章</h1>
            <p>正文</p>
            <h1 id="two">第二章</h1>
        </body></html>"#;
        let nav_map = scan(xml, "chapter.xhtml");

        assert_eq!(nav_map.nav_points.len(), 2);
        assert_eq!(nav_map.nav_points[0].label, "第一章");
        assert_eq!(nav_map.nav_points[0].src, "chapter.xhtml#one");
        assert_eq!(nav_map.nav_points[0].play_order, 1);
        assert_eq!(nav_map.nav_points[1].play_order, 2);
    }

    #[test]
    fn test_nested_headings() {
        let xml = r#"<html><body>
            <h1 id="part">部</h1>
            <h2 id="chapter">章</h2>
            <h3 id="section">节</h3>
            <h2 id="chapter2">又一章</h2>
        </body></html>"#;
        let nav_map = scan(xml, "book.xhtml");

        assert_eq!(nav_map.nav_points.len(), 1);
        let part = &nav_map.nav_points[0];
        assert_eq!(part.children.len(), 2);
        assert_eq!(part.children[0].label, "章");
        assert_eq!(part.children[0].children[0].label, "节");
        assert_eq!(part.children[1].label, "又一章");

        let orders: Vec<u32> = nav_map.flatten().iter().map(|p| p.play_order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_heading_without_anchor_is_skipped() {
        let xml = r#"<html><body>
            <h1>无法链接的标题</h1>
            <h1 id="ok">可链接的标题</h1>
        </body></html>"#;
        let nav_map = scan(xml, "chapter.xhtml");

        assert_eq!(nav_map.nav_points.len(), 1);
        assert_eq!(nav_map.nav_points[0].label, "可链接的标题");
        assert_eq!(nav_map.nav_points[0].play_order, 1);
    }

    #[test]
    fn test_deep_heading_without_ancestor_attaches_to_root() {
        let xml = r#"<html><body><h3 id="lonely">孤立小节</h3></body></html>"#;
        let nav_map = scan(xml, "chapter.xhtml");

        assert_eq!(nav_map.nav_points.len(), 1);
        assert_eq!(nav_map.nav_points[0].label, "孤立小节");
    }

    #[test]
    fn test_inline_markup_inside_heading() {
        let xml = r#"<html><body>
            <h1 id="styled">前缀 <em>强调</em> 后缀</h1>
        </body></html>"#;
        let nav_map = scan(xml, "chapter.xhtml");

        assert_eq!(nav_map.nav_points[0].label, "前缀 强调 后缀");
    }

    #[test]
    fn test_play_order_spans_files() {
        let mut nav_map = NavMap::new();
        let mut state = GeneratorState {
            last_seen: Default::default(),
            play_order: 0,
        };
        scan_content(
            r#"<html><body><h1 id="a">甲</h1></body></html>"#,
            "first.xhtml",
            &mut nav_map,
            &mut state,
        )
        .unwrap();
        scan_content(
            r#"<html><body><h1 id="b">乙</h1></body></html>"#,
            "second.xhtml",
            &mut nav_map,
            &mut state,
        )
        .unwrap();

        let orders: Vec<u32> = nav_map.flatten().iter().map(|p| p.play_order).collect();
        assert_eq!(orders, vec![1, 2]);
        assert_eq!(nav_map.nav_points[1].src, "second.xhtml#b");
    }

    #[test]
    fn test_generate_respects_no_toc_flag() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.xhtml");
        let second = dir.path().join("second.xhtml");
        fs::write(&first, r#"<html><body><h1 id="a">甲</h1></body></html>"#).unwrap();
        fs::write(&second, r#"<html><body><h1 id="b">乙</h1></body></html>"#).unwrap();

        let mut manifest = Manifest::new();
        manifest
            .add(ManifestItem::new(
                "first".to_string(),
                "first.xhtml".to_string(),
                XHTML_MIMETYPE.to_string(),
                first,
            ))
            .unwrap();
        let mut skipped = ManifestItem::new(
            "second".to_string(),
            "second.xhtml".to_string(),
            XHTML_MIMETYPE.to_string(),
            second,
        );
        skipped.no_toc = true;
        manifest.add(skipped).unwrap();

        let mut spine = Spine::new();
        spine.push("first");
        spine.push("second");

        let ncx = generate(&spine, &manifest, "urn:uuid:0001", "Table of contents").unwrap();
        assert_eq!(ncx.nav_map.flatten().len(), 1);
        assert_eq!(ncx.nav_map.nav_points[0].src, "first.xhtml#a");
    }

    #[test]
    fn test_generate_aborts_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.xhtml");
        fs::write(&broken, "<html><body><h1 id=\"a\">坏</h2></body></html>").unwrap();

        let mut manifest = Manifest::new();
        manifest
            .add(ManifestItem::new(
                "broken".to_string(),
                "broken.xhtml".to_string(),
                XHTML_MIMETYPE.to_string(),
                broken,
            ))
            .unwrap();
        let mut spine = Spine::new();
        spine.push("broken");

        let result = generate(&spine, &manifest, "urn:uuid:0001", "Table of contents");
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_skips_unresolved_spine_entry() {
        let manifest = Manifest::new();
        let mut spine = Spine::new();
        spine.push("missing");

        let ncx = generate(&spine, &manifest, "urn:uuid:0001", "Table of contents").unwrap();
        assert!(ncx.nav_map.nav_points.is_empty());
    }
}
