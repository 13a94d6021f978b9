//! 媒体类型推断模块
//!
//! 提供内容文件媒体类型的推断功能：优先按扩展名查表，
//! 查不到时再读取文件头部字节进行内容嗅探。

use crate::epub::error::Result;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// EPUB档案自身的媒体类型
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// XHTML内容文件的媒体类型
pub const XHTML_MIMETYPE: &str = "application/xhtml+xml";

/// NCX目录文件的媒体类型
pub const NCX_MIMETYPE: &str = "application/x-dtbncx+xml";

/// OPF包文件的媒体类型
pub const OPF_MIMETYPE: &str = "application/oebps-package+xml";

/// 扩展名到媒体类型的映射表
static EXTENSION_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("xhtml", XHTML_MIMETYPE),
        ("html", XHTML_MIMETYPE),
        ("htm", XHTML_MIMETYPE),
        ("css", "text/css"),
        ("js", "application/javascript"),
        ("txt", "text/plain"),
        ("xml", "application/xml"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("png", "image/png"),
        ("gif", "image/gif"),
        ("svg", "image/svg+xml"),
        ("otf", "font/opentype"),
        ("ttf", "font/ttf"),
        ("woff", "font/woff"),
        ("woff2", "font/woff2"),
        ("ncx", NCX_MIMETYPE),
        ("opf", OPF_MIMETYPE),
    ])
});

/// 根据文件扩展名推断媒体类型
pub fn from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    EXTENSION_TYPES.get(extension.as_str()).copied()
}

/// 读取文件头部字节嗅探媒体类型
///
/// # 参数
/// * `path` - 要嗅探的文件路径
///
/// # 返回值
/// * `Result<Option<&'static str>>` - 识别出的媒体类型，无法识别时为None
pub fn sniff(path: &Path) -> Result<Option<&'static str>> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 16];
    let read = file.read(&mut header)?;
    Ok(sniff_bytes(&header[..read]))
}

fn sniff_bytes(header: &[u8]) -> Option<&'static str> {
    if header.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if header.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    if header.starts_with(b"OTTO") {
        return Some("font/opentype");
    }
    if header.starts_with(b"<?xml") || header.starts_with(b"<svg") {
        return Some("application/xml");
    }
    None
}

/// 推断文件的媒体类型：先按扩展名查表，再进行内容嗅探
pub fn detect(path: &Path) -> Result<Option<&'static str>> {
    if let Some(media_type) = from_extension(path) {
        return Ok(Some(media_type));
    }
    sniff(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_extension() {
        assert_eq!(from_extension(Path::new("chapter.xhtml")), Some(XHTML_MIMETYPE));
        assert_eq!(from_extension(Path::new("cover.JPG")), Some("image/jpeg"));
        assert_eq!(from_extension(Path::new("toc.ncx")), Some(NCX_MIMETYPE));
        assert_eq!(from_extension(Path::new("unknown.zzz")), None);
        assert_eq!(from_extension(Path::new("no_extension")), None);
    }

    #[test]
    fn test_sniff_bytes() {
        assert_eq!(
            sniff_bytes(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]),
            Some("image/png")
        );
        assert_eq!(sniff_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_bytes(b"GIF89a..."), Some("image/gif"));
        assert_eq!(sniff_bytes(b"plain text"), None);
        assert_eq!(sniff_bytes(&[]), None);
    }

    #[test]
    fn test_detect_falls_back_to_sniffing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.bin");
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
        assert_eq!(detect(&path).unwrap(), Some("image/jpeg"));
    }
}
