//! EPUB档案打包/解包模块
//!
//! 负责物理ZIP文件的生成与解开。EPUB规范要求档案的首个条目
//! 必须是名为mimetype的未压缩条目，阅读器据此不经ZIP中央目录
//! 即可识别格式。

use crate::epub::error::{EpubError, Result};
use crate::epub::media::EPUB_MIMETYPE;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// 将工作目录压缩为EPUB档案
///
/// 工作目录需已包含META-INF/与OEBPS/目录树。mimetype条目由
/// 本函数生成并放在首位，目录树中的同名文件会被跳过。
///
/// # 参数
/// * `destination` - 目标EPUB文件路径，已存在时返回`DestinationExists`
/// * `folder` - 已组装完成的工作目录
pub fn pack(destination: &Path, folder: &Path) -> Result<()> {
    if destination.exists() {
        return Err(EpubError::DestinationExists(destination.to_path_buf()));
    }
    let result = write_archive(destination, folder);
    if result.is_err() {
        // 打包中途失败时不留下截断的EPUB文件
        let _ = fs::remove_file(destination);
    }
    result
}

fn write_archive(destination: &Path, folder: &Path) -> Result<()> {
    let file = File::create(destination)?;
    let mut zip = ZipWriter::new(file);
    write_mimetype_entry(&mut zip)?;

    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    add_folder(&mut zip, folder, folder, deflated)?;
    zip.finish()?;
    Ok(())
}

/// 写入首位的mimetype条目：存储方式、无压缩、CRC与长度由写入器补全
fn write_mimetype_entry(zip: &mut ZipWriter<File>) -> Result<()> {
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("mimetype", stored)?;
    zip.write_all(EPUB_MIMETYPE.as_bytes())?;
    Ok(())
}

/// 递归添加目录内容，文件先于子目录写入
fn add_folder(
    zip: &mut ZipWriter<File>,
    root: &Path,
    folder: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        } else {
            files.push(path);
        }
    }
    files.sort();
    dirs.sort();

    for path in &files {
        let name = relative_name(root, path)?;
        // mimetype已作为首个条目写入
        if name == "mimetype" {
            continue;
        }
        zip.start_file(name, options)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, zip)?;
    }
    for path in &dirs {
        zip.add_directory(relative_name(root, path)?, options)?;
        add_folder(zip, root, path, options)?;
    }
    Ok(())
}

/// 计算root下文件的POSIX风格相对路径
fn relative_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        EpubError::InvalidInput(format!("{} 不在工作目录之内", path.display()))
    })?;
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Ok(segments.join("/"))
}

/// 将EPUB档案解压到目标目录
pub fn unpack(archive_path: &Path, destination: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;
    fs::create_dir_all(destination)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            EpubError::MalformedArchive(format!("条目名称非法: {}", entry.name()))
        })?;
        let target = destination.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut output = File::create(&target)?;
            io::copy(&mut entry, &mut output)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn build_working_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let meta_inf = dir.path().join("META-INF");
        let oebps = dir.path().join("OEBPS");
        fs::create_dir_all(&meta_inf).unwrap();
        fs::create_dir_all(&oebps).unwrap();
        fs::write(meta_inf.join("container.xml"), "<container/>").unwrap();
        fs::write(oebps.join("content.opf"), "<package/>").unwrap();
        fs::write(oebps.join("chapter-1.xhtml"), "<html/>").unwrap();
        dir
    }

    #[test]
    fn test_mimetype_entry_is_first_stored_and_exact() {
        let working = build_working_dir();
        let out = tempfile::tempdir().unwrap();
        let epub = out.path().join("book.epub");
        pack(&epub, working.path()).unwrap();

        let mut archive = ZipArchive::new(File::open(&epub).unwrap()).unwrap();
        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        assert_eq!(first.size(), 20);

        let mut content = String::new();
        first.read_to_string(&mut content).unwrap();
        assert_eq!(content, "application/epub+zip");
    }

    #[test]
    fn test_pack_fails_when_destination_exists() {
        let working = build_working_dir();
        let out = tempfile::tempdir().unwrap();
        let epub = out.path().join("book.epub");
        fs::write(&epub, "occupied").unwrap();

        let result = pack(&epub, working.path());
        assert!(matches!(result, Err(EpubError::DestinationExists(_))));
        // 已存在的文件保持原样
        assert_eq!(fs::read_to_string(&epub).unwrap(), "occupied");
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let working = build_working_dir();
        let out = tempfile::tempdir().unwrap();
        let epub = out.path().join("book.epub");
        pack(&epub, working.path()).unwrap();

        let extracted = out.path().join("extracted");
        unpack(&epub, &extracted).unwrap();
        assert_eq!(
            fs::read_to_string(extracted.join("mimetype")).unwrap(),
            "application/epub+zip"
        );
        assert_eq!(
            fs::read_to_string(extracted.join("META-INF/container.xml")).unwrap(),
            "<container/>"
        );
        assert_eq!(
            fs::read_to_string(extracted.join("OEBPS/chapter-1.xhtml")).unwrap(),
            "<html/>"
        );
    }

    #[test]
    fn test_relative_name_uses_posix_separators() {
        let root = PathBuf::from("/tmp/work");
        let nested = root.join("OEBPS").join("images").join("cover.png");
        assert_eq!(
            relative_name(&root, &nested).unwrap(),
            "OEBPS/images/cover.png"
        );
    }
}
