use clap::{Parser, Subcommand};
use epubforge::{BookConfig, FieldKind, Publication, PublicationConfig, Result};
use std::path::PathBuf;
use std::process;

/// 📦 EPUBForge - EPUB出版物装配工具
#[derive(Parser)]
#[command(name = "epubforge")]
#[command(about = "一个用于装配和拆解EPUB出版物的Rust工具")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// 详细输出模式
    #[arg(short, long, global = true, help = "显示详细信息")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// 依据YAML配置装配EPUB文件
    Pack {
        /// 装配配置文件路径
        #[arg(help = "YAML装配配置文件路径")]
        config: PathBuf,

        /// 输出文件路径
        #[arg(help = "输出的EPUB文件路径")]
        output: PathBuf,
    },
    /// 将EPUB文件解包到指定目录
    Unpack {
        /// EPUB文件路径
        #[arg(help = "要解包的EPUB文件路径")]
        epub: PathBuf,

        /// 目标目录
        #[arg(help = "解包目标目录")]
        destination: PathBuf,
    },
    /// 显示EPUB文件的元数据与结构信息
    Info {
        /// EPUB文件路径
        #[arg(help = "要查看的EPUB文件路径")]
        epub: PathBuf,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(error) = run(args) {
        eprintln!("❌ 错误: {}", error);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = PublicationConfig {
        verbose: args.verbose,
        ..Default::default()
    };

    match args.command {
        Command::Pack { config: book_config, output } => {
            let book = BookConfig::from_file(&book_config)?;
            let mut publication = book.build(config)?;
            publication.pack(&output)?;
            println!("✅ 已生成 {}", output.display());
        }
        Command::Unpack { epub, destination } => {
            let publication = Publication::unpack_with_config(&epub, &destination, config)?;
            println!("✅ 已解包到 {}", destination.display());
            print_summary(&publication);
        }
        Command::Info { epub } => {
            let scratch = tempfile::tempdir()?;
            let publication = Publication::unpack_with_config(&epub, scratch.path(), config)?;
            print_summary(&publication);
        }
    }
    Ok(())
}

/// 打印出版物的概要信息
fn print_summary(publication: &Publication) {
    println!("📖 标题: {}", publication.metadata.title().unwrap_or("(未指定)"));
    println!(
        "🌐 语言: {}",
        publication.metadata.language().unwrap_or("(未指定)")
    );

    let creators = publication.metadata.of_kind(FieldKind::Creator);
    if !creators.is_empty() {
        let names: Vec<&str> = creators.iter().map(|c| c.value.as_str()).collect();
        println!("✍️ 创建者: {}", names.join("、"));
    }

    if let Some(unique) = publication.metadata.unique_identifier() {
        println!("🔑 唯一标识符: {}", unique.value);
    }

    println!("📄 清单项: {} 个", publication.manifest.len());
    println!("📚 阅读顺序: {} 项", publication.spine.len());
    if !publication.guide.is_empty() {
        println!("🧭 指南地标: {} 个", publication.guide.len());
    }
    if let Some(toc_path) = publication.toc_path() {
        println!("🗂 目录文件: {}", toc_path.display());
    }
}
