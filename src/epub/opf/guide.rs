//! 指南模块
//!
//! 提供出版物语义地标（封面、扉页、目录等）的结构定义。
//! 类型词汇表为OPF 2.0规范定义的封闭集合。

/// 指南引用类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceType {
    Cover,
    TitlePage,
    Toc,
    Index,
    Glossary,
    Acknowledgements,
    Bibliography,
    Colophon,
    CopyrightPage,
    Dedication,
    Epigraph,
    Foreword,
    Loi,
    Lot,
    Notes,
    Preface,
    Text,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Cover => "cover",
            ReferenceType::TitlePage => "title-page",
            ReferenceType::Toc => "toc",
            ReferenceType::Index => "index",
            ReferenceType::Glossary => "glossary",
            ReferenceType::Acknowledgements => "acknowledgements",
            ReferenceType::Bibliography => "bibliography",
            ReferenceType::Colophon => "colophon",
            ReferenceType::CopyrightPage => "copyright-page",
            ReferenceType::Dedication => "dedication",
            ReferenceType::Epigraph => "epigraph",
            ReferenceType::Foreword => "foreword",
            ReferenceType::Loi => "loi",
            ReferenceType::Lot => "lot",
            ReferenceType::Notes => "notes",
            ReferenceType::Preface => "preface",
            ReferenceType::Text => "text",
        }
    }

    pub fn from_str(value: &str) -> Option<ReferenceType> {
        match value {
            "cover" => Some(ReferenceType::Cover),
            "title-page" => Some(ReferenceType::TitlePage),
            "toc" => Some(ReferenceType::Toc),
            "index" => Some(ReferenceType::Index),
            "glossary" => Some(ReferenceType::Glossary),
            "acknowledgements" => Some(ReferenceType::Acknowledgements),
            "bibliography" => Some(ReferenceType::Bibliography),
            "colophon" => Some(ReferenceType::Colophon),
            "copyright-page" => Some(ReferenceType::CopyrightPage),
            "dedication" => Some(ReferenceType::Dedication),
            "epigraph" => Some(ReferenceType::Epigraph),
            "foreword" => Some(ReferenceType::Foreword),
            "loi" => Some(ReferenceType::Loi),
            "lot" => Some(ReferenceType::Lot),
            "notes" => Some(ReferenceType::Notes),
            "preface" => Some(ReferenceType::Preface),
            "text" => Some(ReferenceType::Text),
            _ => None,
        }
    }
}

/// 指南引用（一个语义地标）
#[derive(Debug, Clone, PartialEq)]
pub struct GuideReference {
    /// 指向的清单项href
    pub href: String,
    /// 显示标题
    pub title: String,
    /// 地标类型
    pub kind: ReferenceType,
}

impl GuideReference {
    pub fn new(href: String, title: String, kind: ReferenceType) -> Self {
        Self { href, title, kind }
    }
}

/// 指南（语义地标的有序列表）
#[derive(Debug, Clone, Default)]
pub struct Guide {
    references: Vec<GuideReference>,
}

impl Guide {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一条指南引用
    pub fn add(&mut self, reference: GuideReference) {
        self.references.push(reference);
    }

    pub fn references(&self) -> &[GuideReference] {
        &self.references
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
