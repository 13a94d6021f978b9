//! 元数据处理模块
//!
//! 提供出版物Dublin Core元数据的结构定义、查询接口，
//! 以及打包前的必备元数据填充。

use chrono::Utc;
use uuid::Uuid;

use crate::epub::media::EPUB_MIMETYPE;

/// 自动生成的唯一标识符所使用的元素id
pub const UUID_IDENTIFIER_ID: &str = "uuid";

/// 创建日期事件名
const CREATION_DATE_EVENT: &str = "creation";

/// 元数据条目的种类（Dublin Core元素与meta标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    Creator,
    Subject,
    Description,
    Publisher,
    Date,
    Identifier,
    Language,
    Format,
    Type,
    Contributor,
    Coverage,
    Rights,
    Source,
    Relation,
    Meta,
}

impl FieldKind {
    /// OPF文件中对应的元素本地名
    pub fn tag_name(&self) -> &'static str {
        match self {
            FieldKind::Title => "title",
            FieldKind::Creator => "creator",
            FieldKind::Subject => "subject",
            FieldKind::Description => "description",
            FieldKind::Publisher => "publisher",
            FieldKind::Date => "date",
            FieldKind::Identifier => "identifier",
            FieldKind::Language => "language",
            FieldKind::Format => "format",
            FieldKind::Type => "type",
            FieldKind::Contributor => "contributor",
            FieldKind::Coverage => "coverage",
            FieldKind::Rights => "rights",
            FieldKind::Source => "source",
            FieldKind::Relation => "relation",
            FieldKind::Meta => "meta",
        }
    }

    /// 根据元素本地名识别种类（忽略命名空间前缀后的名称）
    pub fn from_tag(tag: &str) -> Option<FieldKind> {
        match tag {
            "title" => Some(FieldKind::Title),
            "creator" => Some(FieldKind::Creator),
            "subject" => Some(FieldKind::Subject),
            "description" => Some(FieldKind::Description),
            "publisher" => Some(FieldKind::Publisher),
            "date" => Some(FieldKind::Date),
            "identifier" => Some(FieldKind::Identifier),
            "language" => Some(FieldKind::Language),
            "format" => Some(FieldKind::Format),
            "type" => Some(FieldKind::Type),
            "contributor" => Some(FieldKind::Contributor),
            "coverage" => Some(FieldKind::Coverage),
            "rights" => Some(FieldKind::Rights),
            "source" => Some(FieldKind::Source),
            "relation" => Some(FieldKind::Relation),
            "meta" => Some(FieldKind::Meta),
            _ => None,
        }
    }
}

/// 创建者/贡献者的角色（MARC relator代码）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Author,
    Editor,
    Translator,
    Illustrator,
    Redactor,
    Narrator,
    Photographer,
    Artist,
    Adapter,
    Annotator,
}

impl Role {
    pub fn code(&self) -> &'static str {
        match self {
            Role::Author => "aut",
            Role::Editor => "edt",
            Role::Translator => "trl",
            Role::Illustrator => "ill",
            Role::Redactor => "red",
            Role::Narrator => "nrt",
            Role::Photographer => "pht",
            Role::Artist => "art",
            Role::Adapter => "adp",
            Role::Annotator => "ann",
        }
    }

    pub fn from_code(code: &str) -> Option<Role> {
        match code {
            "aut" => Some(Role::Author),
            "edt" => Some(Role::Editor),
            "trl" => Some(Role::Translator),
            "ill" => Some(Role::Illustrator),
            "red" => Some(Role::Redactor),
            "nrt" => Some(Role::Narrator),
            "pht" => Some(Role::Photographer),
            "art" => Some(Role::Artist),
            "adp" => Some(Role::Adapter),
            "ann" => Some(Role::Annotator),
            _ => None,
        }
    }
}

/// 标识符的表示方案
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Isbn,
    Issn,
    Uuid,
    Doi,
    Uri,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Isbn => "ISBN",
            Scheme::Issn => "ISSN",
            Scheme::Uuid => "UUID",
            Scheme::Doi => "DOI",
            Scheme::Uri => "URI",
        }
    }

    pub fn from_str(value: &str) -> Option<Scheme> {
        match value.to_ascii_uppercase().as_str() {
            "ISBN" => Some(Scheme::Isbn),
            "ISSN" => Some(Scheme::Issn),
            "UUID" => Some(Scheme::Uuid),
            "DOI" => Some(Scheme::Doi),
            "URI" => Some(Scheme::Uri),
            _ => None,
        }
    }
}

/// 单条元数据
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataField {
    /// 元素id（用于unique-identifier关联）
    pub id: Option<String>,
    /// 语言代码
    pub lang: Option<String>,
    /// 元素内容
    pub value: String,
    /// 条目种类
    pub kind: FieldKind,
    /// 创建者/贡献者角色
    pub role: Option<Role>,
    /// 标识符方案
    pub scheme: Option<Scheme>,
    /// 日期事件（creation、publication等）
    pub event: Option<String>,
    /// meta标签的name属性（仅FieldKind::Meta使用）
    pub name: Option<String>,
}

impl MetadataField {
    /// 创建指定种类的元数据条目
    pub fn new(kind: FieldKind, value: &str) -> Self {
        Self {
            id: None,
            lang: None,
            value: value.to_string(),
            kind,
            role: None,
            scheme: None,
            event: None,
            name: None,
        }
    }

    pub fn with_id(mut self, id: Option<&str>) -> Self {
        self.id = id.map(str::to_string);
        self
    }

    pub fn with_lang(mut self, lang: Option<&str>) -> Self {
        self.lang = lang.map(str::to_string);
        self
    }

    pub fn with_role(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    pub fn with_scheme(mut self, scheme: Option<Scheme>) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_event(mut self, event: Option<&str>) -> Self {
        self.event = event.map(str::to_string);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// 出版物的元数据存储
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    fields: Vec<MetadataField>,
    unique_identifier_id: Option<String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一条元数据
    pub fn add(&mut self, field: MetadataField) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[MetadataField] {
        &self.fields
    }

    /// 按种类筛选元数据条目
    pub fn of_kind(&self, kind: FieldKind) -> Vec<&MetadataField> {
        self.fields.iter().filter(|f| f.kind == kind).collect()
    }

    /// 指定包的唯一标识符对应的元素id
    pub fn set_unique_identifier_id(&mut self, id: &str) {
        self.unique_identifier_id = Some(id.to_string());
    }

    pub fn unique_identifier_id(&self) -> Option<&str> {
        self.unique_identifier_id.as_deref()
    }

    /// 解析包的唯一标识符
    ///
    /// # 返回值
    /// * `Option<&MetadataField>` - unique-identifier指向的Identifier条目
    pub fn unique_identifier(&self) -> Option<&MetadataField> {
        let target = self.unique_identifier_id.as_deref()?;
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Identifier)
            .find(|f| f.id.as_deref() == Some(target))
    }

    /// 获取第一个标题
    pub fn title(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.kind == FieldKind::Title)
            .map(|f| f.value.as_str())
    }

    /// 获取第一个语言
    pub fn language(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.kind == FieldKind::Language)
            .map(|f| f.value.as_str())
    }

    fn has_kind(&self, kind: FieldKind) -> bool {
        self.fields.iter().any(|f| f.kind == kind)
    }

    /// 填充打包前必须存在的元数据
    ///
    /// 补全内容：创建日期、redactor贡献者、UUID唯一标识符、
    /// 空主题、英语语言、默认标题与EPUB格式声明。
    pub fn add_compulsory_data(&mut self) {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.add(MetadataField::new(FieldKind::Date, &today).with_event(Some(CREATION_DATE_EVENT)));
        self.add(
            MetadataField::new(FieldKind::Contributor, "EPUBForge contributors")
                .with_role(Some(Role::Redactor)),
        );
        if self.unique_identifier().is_none() {
            let uuid = Uuid::new_v4().to_string();
            self.add(
                MetadataField::new(FieldKind::Identifier, &uuid)
                    .with_id(Some(UUID_IDENTIFIER_ID))
                    .with_scheme(Some(Scheme::Uuid)),
            );
            self.set_unique_identifier_id(UUID_IDENTIFIER_ID);
        }
        if !self.has_kind(FieldKind::Subject) {
            self.add(MetadataField::new(FieldKind::Subject, ""));
        }
        if !self.has_kind(FieldKind::Language) {
            self.add(MetadataField::new(FieldKind::Language, "en"));
        }
        if !self.has_kind(FieldKind::Title) {
            self.add(MetadataField::new(FieldKind::Title, "No title specified"));
        }
        if !self.has_kind(FieldKind::Format) {
            self.add(MetadataField::new(FieldKind::Format, EPUB_MIMETYPE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compulsory_data_on_empty_metadata() {
        let mut metadata = Metadata::new();
        metadata.add_compulsory_data();

        let titles = metadata.of_kind(FieldKind::Title);
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].value, "No title specified");

        let languages = metadata.of_kind(FieldKind::Language);
        assert_eq!(languages.len(), 1);
        assert_eq!(languages[0].value, "en");

        let formats = metadata.of_kind(FieldKind::Format);
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].value, "application/epub+zip");

        let unique = metadata.unique_identifier().expect("应生成UUID标识符");
        assert_eq!(unique.scheme, Some(Scheme::Uuid));
        assert_eq!(unique.id.as_deref(), Some(UUID_IDENTIFIER_ID));
        assert!(!unique.value.is_empty());
    }

    #[test]
    fn test_compulsory_data_keeps_existing_fields() {
        let mut metadata = Metadata::new();
        metadata.add(MetadataField::new(FieldKind::Title, "九州志"));
        metadata.add(
            MetadataField::new(FieldKind::Identifier, "978-7-02-008448-3")
                .with_id(Some("bookid"))
                .with_scheme(Some(Scheme::Isbn)),
        );
        metadata.set_unique_identifier_id("bookid");
        metadata.add_compulsory_data();

        assert_eq!(metadata.title(), Some("九州志"));
        let unique = metadata.unique_identifier().unwrap();
        assert_eq!(unique.value, "978-7-02-008448-3");
        assert_eq!(unique.scheme, Some(Scheme::Isbn));
        // 未重复生成UUID标识符
        assert_eq!(metadata.of_kind(FieldKind::Identifier).len(), 1);
    }

    #[test]
    fn test_unique_identifier_requires_matching_id() {
        let mut metadata = Metadata::new();
        metadata.add(MetadataField::new(FieldKind::Identifier, "urn:x"));
        metadata.set_unique_identifier_id("missing");
        assert!(metadata.unique_identifier().is_none());
    }

    #[test]
    fn test_role_and_scheme_codes() {
        assert_eq!(Role::Redactor.code(), "red");
        assert_eq!(Role::from_code("aut"), Some(Role::Author));
        assert_eq!(Role::from_code("xyz"), None);
        assert_eq!(Scheme::Uuid.as_str(), "UUID");
        assert_eq!(Scheme::from_str("isbn"), Some(Scheme::Isbn));
    }
}
