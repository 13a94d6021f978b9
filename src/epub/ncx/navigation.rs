//! NCX导航元素数据结构定义
//!
//! 定义toc.ncx文档的内存模型：导航点、导航地图与NCX根节点。

/// 导航点
#[derive(Debug, Clone, PartialEq)]
pub struct NavPoint {
    /// 唯一标识符（navpointN）
    pub id: String,
    /// 播放顺序，全书范围内严格递增
    pub play_order: u32,
    /// 导航标签文本
    pub label: String,
    /// 内容引用（href或href#fragment）
    pub src: String,
    /// 子导航点
    pub children: Vec<NavPoint>,
}

impl NavPoint {
    /// 创建新的导航点
    pub fn new(id: String, play_order: u32, label: String, src: String) -> Self {
        Self {
            id,
            play_order,
            label,
            src,
            children: Vec::new(),
        }
    }

    /// 添加子导航点
    pub fn add_child(&mut self, child: NavPoint) {
        self.children.push(child);
    }

    /// 获取所有导航点（包括子导航点）的平铺列表，按文档顺序
    pub fn flatten(&self) -> Vec<&NavPoint> {
        let mut points = vec![self];
        for child in &self.children {
            points.extend(child.flatten());
        }
        points
    }

    /// 获取导航深度
    pub fn depth(&self) -> u32 {
        1 + self
            .children
            .iter()
            .map(|child| child.depth())
            .max()
            .unwrap_or(0)
    }
}

/// 导航地图
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavMap {
    /// 顶层导航点列表
    pub nav_points: Vec<NavPoint>,
}

impl NavMap {
    /// 创建新的导航地图
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加顶层导航点
    pub fn add_nav_point(&mut self, nav_point: NavPoint) {
        self.nav_points.push(nav_point);
    }

    /// 获取所有导航点的平铺列表，按文档顺序
    pub fn flatten(&self) -> Vec<&NavPoint> {
        let mut all_points = Vec::new();
        for nav_point in &self.nav_points {
            all_points.extend(nav_point.flatten());
        }
        all_points
    }

    /// 获取导航深度
    pub fn depth(&self) -> u32 {
        self.nav_points
            .iter()
            .map(|point| point.depth())
            .max()
            .unwrap_or(0)
    }
}

/// NCX目录文档模型
#[derive(Debug, Clone, PartialEq)]
pub struct Ncx {
    /// 包的唯一标识符（dtb:uid）
    pub uid: String,
    /// 文档标题
    pub doc_title: String,
    /// 导航地图
    pub nav_map: NavMap,
}

impl Ncx {
    /// 创建空导航地图的NCX文档
    pub fn new(uid: String, doc_title: String) -> Self {
        Self {
            uid,
            doc_title,
            nav_map: NavMap::new(),
        }
    }
}
