//! Novella - 网络小说阅读页服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 小说、章节、文档标识、章节存储方式
//! - Content Formatter: 正文分段与图片标记
//!
//! 应用层 (application/):
//! - Ports: 小说、章节、用户文档仓储
//! - Queries: 章节解析、小说详情、小说列表
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Memory: 内存文档存储
//! - Persistence: SQLite 存储 + 种子数据导入

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
