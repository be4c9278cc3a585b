use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("写出分析结果失败: {0}")]
    Output(#[from] std::io::Error),
    #[error("序列化 JSON 结果失败: {0}")]
    Json(#[from] serde_json::Error),
}
