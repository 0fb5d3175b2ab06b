use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum AdError {
    Validation(String),
    QuotaExceeded(String),
    Storage(String),
    Encoding(String),
    Config(String),
}

impl AdError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AdError::Validation(_) => "E001",
            AdError::QuotaExceeded(_) => "E002",
            AdError::Storage(_) => "E003",
            AdError::Encoding(_) => "E004",
            AdError::Config(_) => "E005",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AdError::Validation(_) => "Validation Error",
            AdError::QuotaExceeded(_) => "Quota Exceeded",
            AdError::Storage(_) => "Storage Error",
            AdError::Encoding(_) => "Encoding Error",
            AdError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            AdError::Validation(msg) => msg,
            AdError::QuotaExceeded(msg) => msg,
            AdError::Storage(msg) => msg,
            AdError::Encoding(msg) => msg,
            AdError::Config(msg) => msg,
        }
    }

    /// HTTP status the API layer answers with.
    ///
    /// A full quota is a refusal, not a server fault.
    pub fn http_status(&self) -> StatusCode {
        match self {
            AdError::Validation(_) => StatusCode::BAD_REQUEST,
            AdError::QuotaExceeded(_) => StatusCode::FORBIDDEN,
            AdError::Storage(_) | AdError::Encoding(_) | AdError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AdError {}

// 便捷的构造函数
impl AdError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AdError::Validation(msg.into())
    }

    pub fn quota_exceeded<T: Into<String>>(msg: T) -> Self {
        AdError::QuotaExceeded(msg.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        AdError::Storage(msg.into())
    }

    pub fn encoding<T: Into<String>>(msg: T) -> Self {
        AdError::Encoding(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        AdError::Config(msg.into())
    }
}

impl From<redis::RedisError> for AdError {
    fn from(err: redis::RedisError) -> Self {
        AdError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AdError {
    fn from(err: serde_json::Error) -> Self {
        AdError::Encoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdError>;
