use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// 值类型标签
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Int,
    Float,
    #[serde(rename = "string")]
    Text,
    Bytes,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Text => "string",
            ValueType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(ValueType::Int),
            "float" | "double" => Ok(ValueType::Float),
            "string" | "str" | "text" => Ok(ValueType::Text),
            "bytes" | "raw" => Ok(ValueType::Bytes),
            other => Err(AppError::Validation(format!("unknown data type: {}", other))),
        }
    }
}

/// 带类型标签的值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    Int(i64),
    Float(f64),
    #[serde(rename = "string")]
    Text(String),
    Bytes(Vec<u8>),
}

impl TypedValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::Int(_) => ValueType::Int,
            TypedValue::Float(_) => ValueType::Float,
            TypedValue::Text(_) => ValueType::Text,
            TypedValue::Bytes(_) => ValueType::Bytes,
        }
    }

    /// 按声明的类型解析客户端提交的 JSON 值
    pub fn from_json(value_type: ValueType, raw: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        let invalid = || {
            AppError::Validation(format!("value {} is not a valid {}", raw, value_type))
        };

        match value_type {
            ValueType::Int => match raw {
                Value::Number(n) => n.as_i64().map(TypedValue::Int).ok_or_else(invalid),
                Value::String(s) => s.trim().parse().map(TypedValue::Int).map_err(|_| invalid()),
                _ => Err(invalid()),
            },
            ValueType::Float => match raw {
                Value::Number(n) => n.as_f64().map(TypedValue::Float).ok_or_else(invalid),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(TypedValue::Float)
                    .ok_or_else(invalid),
                _ => Err(invalid()),
            },
            ValueType::Text => match raw {
                Value::String(s) => Ok(TypedValue::Text(s.clone())),
                Value::Number(_) | Value::Bool(_) => Ok(TypedValue::Text(raw.to_string())),
                _ => Err(invalid()),
            },
            ValueType::Bytes => match raw {
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_u64()
                            .and_then(|b| u8::try_from(b).ok())
                            .ok_or_else(invalid)
                    })
                    .collect::<Result<Vec<u8>>>()
                    .map(TypedValue::Bytes),
                Value::String(s) => parse_hex(s).map(TypedValue::Bytes).ok_or_else(invalid),
                _ => Err(invalid()),
            },
        }
    }

    /// 转为不带标签的 JSON 值
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            TypedValue::Int(v) => serde_json::json!(v),
            TypedValue::Float(v) => serde_json::json!(v),
            TypedValue::Text(v) => serde_json::json!(v),
            TypedValue::Bytes(v) => serde_json::json!(v),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int(v) => write!(f, "{}", v),
            TypedValue::Float(v) => write!(f, "{}", v),
            TypedValue::Text(v) => f.write_str(v),
            TypedValue::Bytes(v) => {
                let hex: Vec<String> = v.iter().map(|b| format!("{:02X}", b)).collect();
                f.write_str(&hex.join(" "))
            }
        }
    }
}

/// 解析 "0A FF 10" 或 "0aff10" 形式的十六进制串
fn parse_hex(s: &str) -> Option<Vec<u8>> {
    let digits: String = s
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if digits.is_empty()
        || digits.len() % 2 != 0
        || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return None;
    }
    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        })
        .collect()
}

/// 后端写入结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteState {
    /// 扫描产生，尚未写入
    #[default]
    Scanned,
    /// 最近一次写入成功
    Written,
    /// 最近一次写入失败，value 仅记录意图
    WriteFailed,
}

/// 内存后端返回的单个扫描命中
#[derive(Debug, Clone, PartialEq)]
pub struct ScanHit {
    pub location: String,
    pub value: TypedValue,
}

/// 内存地址记录
///
/// 扫描只追加新记录；编辑按 (pid, address) 原地更新。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryAddress {
    /// 记录唯一标识
    pub id: String,
    /// 所属目标进程
    pub pid: u32,
    /// 地址（后端定义的不透明位置）
    pub address: String,
    /// 当前值（编辑后为意图值）
    pub value: TypedValue,
    /// 描述
    pub description: Option<String>,
    /// 产生该记录的扫描批次
    pub scan_id: String,
    /// 后端写入状态
    pub write_state: WriteState,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后更新时间
    pub updated_at: DateTime<Utc>,
}

impl MemoryAddress {
    /// 由一次扫描命中创建记录
    pub fn from_scan(pid: u32, scan_id: &str, hit: ScanHit, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            pid,
            address: hit.location,
            value: hit.value,
            description,
            scan_id: scan_id.to_string(),
            write_state: WriteState::Scanned,
            created_at: now,
            updated_at: now,
        }
    }

    /// 记录意图值
    pub fn apply_value(&mut self, value: TypedValue) {
        self.value = value;
        self.updated_at = Utc::now();
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }
}
