//! 校验错误与多语言翻译

use serde::Serialize;
use std::fmt;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidError {
    pub key: String,
    pub message: String,
}

impl fmt::Display for ValidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidError {}

/// 按字段 key 排序的校验错误列表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidErrors(pub Vec<ValidError>);

impl ValidErrors {
    pub fn errors(&self) -> Vec<String> {
        self.0.iter().map(|e| e.to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.errors().join(","))
    }
}

impl std::error::Error for ValidErrors {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl Locale {
    /// 解析 `locale` 请求头；无法识别时回落到中文
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("en") => Locale::En,
            _ => Locale::Zh,
        }
    }
}

/// 将 validator 的结构化错误翻译为本地化文案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Translator {
    locale: Locale,
}

impl Translator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn translate(&self, errors: &ValidationErrors) -> ValidErrors {
        let mut out = Vec::new();
        self.collect(String::new(), errors, &mut out);
        out.sort_by(|a, b| a.key.cmp(&b.key));
        ValidErrors(out)
    }

    fn collect(&self, prefix: String, errors: &ValidationErrors, out: &mut Vec<ValidError>) {
        for (field, kind) in errors.errors() {
            let key = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{prefix}.{field}")
            };
            match kind {
                ValidationErrorsKind::Field(list) => {
                    for err in list {
                        out.push(ValidError {
                            key: key.clone(),
                            message: self.message(field, err),
                        });
                    }
                }
                ValidationErrorsKind::Struct(inner) => self.collect(key, inner, out),
                ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        self.collect(format!("{key}[{index}]"), inner, out);
                    }
                }
            }
        }
    }

    fn message(&self, field: &str, err: &ValidationError) -> String {
        let min = param(err, "min");
        let max = param(err, "max");
        let zh = self.locale == Locale::Zh;
        match &*err.code {
            "required" if zh => format!("{field}为必填字段"),
            "required" => format!("{field} is a required field"),
            "length" => {
                if let Some(equal) = param(err, "equal") {
                    return if zh {
                        format!("{field}长度必须是{equal}个字符")
                    } else {
                        format!("{field} must be {equal} characters in length")
                    };
                }
                match (min, max, zh) {
                    (Some(min), Some(max), true) => {
                        format!("{field}长度必须在{min}到{max}个字符之间")
                    }
                    (Some(min), Some(max), false) => {
                        format!("{field} must be between {min} and {max} characters in length")
                    }
                    (Some(min), None, true) => format!("{field}长度必须至少为{min}个字符"),
                    (Some(min), None, false) => {
                        format!("{field} must be at least {min} characters in length")
                    }
                    (None, Some(max), true) => format!("{field}长度不能超过{max}个字符"),
                    (None, Some(max), false) => {
                        format!("{field} must be a maximum of {max} characters in length")
                    }
                    (None, None, _) => self.fallback(field, err),
                }
            }
            "range" => match (min, max, zh) {
                (Some(min), Some(max), true) => format!("{field}必须在{min}到{max}之间"),
                (Some(min), Some(max), false) => format!("{field} must be between {min} and {max}"),
                (Some(min), None, true) => format!("{field}必须大于或等于{min}"),
                (Some(min), None, false) => format!("{field} must be {min} or greater"),
                (None, Some(max), true) => format!("{field}必须小于或等于{max}"),
                (None, Some(max), false) => format!("{field} must be {max} or less"),
                (None, None, _) => self.fallback(field, err),
            },
            "url" if zh => format!("{field}必须是一个有效的URL"),
            "url" => format!("{field} must be a valid URL"),
            "email" if zh => format!("{field}必须是一个有效的邮箱"),
            "email" => format!("{field} must be a valid email address"),
            _ => self.fallback(field, err),
        }
    }

    fn fallback(&self, field: &str, err: &ValidationError) -> String {
        if let Some(message) = &err.message {
            return message.to_string();
        }
        match self.locale {
            Locale::Zh => format!("{field}格式不正确"),
            Locale::En => format!("{field} is invalid"),
        }
    }
}

fn param(err: &ValidationError, name: &str) -> Option<String> {
    err.params.get(name).map(|v| match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
