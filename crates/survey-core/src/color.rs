//! 8位RGB颜色运算

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 以 `#rrggbb` 形式序列化的颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 按百分比调整亮度：正数变亮，负数变暗。
    ///
    /// 每个通道加减 `round(2.55 * |percent|)`，结果截断在 [0, 255]。
    pub fn shift(self, percent: i32) -> Self {
        let amount = (2.55 * f64::from(percent)).round() as i32;
        let channel = |c: u8| (i32::from(c) + amount).clamp(0, 255) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
        }
    }

    pub fn lighten(self, percent: u8) -> Self {
        self.shift(i32::from(percent))
    }

    pub fn darken(self, percent: u8) -> Self {
        self.shift(-i32::from(percent))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid hex color: {}", s));
        }
        let value = u32::from_str_radix(hex, 16).map_err(|e| e.to_string())?;
        Ok(Self {
            r: (value >> 16) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        })
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
