// ==========================================
// 车间工单排产系统 - 物料节拍与工时估算引擎
// ==========================================
// 职责: 从物料名称识别类别/规格, 查节拍表, 结合机台 OEE 估算生产时长
// 说明: 估算仅供参考, 不参与排程不变式
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::machine::Machine;

/// 机台缺失或未配置 OEE 时的默认值
pub const DEFAULT_OEE: f64 = 0.85;

/// 估算天数按每工作日 16 小时折算
const WORKDAY_HOURS: f64 = 16.0;

/// 节拍表完全未命中时的兜底节拍 (秒)
const FALLBACK_TAKT_SECONDS: u32 = 25;

// ==========================================
// MaterialCategory - 物料类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialCategory {
    #[serde(rename = "内外板")]
    Plate, // 内外板 (粗加工链板)
    #[serde(rename = "套筒")]
    Sleeve, // 套筒
    #[serde(rename = "滚子")]
    Roller, // 滚子
    #[serde(rename = "销轴")]
    Pin, // 销轴
    #[serde(rename = "其他")]
    Other, // 其他
}

// ==========================================
// ProductionEstimate - 工时估算结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionEstimate {
    pub category: MaterialCategory, // 识别出的物料类别
    pub takt_seconds: u32,          // 单件节拍 (秒)
    pub oee: f64,                   // 采用的 OEE (0-1)
    pub theoretical_seconds: i64,   // 理论生产时间 (秒)
    pub actual_seconds: i64,        // 考虑 OEE 的实际生产时间 (秒)
    pub estimated_hours: f64,       // 估算小时数
    pub estimated_days: f64,        // 估算天数 (按16小时工作日)
}

// ==========================================
// TaktEngine - 节拍估算引擎
// ==========================================
pub struct TaktEngine {
    // 无状态引擎, 节拍表为编译期常量
}

impl TaktEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 物料识别
    // ==========================================

    /// 从物料名称识别类别
    pub fn identify_category(&self, material_name: &str) -> MaterialCategory {
        if material_name.contains("粗加工") && material_name.contains("链板") {
            return MaterialCategory::Plate;
        }
        if material_name.contains("金加工") {
            if material_name.contains("套筒") {
                return MaterialCategory::Sleeve;
            }
            if material_name.contains("滚子") {
                return MaterialCategory::Roller;
            }
            if material_name.contains("销轴") {
                return MaterialCategory::Pin;
            }
        }
        MaterialCategory::Other
    }

    /// 查询单件节拍 (秒)
    ///
    /// 内外板按 "宽x厚" 中的厚度与孔型 (圆/扁) 查表;
    /// 套筒/滚子/销轴按 "金加工 012滚子" 样式的型号映射尺寸档;
    /// 未命中一律回落到兜底节拍
    pub fn takt_for(&self, material_name: &str) -> u32 {
        match self.identify_category(material_name) {
            MaterialCategory::Plate => {
                let flat = material_name.contains('扁');
                match extract_thickness_mm(material_name) {
                    Some(6) | Some(8) => if flat { 14 } else { 16 },
                    Some(10) => if flat { 17 } else { 19 },
                    Some(12) => if flat { 20 } else { 22 },
                    Some(14) => if flat { 24 } else { 26 },
                    Some(16) => if flat { 28 } else { 30 },
                    _ => 30,
                }
            }
            MaterialCategory::Sleeve => match extract_model_no(material_name) {
                Some(m) if m <= 30 => 85,
                Some(m) if m <= 40 => 90,
                Some(m) if m <= 50 => 100,
                Some(m) if m <= 58 => 115,
                _ => FALLBACK_TAKT_SECONDS,
            },
            MaterialCategory::Roller => match extract_model_no(material_name) {
                Some(m) if m <= 20 => 68,
                Some(m) if m <= 30 => 82,
                Some(m) if m <= 40 => 95,
                Some(m) if m <= 50 => 105,
                Some(m) if m <= 58 => 113,
                _ => FALLBACK_TAKT_SECONDS,
            },
            MaterialCategory::Pin => match extract_model_no(material_name) {
                Some(m) if m <= 20 => 22,
                Some(m) if m <= 30 => 24,
                Some(m) if m <= 40 => 26,
                Some(m) if m <= 50 => 28,
                Some(m) if m <= 58 => 34,
                _ => FALLBACK_TAKT_SECONDS,
            },
            MaterialCategory::Other => FALLBACK_TAKT_SECONDS,
        }
    }

    // ==========================================
    // 工时估算
    // ==========================================

    /// 估算工单生产时长
    ///
    /// OEE 取自机台配置; 配置为百分比形式 (>1) 时折算为小数,
    /// 机台缺失或 OEE 非法时取默认值
    pub fn estimate(
        &self,
        material_name: &str,
        quantity: i64,
        machine: Option<&Machine>,
    ) -> ProductionEstimate {
        let category = self.identify_category(material_name);
        let takt_seconds = self.takt_for(material_name);
        let oee = normalize_oee(machine.map(|m| m.oee));

        let theoretical = takt_seconds as f64 * quantity.max(0) as f64;
        let actual = theoretical / oee;
        let hours = actual / 3600.0;

        ProductionEstimate {
            category,
            takt_seconds,
            oee,
            theoretical_seconds: theoretical.round() as i64,
            actual_seconds: actual.round() as i64,
            estimated_hours: hours,
            estimated_days: hours / WORKDAY_HOURS,
        }
    }
}

impl Default for TaktEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// OEE 归一化: 百分比形式折算为小数, 非法值回落默认
fn normalize_oee(raw: Option<f64>) -> f64 {
    match raw {
        Some(v) if v.is_finite() && v > 0.0 => {
            if v > 1.0 {
                v / 100.0
            } else {
                v
            }
        }
        _ => DEFAULT_OEE,
    }
}

/// 提取 "宽x厚" 样式中的厚度 (第二个数字)
fn extract_thickness_mm(material_name: &str) -> Option<u32> {
    let chars: Vec<char> = material_name.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let mut j = i;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == 'x' || chars[j] == 'X' || chars[j] == '×') {
                let mut k = j + 1;
                let mut thickness = String::new();
                while k < chars.len() && chars[k].is_ascii_digit() {
                    thickness.push(chars[k]);
                    k += 1;
                }
                if !thickness.is_empty() {
                    return thickness.parse().ok();
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }
    None
}

/// 提取 "金加工 012滚子" 样式中的型号数字
fn extract_model_no(material_name: &str) -> Option<u32> {
    let rest = material_name.split("金加工").nth(1)?;
    let digits: String = rest
        .chars()
        .skip_while(|c| c.is_whitespace())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
