//! Vision model prompts for watermark extraction

use skymark_domain::VisionRequest;

/// Builds the single-turn request sent to the vision model
pub struct PromptBuilder {
    image_data_url: String,
}

impl PromptBuilder {
    /// Create a new prompt builder for an image already encoded as a data URL
    pub fn new(image_data_url: String) -> Self {
        Self { image_data_url }
    }

    /// Build the request: fixed instructions plus the embedded image
    pub fn build(self) -> VisionRequest {
        VisionRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            user_instruction: USER_INSTRUCTION.to_string(),
            image_data_url: self.image_data_url,
        }
    }
}

/// Role instruction: extract time and place, answer with strict JSON only
pub const SYSTEM_INSTRUCTION: &str = "你是一名结构化信息抽取助手，负责从气象监测照片中的水印或字幕里提取时间与地点。务必只输出严格符合要求的 JSON。";

/// Task instruction sent alongside the image
pub const USER_INSTRUCTION: &str = r#"请阅读这张气象监测照片右上或右下角的文字水印，提取拍摄时间和测站地点。如果无法确定某个字段，请填空字符串并将 confidence 设置为 0。
返回 JSON，字段说明：
{
  "time": "24小时制时间戳，格式为 YYYY-MM-DD HH:MM[:SS]，若无法确定则为空字符串",
  "location": "地点中文名称，包含省市县或测站名称，无法确定则为空字符串",
  "confidence": 小数，0-1 之间，表示整体提取置信度,
  "notes": "可选，说明判断依据，若无可留空"
}
仅返回 JSON，不要添加其它文字。"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_image() {
        let request = PromptBuilder::new("data:image/jpeg;base64,AAAA".to_string()).build();
        assert_eq!(request.image_data_url, "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_instructions_describe_json_fields() {
        let request = PromptBuilder::new(String::new()).build();
        assert!(request.system_instruction.contains("JSON"));
        for field in ["\"time\"", "\"location\"", "\"confidence\"", "\"notes\""] {
            assert!(request.user_instruction.contains(field), "missing {}", field);
        }
    }
}
