use std::fmt;

use super::state::UiState;
use crate::analysis::summarize;

/// Renders the page as plain text. Output depends only on `state`.
pub fn render(state: &UiState) -> String {
    Page(state).to_string()
}

/// Text view of a session, usable anywhere a `Display` is.
pub struct Page<'a>(pub &'a UiState);

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(f, "ระบบตรวจจับสิวด้วย AI")?;
        writeln!(f)?;

        match &state.selected {
            Some(image) => writeln!(f, "รูปภาพ: {} ({})", image.file_name, image.content_type)?,
            None => writeln!(f, "รูปภาพ: -")?,
        }
        writeln!(
            f,
            "ความมั่นใจขั้นต่ำ: {:.0}%",
            state.confidence_threshold * 100.0
        )?;
        if let Some(error) = &state.error {
            writeln!(f, "! {error}")?;
        }

        writeln!(f)?;
        writeln!(f, "ผลการตรวจจับ")?;
        if state.is_detecting && state.detection_result.is_none() {
            writeln!(f, "กำลังตรวจจับ...")?;
        } else if let Some(result) = &state.detection_result {
            let severity = state
                .analysis_result
                .as_ref()
                .map(|analysis| analysis.detection_summary.severity.thai_label())
                .unwrap_or("-");
            writeln!(f, "จำนวนสิว: {}", result.detections_count)?;
            writeln!(f, "ความรุนแรง: {severity}")?;
            writeln!(
                f,
                "โมเดล: {} {}",
                result.model_info.name, result.model_info.version
            )?;
            if !result.detections.is_empty() {
                writeln!(f, "รายละเอียดการตรวจจับ:")?;
                for row in summarize(&result.detections) {
                    writeln!(f, "  #{} {} {}", row.id, row.kind, row.confidence)?;
                    writeln!(f, "     ตำแหน่ง: {}", row.location)?;
                }
            }
        } else {
            writeln!(f, "อัพโหลดและตรวจจับรูปภาพเพื่อดูผลลัพธ์")?;
        }

        if state.is_analyzing || state.analysis_result.is_some() {
            writeln!(f)?;
            writeln!(f, "การวิเคราะห์จาก AI")?;
            if state.is_analyzing {
                writeln!(f, "กำลังวิเคราะห์...")?;
            } else if let Some(analysis) = &state.analysis_result {
                writeln!(f, "{}", analysis.analysis)?;
            }
        }
        Ok(())
    }
}
