use crate::provider::Prompt;
use crate::types::{DetectionSummaryItem, ImageSize};

/// Detection section used when nothing was found.
pub const NO_ACNE_PLACEHOLDER: &str = "ไม่พบสิวในภาพ";

const SYSTEM_PROMPT: &str = "คุณคือผู้เชี่ยวชาญด้านผิวหนังและการดูแลผิวพรรณ มีความรู้เชิงลึกเกี่ยวกับสิว ปัญหาผิว และการรักษา

คุณจะได้รับข้อมูลการตรวจจับสิวจากระบบ AI และต้องวิเคราะห์ให้คำแนะนำที่เป็นมืออาชีพ เป็นกันเอง และมีประโยชน์

**หน้าที่ของคุณ:**
1. วิเคราะห์จำนวนและตำแหน่งของสิวที่ตรวจพบ
2. ประเมินระดับความรุนแรง (เล็กน้อย, ปานกลาง, มาก)
3. ให้คำแนะนำในการดูแลผิว
4. แนะนำผลิตภัณฑ์หรือวิธีการรักษาที่เหมาะสม
5. ข้อควรระวังและคำแนะนำเพิ่มเติม

**รูปแบบคำตอบ:**
- ใช้ภาษาที่เข้าใจง่าย เป็นมิตร
- แบ่งเป็นหัวข้อชัดเจน
- ให้ข้อมูลที่เป็นประโยชน์และปฏิบัติได้จริง
- หากไม่พบสิว ให้ชมเชยและให้คำแนะนำในการรักษาผิวให้สวยต่อไป";

/// One line per row, or the placeholder when there are none.
pub fn detection_section(rows: &[DetectionSummaryItem]) -> String {
    if rows.is_empty() {
        return NO_ACNE_PLACEHOLDER.to_string();
    }
    rows.iter()
        .map(|row| {
            format!(
                "{}. {} - ความมั่นใจ: {}, ตำแหน่ง: {}, ขนาด: {}",
                row.id, row.kind, row.confidence, row.location, row.size
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(
    image_size: ImageSize,
    detections_count: usize,
    rows: &[DetectionSummaryItem],
) -> Prompt {
    let user = format!(
        "กรุณาวิเคราะห์ผลการตรวจจับสิวต่อไปนี้:

**ข้อมูลภาพ:**
- ขนาดภาพ: {}x{} พิกเซล
- จำนวนสิวที่ตรวจพบ: {} จุด

**รายละเอียดการตรวจจับ:**
{}

กรุณาวิเคราะห์และให้คำแนะนำที่ครบถ้วน",
        image_size.width,
        image_size.height,
        detections_count,
        detection_section(rows)
    );

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}
