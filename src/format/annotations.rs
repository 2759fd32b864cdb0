//! Per-image annotation text files.
//!
//! One box per line: `class_id cx cy w h`, coordinates normalized and written
//! with six decimals. A sixth confidence column is accepted on read but never
//! written, since confidence only matters while filtering fresh detections.

use std::path::Path;

use crate::annotation::BoundingBox;
use crate::format::error::FormatError;

/// Parse a single annotation line. Returns `None` for malformed lines.
pub fn parse_line(line: &str) -> Option<BoundingBox> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }

    let class_id: u32 = parts[0].parse().ok()?;
    let cx: f32 = parts[1].parse().ok()?;
    let cy: f32 = parts[2].parse().ok()?;
    let w: f32 = parts[3].parse().ok()?;
    let h: f32 = parts[4].parse().ok()?;

    let mut bbox = BoundingBox::new(class_id, cx, cy, w, h);
    if let Some(confidence) = parts.get(5).and_then(|c| c.parse::<f32>().ok()) {
        bbox = bbox.with_confidence(confidence);
    }
    Some(bbox)
}

/// Parse a whole file's content, skipping blank and malformed lines.
pub fn parse(content: &str) -> Vec<BoundingBox> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                log::warn!("Skipping malformed annotation line {}: {:?}", i + 1, line);
            }
            parsed
        })
        .collect()
}

pub fn format_line(bbox: &BoundingBox) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        bbox.class_id, bbox.rect.center_x, bbox.rect.center_y, bbox.rect.width, bbox.rect.height
    )
}

/// Serialize boxes in storage order, one line each.
pub fn format(boxes: &[BoundingBox]) -> String {
    boxes.iter().map(|b| format_line(b) + "\n").collect()
}

/// Load boxes from `path`. A missing file yields no boxes.
pub fn load(path: &Path) -> Result<Vec<BoundingBox>, FormatError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    let boxes = parse(&content);
    log::debug!("Loaded {} boxes from {:?}", boxes.len(), path);
    Ok(boxes)
}

/// Write boxes to `path`, replacing any previous content.
pub fn save(path: &Path, boxes: &[BoundingBox]) -> Result<(), FormatError> {
    std::fs::write(path, format(boxes))?;
    log::info!("Saved {} annotations to {:?}", boxes.len(), path);
    Ok(())
}
