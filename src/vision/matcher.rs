//! Normalized cross-correlation search of a frame for a named template.

use super::error::{VisionError, VisionResult};
use super::library::{Template, TemplateLibrary};
use super::types::Match;
use crate::capture::Frame;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use imageproc::template_matching::{match_template, MatchTemplateMethod};

fn validate_threshold(threshold: f32) -> VisionResult<()> {
    // No silent clamping: an out-of-range tolerance is a caller bug.
    if !(0.0..=1.0).contains(&threshold) {
        return Err(VisionError::ThresholdOutOfRange { threshold });
    }
    Ok(())
}

/// Compute the dense similarity surface for the template over the frame and
/// return the best top-left alignment with its score, or `None` when the
/// template cannot fit inside the frame.
fn best_alignment(frame: &Frame, template: &Template) -> Option<(u32, u32, f32)> {
    let frame_gray = frame.to_gray();
    if template.width > frame_gray.width() || template.height > frame_gray.height() {
        log::debug!(
            "Template '{}' ({}x{}) larger than frame ({}x{}); treating as no match",
            template.name,
            template.width,
            template.height,
            frame_gray.width(),
            frame_gray.height()
        );
        return None;
    }

    let surface = match_template(
        &frame_gray,
        &template.gray,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );

    let mut best: Option<(u32, u32, f32)> = None;
    for (x, y, pixel) in surface.enumerate_pixels() {
        let score = pixel[0];
        // Zero-variance regions produce NaN scores; they can never qualify.
        if !score.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, _, s)| score > s) {
            best = Some((x, y, score));
        }
    }
    best
}

fn to_center(template: &Template, top_left_x: u32, top_left_y: u32, score: f32) -> Match {
    Match {
        x: top_left_x + template.width / 2,
        y: top_left_y + template.height / 2,
        score: score.clamp(0.0, 1.0),
    }
}

/// Find the single best placement of the named template in the frame.
///
/// Returns `Ok(None)` when the best score falls below the threshold - the
/// expected "not present" outcome, not an error. An unknown name or an
/// out-of-range threshold fails loudly instead.
pub fn best_match(
    library: &TemplateLibrary,
    frame: &Frame,
    name: &str,
    threshold: f32,
) -> VisionResult<Option<Match>> {
    validate_threshold(threshold)?;
    let template = library.get(name).ok_or_else(|| VisionError::UnknownTemplate {
        name: name.to_string(),
    })?;

    match best_alignment(frame, template) {
        Some((x, y, score)) if score >= threshold => {
            let m = to_center(template, x, y, score);
            log::debug!(
                "Template '{}' found at ({}, {}) score {:.3}",
                name,
                m.x,
                m.y,
                m.score
            );
            Ok(Some(m))
        }
        Some((_, _, score)) => {
            log::debug!(
                "Template '{}' best score {:.3} below threshold {:.3}",
                name,
                score,
                threshold
            );
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Find every alignment whose score reaches the threshold, as center points
/// ordered by descending score. Used for multi-instance detection.
pub fn all_matches(
    library: &TemplateLibrary,
    frame: &Frame,
    name: &str,
    threshold: f32,
) -> VisionResult<Vec<Match>> {
    validate_threshold(threshold)?;
    let template = library.get(name).ok_or_else(|| VisionError::UnknownTemplate {
        name: name.to_string(),
    })?;

    let frame_gray = frame.to_gray();
    if template.width > frame_gray.width() || template.height > frame_gray.height() {
        return Ok(Vec::new());
    }

    let surface = match_template(
        &frame_gray,
        &template.gray,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );

    let mut matches: Vec<Match> = surface
        .enumerate_pixels()
        .filter(|(_, _, pixel)| pixel[0].is_finite() && pixel[0] >= threshold)
        .map(|(x, y, pixel)| to_center(template, x, y, pixel[0]))
        .collect();
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    log::debug!("Found {} placement(s) of '{}'", matches.len(), name);
    Ok(matches)
}

/// Draw the matched rectangle and center point onto a copy of the frame,
/// for debug output.
pub fn annotate_match(frame: &Frame, template: &Template, m: &Match) -> RgbImage {
    let mut annotated = frame.image().clone();
    let left = m.x.saturating_sub(template.width / 2) as i32;
    let top = m.y.saturating_sub(template.height / 2) as i32;
    draw_hollow_rect_mut(
        &mut annotated,
        Rect::at(left, top).of_size(template.width.max(1), template.height.max(1)),
        Rgb([0, 255, 0]),
    );
    draw_filled_circle_mut(&mut annotated, (m.x as i32, m.y as i32), 3, Rgb([255, 0, 0]));
    annotated
}
