//! Word-cloud rendering: frequency-scaled words placed on an outward spiral
//! with rectangle collision checks.

use ahash::AHashMap;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

const MAX_WORDS: usize = 50;
const PALETTE: [RGBColor; 6] = [
    RGBColor(66, 133, 244),
    RGBColor(219, 68, 55),
    RGBColor(244, 160, 0),
    RGBColor(15, 157, 88),
    RGBColor(98, 71, 170),
    RGBColor(0, 121, 107),
];

/// Whitespace-token frequencies over a set of texts, descending.
pub fn word_frequencies<'a, I: IntoIterator<Item = &'a str>>(texts: I) -> Vec<(String, u64)> {
    let mut counts: AHashMap<String, u64> = AHashMap::new();
    for text in texts {
        for tok in text.split_whitespace() {
            *counts.entry(tok.to_string()).or_insert(0) += 1;
        }
    }
    let mut freqs: Vec<(String, u64)> = counts.into_iter().collect();
    freqs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    freqs
}

#[derive(Clone, Debug)]
struct PlacedWord {
    text: String,
    x: i32,
    y: i32,
    size: i32,
    w: i32,
    h: i32,
}

fn overlaps(a: &PlacedWord, b: &PlacedWord) -> bool {
    a.x < b.x + b.w && b.x < a.x + a.w && a.y < b.y + b.h && b.y < a.y + a.h
}

/// Greedy spiral layout. Words that cannot be placed without overlap are
/// dropped; the estimate of a word's box uses the average glyph aspect of
/// the default sans face.
fn layout_cloud(freqs: &[(String, u64)], width: i32, height: i32) -> Vec<PlacedWord> {
    let top: Vec<&(String, u64)> = freqs.iter().take(MAX_WORDS).collect();
    let Some(&&(_, max_count)) = top.first() else { return Vec::new() };
    let min_count = top.last().map(|(_, c)| *c).unwrap_or(1).max(1);

    let (cx, cy) = (width / 2, height / 2);
    let mut placed: Vec<PlacedWord> = Vec::new();

    for (word, count) in top.iter() {
        let scale = if max_count == min_count {
            1.0
        } else {
            ((*count - min_count) as f64 / (max_count - min_count) as f64).sqrt()
        };
        let size = (16.0 + scale * 64.0) as i32;
        let w = (word.chars().count() as f64 * size as f64 * 0.58) as i32 + 4;
        let h = (size as f64 * 1.15) as i32;

        let mut t = 0.0f64;
        let mut slot = None;
        while t < 3000.0 {
            let r = 2.0 + 1.8 * t.sqrt() * 3.0;
            let angle = 0.4 * t;
            let x = cx + (r * angle.cos()) as i32 - w / 2;
            let y = cy + (r * angle.sin() * 0.7) as i32 - h / 2;
            let candidate = PlacedWord { text: word.to_string(), x, y, size, w, h };
            let inside = x >= 0 && y >= 0 && x + w <= width && y + h <= height;
            if inside && placed.iter().all(|p| !overlaps(p, &candidate)) {
                slot = Some(candidate);
                break;
            }
            t += 1.0;
        }
        if let Some(p) = slot {
            placed.push(p);
        }
    }
    placed
}

fn draw_cloud_on(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    freqs: &[(String, u64)],
    title: Option<&str>,
) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    area.fill(&WHITE)?;
    if let Some(title) = title {
        area.draw(&Text::new(title.to_string(), (12, 8), ("sans-serif", 20).into_font()))?;
    }
    let top_margin = if title.is_some() { 36 } else { 0 };
    let words = layout_cloud(freqs, w as i32, h as i32 - top_margin);
    for (i, word) in words.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        area.draw(&Text::new(
            word.text.clone(),
            (word.x, word.y + top_margin),
            ("sans-serif", word.size).into_font().color(&color),
        ))?;
    }
    Ok(())
}

/// Render a single word cloud PNG.
pub fn render_word_cloud(path: &Path, freqs: &[(String, u64)]) -> Result<()> {
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    draw_cloud_on(&root, freqs, None)?;
    root.present()?;
    Ok(())
}

/// Render the old-vs-new comparison cloud: two panels split at the median
/// date, titled with the boundary.
pub fn render_comparison_cloud(
    path: &Path,
    old_freqs: &[(String, u64)],
    new_freqs: &[(String, u64)],
    mid_date_label: &str,
) -> Result<()> {
    let root = BitMapBackend::new(path, (1600, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(800);
    draw_cloud_on(&left, old_freqs, Some(&format!("Old titles before {}", mid_date_label)))?;
    draw_cloud_on(&right, new_freqs, Some(&format!("New titles from {}", mid_date_label)))?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequencies_count_and_sort() {
        let freqs = word_frequencies(["dog cat", "dog dog"]);
        assert_eq!(freqs[0], ("dog".to_string(), 3));
        assert_eq!(freqs[1], ("cat".to_string(), 1));
    }

    #[test]
    fn layout_never_overlaps_and_stays_in_bounds() {
        let freqs: Vec<(String, u64)> = (0..30)
            .map(|i| (format!("word{}", i), (60 - i) as u64))
            .collect();
        let placed = layout_cloud(&freqs, 1200, 800);
        assert!(!placed.is_empty());
        for p in &placed {
            assert!(p.x >= 0 && p.y >= 0);
            assert!(p.x + p.w <= 1200 && p.y + p.h <= 800);
        }
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                assert!(!overlaps(&placed[i], &placed[j]), "{:?} vs {:?}", placed[i], placed[j]);
            }
        }
    }

    #[test]
    fn layout_of_empty_input_is_empty() {
        assert!(layout_cloud(&[], 800, 600).is_empty());
    }
}
