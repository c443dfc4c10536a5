//! PNG chart rendering. Pure side-effecting sinks: each function writes one
//! file under the caller's output directory or fails.

use crate::cluster::Merge;
use crate::stats::{quantile, Interpolation};
use anyhow::Result;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use time::Date;

const BAR: RGBColor = RGBColor(66, 133, 244);

/// Horizontal bar chart of (term, frequency), most frequent on top.
pub fn plot_top_terms(path: &Path, terms: &[(String, u64)]) -> Result<()> {
    let n = terms.len().max(1);
    let height = (n as u32 * 24 + 140).clamp(240, 4000);
    let root = BitMapBackend::new(path, (960, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let max = terms.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption("Frequent terms", ("sans-serif", 26))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(10)
        .build_cartesian_2d(0f64..max * 1.08, 0f64..n as f64)?;
    chart.configure_mesh().disable_y_mesh().disable_y_axis().x_desc("frequency").draw()?;

    chart.draw_series(terms.iter().enumerate().map(|(i, (_, count))| {
        let top = n as f64 - i as f64;
        Rectangle::new([(0.0, top - 0.85), (*count as f64, top - 0.15)], BAR.mix(0.7).filled())
    }))?;
    // term names drawn inside the plot, next to each bar
    chart.draw_series(terms.iter().enumerate().map(|(i, (term, count))| {
        let top = n as f64 - i as f64;
        Text::new(
            format!("{} ({})", term, count),
            (max * 0.01, top - 0.3),
            ("sans-serif", 14).into_font().color(&BLACK),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Right-oriented dendrogram: x is merge distance, leaves stacked on y.
/// Leaf labels are drawn when the tree is small enough to keep them legible.
pub fn plot_dendrogram(path: &Path, merges: &[Merge], labels: &[String]) -> Result<()> {
    let n_leaves = merges.len() + 1;
    let height = (n_leaves as u32 * 18 + 160).clamp(300, 8000);
    let root = BitMapBackend::new(path, (1100, height)).into_drawing_area();
    root.fill(&WHITE)?;

    // leaf ordering by tree traversal so branches never cross
    let n_nodes = n_leaves + merges.len();
    let mut children: Vec<Option<(usize, usize)>> = vec![None; n_nodes];
    for (t, m) in merges.iter().enumerate() {
        children[n_leaves + t] = Some((m.a, m.b));
    }
    let mut order = Vec::with_capacity(n_leaves);
    let mut stack = vec![n_nodes - 1];
    while let Some(node) = stack.pop() {
        match children[node] {
            Some((a, b)) => {
                stack.push(b);
                stack.push(a);
            }
            None => order.push(node),
        }
    }

    let mut y_pos = vec![0.0f64; n_nodes];
    for (slot, &leaf) in order.iter().enumerate() {
        y_pos[leaf] = slot as f64 + 0.5;
    }
    let mut height_of = vec![0.0f64; n_nodes];
    for (t, m) in merges.iter().enumerate() {
        y_pos[n_leaves + t] = (y_pos[m.a] + y_pos[m.b]) / 2.0;
        height_of[n_leaves + t] = m.distance;
    }

    let max_dist = merges.iter().map(|m| m.distance).fold(1e-9, f64::max);
    let mut chart = ChartBuilder::on(&root)
        .caption("Hierarchical Clustering Dendrogram", ("sans-serif", 26))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(10)
        .build_cartesian_2d(-max_dist * 0.35..max_dist * 1.05, 0f64..n_leaves as f64)?;
    chart.configure_mesh().disable_y_mesh().disable_y_axis().x_desc("distance").draw()?;

    for m in merges {
        let h = m.distance;
        let (ya, yb) = (y_pos[m.a], y_pos[m.b]);
        let (ha, hb) = (height_of[m.a], height_of[m.b]);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(ha, ya), (h, ya), (h, yb), (hb, yb)],
            BLUE.stroke_width(1),
        )))?;
    }

    if n_leaves <= 80 {
        chart.draw_series(order.iter().enumerate().map(|(slot, &leaf)| {
            let label = labels.get(leaf).cloned().unwrap_or_default();
            let short: String = label.chars().take(28).collect();
            Text::new(short, (-max_dist * 0.34, slot as f64 + 0.3), ("sans-serif", 11).into_font())
        }))?;
    }

    root.present()?;
    Ok(())
}

/// Line chart of documents per year.
pub fn plot_yearly_counts(path: &Path, title: &str, counts: &BTreeMap<i32, u64>) -> Result<()> {
    let root = BitMapBackend::new(path, (960, 540)).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi) = match (counts.keys().next(), counts.keys().last()) {
        (Some(&lo), Some(&hi)) => (lo, hi.max(lo + 1)),
        _ => (0, 1),
    };
    let max = counts.values().max().copied().unwrap_or(1);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(56)
        .build_cartesian_2d(lo..hi, 0u64..max + max / 5 + 1)?;
    chart.configure_mesh().x_desc("year").y_desc("documents").draw()?;

    chart.draw_series(LineSeries::new(counts.iter().map(|(&y, &c)| (y, c)), &BAR))?;
    chart.draw_series(counts.iter().map(|(&y, &c)| Circle::new((y, c), 3, BAR.filled())))?;

    root.present()?;
    Ok(())
}

/// Line chart of documents per calendar day.
pub fn plot_daily_trend(path: &Path, title: &str, counts: &BTreeMap<Date, u64>) -> Result<()> {
    let root = BitMapBackend::new(path, (960, 540)).into_drawing_area();
    root.fill(&WHITE)?;

    let days: Vec<&Date> = counts.keys().collect();
    let n = days.len().max(1) as i32;
    let max = counts.values().max().copied().unwrap_or(1);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(56)
        .build_cartesian_2d(0i32..n, 0u64..max + max / 5 + 1)?;
    chart
        .configure_mesh()
        .x_desc("day")
        .y_desc("documents")
        .x_label_formatter(&|i| {
            days.get(*i as usize).map(|d| d.to_string()).unwrap_or_default()
        })
        .draw()?;

    chart.draw_series(LineSeries::new(
        counts.values().enumerate().map(|(i, &c)| (i as i32, c)),
        &BAR,
    ))?;

    root.present()?;
    Ok(())
}

struct BoxFigures {
    q1: f64,
    median: f64,
    q3: f64,
    lo: f64,
    hi: f64,
}

fn box_figures(values: &[f64]) -> Option<BoxFigures> {
    let q1 = quantile(values, 0.25, Interpolation::Linear)?;
    let median = quantile(values, 0.50, Interpolation::Linear)?;
    let q3 = quantile(values, 0.75, Interpolation::Linear)?;
    let iqr = q3 - q1;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some(BoxFigures {
        q1,
        median,
        q3,
        lo: (q1 - 1.5 * iqr).max(min),
        hi: (q3 + 1.5 * iqr).min(max),
    })
}

fn value_bounds(groups: &[(String, Vec<f64>)]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (_, vs) in groups {
        for &v in vs {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 1.0, hi + 1.0)
    } else {
        let pad = (hi - lo) * 0.08;
        (lo - pad, hi + pad)
    }
}

/// Side-by-side box plots, one per labelled group.
pub fn plot_box_groups(path: &Path, title: &str, groups: &[(String, Vec<f64>)]) -> Result<()> {
    let root = BitMapBackend::new(path, (320 * groups.len().max(1) as u32 + 160, 560)).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi) = value_bounds(groups);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..groups.len() as f64, lo..hi)?;
    chart.configure_mesh().disable_x_mesh().disable_x_axis().y_desc("cites").draw()?;

    for (i, (label, values)) in groups.iter().enumerate() {
        let center = i as f64 + 0.5;
        chart.draw_series(std::iter::once(Text::new(
            label.clone(),
            (center - 0.22, lo + (hi - lo) * 0.02),
            ("sans-serif", 15).into_font(),
        )))?;
        let Some(fig) = box_figures(values) else { continue };
        let half = 0.22;
        // box, median line, whiskers and caps
        chart.draw_series(std::iter::once(Rectangle::new(
            [(center - half, fig.q1), (center + half, fig.q3)],
            BAR.mix(0.35).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(center - half, fig.q1), (center + half, fig.q3)],
            BAR.stroke_width(1),
        )))?;
        let segments = vec![
            vec![(center - half, fig.median), (center + half, fig.median)],
            vec![(center, fig.q3), (center, fig.hi)],
            vec![(center, fig.q1), (center, fig.lo)],
            vec![(center - half / 2.0, fig.hi), (center + half / 2.0, fig.hi)],
            vec![(center - half / 2.0, fig.lo), (center + half / 2.0, fig.lo)],
        ];
        for seg in segments {
            chart.draw_series(std::iter::once(PathElement::new(seg, BLACK.stroke_width(1))))?;
        }
    }

    root.present()?;
    Ok(())
}

/// Gaussian kernel density over `points` evaluation positions.
fn kde(values: &[f64], positions: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n.max(2.0);
    let bandwidth = (1.06 * var.sqrt() * n.powf(-0.2)).max(1e-6);
    positions
        .iter()
        .map(|&x| {
            values
                .iter()
                .map(|&v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt())
        })
        .collect()
}

/// Side-by-side violin plots (mirrored KDE silhouettes), one per group.
pub fn plot_violin_groups(path: &Path, title: &str, groups: &[(String, Vec<f64>)]) -> Result<()> {
    let root = BitMapBackend::new(path, (320 * groups.len().max(1) as u32 + 160, 560)).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi) = value_bounds(groups);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..groups.len() as f64, lo..hi)?;
    chart.configure_mesh().disable_x_mesh().disable_x_axis().y_desc("cites").draw()?;

    let steps = 80usize;
    for (i, (label, values)) in groups.iter().enumerate() {
        let center = i as f64 + 0.5;
        chart.draw_series(std::iter::once(Text::new(
            label.clone(),
            (center - 0.22, lo + (hi - lo) * 0.02),
            ("sans-serif", 15).into_font(),
        )))?;
        if values.is_empty() {
            continue;
        }
        let positions: Vec<f64> = (0..=steps)
            .map(|s| lo + (hi - lo) * s as f64 / steps as f64)
            .collect();
        let density = kde(values, &positions);
        let peak = density.iter().cloned().fold(1e-12, f64::max);

        let mut outline: Vec<(f64, f64)> = positions
            .iter()
            .zip(density.iter())
            .map(|(&y, &d)| (center + d / peak * 0.35, y))
            .collect();
        let left: Vec<(f64, f64)> = positions
            .iter()
            .zip(density.iter())
            .rev()
            .map(|(&y, &d)| (center - d / peak * 0.35, y))
            .collect();
        outline.extend(left);
        chart.draw_series(std::iter::once(Polygon::new(outline, BAR.mix(0.45).filled())))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_figures_whiskers_stay_inside_data() {
        let fig = box_figures(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert!(fig.q1 <= fig.median && fig.median <= fig.q3);
        assert!(fig.lo >= 1.0);
        assert!(fig.hi <= 100.0);
    }

    #[test]
    fn kde_integrates_to_roughly_one() {
        let values = [0.0, 0.5, 1.0, 1.5, 2.0];
        let positions: Vec<f64> = (0..400).map(|i| -5.0 + i as f64 * 0.03).collect();
        let density = kde(&values, &positions);
        let integral: f64 = density.iter().sum::<f64>() * 0.03;
        assert!((integral - 1.0).abs() < 0.05);
    }
}
