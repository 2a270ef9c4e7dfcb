use std::collections::HashMap;

use crate::templates::TemplateLibrary;

/// Floor added to the standard deviation so near-flat segments normalize
/// without dividing by zero.
pub const NORMALIZE_EPSILON: f64 = 1e-6;

/// Z-score a segment: `(x - mean) / (std + epsilon)`, f64 accumulation.
pub fn normalize_segment(segment: &[f32]) -> Vec<f32> {
    if segment.is_empty() {
        return Vec::new();
    }
    let n = segment.len() as f64;
    let mean = segment.iter().map(|&x| x as f64).sum::<f64>() / n;
    let var = segment
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let denom = var.sqrt() + NORMALIZE_EPSILON;
    segment
        .iter()
        .map(|&x| ((x as f64 - mean) / denom) as f32)
        .collect()
}

/// Cosine distance `1 - cos(a, b)`; smaller = more similar. A zero-norm
/// operand scores 1.0 (no directional evidence either way).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += x as f64 * y as f64;
        norm_a += x as f64 * x as f64;
        norm_b += y as f64 * y as f64;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::MIN_POSITIVE {
        return 1.0;
    }
    (1.0 - dot / denom) as f32
}

/// Score one segment against every symbol bucket: normalize, then keep the
/// minimum cosine distance per symbol over all templates of identical
/// length. Length-incompatible templates are silently skipped; a symbol
/// with no compatible template yields no entry at all, so consumers must
/// tolerate missing keys.
pub fn score_segment(segment: &[f32], library: &TemplateLibrary) -> HashMap<String, f32> {
    let normalized = normalize_segment(segment);
    let mut scores = HashMap::new();
    for (symbol, templates) in library.iter() {
        let mut best = f32::INFINITY;
        for template in templates {
            if template.len() != normalized.len() {
                continue;
            }
            let d = cosine_distance(&normalized, template);
            if d < best {
                best = d;
            }
        }
        if best.is_finite() {
            scores.insert(symbol.clone(), best);
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;
    use std::f64::consts::PI;

    fn sine(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * 2.0 * i as f64 / len as f64).sin() as f32)
            .collect()
    }

    fn library(buckets: Vec<(&str, Vec<Vec<f32>>)>) -> TemplateLibrary {
        let map: Map<String, Vec<Vec<f32>>> = buckets
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        TemplateLibrary::from_buckets(map)
    }

    #[test]
    fn normalization_centers_and_scales() {
        let normalized = normalize_segment(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mean: f64 = normalized.iter().map(|&x| x as f64).sum::<f64>() / 5.0;
        assert!(mean.abs() < 1e-6);
        let var: f64 = normalized.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>() / 5.0;
        assert!((var - 1.0).abs() < 1e-3);
    }

    #[test]
    fn scoring_is_invariant_to_affine_transform() {
        let segment = sine(180);
        let shifted: Vec<f32> = segment.iter().map(|&x| 2.0 * x + 5.0).collect();
        let lib = library(vec![
            ("N", vec![normalize_segment(&sine(180))]),
            ("V", vec![sine(180).iter().map(|&x| -x).collect()]),
        ]);
        let a = score_segment(&segment, &lib);
        let b = score_segment(&shifted, &lib);
        for (symbol, &score) in &a {
            let other = b[symbol];
            assert!(
                (score - other).abs() < 1e-4,
                "symbol {symbol}: {score} vs {other}"
            );
        }
    }

    #[test]
    fn identical_template_scores_near_zero() {
        let segment = sine(180);
        let lib = library(vec![("N", vec![normalize_segment(&segment)])]);
        let scores = score_segment(&segment, &lib);
        assert!(scores["N"] < 1e-4);
    }

    #[test]
    fn best_replicate_wins_per_symbol() {
        let segment = sine(180);
        let inverted: Vec<f32> = segment.iter().map(|&x| -x).collect();
        let lib = library(vec![(
            "N",
            vec![inverted, normalize_segment(&segment)],
        )]);
        let scores = score_segment(&segment, &lib);
        assert!(scores["N"] < 1e-4);
    }

    #[test]
    fn incompatible_lengths_yield_no_entry() {
        let segment = sine(180);
        let lib = library(vec![
            ("N", vec![normalize_segment(&segment)]),
            ("V", vec![vec![0.5; 64]]),
        ]);
        let scores = score_segment(&segment, &lib);
        assert!(scores.contains_key("N"));
        assert!(!scores.contains_key("V"));
    }

    #[test]
    fn opposite_signals_score_near_two() {
        let segment = sine(180);
        let inverted: Vec<f32> = normalize_segment(&segment).iter().map(|&x| -x).collect();
        let lib = library(vec![("V", vec![inverted])]);
        let scores = score_segment(&segment, &lib);
        assert!((scores["V"] - 2.0).abs() < 1e-3);
    }
}
