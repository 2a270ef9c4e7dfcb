use serde::Serialize;

use crate::analysis::classes::{
    BRADY_RATE_LIMIT, PACED_FRACTION_THRESHOLD, PVC_FRACTION_THRESHOLD,
    RATE_FRACTION_THRESHOLD, SYM_LBBB, SYM_PACED, SYM_PVC, SYM_RBBB, SYM_VF_OFFSET,
    SYM_VF_ONSET, TACHY_RATE_LIMIT,
};

/// Rule-based flags derived once from the final statistics pass. Flags
/// whose class symbol is absent from the canonical class set, and the
/// rate flags when no secondary channel was supplied, stay `None` and are
/// omitted from serialized output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnosis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequent_pvcs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pvc_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lbbb: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbbb: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paced_rhythm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paced_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sinus_tachy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sinus_brady: Option<bool>,
    /// Always reported; unconditionally false when the VF bracket symbols
    /// are absent from the canonical class set.
    pub vf_detected: bool,
}

/// Apply the fixed rule table over the predicted-class sequence and the
/// optional secondary (heart-rate) channel.
pub fn diagnose(
    predicted: &[usize],
    class_names: &[&str],
    secondary_channel: Option<&[f32]>,
) -> Diagnosis {
    let mut diagnosis = Diagnosis::default();

    if let Some(v_idx) = position(class_names, SYM_PVC) {
        let fraction = predicted_fraction(predicted, v_idx);
        diagnosis.frequent_pvcs = Some(fraction > PVC_FRACTION_THRESHOLD);
        diagnosis.pvc_percent = Some(fraction);
    }
    if let Some(l_idx) = position(class_names, SYM_LBBB) {
        diagnosis.lbbb = Some(predicted.iter().any(|&p| p == l_idx));
    }
    if let Some(r_idx) = position(class_names, SYM_RBBB) {
        diagnosis.rbbb = Some(predicted.iter().any(|&p| p == r_idx));
    }
    if let Some(p_idx) = position(class_names, SYM_PACED) {
        let fraction = predicted_fraction(predicted, p_idx);
        diagnosis.paced_rhythm = Some(fraction > PACED_FRACTION_THRESHOLD);
        diagnosis.paced_percent = Some(fraction);
    }

    if let Some(channel) = secondary_channel {
        diagnosis.sinus_tachy =
            Some(value_fraction(channel, |v| v > TACHY_RATE_LIMIT) > RATE_FRACTION_THRESHOLD);
        diagnosis.sinus_brady =
            Some(value_fraction(channel, |v| v < BRADY_RATE_LIMIT) > RATE_FRACTION_THRESHOLD);
    }

    diagnosis.vf_detected = match (
        position(class_names, SYM_VF_ONSET),
        position(class_names, SYM_VF_OFFSET),
    ) {
        (Some(onset), Some(offset)) => predicted.iter().any(|&p| p == onset || p == offset),
        _ => false,
    };

    diagnosis
}

fn position(class_names: &[&str], symbol: &str) -> Option<usize> {
    class_names.iter().position(|&c| c == symbol)
}

fn predicted_fraction(predicted: &[usize], class_index: usize) -> f64 {
    if predicted.is_empty() {
        return 0.0;
    }
    predicted.iter().filter(|&&p| p == class_index).count() as f64 / predicted.len() as f64
}

fn value_fraction(channel: &[f32], pred: impl Fn(f32) -> bool) -> f64 {
    if channel.is_empty() {
        return 0.0;
    }
    channel.iter().filter(|&&v| pred(v)).count() as f64 / channel.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classes::CANONICAL_CLASS_NAMES;

    fn predictions(fractions: &[(&str, usize)], total: usize, fill: &str) -> Vec<usize> {
        let fill_idx = CANONICAL_CLASS_NAMES.iter().position(|&c| c == fill).unwrap();
        let mut predicted = vec![fill_idx; total];
        let mut cursor = 0;
        for &(symbol, count) in fractions {
            let idx = CANONICAL_CLASS_NAMES
                .iter()
                .position(|&c| c == symbol)
                .unwrap();
            for slot in predicted.iter_mut().skip(cursor).take(count) {
                *slot = idx;
            }
            cursor += count;
        }
        predicted
    }

    #[test]
    fn fifteen_percent_pvcs_raise_the_flag() {
        let predicted = predictions(&[("V", 15)], 100, "N");
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, None);
        assert_eq!(d.frequent_pvcs, Some(true));
        let pct = d.pvc_percent.unwrap();
        assert!((pct - 0.15).abs() < 1e-12);
    }

    #[test]
    fn ten_percent_pvcs_do_not() {
        let predicted = predictions(&[("V", 10)], 100, "N");
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, None);
        assert_eq!(d.frequent_pvcs, Some(false));
    }

    #[test]
    fn any_bundle_branch_block_beat_flags() {
        let predicted = predictions(&[("L", 1)], 200, "N");
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, None);
        assert_eq!(d.lbbb, Some(true));
        assert_eq!(d.rbbb, Some(false));

        let predicted = predictions(&[("R", 1)], 200, "N");
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, None);
        assert_eq!(d.rbbb, Some(true));
    }

    #[test]
    fn paced_rhythm_needs_a_dominant_fraction() {
        let predicted = predictions(&[("/", 81)], 100, "N");
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, None);
        assert_eq!(d.paced_rhythm, Some(true));

        let predicted = predictions(&[("/", 80)], 100, "N");
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, None);
        assert_eq!(d.paced_rhythm, Some(false));
        assert!((d.paced_percent.unwrap() - 0.80).abs() < 1e-12);
    }

    #[test]
    fn vf_brackets_must_both_exist_in_the_class_set() {
        let predicted = predictions(&[("[", 5)], 100, "N");
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, None);
        assert!(d.vf_detected);

        // Same predictions against a class set without the brackets:
        // unconditionally false, whatever the indices point at.
        let reduced: Vec<&str> = CANONICAL_CLASS_NAMES
            .iter()
            .copied()
            .filter(|&c| c != "[" && c != "]")
            .collect();
        let d = diagnose(&predicted, &reduced, None);
        assert!(!d.vf_detected);
    }

    #[test]
    fn rate_flags_require_the_secondary_channel() {
        let predicted = predictions(&[], 10, "N");
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, None);
        assert_eq!(d.sinus_tachy, None);
        assert_eq!(d.sinus_brady, None);

        // 10% of samples above 100 bpm, none below 50.
        let mut rate = vec![70.0f32; 90];
        rate.extend(vec![120.0f32; 10]);
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, Some(&rate));
        assert_eq!(d.sinus_tachy, Some(true));
        assert_eq!(d.sinus_brady, Some(false));

        let mut rate = vec![70.0f32; 96];
        rate.extend(vec![40.0f32; 4]);
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, Some(&rate));
        assert_eq!(d.sinus_brady, Some(false));

        let mut rate = vec![70.0f32; 90];
        rate.extend(vec![40.0f32; 10]);
        let d = diagnose(&predicted, &CANONICAL_CLASS_NAMES, Some(&rate));
        assert_eq!(d.sinus_brady, Some(true));
    }

    #[test]
    fn missing_symbols_leave_flags_unset() {
        let class_names = ["N", "A"];
        let d = diagnose(&[0, 1, 0], &class_names, None);
        assert_eq!(d.frequent_pvcs, None);
        assert_eq!(d.pvc_percent, None);
        assert_eq!(d.lbbb, None);
        assert_eq!(d.paced_rhythm, None);
        assert!(!d.vf_detected);
    }

    #[test]
    fn empty_prediction_sequence_is_benign() {
        let d = diagnose(&[], &CANONICAL_CLASS_NAMES, None);
        assert_eq!(d.frequent_pvcs, Some(false));
        assert_eq!(d.pvc_percent, Some(0.0));
        assert!(!d.vf_detected);
    }
}
