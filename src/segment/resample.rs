use num_complex::Complex;
use rustfft::FftPlanner;

/// Band-limited resampling to an exact output length via spectral
/// truncation / zero-padding. The shared Nyquist bin is folded when
/// shrinking and split when growing so real input stays real.
pub fn resample_fft(signal: &[f32], target_len: usize) -> Vec<f32> {
    let n = signal.len();
    let m = target_len;
    if m == 0 {
        return Vec::new();
    }
    if n == 0 {
        return vec![0.0; m];
    }
    if n == m {
        return signal.to_vec();
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut spectrum: Vec<Complex<f64>> = signal
        .iter()
        .map(|&x| Complex::new(x as f64, 0.0))
        .collect();
    fft.process(&mut spectrum);

    let mut resized = vec![Complex::new(0.0, 0.0); m];
    let k = n.min(m);
    // DC and strictly-positive frequencies below the shared Nyquist slot.
    let half = (k + 1) / 2;
    resized[..half].copy_from_slice(&spectrum[..half]);
    // Mirrored negative frequencies.
    for i in 1..=(k / 2) {
        resized[m - i] = spectrum[n - i];
    }
    if k % 2 == 0 {
        let nyq = k / 2;
        if m < n {
            // Fold the aliased positive bin into the slot the mirror loop
            // filled (resized[m - nyq] == resized[nyq] here).
            resized[nyq] += spectrum[nyq];
        } else {
            resized[m - nyq] = resized[m - nyq].scale(0.5);
            resized[nyq] = resized[m - nyq];
        }
    }

    let ifft = planner.plan_fft_inverse(m);
    ifft.process(&mut resized);

    // rustfft leaves both passes unnormalized; 1/n restores amplitude after
    // the m/n spectral rescale implied by the length change.
    let scale = 1.0 / n as f64;
    resized.iter().map(|c| (c.re * scale) as f32).collect()
}

/// Length fixup without interpolation: truncate, or repeat the signal
/// cyclically until the target length is reached.
pub fn resize_cyclic(signal: &[f32], target_len: usize) -> Vec<f32> {
    if signal.is_empty() {
        return vec![0.0; target_len];
    }
    signal.iter().copied().cycle().take(target_len).collect()
}
