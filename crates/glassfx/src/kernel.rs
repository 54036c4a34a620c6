//! Separable Gaussian kernel with paired bilinear taps.

/// Upper bound on samples per side of the kernel.
pub const MAX_BLUR_SAMPLES: u32 = 8;

/// Taps per side after pairing adjacent samples.
pub const MAX_KERNEL_PAIRS: usize = (MAX_BLUR_SAMPLES as usize).div_ceil(2);

const MIN_PAIR_WEIGHT: f32 = 1e-4;

/// One bilinear fetch, mirrored on both sides of the center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KernelTap {
    /// Distance from the center in texels.
    pub offset: f32,
    pub weight: f32,
}

/// Normalised weights for one directional blur pass.
///
/// `center_weight + 2 * sum(pair weights) == 1`, so a pass preserves overall
/// brightness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurKernel {
    radius: f32,
    center: f32,
    pairs: [KernelTap; MAX_KERNEL_PAIRS],
    len: usize,
}

impl BlurKernel {
    pub fn new(radius: f32) -> Self {
        let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
        let sigma = (radius / 3.0).max(0.001);
        let inv_sigma2 = -0.5 / (sigma * sigma);
        let samples = (radius.ceil() as u32).min(MAX_BLUR_SAMPLES);
        let gauss = |x: f32| (x * x * inv_sigma2).exp();

        let mut pairs = [KernelTap::default(); MAX_KERNEL_PAIRS];
        let mut len = 0;
        let mut total = 1.0;
        for i in (1..=samples).step_by(2) {
            let x1 = i as f32;
            let x2 = (i + 1) as f32;
            let w1 = gauss(x1);
            let w2 = if i < samples { gauss(x2) } else { 0.0 };
            let sum = w1 + w2;
            if sum < MIN_PAIR_WEIGHT {
                continue;
            }
            // the bilinear fetch lands between the two texels, biased to the heavier one
            pairs[len] = KernelTap {
                offset: (x1 * w1 + x2 * w2) / sum,
                weight: sum,
            };
            len += 1;
            total += 2.0 * sum;
        }

        for tap in &mut pairs[..len] {
            tap.weight /= total;
        }

        Self {
            radius,
            center: 1.0 / total,
            pairs,
            len,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn center_weight(&self) -> f32 {
        self.center
    }

    pub fn pairs(&self) -> &[KernelTap] {
        &self.pairs[..self.len]
    }

    /// Sum of every tap weight, both sides included.
    pub fn total_weight(&self) -> f32 {
        self.center + 2.0 * self.pairs().iter().map(|tap| tap.weight).sum::<f32>()
    }

    /// True when a pass with this kernel copies its input unchanged.
    pub fn is_identity(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        for radius in [0.0, 0.1, 0.5, 1.0, 2.5, 6.0, 12.0, 24.0, 96.0] {
            let kernel = BlurKernel::new(radius);
            assert!(
                (kernel.total_weight() - 1.0).abs() < 1e-5,
                "radius {radius}: {}",
                kernel.total_weight()
            );
        }
    }

    #[test]
    fn zero_and_invalid_radius_are_identity() {
        for radius in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            let kernel = BlurKernel::new(radius);
            assert!(kernel.is_identity());
            assert_eq!(kernel.center_weight(), 1.0);
        }
    }

    #[test]
    fn caps_samples_at_eight() {
        let kernel = BlurKernel::new(200.0);
        assert_eq!(kernel.pairs().len(), MAX_KERNEL_PAIRS);
        let last = kernel.pairs()[MAX_KERNEL_PAIRS - 1];
        assert!(last.offset > 7.0 && last.offset < 8.0);
    }

    #[test]
    fn odd_sample_count_leaves_a_single_last_tap() {
        // three samples: pair (1, 2) and a lone tap at 3
        let kernel = BlurKernel::new(3.0);
        let pairs = kernel.pairs();
        assert_eq!(pairs.len(), 2);
        assert!((pairs[1].offset - 3.0).abs() < 1e-6);
        assert!(pairs[0].offset > 1.0 && pairs[0].offset < 2.0);
    }

    #[test]
    fn negligible_pairs_are_dropped() {
        // sigma is tiny, so the first pair carries no weight at all
        let kernel = BlurKernel::new(0.1);
        assert!(kernel.is_identity());
    }
}
