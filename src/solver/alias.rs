use crate::algebra::{AsFloatT, FloatT, VectorMath};
use rand::rngs::StdRng;
use rand::Rng;

/// Walker alias table for O(1) draws from a discrete distribution over
/// positive weights.
///
/// Construction is O(k): weights are normalized to sum `k`, then a
/// two-pointer sweep pairs each deficient ("small") slot with a surplus
/// ("big") one, so a draw needs one uniform slot pick and one biased
/// coin.
#[derive(Debug)]
pub struct AliasSampler<T> {
    frac: Vec<T>,
    alias: Vec<usize>,
    err: T,
}

impl<T> AliasSampler<T>
where
    T: FloatT,
{
    /// Build the table from a positive weight vector.
    ///
    /// # Panics
    /// Panics if `p` is empty or sums to zero.
    pub fn new(p: &[T]) -> Self {
        let k = p.len();
        assert!(k > 0, "alias sampler needs at least one weight");
        let total = p.sum();
        assert!(total > T::zero(), "alias sampler weights must sum > 0");

        let kf: T = k.as_T();
        let scale = kf / total;
        let mut resid: Vec<T> = p.iter().map(|&w| w * scale).collect();
        let mut frac = vec![T::one(); k];
        let mut alias: Vec<usize> = (0..k).collect();

        let mut small: Vec<usize> = Vec::with_capacity(k);
        let mut big: Vec<usize> = Vec::with_capacity(k);
        for (i, &r) in resid.iter().enumerate() {
            if r < T::one() {
                small.push(i);
            } else {
                big.push(i);
            }
        }

        while !small.is_empty() && !big.is_empty() {
            let s = small.pop().unwrap();
            let b = big.pop().unwrap();
            frac[s] = resid[s];
            alias[s] = b;
            //the big slot donated 1 - resid[s] of its mass
            resid[b] = (resid[b] + resid[s]) - T::one();
            if resid[b] < T::one() {
                small.push(b);
            } else {
                big.push(b);
            }
        }

        //leftover slots keep full probability; their residual drift is
        //the construction error
        let mut err = T::zero();
        for i in small.into_iter().chain(big) {
            err += (resid[i] - T::one()).abs();
            frac[i] = T::one();
        }

        Self { frac, alias, err }
    }

    /// number of weights
    pub fn len(&self) -> usize {
        self.frac.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frac.is_empty()
    }

    /// residual normalization error accumulated during construction
    pub fn error(&self) -> T {
        self.err
    }

    /// One O(1) draw.
    pub fn draw(&self, rng: &mut StdRng) -> usize {
        let k = self.len();
        let u: f64 = rng.gen();
        let i = ((u * k as f64) as usize).min(k - 1);
        let coin: T = rng.gen::<f64>().as_T();
        if coin < self.frac[i] {
            i
        } else {
            self.alias[i]
        }
    }

    /// `s` independent draws.
    pub fn draw_many(&self, s: usize, rng: &mut StdRng) -> Vec<usize> {
        (0..s).map(|_| self.draw(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_frequencies_match_weights() {
        let p = vec![1.0, 2.0, 3.0, 4.0];
        let total: f64 = 10.0;
        let sampler = AliasSampler::new(&p);
        assert!(sampler.error() < p.len() as f64 * 1e-12);

        let mut rng = StdRng::seed_from_u64(271828);
        let ndraw = 1_000_000usize;
        let mut counts = vec![0usize; p.len()];
        for i in sampler.draw_many(ndraw, &mut rng) {
            counts[i] += 1;
        }

        for (i, &c) in counts.iter().enumerate() {
            let prob = p[i] / total;
            let sigma = (ndraw as f64 * prob * (1.0 - prob)).sqrt();
            let dev = (c as f64 - ndraw as f64 * prob).abs();
            assert!(
                dev <= 3.0 * sigma,
                "weight {} drifted {:.1} sigma",
                i,
                dev / sigma
            );
        }
    }

    #[test]
    fn test_single_weight() {
        let sampler = AliasSampler::new(&[7.0]);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(sampler.draw(&mut rng), 0);
        }
    }
}
