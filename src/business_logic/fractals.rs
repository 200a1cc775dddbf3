use crate::models::candle::Candle;
use crate::models::swing::{Fractal, FractalKind};

/// Fractal (pivot) detector over a symmetric window.
///
/// A pivot at index `i` is only known once `k` bars exist after it, so the
/// output lags live price by `k` bars.
#[derive(Debug, Clone, Copy)]
pub struct FractalDetector {
    half_window: usize,
}

impl FractalDetector {
    /// `window` must be odd and at least 3; the config layer enforces that.
    pub fn new(window: usize) -> Self {
        Self {
            half_window: window.saturating_sub(1) / 2,
        }
    }

    pub fn window(&self) -> usize {
        self.half_window * 2 + 1
    }

    /// Lazily yields fractals for fully formed windows, starting the scan at
    /// bar index `start`. Yields nothing while history is shorter than the
    /// window.
    pub fn detect<'a>(
        &self,
        bars: &'a [Candle],
        start: usize,
    ) -> impl Iterator<Item = Fractal> + 'a {
        let detector = *self;
        let k = self.half_window;
        let first = start.max(k);
        let end = bars.len().saturating_sub(k);

        (first..end).flat_map(move |i| detector.fractals_at(bars, i))
    }

    /// Fractals at bar `i`, ordered by the bar's own path: a bullish bar
    /// prints its low before its high.
    fn fractals_at(&self, bars: &[Candle], i: usize) -> impl Iterator<Item = Fractal> {
        let bar = &bars[i];
        let high = self.is_high(bars, i).then(|| Fractal {
            timestamp: bar.open_time,
            price: bar.high,
            kind: FractalKind::High,
        });
        let low = self.is_low(bars, i).then(|| Fractal {
            timestamp: bar.open_time,
            price: bar.low,
            kind: FractalKind::Low,
        });

        let ordered = if bar.is_bullish() {
            [low, high]
        } else {
            [high, low]
        };
        ordered.into_iter().flatten()
    }

    /// Strictly above earlier bars in the window, not below later ones, so
    /// equal highs resolve to the earliest bar.
    fn is_high(&self, bars: &[Candle], i: usize) -> bool {
        let k = self.half_window;
        if i < k || i + k >= bars.len() {
            return false;
        }

        let hi = bars[i].high;
        bars[i - k..i].iter().all(|c| c.high < hi) && bars[i + 1..=i + k].iter().all(|c| c.high <= hi)
    }

    fn is_low(&self, bars: &[Candle], i: usize) -> bool {
        let k = self.half_window;
        if i < k || i + k >= bars.len() {
            return false;
        }

        let lo = bars[i].low;
        bars[i - k..i].iter().all(|c| c.low > lo) && bars[i + 1..=i + k].iter().all(|c| c.low >= lo)
    }
}
