use super::{LayoutEngine, SpriteLayouter};
use crate::error::{Result, SpriteMapperError};
use crate::model::{Sprite, page_dimensions};
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Smallest power of two `>= n`; 1 for `n <= 1`, 0 if it does not fit in `u32`.
pub fn to_upper_pot(n: u32) -> u32 {
    if n <= 1 {
        1
    } else {
        n.checked_next_power_of_two().unwrap_or(0)
    }
}

/// Largest power of two `<= n`; 0 for `n == 0`.
pub fn to_lower_pot(n: u32) -> u32 {
    if n == 0 { 0 } else { 1 << (31 - n.leading_zeros()) }
}

/// Objective used to rank trial layouts. Lower is better on both fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutScore {
    /// Total page area, border included.
    pub area: u64,
    /// Extra-page and aspect-ratio penalty.
    pub factor: f64,
}

impl LayoutScore {
    /// Scores a finished layout of `page_count` pages.
    ///
    /// `max_width`/`max_height` are the usable bounds the engines received
    /// (`max_height == 0` for unbounded).
    pub fn evaluate(
        sprites: &[Sprite],
        page_count: usize,
        max_width: u32,
        max_height: u32,
        border: u32,
        power_of_two: bool,
    ) -> Self {
        let dims = page_dimensions(sprites, page_count);
        let pad = 2 * border as u64;
        let round = |v: u64| -> u64 {
            if power_of_two {
                v.max(1).next_power_of_two()
            } else {
                v
            }
        };

        let area = dims
            .iter()
            .map(|d| round(d.width as u64 + pad) * round(d.height as u64 + pad))
            .sum();

        let mut factor = 0.0f64;
        if let Some((last, rest)) = dims.split_last() {
            for d in rest {
                factor += 1.0 - d.width as f64 / max_width as f64;
                if max_height > 0 {
                    factor += 1.0 - d.height as f64 / max_height as f64;
                }
                factor += 1.0;
            }
            factor *= dims.len() as f64;
            let long = last.width.max(last.height) as f64;
            let short = last.width.min(last.height).max(1) as f64;
            factor += long / short;
        }

        Self { area, factor }
    }

    /// Smaller area wins; equal areas compare by factor.
    pub fn beats(&self, other: &LayoutScore) -> bool {
        self.area < other.area || (self.area == other.area && self.factor < other.factor)
    }
}

/// Runs every configured engine on its own copy of the sprites and keeps the
/// layout with the best [`LayoutScore`].
///
/// The page border and power-of-two rounding are applied here; nested
/// engines only ever see the usable area.
#[derive(Debug, Clone, Default)]
pub struct OptimalLayouter {
    layouters: Vec<LayoutEngine>,
    border: u32,
    power_of_two: bool,
    parallel: bool,
    last_used: Option<usize>,
}

impl OptimalLayouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_border(mut self, border: u32) -> Self {
        self.border = border;
        self
    }

    pub fn with_power_of_two(mut self, pot: bool) -> Self {
        self.power_of_two = pot;
        self
    }

    /// Run trials on the rayon pool, here and in nested selectors already
    /// added. No effect without the `parallel` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.set_parallel(parallel);
        self
    }

    fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
        for engine in &mut self.layouters {
            if let LayoutEngine::Optimal(nested) = engine {
                nested.set_parallel(parallel);
            }
        }
    }

    pub fn push(&mut self, engine: impl Into<LayoutEngine>) {
        self.layouters.push(engine.into());
    }

    pub fn layouters(&self) -> &[LayoutEngine] {
        &self.layouters
    }

    pub fn len(&self) -> usize {
        self.layouters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouters.is_empty()
    }

    pub fn border(&self) -> u32 {
        self.border
    }

    pub fn power_of_two(&self) -> bool {
        self.power_of_two
    }

    /// Engine that produced the most recent layout.
    pub fn last_used(&self) -> Option<&LayoutEngine> {
        self.last_used.and_then(|i| self.layouters.get(i))
    }

    /// Usable page bounds after POT flooring and border removal, or `None`
    /// if nothing is left.
    fn usable_bounds(&self, max_width: u32, max_height: u32) -> Option<(u32, u32)> {
        let (mut w, mut h) = (max_width, max_height);
        if self.power_of_two {
            w = to_lower_pot(w);
            if h > 0 {
                h = to_lower_pot(h);
            }
        }
        let pad = self.border.saturating_mul(2);
        if w <= pad {
            return None;
        }
        w -= pad;
        if h > 0 {
            if h <= pad {
                return None;
            }
            h -= pad;
        }
        Some((w, h))
    }

    fn run_trials(
        &mut self,
        max_width: u32,
        max_height: u32,
        spacing: u32,
        sprites: &[Sprite],
    ) -> Vec<Result<(Vec<Sprite>, usize)>> {
        let trial = |engine: &mut LayoutEngine| {
            let mut copy = sprites.to_vec();
            engine
                .layout(max_width, max_height, spacing, &mut copy)
                .map(|pages| (copy, pages))
        };

        #[cfg(feature = "parallel")]
        {
            if self.parallel {
                return self.layouters.par_iter_mut().map(trial).collect();
            }
        }

        self.layouters.iter_mut().map(trial).collect()
    }
}

impl SpriteLayouter for OptimalLayouter {
    fn layout(
        &mut self,
        max_width: u32,
        max_height: u32,
        spacing: u32,
        sprites: &mut [Sprite],
    ) -> Result<usize> {
        self.last_used = None;
        let Some((w, h)) = self.usable_bounds(max_width, max_height) else {
            warn!(
                max_width,
                max_height,
                border = self.border,
                "border leaves no usable page area"
            );
            return Ok(0);
        };
        if sprites.is_empty() || self.layouters.is_empty() {
            return Ok(0);
        }

        if self.layouters.len() == 1 {
            return match self.layouters[0].layout(w, h, spacing, sprites) {
                Ok(pages) => {
                    self.last_used = Some(0);
                    Ok(pages)
                }
                Err(e @ SpriteMapperError::NoFreeSpace { .. }) => {
                    warn!(engine = %self.layouters[0], error = %e, "layout failed");
                    Ok(0)
                }
                Err(e) => Err(e),
            };
        }

        let results = self.run_trials(w, h, spacing, sprites);

        let mut best: Option<(usize, LayoutScore, Vec<Sprite>, usize)> = None;
        for (idx, result) in results.into_iter().enumerate() {
            let engine = &self.layouters[idx];
            let (copy, pages) = match result {
                Ok((_, 0)) => {
                    warn!(engine = %engine, "layout produced no pages, skipping");
                    continue;
                }
                Ok(r) => r,
                Err(e @ SpriteMapperError::NoFreeSpace { .. }) => {
                    warn!(engine = %engine, error = %e, "layout failed, skipping");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let score = LayoutScore::evaluate(&copy, pages, w, h, self.border, self.power_of_two);
            debug!(engine = %engine, pages, area = score.area, factor = score.factor, "trial");
            let better = match &best {
                None => true,
                Some((_, best_score, _, _)) => score.beats(best_score),
            };
            if better {
                best = Some((idx, score, copy, pages));
            }
        }

        let Some((idx, score, winner, pages)) = best else {
            warn!(engines = self.layouters.len(), "no layouter could place the sprites");
            return Ok(0);
        };
        for (dst, src) in sprites.iter_mut().zip(winner) {
            *dst = src;
        }
        self.last_used = Some(idx);
        info!(
            engine = %self.layouters[idx].resolved(),
            pages,
            area = score.area,
            factor = score.factor,
            "selected layout"
        );
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pot_helpers() {
        assert_eq!(to_upper_pot(100), 128);
        assert_eq!(to_lower_pot(100), 64);
        assert_eq!(to_upper_pot(128), 128);
        assert_eq!(to_lower_pot(128), 128);
        assert_eq!(to_upper_pot(0), 1);
        assert_eq!(to_upper_pot(1), 1);
        assert_eq!(to_lower_pot(1), 1);
        assert_eq!(to_lower_pot(0), 0);
        assert_eq!(to_upper_pot((1 << 30) + 1), 1 << 31);
    }

    #[test]
    fn score_counts_border_and_pot() {
        let mut s = Sprite::new("a", 30, 20);
        s.place(0, 0, 0);
        let plain = LayoutScore::evaluate(std::slice::from_ref(&s), 1, 100, 0, 1, false);
        assert_eq!(plain.area, 32 * 22);
        let pot = LayoutScore::evaluate(std::slice::from_ref(&s), 1, 100, 0, 1, true);
        assert_eq!(pot.area, 32 * 32);
        assert!((plain.factor - 1.5).abs() < 1e-9);
    }

    #[test]
    fn score_penalises_extra_pages() {
        let mut a = Sprite::new("a", 10, 10);
        let mut b = Sprite::new("b", 10, 10);
        a.place(0, 0, 0);
        b.place(0, 0, 1);
        let score = LayoutScore::evaluate(&[a, b], 2, 20, 20, 0, false);
        // page 0: (1 - 10/20) + (1 - 10/20) + 1 = 2, times 2 pages, plus square last page
        assert!((score.factor - 5.0).abs() < 1e-9);
    }

    #[test]
    fn usable_bounds_floor_then_subtract_border() {
        let l = OptimalLayouter::new().with_border(2).with_power_of_two(true);
        assert_eq!(l.usable_bounds(100, 0), Some((60, 0)));
        assert_eq!(l.usable_bounds(100, 70), Some((60, 60)));
        assert_eq!(l.usable_bounds(4, 0), None);
    }
}
