use crate::animation::values::Interpolatable;

/// The pair of keys bracketing a query time, plus the blend factor between them.
///
/// `t_lower`/`t_upper` are the effective key times, which differ from the
/// stored times when the segment crosses the loop seam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub lower: usize,
    pub upper: usize,
    pub t_lower: f32,
    pub t_upper: f32,
    pub factor: f32,
}

impl Segment {
    const fn hold(index: usize, time: f32) -> Self {
        Self {
            lower: index,
            upper: index,
            t_lower: time,
            t_upper: time,
            factor: 0.0,
        }
    }
}

/// Keys of one animated property. Times are in seconds, strictly increasing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>) -> Self {
        debug_assert_eq!(times.len(), values.len(), "keyframe times and values differ in length");
        debug_assert!(
            times.windows(2).all(|w| w[0] < w[1]),
            "keyframe times must be strictly increasing"
        );
        Self { times, values }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last key, or 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Finds the keys bracketing `time` on a track that loops every `period`
    /// seconds.
    ///
    /// Past the last key the segment runs from the last key to the first key
    /// one loop later; before (or at) the first key it runs from the last key
    /// one loop earlier to the first key. A non-positive `period` holds the
    /// end values instead of wrapping.
    #[must_use]
    pub fn segment(&self, time: f32, period: f32) -> Option<Segment> {
        let len = self.times.len();
        match len {
            0 => return None,
            1 => return Some(Segment::hold(0, self.times[0])),
            _ => {}
        }

        let first = self.times[0];
        let last = self.times[len - 1];
        let wraps = period > 0.0;

        let (lower, upper, t_lower, t_upper) = if time > last {
            if !wraps {
                return Some(Segment::hold(len - 1, last));
            }
            (len - 1, 0, last, first + seam_offset(first, last, period))
        } else {
            // Number of keys strictly before `time`
            let before = self.times.partition_point(|&t| t < time);
            if before == 0 {
                if !wraps {
                    return Some(Segment::hold(0, first));
                }
                (len - 1, 0, last - seam_offset(first, last, period), first)
            } else {
                let lower = before - 1;
                (lower, lower + 1, self.times[lower], self.times[lower + 1])
            }
        };

        let span = t_upper - t_lower;
        let factor = if span > 0.0 { (time - t_lower) / span } else { 1.0 };
        debug_assert!(
            (0.0..=1.0).contains(&factor),
            "interpolation factor {factor} out of range at time {time}"
        );

        Some(Segment {
            lower,
            upper,
            t_lower,
            t_upper,
            factor: factor.clamp(0.0, 1.0),
        })
    }

    /// Interpolated value at `time`, or `None` for an empty track.
    ///
    /// A factor of exactly 0 or 1 yields the stored key value unchanged.
    #[must_use]
    pub fn sample(&self, time: f32, period: f32) -> Option<T> {
        let seg = self.segment(time, period)?;
        Some(if seg.factor == 0.0 {
            self.values[seg.lower]
        } else if seg.factor == 1.0 {
            self.values[seg.upper]
        } else {
            T::interpolate_linear(self.values[seg.lower], self.values[seg.upper], seg.factor)
        })
    }
}

/// Smallest whole number of periods that moves a key from one end of
/// `[first, last]` strictly past the other.
fn seam_offset(first: f32, last: f32, period: f32) -> f32 {
    let mut loops = (((last - first) / period).floor() + 1.0).max(1.0);
    // Rounding in the division can land exactly on the far key
    if first + loops * period <= last {
        loops += 1.0;
    }
    loops * period
}
