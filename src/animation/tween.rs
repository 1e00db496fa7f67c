use crate::{
    animation::ease::Ease,
    foundation::core::{Millis, Point, Vec2},
};

/// Interpolation contract for tweened values.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }
}

/// One eased transition of a value over session time.
///
/// Tweens are overwritten, never queued: the owner replaces its tween when a new transition on
/// the same target starts.
#[derive(Clone, Debug)]
pub struct Tween<T> {
    from: T,
    to: T,
    start_ms: Millis,
    duration_ms: Millis,
    ease: Ease,
}

impl<T> Tween<T>
where
    T: Lerp + Clone,
{
    pub fn new(from: T, to: T, start_ms: Millis, duration_ms: Millis, ease: Ease) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
            ease,
        }
    }

    /// Normalized, un-eased progress at `now`.
    pub fn progress(&self, now: Millis) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start_ms) as f64;
        (elapsed / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now: Millis) -> T {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to.clone();
        }
        T::lerp(&self.from, &self.to, self.ease.apply(p))
    }

    pub fn end_ms(&self) -> Millis {
        self.start_ms.saturating_add(self.duration_ms)
    }

    pub fn is_finished(&self, now: Millis) -> bool {
        now >= self.end_ms()
    }

    pub fn target(&self) -> &T {
        &self.to
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
