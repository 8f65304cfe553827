/// Linear interpolation between two values.
pub trait Lerp {
    fn lerp(&self, other: &Self, factor: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, factor: f64) -> Self {
        self * (1.0 - factor) + other * factor
    }
}

/// A value that can blend from its previous setting toward a new one.
///
/// `factor` is the blend progress: 0 yields the previous value, 1 the new one.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatableProperty<T> {
    current: T,
    next: T,
    factor: f64,
}

impl<T: Lerp + Clone> AnimatableProperty<T> {
    pub fn new(value: T) -> Self {
        AnimatableProperty {
            current: value.clone(),
            next: value,
            factor: 1.0,
        }
    }

    pub fn value(&self) -> T {
        if self.factor >= 1.0 {
            self.next.clone()
        } else if self.factor <= 0.0 {
            self.current.clone()
        } else {
            self.current.lerp(&self.next, self.factor)
        }
    }

    /// The value a running blend is heading toward.
    pub fn target(&self) -> &T {
        &self.next
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Starts a blend from the present value to `value`. A factor of 1
    /// snaps straight to it.
    pub fn set_value_with_factor(&mut self, value: T, factor: f64) {
        self.current = self.value();
        self.next = value;
        self.factor = factor.clamp(0.0, 1.0);
    }

    pub fn set_factor(&mut self, factor: f64) {
        self.factor = factor.clamp(0.0, 1.0);
    }
}

impl<T: Lerp + Clone + Default> Default for AnimatableProperty<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap() {
        let mut prop = AnimatableProperty::new(1.0);
        prop.set_value_with_factor(5.0, 1.0);
        assert_eq!(5.0, prop.value());
        assert_eq!(1.0, prop.factor());
    }

    #[test]
    fn test_half_blend() {
        let mut prop = AnimatableProperty::new(0.0);
        prop.set_value_with_factor(10.0, 0.5);
        assert!(prop.value() > 0.0 && prop.value() < 10.0);
        assert_eq!(5.0, prop.value());
    }

    #[test]
    fn test_blend() {
        let mut prop = AnimatableProperty::new(0.0);
        prop.set_value_with_factor(10.0, 0.0);
        assert_eq!(0.0, prop.value());
        prop.set_factor(0.25);
        assert_eq!(2.5, prop.value());
        prop.set_factor(1.0);
        assert_eq!(10.0, prop.value());

        // Retargeting mid-blend starts from where the blend is now.
        prop.set_factor(0.5);
        prop.set_value_with_factor(20.0, 0.0);
        assert_eq!(5.0, prop.value());
        prop.set_factor(0.5);
        assert_eq!(12.5, prop.value());
        assert_eq!(20.0, *prop.target());
    }
}
