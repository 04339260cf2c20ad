extern crate glam;

use std::ops::{Index, IndexMut};

use strum::EnumIter;

/// 3D Axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// The following axis, wrapping from Z back to X
    #[inline]
    pub fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    /// Axis from its integer encoding, `None` for anything outside `0..=2`
    #[inline]
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Index<Axis> for glam::Vec3A {
    type Output = f32;

    fn index(&self, axis: Axis) -> &Self::Output {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl IndexMut<Axis> for glam::Vec3A {
    fn index_mut(&mut self, axis: Axis) -> &mut Self::Output {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use crate::Axis;

    #[test]
    fn next_cycles_through_all_axes() {
        let mut axis = Axis::Z;
        let visited: Vec<Axis> = (0..3)
            .map(|_| {
                axis = axis.next();
                axis
            })
            .collect();
        assert_eq!(visited, Axis::iter().collect::<Vec<_>>());
    }

    #[test]
    fn index_round_trips() {
        for axis in Axis::iter() {
            assert_eq!(Axis::from_index(axis as u32), Some(axis));
        }
        assert_eq!(Axis::from_index(3), None);
    }
}
