// math.rs — small vector type shared by the register model

/// Four-component vector, the unit the PICA shader unit operates on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vec4<T> {
    pub x: T,
    pub y: T,
    pub z: T,
    pub w: T,
}

impl<T: Copy> Vec4<T> {
    #[inline]
    pub const fn new(x: T, y: T, z: T, w: T) -> Self {
        Self { x, y, z, w }
    }

    /// Component-wise conversion.
    #[inline]
    pub fn map<U: Copy>(self, mut f: impl FnMut(T) -> U) -> Vec4<U> {
        Vec4::new(f(self.x), f(self.y), f(self.z), f(self.w))
    }

    #[inline]
    pub fn to_array(self) -> [T; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec4_map_preserves_component_order() {
        let v = Vec4::new(1u8, 2, 3, 4).map(u32::from);
        assert_eq!(v.to_array(), [1u32, 2, 3, 4]);
    }
}
