use core::fmt;
use core::num::NonZeroU32;

/// Identity of a star for the whole run.
///
/// Disks carry the key of their host star, so the key is also the disk id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StarKey(u64);

impl StarKey {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for StarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StarKey({})", self.0)
    }
}

impl fmt::Display for StarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compact id of a viscous integrator backend.
///
/// `NonZero` storage keeps `Option<BackendId>` the size of a `u32`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(NonZeroU32);

impl BackendId {
    /// Create an id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Debug for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackendId({})", self.index())
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_id_round_trip_index() {
        for i in [0_u32, 1, 2, 9, 10_000] {
            assert_eq!(BackendId::from_index(i).index(), i as usize);
        }
    }

    #[test]
    fn option_backend_id_is_small() {
        assert_eq!(
            core::mem::size_of::<BackendId>(),
            core::mem::size_of::<Option<BackendId>>()
        );
    }

    #[test]
    fn star_keys_order_by_raw_value() {
        let mut keys = vec![StarKey::new(7), StarKey::new(2), StarKey::new(5)];
        keys.sort();
        assert_eq!(keys.iter().map(|k| k.get()).collect::<Vec<_>>(), [2, 5, 7]);
        assert_eq!(format!("{}", StarKey::new(42)), "42");
    }
}
