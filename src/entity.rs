use std::fmt;
use std::num::{NonZeroU32, NonZeroU8};

/// Number of low bits of the packed key holding the slot index.
pub const INDEX_BITS: u32 = 24;

/// Largest slot index an [`Entity`] can carry.
pub const MAX_INDEX: u32 = (1 << INDEX_BITS) - 1;

const INDEX_MASK: u32 = MAX_INDEX;

/// An entity is an opaque handle identifying a logical object in a world.
///
/// The handle packs a 24-bit slot index and an 8-bit generation into a single
/// key. The generation distinguishes successive reuses of the same slot and is
/// never zero, so the packed key is never zero and `Option<Entity>` is
/// pointer-sized.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Entity(NonZeroU32);

impl Entity {
    #[inline]
    pub(crate) fn new(index: u32, generation: NonZeroU8) -> Entity {
        debug_assert!(index <= MAX_INDEX);
        let key = ((generation.get() as u32) << INDEX_BITS) | (index & INDEX_MASK);
        // Generation is non-zero, therefore so is the packed key.
        Entity(NonZeroU32::new(key).expect("packed entity key is zero"))
    }

    /// Slot index portion of the handle.
    #[inline]
    pub fn index(self) -> u32 {
        self.0.get() & INDEX_MASK
    }

    /// Generation portion of the handle.
    #[inline]
    pub fn generation(self) -> NonZeroU8 {
        // The constructor guarantees the high byte is non-zero.
        NonZeroU8::new((self.0.get() >> INDEX_BITS) as u8).expect("zero generation byte")
    }

    /// Raw packed key, for storage or FFI.
    #[inline]
    pub fn to_bits(self) -> u32 {
        self.0.get()
    }

    /// Reconstructs a handle from [`Entity::to_bits`].
    ///
    /// Returns `None` if the generation byte is zero, which no live handle
    /// ever carries.
    #[inline]
    pub fn from_bits(bits: u32) -> Option<Entity> {
        if bits >> INDEX_BITS == 0 {
            return None;
        }
        NonZeroU32::new(bits).map(Entity)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index(), self.generation())
    }
}
