pub mod leaf;
pub mod slot;

pub use leaf::{Activation, Leaf, LeafData};
pub use slot::{Slot, Step};
