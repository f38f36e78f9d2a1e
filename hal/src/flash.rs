/// Word addressed persistent storage.
///
/// Addresses are word offsets from the start of the partition. `erase` resets the
/// whole sector containing `address` to all ones, `program` may only clear bits.
pub trait Flash<W> {
    type Error: core::fmt::Debug;

    fn read(&self, address: usize, words: &mut [W]) -> Result<(), Self::Error>;
    fn erase(&mut self, address: usize) -> Result<(), Self::Error>;
    fn program(&mut self, address: usize, words: &[W]) -> Result<(), Self::Error>;
}
