use core::fmt;

/// An application partition able to hold a firmware image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub index: u8,
    pub address: u32,
    pub size: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotState {
    New,
    PendingVerify,
    Valid,
    Invalid,
    Aborted,
    Undefined,
}

/// Over-the-air update of the next application slot.
pub trait Ota {
    type Error: fmt::Debug;
    type Update: OtaUpdate<Error = Self::Error>;

    fn running_slot(&self) -> Result<Slot, Self::Error>;
    fn next_slot(&self) -> Result<Slot, Self::Error>;
    fn slot_state(&self, slot: &Slot) -> Result<SlotState, Self::Error>;
    /// Erases the next slot and starts accepting image data
    fn begin(&mut self, image_size: Option<usize>) -> Result<Self::Update, Self::Error>;
    /// Cancels the pending rollback of the running image
    fn mark_running_valid(&mut self) -> Result<(), Self::Error>;
    fn rollback(&mut self) -> Result<(), Self::Error>;
}

pub trait OtaUpdate {
    type Error: fmt::Debug;

    fn write(&mut self, chunk: &[u8]) -> Result<(), Self::Error>;
    /// Validates the written image and selects it for the next boot
    fn complete(self) -> Result<(), Self::Error>;
    fn abort(self) -> Result<(), Self::Error>;
}
