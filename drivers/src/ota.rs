use core::fmt;

use hal::ota::{Ota, OtaUpdate};

pub const IMAGE_MAGIC: u8 = 0xE9;
/// Image header, first segment header and application descriptor
pub const IMAGE_HEADER_SIZE: usize = 24 + 8 + 256;
pub const MIN_IMAGE_SIZE: usize = IMAGE_HEADER_SIZE + 1024;
pub const MAX_IMAGE_SIZE: usize = 3 * 1024 * 1024;
pub const MAX_SEGMENTS: u8 = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    TooSmall(usize),
    TooLarge(usize),
    BadImage,
    Incomplete { expected: usize, received: usize },
    Ota(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TooSmall(size) => write!(f, "image size {} too small", size),
            Self::TooLarge(size) => write!(f, "image size {} too big", size),
            Self::BadImage => write!(f, "not a firmware image"),
            Self::Incomplete { expected, received } => {
                write!(f, "expected {} bytes but only got {}", expected, received)
            }
            Self::Ota(e) => write!(f, "OTA error {:?}", e),
        }
    }
}

/// Streams a firmware image of known size into the next OTA slot.
pub struct FirmwareWriter<U> {
    update: U,
    expected: usize,
    received: usize,
}

impl<E: fmt::Debug, U: OtaUpdate<Error = E>> FirmwareWriter<U> {
    pub fn begin<O: Ota<Update = U, Error = E>>(ota: &mut O, size: usize) -> Result<Self, Error<E>> {
        if size < MIN_IMAGE_SIZE {
            return Err(Error::TooSmall(size));
        }
        if size > MAX_IMAGE_SIZE {
            return Err(Error::TooLarge(size));
        }
        let update = ota.begin(Some(size)).map_err(Error::Ota)?;
        info!("Receiving firmware of {} bytes", size);
        Ok(Self { update, expected: size, received: 0 })
    }

    fn check_header(chunk: &[u8]) -> Result<(), Error<E>> {
        if chunk.first() != Some(&IMAGE_MAGIC) {
            return Err(Error::BadImage);
        }
        match chunk.get(1) {
            Some(&segments) if segments == 0 || segments > MAX_SEGMENTS => Err(Error::BadImage),
            _ => Ok(()),
        }
    }

    /// Bytes beyond the declared size are ignored
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), Error<E>> {
        if chunk.is_empty() {
            return Ok(());
        }
        if self.received == 0 {
            Self::check_header(chunk)?;
        }
        let remain = self.expected - self.received;
        let chunk = &chunk[..chunk.len().min(remain)];
        self.update.write(chunk).map_err(Error::Ota)?;
        self.received += chunk.len();
        debug!("Firmware download {}%", self.progress());
        Ok(())
    }

    pub fn progress(&self) -> usize {
        self.received * 100 / self.expected
    }

    pub fn is_done(&self) -> bool {
        self.received >= self.expected
    }

    pub fn finish(self) -> Result<(), Error<E>> {
        if !self.is_done() {
            let (expected, received) = (self.expected, self.received);
            self.update.abort().map_err(Error::Ota)?;
            return Err(Error::Incomplete { expected, received });
        }
        self.update.complete().map_err(Error::Ota)?;
        info!("Firmware update completed");
        Ok(())
    }

    pub fn abort(self) -> Result<(), Error<E>> {
        self.update.abort().map_err(Error::Ota)
    }
}

/// Writes the whole image, aborting the update on the first failure.
pub fn install<'a, O, I>(ota: &mut O, size: usize, chunks: I) -> Result<(), Error<O::Error>>
where
    O: Ota,
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut writer = FirmwareWriter::begin(ota, size)?;
    for chunk in chunks {
        if let Err(e) = writer.write(chunk) {
            error!("Firmware update failed: {}", e);
            writer.abort().ok();
            return Err(e);
        }
        if writer.is_done() {
            break;
        }
    }
    writer.finish()
}

#[cfg(test)]
mod test {
    use std::vec;
    use std::vec::Vec;

    use hal::ota::{Ota, OtaUpdate, Slot, SlotState};

    #[derive(Debug, PartialEq)]
    enum Outcome {
        Pending,
        Completed,
        Aborted,
    }

    #[derive(Default)]
    struct Flash {
        image: Vec<u8>,
        outcome: Option<Outcome>,
    }

    struct Update<'a>(&'a mut Flash);

    impl<'a> OtaUpdate for Update<'a> {
        type Error = &'static str;

        fn write(&mut self, chunk: &[u8]) -> Result<(), &'static str> {
            if chunk.starts_with(b"fail") {
                return Err("write");
            }
            self.0.image.extend_from_slice(chunk);
            Ok(())
        }

        fn complete(self) -> Result<(), &'static str> {
            self.0.outcome = Some(Outcome::Completed);
            Ok(())
        }

        fn abort(self) -> Result<(), &'static str> {
            self.0.outcome = Some(Outcome::Aborted);
            Ok(())
        }
    }

    struct Slots<'a>(Option<&'a mut Flash>);

    impl<'a> Ota for Slots<'a> {
        type Error = &'static str;
        type Update = Update<'a>;

        fn running_slot(&self) -> Result<Slot, &'static str> {
            Ok(Slot { index: 0, address: 0x10000, size: 0x300000 })
        }

        fn next_slot(&self) -> Result<Slot, &'static str> {
            Ok(Slot { index: 1, address: 0x310000, size: 0x300000 })
        }

        fn slot_state(&self, _: &Slot) -> Result<SlotState, &'static str> {
            Ok(SlotState::Valid)
        }

        fn begin(&mut self, _: Option<usize>) -> Result<Update<'a>, &'static str> {
            let flash = self.0.take().ok_or("busy")?;
            flash.outcome = Some(Outcome::Pending);
            Ok(Update(flash))
        }

        fn mark_running_valid(&mut self) -> Result<(), &'static str> {
            Ok(())
        }

        fn rollback(&mut self) -> Result<(), &'static str> {
            Err("no rollback")
        }
    }

    fn image(size: usize) -> Vec<u8> {
        let mut image = vec![0u8; size];
        image[0] = super::IMAGE_MAGIC;
        image[1] = 3;
        image
    }

    #[test]
    fn test_install() {
        use super::{install, MIN_IMAGE_SIZE};

        let mut flash = Flash::default();
        let firmware = image(MIN_IMAGE_SIZE + 100);
        let mut chunks: Vec<&[u8]> = firmware.chunks(512).collect();
        chunks.push(b"trailing garbage");
        install(&mut Slots(Some(&mut flash)), firmware.len(), chunks).unwrap();
        assert_eq!(flash.outcome, Some(Outcome::Completed));
        assert_eq!(flash.image, firmware);
    }

    #[test]
    fn test_size_bounds() {
        use super::{install, Error, MAX_IMAGE_SIZE};

        let mut flash = Flash::default();
        let result = install(&mut Slots(Some(&mut flash)), 100, Vec::<&[u8]>::new());
        assert_eq!(result, Err(Error::TooSmall(100)));
        let result = install(&mut Slots(Some(&mut flash)), MAX_IMAGE_SIZE + 1, Vec::<&[u8]>::new());
        assert_eq!(result, Err(Error::TooLarge(MAX_IMAGE_SIZE + 1)));
        assert_eq!(flash.outcome, None);
    }

    #[test]
    fn test_bad_image() {
        use super::{install, Error, MIN_IMAGE_SIZE};

        let mut flash = Flash::default();
        let mut firmware = image(MIN_IMAGE_SIZE);
        firmware[0] = 0x7F;
        let result = install(&mut Slots(Some(&mut flash)), firmware.len(), vec![&firmware[..]]);
        assert_eq!(result, Err(Error::BadImage));
        assert_eq!(flash.outcome, Some(Outcome::Aborted));
        assert!(flash.image.is_empty());
    }

    #[test]
    fn test_incomplete() {
        use super::{install, Error, MIN_IMAGE_SIZE};

        let mut flash = Flash::default();
        let firmware = image(MIN_IMAGE_SIZE);
        let result = install(&mut Slots(Some(&mut flash)), MIN_IMAGE_SIZE + 1, vec![&firmware[..]]);
        let expected = Error::Incomplete { expected: MIN_IMAGE_SIZE + 1, received: MIN_IMAGE_SIZE };
        assert_eq!(result, Err(expected));
        assert_eq!(flash.outcome, Some(Outcome::Aborted));
    }

    #[test]
    fn test_write_failure() {
        use super::{FirmwareWriter, Error, MIN_IMAGE_SIZE};

        let mut flash = Flash::default();
        let mut slots = Slots(Some(&mut flash));
        let mut writer = FirmwareWriter::begin(&mut slots, MIN_IMAGE_SIZE).unwrap();
        writer.write(&image(16)).unwrap();
        assert_eq!(writer.write(b"fail"), Err(Error::Ota("write")));
        assert_eq!(writer.progress(), 16 * 100 / MIN_IMAGE_SIZE);
        writer.abort().unwrap();
        assert_eq!(flash.outcome, Some(Outcome::Aborted));
    }
}
