//! Log structured file store over two flash sectors.
//!
//! Sector layout: `[ACTIVE, generation, record...]`, unused words read as `EMPTY`.
//! A record is `[kind | path_len << 16, data_len, path words..., data words...]`
//! and the last record of a path wins. When the active sector runs full the live
//! records are copied into the spare sector, which then becomes active.

use core::fmt;

use hal::flash::Flash;
use hal::fs::{FileSystem, MountConfig, Usage};

const ACTIVE: u32 = u32::from_le_bytes(*b"LGFS");
const EMPTY: u32 = 0xFFFFFFFF;

const SECTOR_HEADER: usize = 2;
const RECORD_HEADER: usize = 2;
const FILE: u32 = 0x0001;
const TOMBSTONE: u32 = 0x0002;

pub const MAX_PATH: usize = 64;
const CHUNK: usize = MAX_PATH / 4;

fn word_count(bytes: usize) -> usize {
    (bytes + 3) / 4
}

fn pack(bytes: &[u8], words: &mut [u32]) -> usize {
    for (word, chunk) in words.iter_mut().zip(bytes.chunks(4)) {
        let mut buffer = [0u8; 4];
        buffer[..chunk.len()].copy_from_slice(chunk);
        *word = u32::from_le_bytes(buffer);
    }
    word_count(bytes.len())
}

fn unpack(words: &[u32], bytes: &mut [u8]) {
    for (index, byte) in bytes.iter_mut().enumerate() {
        *byte = words[index / 4].to_le_bytes()[index % 4];
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    Flash(E),
    NotMounted,
    AlreadyMounted,
    NotFound,
    NoSpace,
    ReadOnly,
    Corrupted,
    InvalidPath,
    BufferTooSmall(usize),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Flash(e) => write!(f, "flash error {:?}", e),
            Self::NotMounted => write!(f, "not mounted"),
            Self::AlreadyMounted => write!(f, "already mounted"),
            Self::NotFound => write!(f, "no such file"),
            Self::NoSpace => write!(f, "no space left"),
            Self::ReadOnly => write!(f, "read-only filesystem"),
            Self::Corrupted => write!(f, "corrupted filesystem"),
            Self::InvalidPath => write!(f, "invalid path"),
            Self::BufferTooSmall(size) => write!(f, "file of {} bytes exceeds buffer", size),
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Record {
    offset: usize,
    path_len: usize,
    data_len: usize,
    tombstone: bool,
}

impl Record {
    fn size(&self) -> usize {
        RECORD_HEADER + word_count(self.path_len) + word_count(self.data_len)
    }

    fn path_offset(&self) -> usize {
        self.offset + RECORD_HEADER
    }

    fn data_offset(&self) -> usize {
        self.path_offset() + word_count(self.path_len)
    }
}

#[derive(Copy, Clone, Debug)]
struct Mount {
    base_path: &'static str,
    read_only: bool,
    active: usize,
    generation: u32,
    write_offset: usize,
}

pub struct LogFs<F> {
    flash: F,
    sector_words: usize,
    mount: Option<Mount>,
}

impl<E: fmt::Debug, F: Flash<u32, Error = E>> LogFs<F> {
    /// Sector 0 starts at address 0, sector 1 at `sector_words`.
    pub fn new(flash: F, sector_words: usize) -> Self {
        Self { flash, sector_words, mount: None }
    }

    pub fn into_inner(self) -> F {
        self.flash
    }

    fn base(&self, sector: usize) -> usize {
        sector * self.sector_words
    }

    fn mounted(&self) -> Result<Mount, Error<E>> {
        self.mount.ok_or(Error::NotMounted)
    }

    fn relative<'p>(mount: &Mount, path: &'p str) -> Result<&'p [u8], Error<E>> {
        let name = path.strip_prefix(mount.base_path).and_then(|p| p.strip_prefix('/'));
        match name {
            Some(name) if !name.is_empty() && name.len() <= MAX_PATH => Ok(name.as_bytes()),
            _ => Err(Error::InvalidPath),
        }
    }

    fn sector_header(&self, sector: usize) -> Result<[u32; SECTOR_HEADER], Error<E>> {
        let mut header = [0u32; SECTOR_HEADER];
        self.flash.read(self.base(sector), &mut header).map_err(Error::Flash)?;
        Ok(header)
    }

    fn record_at(&self, sector: usize, offset: usize) -> Result<Option<Record>, Error<E>> {
        if offset + RECORD_HEADER > self.sector_words {
            return Ok(None);
        }
        let mut header = [0u32; RECORD_HEADER];
        self.flash.read(self.base(sector) + offset, &mut header).map_err(Error::Flash)?;
        if header[0] == EMPTY {
            return Ok(None);
        }
        let tombstone = match header[0] & 0xFFFF {
            FILE => false,
            TOMBSTONE => true,
            _ => return Err(Error::Corrupted),
        };
        let (path_len, data_len) = ((header[0] >> 16) as usize, header[1] as usize);
        // a torn header may leave data_len all ones
        if path_len == 0 || path_len > MAX_PATH || data_len > self.sector_words * 4 {
            return Err(Error::Corrupted);
        }
        let record = Record { offset, path_len, data_len, tombstone };
        if offset + record.size() > self.sector_words {
            return Err(Error::Corrupted);
        }
        Ok(Some(record))
    }

    fn read_path<'b>(
        &self,
        sector: usize,
        record: &Record,
        bytes: &'b mut [u8; MAX_PATH],
    ) -> Result<&'b [u8], Error<E>> {
        let mut words = [0u32; CHUNK];
        let words = &mut words[..word_count(record.path_len)];
        self.flash.read(self.base(sector) + record.path_offset(), words).map_err(Error::Flash)?;
        let path = &mut bytes[..record.path_len];
        unpack(words, path);
        Ok(path)
    }

    fn path_matches(&self, sector: usize, record: &Record, path: &[u8]) -> Result<bool, Error<E>> {
        if record.path_len != path.len() {
            return Ok(false);
        }
        let mut bytes = [0u8; MAX_PATH];
        Ok(self.read_path(sector, record, &mut bytes)? == path)
    }

    fn lookup(&self, sector: usize, path: &[u8]) -> Result<Option<Record>, Error<E>> {
        let mut found = None;
        let mut offset = SECTOR_HEADER;
        while let Some(record) = self.record_at(sector, offset)? {
            if self.path_matches(sector, &record, path)? {
                found = if record.tombstone { None } else { Some(record) };
            }
            offset += record.size();
        }
        Ok(found)
    }

    fn is_superseded(&self, sector: usize, record: &Record) -> Result<bool, Error<E>> {
        let mut bytes = [0u8; MAX_PATH];
        let path = self.read_path(sector, record, &mut bytes)?;
        let mut offset = record.offset + record.size();
        while let Some(next) = self.record_at(sector, offset)? {
            if self.path_matches(sector, &next, path)? {
                return Ok(true);
            }
            offset += next.size();
        }
        Ok(false)
    }

    fn is_live(&self, sector: usize, record: &Record, skip: &[u8]) -> Result<bool, Error<E>> {
        if record.tombstone || self.path_matches(sector, record, skip)? {
            return Ok(false);
        }
        Ok(!self.is_superseded(sector, record)?)
    }

    /// Words occupied by live records other than `skip` after compaction
    fn live_words(&self, sector: usize, skip: &[u8]) -> Result<usize, Error<E>> {
        let mut total = SECTOR_HEADER;
        let mut offset = SECTOR_HEADER;
        while let Some(record) = self.record_at(sector, offset)? {
            if self.is_live(sector, &record, skip)? {
                total += record.size();
            }
            offset += record.size();
        }
        Ok(total)
    }

    fn program_bytes(&mut self, address: usize, bytes: &[u8]) -> Result<(), Error<E>> {
        let mut words = [0u32; CHUNK];
        for (index, chunk) in bytes.chunks(CHUNK * 4).enumerate() {
            let size = pack(chunk, &mut words);
            self.flash.program(address + index * CHUNK, &words[..size]).map_err(Error::Flash)?;
        }
        Ok(())
    }

    fn append(&mut self, mount: &mut Mount, kind: u32, path: &[u8], data: &[u8]) -> Result<(), Error<E>> {
        let address = self.base(mount.active) + mount.write_offset;
        let header = [kind | (path.len() as u32) << 16, data.len() as u32];
        self.flash.program(address, &header).map_err(Error::Flash)?;
        self.program_bytes(address + RECORD_HEADER, path)?;
        self.program_bytes(address + RECORD_HEADER + word_count(path.len()), data)?;
        mount.write_offset += RECORD_HEADER + word_count(path.len()) + word_count(data.len());
        Ok(())
    }

    fn copy_record(&mut self, from: usize, record: &Record, to: usize, offset: usize) -> Result<(), Error<E>> {
        let mut words = [0u32; CHUNK];
        let size = record.size();
        let mut done = 0;
        while done < size {
            let length = CHUNK.min(size - done);
            let source = self.base(from) + record.offset + done;
            self.flash.read(source, &mut words[..length]).map_err(Error::Flash)?;
            let destination = self.base(to) + offset + done;
            self.flash.program(destination, &words[..length]).map_err(Error::Flash)?;
            done += length;
        }
        Ok(())
    }

    /// Copies live records except `skip` into the spare sector and activates it
    fn compact(&mut self, mount: &mut Mount, skip: &[u8]) -> Result<(), Error<E>> {
        let (from, to) = (mount.active, mount.active ^ 1);
        let spare = self.base(to);
        self.flash.erase(spare).map_err(Error::Flash)?;
        let mut write_offset = SECTOR_HEADER;
        let mut offset = SECTOR_HEADER;
        while let Some(record) = self.record_at(from, offset)? {
            if self.is_live(from, &record, skip)? {
                self.copy_record(from, &record, to, write_offset)?;
                write_offset += record.size();
            }
            offset += record.size();
        }
        let generation = mount.generation.wrapping_add(1);
        self.flash.program(spare + 1, &[generation]).map_err(Error::Flash)?;
        self.flash.program(spare, &[ACTIVE]).map_err(Error::Flash)?;
        self.flash.erase(self.base(from)).map_err(Error::Flash)?;
        debug!("Compacted sector {} into {}, {} words live", from, to, write_offset);
        mount.active = to;
        mount.generation = generation;
        mount.write_offset = write_offset;
        Ok(())
    }

    /// Makes room for `size` words.
    ///
    /// The current version of `path` is carried over so it survives until the new
    /// record lands, it is only dropped when nothing else makes enough room.
    fn reserve(&mut self, mount: &mut Mount, size: usize, path: &[u8]) -> Result<(), Error<E>> {
        if mount.write_offset + size <= self.sector_words {
            return Ok(());
        }
        if self.live_words(mount.active, &[])? + size <= self.sector_words {
            return self.compact(mount, &[]);
        }
        if self.live_words(mount.active, path)? + size > self.sector_words {
            return Err(Error::NoSpace);
        }
        self.compact(mount, path)
    }

    fn format(&mut self) -> Result<(), Error<E>> {
        warn!("Formatting flash filesystem");
        self.flash.erase(self.base(0)).map_err(Error::Flash)?;
        self.flash.erase(self.base(1)).map_err(Error::Flash)?;
        self.flash.program(self.base(0), &[ACTIVE, 0]).map_err(Error::Flash)
    }

    fn end_of_log(&self, sector: usize) -> Result<usize, Error<E>> {
        let mut offset = SECTOR_HEADER;
        while let Some(record) = self.record_at(sector, offset)? {
            offset += record.size();
        }
        Ok(offset)
    }
}

impl<E: fmt::Debug, F: Flash<u32, Error = E>> FileSystem for LogFs<F> {
    type Error = Error<E>;

    fn mount(&mut self, config: &MountConfig) -> Result<(), Error<E>> {
        if self.mount.is_some() {
            return Err(Error::AlreadyMounted);
        }
        let headers = [self.sector_header(0)?, self.sector_header(1)?];
        let active = match (headers[0][0] == ACTIVE, headers[1][0] == ACTIVE) {
            (true, true) => {
                let newer = ((headers[1][1].wrapping_sub(headers[0][1]) as i32) > 0) as usize;
                if !config.read_only {
                    self.flash.erase(self.base(newer ^ 1)).map_err(Error::Flash)?;
                }
                Some(newer)
            }
            (true, false) => Some(0),
            (false, true) => Some(1),
            (false, false) => None,
        };
        let blank = headers[0][0] == EMPTY && headers[1][0] == EMPTY;
        let can_format = (blank || config.format_if_mount_failed) && !config.read_only;
        let (active, write_offset) = match active.map(|s| (s, self.end_of_log(s))) {
            Some((sector, Ok(offset))) => (sector, offset),
            Some((_, Err(Error::Corrupted))) | None if can_format => {
                self.format()?;
                (0, SECTOR_HEADER)
            }
            Some((_, Err(e))) => return Err(e),
            None => return Err(Error::Corrupted),
        };
        let generation = self.sector_header(active)?[1];
        let (base_path, read_only) = (config.base_path, config.read_only);
        self.mount = Some(Mount { base_path, read_only, active, generation, write_offset });
        info!("Mounted {} on sector {} generation {}", base_path, active, generation);
        Ok(())
    }

    fn unmount(&mut self) -> Result<(), Error<E>> {
        self.mount.take().map(|_| ()).ok_or(Error::NotMounted)
    }

    fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    fn exists(&self, path: &str) -> Result<bool, Error<E>> {
        let mount = self.mounted()?;
        let name = Self::relative(&mount, path)?;
        Ok(self.lookup(mount.active, name)?.is_some())
    }

    fn read(&self, path: &str, buf: &mut [u8]) -> Result<usize, Error<E>> {
        let mount = self.mounted()?;
        let name = Self::relative(&mount, path)?;
        let record = self.lookup(mount.active, name)?.ok_or(Error::NotFound)?;
        if record.data_len > buf.len() {
            return Err(Error::BufferTooSmall(record.data_len));
        }
        let mut words = [0u32; CHUNK];
        let mut address = self.base(mount.active) + record.data_offset();
        for chunk in buf[..record.data_len].chunks_mut(CHUNK * 4) {
            let size = word_count(chunk.len());
            self.flash.read(address, &mut words[..size]).map_err(Error::Flash)?;
            unpack(&words[..size], chunk);
            address += size;
        }
        Ok(record.data_len)
    }

    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), Error<E>> {
        let mut mount = self.mounted()?;
        if mount.read_only {
            return Err(Error::ReadOnly);
        }
        let name = Self::relative(&mount, path)?;
        let size = RECORD_HEADER + word_count(name.len()) + word_count(bytes.len());
        let result = self.reserve(&mut mount, size, name);
        self.mount = Some(mount);
        result?;
        let result = self.append(&mut mount, FILE, name, bytes);
        self.mount = Some(mount);
        result
    }

    fn remove(&mut self, path: &str) -> Result<(), Error<E>> {
        let mut mount = self.mounted()?;
        if mount.read_only {
            return Err(Error::ReadOnly);
        }
        let name = Self::relative(&mount, path)?;
        if self.lookup(mount.active, name)?.is_none() {
            return Err(Error::NotFound);
        }
        let size = RECORD_HEADER + word_count(name.len());
        let result = match mount.write_offset + size <= self.sector_words {
            true => self.append(&mut mount, TOMBSTONE, name, &[]),
            false => self.compact(&mut mount, name),
        };
        self.mount = Some(mount);
        result
    }

    fn usage(&self) -> Result<Usage, Error<E>> {
        let mount = self.mounted()?;
        let total = (self.sector_words - SECTOR_HEADER) * 4;
        Ok(Usage { total, used: (mount.write_offset - SECTOR_HEADER) * 4 })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutOfRange(pub usize);

/// NOR flash emulation in RAM, programming can only clear bits.
pub struct RamFlash<const N: usize> {
    sectors: [[u32; N]; 2],
}

impl<const N: usize> RamFlash<N> {
    pub const fn new() -> Self {
        Self { sectors: [[EMPTY; N]; 2] }
    }

    fn locate(&self, address: usize, length: usize) -> Result<(usize, usize), OutOfRange> {
        let (sector, offset) = (address / N, address % N);
        if sector > 1 || offset + length > N {
            return Err(OutOfRange(address));
        }
        Ok((sector, offset))
    }
}

impl<const N: usize> Default for RamFlash<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Flash<u32> for RamFlash<N> {
    type Error = OutOfRange;

    fn read(&self, address: usize, words: &mut [u32]) -> Result<(), OutOfRange> {
        let (sector, offset) = self.locate(address, words.len())?;
        words.copy_from_slice(&self.sectors[sector][offset..offset + words.len()]);
        Ok(())
    }

    fn erase(&mut self, address: usize) -> Result<(), OutOfRange> {
        let (sector, _) = self.locate(address, 0)?;
        self.sectors[sector] = [EMPTY; N];
        Ok(())
    }

    fn program(&mut self, address: usize, words: &[u32]) -> Result<(), OutOfRange> {
        let (sector, offset) = self.locate(address, words.len())?;
        let target = &mut self.sectors[sector][offset..offset + words.len()];
        for (word, value) in target.iter_mut().zip(words.iter()) {
            *word &= *value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use hal::flash::Flash;
    use hal::fs::{FileSystem, MountConfig};

    use super::{Error, LogFs, RamFlash};

    const CONFIG: &str = "/littlefs/config.json";

    fn mounted() -> LogFs<RamFlash<64>> {
        let mut fs = LogFs::new(RamFlash::<64>::new(), 64);
        fs.mount(&MountConfig::default()).unwrap();
        fs
    }

    fn read(fs: &LogFs<RamFlash<64>>, path: &str) -> Result<std::vec::Vec<u8>, Error<super::OutOfRange>> {
        let mut buffer = [0u8; 64];
        let size = fs.read(path, &mut buffer)?;
        Ok(buffer[..size].to_vec())
    }

    #[test]
    fn test_read_write() {
        let mut fs = mounted();
        assert_eq!(fs.exists(CONFIG), Ok(false));
        assert_eq!(read(&fs, CONFIG), Err(Error::NotFound));
        fs.write(CONFIG, b"{\"motor\":{}}").unwrap();
        fs.write("/littlefs/empty", b"").unwrap();
        assert_eq!(fs.exists(CONFIG), Ok(true));
        assert_eq!(read(&fs, CONFIG).unwrap(), b"{\"motor\":{}}".to_vec());
        assert_eq!(read(&fs, "/littlefs/empty").unwrap(), b"".to_vec());
        fs.write(CONFIG, b"{}").unwrap();
        assert_eq!(read(&fs, CONFIG).unwrap(), b"{}".to_vec());
        fs.remove(CONFIG).unwrap();
        assert_eq!(fs.exists(CONFIG), Ok(false));
        assert_eq!(fs.remove(CONFIG), Err(Error::NotFound));
    }

    #[test]
    fn test_invalid_path() {
        let mut fs = mounted();
        assert_eq!(fs.write("/spiffs/config.json", b"{}"), Err(Error::InvalidPath));
        assert_eq!(fs.write("/littlefs/", b"{}"), Err(Error::InvalidPath));
        assert_eq!(fs.write("/littlefsconfig", b"{}"), Err(Error::InvalidPath));
        let long = std::format!("/littlefs/{}", "x".repeat(65));
        assert_eq!(fs.exists(&long), Err(Error::InvalidPath));
    }

    #[test]
    fn test_not_mounted() {
        let mut fs = LogFs::new(RamFlash::<64>::new(), 64);
        assert_eq!(fs.exists(CONFIG), Err(Error::NotMounted));
        assert_eq!(fs.unmount(), Err(Error::NotMounted));
        fs.mount(&MountConfig::default()).unwrap();
        assert_eq!(fs.mount(&MountConfig::default()), Err(Error::AlreadyMounted));
        fs.unmount().unwrap();
        assert!(!fs.is_mounted());
    }

    #[test]
    fn test_compaction() {
        let mut fs = mounted();
        fs.write("/littlefs/keep", b"kept").unwrap();
        for round in 0..20u8 {
            fs.write(CONFIG, &[round; 20]).unwrap();
        }
        assert_eq!(read(&fs, CONFIG).unwrap(), [19u8; 20].to_vec());
        assert_eq!(read(&fs, "/littlefs/keep").unwrap(), b"kept".to_vec());
        let usage = fs.usage().unwrap();
        assert_eq!(usage.total, 62 * 4);
        assert_eq!(usage.used, 44 * 4);
    }

    #[test]
    fn test_no_space() {
        let mut fs = mounted();
        assert_eq!(fs.write(CONFIG, &[1u8; 400]), Err(Error::NoSpace));
        fs.write(CONFIG, &[1u8; 200]).unwrap();
        fs.write(CONFIG, &[2u8; 200]).unwrap();
        let mut buffer = [0u8; 200];
        assert_eq!(fs.read(CONFIG, &mut buffer), Ok(200));
        assert_eq!(buffer, [2u8; 200]);
        let mut small = [0u8; 10];
        assert_eq!(fs.read(CONFIG, &mut small), Err(Error::BufferTooSmall(200)));
    }

    #[test]
    fn test_remount() {
        let mut fs = mounted();
        for round in 0..10u8 {
            fs.write(CONFIG, &[round; 20]).unwrap();
        }
        fs.unmount().unwrap();
        let mut fs = LogFs::new(fs.into_inner(), 64);
        fs.mount(&MountConfig::default()).unwrap();
        assert_eq!(read(&fs, CONFIG).unwrap(), [9u8; 20].to_vec());
    }

    #[test]
    fn test_interrupted_compaction() {
        let mut fs = mounted();
        for round in 0..7u8 {
            fs.write(CONFIG, &[round; 20]).unwrap();
        }
        let mut flash = fs.into_inner();
        // sector 1 is active after one compaction, resurrect the stale sector 0
        flash.program(0, &[super::ACTIVE, 0]).unwrap();
        let mut fs = LogFs::new(flash, 64);
        fs.mount(&MountConfig::default()).unwrap();
        assert_eq!(read(&fs, CONFIG).unwrap(), [6u8; 20].to_vec());
        let mut header = [0u32; 2];
        fs.into_inner().read(0, &mut header).unwrap();
        assert_eq!(header, [super::EMPTY; 2]);
    }

    #[test]
    fn test_corrupted() {
        let mut flash = RamFlash::<64>::new();
        flash.program(0, &[0x1234_5678]).unwrap();
        let mut fs = LogFs::new(flash, 64);
        let strict = MountConfig { format_if_mount_failed: false, ..Default::default() };
        assert_eq!(fs.mount(&strict), Err(Error::Corrupted));
        fs.mount(&MountConfig::default()).unwrap();
        assert_eq!(fs.exists(CONFIG), Ok(false));
    }

    /// Rejects programming from `fail_from` on
    struct Faulty {
        inner: RamFlash<64>,
        fail_from: usize,
    }

    impl Flash<u32> for Faulty {
        type Error = super::OutOfRange;

        fn read(&self, address: usize, words: &mut [u32]) -> Result<(), super::OutOfRange> {
            self.inner.read(address, words)
        }

        fn erase(&mut self, address: usize) -> Result<(), super::OutOfRange> {
            self.inner.erase(address)
        }

        fn program(&mut self, address: usize, words: &[u32]) -> Result<(), super::OutOfRange> {
            if address >= self.fail_from {
                return Err(super::OutOfRange(address));
            }
            self.inner.program(address, words)
        }
    }

    #[test]
    fn test_write_failure_after_compaction() {
        use super::OutOfRange;

        // live records land on 66..80 of sector 1, the new record would start at 80
        let mut fs = LogFs::new(Faulty { inner: RamFlash::new(), fail_from: 80 }, 64);
        fs.mount(&MountConfig::default()).unwrap();
        fs.write("/littlefs/keep", b"kept").unwrap();
        for round in 0..5u8 {
            fs.write(CONFIG, &[round; 20]).unwrap();
        }
        assert_eq!(fs.write(CONFIG, &[5u8; 20]), Err(Error::Flash(OutOfRange(80))));
        fs.unmount().unwrap();

        let mut fs = LogFs::new(fs.into_inner().inner, 64);
        fs.mount(&MountConfig::default()).unwrap();
        assert_eq!(read(&fs, CONFIG).unwrap(), [4u8; 20].to_vec());
        assert_eq!(read(&fs, "/littlefs/keep").unwrap(), b"kept".to_vec());
    }

    #[test]
    fn test_torn_record_header() {
        use super::{ACTIVE, FILE};

        let mut flash = RamFlash::<64>::new();
        flash.program(0, &[ACTIVE, 0, FILE | 11 << 16, u32::MAX]).unwrap();
        let mut fs = LogFs::new(flash, 64);
        let strict = MountConfig { format_if_mount_failed: false, ..Default::default() };
        assert_eq!(fs.mount(&strict), Err(Error::Corrupted));
        fs.mount(&MountConfig::default()).unwrap();
        assert_eq!(fs.exists(CONFIG), Ok(false));
    }

    #[test]
    fn test_read_only() {
        let mut fs = mounted();
        fs.write(CONFIG, b"{}").unwrap();
        fs.unmount().unwrap();
        let read_only = MountConfig { read_only: true, ..Default::default() };
        fs.mount(&read_only).unwrap();
        assert_eq!(fs.write(CONFIG, b"[]"), Err(Error::ReadOnly));
        assert_eq!(fs.remove(CONFIG), Err(Error::ReadOnly));
        assert_eq!(read(&fs, CONFIG).unwrap(), b"{}".to_vec());
    }
}
