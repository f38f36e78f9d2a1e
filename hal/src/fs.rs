use core::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MountConfig {
    pub base_path: &'static str,
    pub partition_label: &'static str,
    pub format_if_mount_failed: bool,
    pub read_only: bool,
    pub grow_on_mount: bool,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            base_path: "/littlefs",
            partition_label: "storage",
            format_if_mount_failed: true,
            read_only: false,
            grow_on_mount: true,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Usage {
    pub total: usize,
    pub used: usize,
}

/// Flash filesystem with whole-file primitives.
///
/// Paths are absolute and must live under the mounted base path.
pub trait FileSystem {
    type Error: fmt::Debug;

    fn mount(&mut self, config: &MountConfig) -> Result<(), Self::Error>;
    fn unmount(&mut self) -> Result<(), Self::Error>;
    fn is_mounted(&self) -> bool;
    fn exists(&self, path: &str) -> Result<bool, Self::Error>;
    /// Returns the file size, which must fit into `buf`
    fn read(&self, path: &str, buf: &mut [u8]) -> Result<usize, Self::Error>;
    /// Creates or replaces the file
    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), Self::Error>;
    fn remove(&mut self, path: &str) -> Result<(), Self::Error>;
    fn usage(&self) -> Result<Usage, Self::Error>;
}
