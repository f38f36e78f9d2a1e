#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpiHost {
    Spi2 = 1,
    Spi3 = 2,
}

/// SPI transport, MOSI drives the data line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpiConfig {
    pub clk_src: u32,
    pub spi_bus: SpiHost,
    pub with_dma: bool,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self { clk_src: 0, spi_bus: SpiHost::Spi2, with_dma: true }
    }
}
