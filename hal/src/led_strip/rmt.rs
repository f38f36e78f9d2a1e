/// RMT peripheral transport.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RmtConfig {
    /// Raw `rmt_clock_source_t`, 0 selects the default clock
    pub clk_src: u32,
    /// 0 lets the driver pick its default of 10MHz
    pub resolution_hz: u32,
    pub mem_block_symbols: usize,
    pub with_dma: bool,
}
