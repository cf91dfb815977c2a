use super::bus::BusMaster;

/// Anything that advances by discrete time units (CPU, rasterizer, audio mixer).
pub trait Component {
    /// Advance one clock step in this component's own clock domain.
    /// Returns true if a "significant event" occurred (instruction boundary,
    /// frame ready, sample produced).
    fn tick(&mut self) -> bool;

    /// Master clock cycles consumed per tick, for clock-domain crossing.
    fn clock_divider(&self) -> u64 {
        1
    }
}

/// Extension for components that act as bus masters (the CPU).
pub trait BusMasterComponent: Component {
    type Bus: super::bus::Bus + ?Sized;

    /// Execute one machine cycle with bus access. Returns true at an
    /// instruction boundary (`mc` wrapped back to 0).
    fn tick_with_bus(&mut self, bus: &mut Self::Bus, master: BusMaster) -> bool;
}
