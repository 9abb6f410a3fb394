//! The guest runtime seam.

use linmem_core::Address;

use crate::config::GuestLayout;
use crate::context::BridgeContext;
use crate::error::HostError;

/// An instantiated guest module, seen from the host.
///
/// Implementations wrap whatever executes the guest's bytecode. The
/// host only needs the guest's initial memory layout and its single
/// `interpret` export; during `interpret` the guest reaches the host
/// back through the context's imports.
pub trait GuestRuntime {
    /// The memory layout exported by the module (`memory`,
    /// `__heap_base`, `__heap_end`).
    fn layout(&self) -> GuestLayout;

    /// Run the guest over `len` bytes of source text at `buffer`.
    ///
    /// Returns the guest's verdict. A [`HostError`] raised by an import
    /// aborts the run and is returned unchanged.
    fn interpret(
        &mut self,
        context: &mut BridgeContext,
        buffer: Address,
        len: u32,
    ) -> Result<bool, HostError>;
}
