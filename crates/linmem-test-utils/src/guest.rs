//! A guest runtime driven by a host-side closure.

use linmem_core::Address;
use linmem_host::{BridgeContext, GuestLayout, GuestRuntime, HostError};
use linmem_region::read_fixed;

type Script = Box<dyn FnMut(&mut BridgeContext, &str) -> Result<bool, HostError>>;

/// Stands in for a compiled guest module.
///
/// `interpret` decodes the staged source text and hands it, with the
/// context, to the script. The script calls imports on the context the
/// way guest code would.
pub struct ScriptedGuest {
    layout: GuestLayout,
    script: Script,
    runs: Vec<String>,
}

impl ScriptedGuest {
    pub const DEFAULT_LAYOUT: GuestLayout = GuestLayout {
        initial_pages: 2,
        heap_base: Address(66_576),
        heap_end: Address(131_072),
    };

    pub fn new<F>(script: F) -> Self
    where
        F: FnMut(&mut BridgeContext, &str) -> Result<bool, HostError> + 'static,
    {
        Self::with_layout(Self::DEFAULT_LAYOUT, script)
    }

    pub fn with_layout<F>(layout: GuestLayout, script: F) -> Self
    where
        F: FnMut(&mut BridgeContext, &str) -> Result<bool, HostError> + 'static,
    {
        Self {
            layout,
            script: Box::new(script),
            runs: Vec::new(),
        }
    }

    /// A guest that accepts everything and does nothing.
    pub fn accept_all() -> Self {
        Self::new(|_, _| Ok(true))
    }

    /// Source texts seen so far, in order.
    pub fn runs(&self) -> &[String] {
        &self.runs
    }
}

impl GuestRuntime for ScriptedGuest {
    fn layout(&self) -> GuestLayout {
        self.layout
    }

    fn interpret(
        &mut self,
        context: &mut BridgeContext,
        buffer: Address,
        len: u32,
    ) -> Result<bool, HostError> {
        let source = read_fixed(context.region(), buffer, len)?.into_string();
        let verdict = (self.script)(context, &source);
        self.runs.push(source);
        verdict
    }
}
