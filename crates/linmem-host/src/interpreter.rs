//! Guest sessions: load once, submit source text many times.

use linmem_core::{align_up, Address};
use linmem_region::SavePoint;

use crate::config::{BridgeConfig, ConfigError};
use crate::context::BridgeContext;
use crate::error::{HostError, SubmitError};
use crate::guest::GuestRuntime;
use crate::output::OutputSink;

/// A loaded guest together with its bridge context and staging buffer.
///
/// The staging buffer is reserved once at load. Every submission rewinds
/// the allocator to just past it, so guest allocations from one run do
/// not pile up across runs.
pub struct Interpreter<G> {
    guest: G,
    context: BridgeContext,
    staging: Address,
    staging_capacity: u32,
    save_point: SavePoint,
}

impl<G: GuestRuntime> Interpreter<G> {
    /// Validate `config` and the guest's layout, build the context, and
    /// reserve the staging buffer.
    pub fn load(guest: G, config: BridgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = guest.layout();
        layout.validate(&config.region)?;

        let mut context =
            BridgeContext::new(&config.region, layout.initial_pages, layout.heap_base)?;
        let staging_capacity = align_up(config.staging_capacity, config.region.alignment)
            .ok_or(ConfigError::InvalidLayout {
                reason: format!(
                    "staging capacity {} overflows when aligned",
                    config.staging_capacity
                ),
            })?;
        let (region, allocator) = context.memory_mut();
        let staging = allocator.try_allocate(region, staging_capacity)?;
        let save_point = allocator.save_point();

        tracing::debug!(
            heap_base = %layout.heap_base,
            heap_end = %layout.heap_end,
            pages = layout.initial_pages,
            %staging,
            staging_capacity,
            "guest loaded"
        );

        Ok(Self {
            guest,
            context,
            staging,
            staging_capacity,
            save_point,
        })
    }

    /// Hand `source` to the guest and return its verdict.
    ///
    /// The text is UTF-8 encoded into the staging buffer and the rest of
    /// the buffer is zeroed. If it does not fit, nothing is touched and
    /// the guest is not called.
    pub fn submit(&mut self, source: &str) -> Result<bool, SubmitError> {
        let bytes = source.as_bytes();
        if bytes.len() > self.staging_capacity as usize {
            return Err(SubmitError::SourceTooLarge {
                len: bytes.len(),
                capacity: self.staging_capacity,
            });
        }
        let len = bytes.len() as u32;

        self.context.allocator_mut().rewind(self.save_point);
        let buffer = self
            .context
            .region_mut()
            .bytes_mut(self.staging, self.staging_capacity)
            .map_err(HostError::from)?;
        let (text, padding) = buffer.split_at_mut(bytes.len());
        text.copy_from_slice(bytes);
        padding.fill(0);

        let verdict = self
            .guest
            .interpret(&mut self.context, self.staging, len)?;
        tracing::debug!(len, verdict, "submission interpreted");
        Ok(verdict)
    }

    /// Attach or detach the output sink. Held output is flushed to a
    /// newly attached sink.
    pub fn set_output(&mut self, sink: Option<Box<dyn OutputSink>>) {
        self.context.set_output(sink);
    }

    /// Address of the staging buffer.
    pub fn staging(&self) -> Address {
        self.staging
    }

    /// Staging buffer size in bytes.
    pub fn staging_capacity(&self) -> u32 {
        self.staging_capacity
    }

    /// The bridge context.
    pub fn context(&self) -> &BridgeContext {
        &self.context
    }

    /// Mutable access to the bridge context.
    pub fn context_mut(&mut self) -> &mut BridgeContext {
        &mut self.context
    }

    /// The guest runtime.
    pub fn guest(&self) -> &G {
        &self.guest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuestLayout;
    use linmem_region::read_fixed;

    /// Records what it was handed and allocates a little each run.
    struct Echo {
        seen: Vec<String>,
    }

    impl GuestRuntime for Echo {
        fn layout(&self) -> GuestLayout {
            GuestLayout {
                initial_pages: 1,
                heap_base: Address(1024),
                heap_end: Address(65_536),
            }
        }

        fn interpret(
            &mut self,
            context: &mut BridgeContext,
            buffer: Address,
            len: u32,
        ) -> Result<bool, HostError> {
            let text = read_fixed(context.region(), buffer, len)?;
            self.seen.push(text.into_string());
            context.malloc(64);
            Ok(len > 0)
        }
    }

    fn load(staging_capacity: u32) -> Interpreter<Echo> {
        let config = BridgeConfig {
            staging_capacity,
            ..BridgeConfig::default()
        };
        Interpreter::load(Echo { seen: Vec::new() }, config).unwrap()
    }

    #[test]
    fn staging_is_reserved_at_heap_base() {
        let interp = load(100);
        assert_eq!(interp.staging(), Address(1024));
        assert_eq!(interp.staging_capacity(), 104);
    }

    #[test]
    fn submit_passes_text_and_verdict() {
        let mut interp = load(64);
        assert!(interp.submit("1 2 +").unwrap());
        assert!(!interp.submit("").unwrap());
        assert_eq!(interp.guest().seen, ["1 2 +", ""]);
    }

    #[test]
    fn shorter_source_zeroes_the_remainder() {
        let mut interp = load(16);
        interp.submit("abcdefgh").unwrap();
        interp.submit("xy").unwrap();
        let staged = interp
            .context()
            .region()
            .bytes(interp.staging(), 16)
            .unwrap();
        assert_eq!(&staged[..3], b"xy\0");
        assert!(staged[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn oversized_source_leaves_state_untouched() {
        let mut interp = load(8);
        interp.submit("ok").unwrap();
        let high_water = interp.context().allocator().high_water();
        let err = interp.submit("this does not fit").unwrap_err();
        assert_eq!(
            err,
            SubmitError::SourceTooLarge {
                len: 17,
                capacity: 8
            }
        );
        assert_eq!(interp.context().allocator().high_water(), high_water);
        assert_eq!(interp.guest().seen.len(), 1);
    }

    #[test]
    fn guest_allocations_are_rewound_between_runs() {
        let mut interp = load(64);
        interp.submit("a").unwrap();
        let after_first = interp.context().allocator().high_water();
        interp.submit("b").unwrap();
        assert_eq!(interp.context().allocator().high_water(), after_first);
        assert_eq!(interp.context().allocator().live_blocks(), 2);
    }

    #[test]
    fn invalid_config_is_rejected_before_load() {
        let config = BridgeConfig {
            staging_capacity: 0,
            ..BridgeConfig::default()
        };
        assert!(matches!(
            Interpreter::load(Echo { seen: Vec::new() }, config),
            Err(ConfigError::StagingEmpty)
        ));
    }
}
