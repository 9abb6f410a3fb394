//! End-to-end sessions: a scripted guest driving the import surface.

use linmem_core::{Address, MemoryError};
use linmem_host::{
    BridgeConfig, ConfigError, GuestLayout, HostError, ImportValue, Interpreter, SubmitError,
};
use linmem_region::RegionConfig;
use linmem_shape::build_view;
use linmem_test_utils::fixtures::string_view_shape;
use linmem_test_utils::{stage_cstr, ArgsPacker, ScriptedGuest, SharedSink};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("linmem=debug")
        .with_test_writer()
        .try_init();
}

/// Prints each whitespace-separated word of the source on its own line.
fn echo_words() -> ScriptedGuest {
    ScriptedGuest::new(|ctx, source| {
        let fmt = stage_cstr(ctx, "%.*s")?;
        for word in source.split_whitespace() {
            let text = stage_cstr(ctx, word)?;
            let args = ArgsPacker::new()
                .size(word.len() as u32)
                .ptr(text)
                .stage(ctx)?;
            ctx.dispatch("web_printfn", &[ImportValue::ptr(fmt), ImportValue::ptr(args)])?;
        }
        Ok(!source.is_empty())
    })
}

#[test]
fn output_reaches_sink_registered_before_submit() {
    init_tracing();
    let mut interp = Interpreter::load(echo_words(), BridgeConfig::default()).unwrap();
    let sink = SharedSink::new();
    interp.set_output(Some(sink.boxed()));
    assert!(interp.submit("34 35 +").unwrap());
    assert_eq!(sink.contents(), "34\n35\n+\n");
}

#[test]
fn output_before_sink_is_held_until_registration() {
    let mut interp = Interpreter::load(
        ScriptedGuest::new(|ctx, _| {
            let fmt = stage_cstr(ctx, "done\nwaiting: %d")?;
            let args = ArgsPacker::new().int(3).stage(ctx)?;
            ctx.printf(fmt, args)?;
            Ok(true)
        }),
        BridgeConfig::default(),
    )
    .unwrap();
    interp.submit("x").unwrap();
    assert_eq!(interp.context().output().pending(), "waiting: 3");

    let sink = SharedSink::new();
    interp.set_output(Some(sink.boxed()));
    assert_eq!(sink.contents(), "waiting: 3");
}

#[test]
fn guest_reads_number_tokens() {
    let mut interp = Interpreter::load(
        ScriptedGuest::new(|ctx, source| {
            let staging = Address(ScriptedGuest::DEFAULT_LAYOUT.heap_base.0);
            let value = ctx.parse_number(staging, source.len() as u32)?;
            Ok(value == 580.0)
        }),
        BridgeConfig::default(),
    )
    .unwrap();
    assert!(interp.submit("580").unwrap());
    assert!(!interp.submit("ascii_E").unwrap());
}

#[test]
fn string_view_built_by_guest_is_readable_through_a_view() {
    let mut interp = Interpreter::load(
        ScriptedGuest::new(|ctx, source| {
            let record = ctx.malloc(8);
            let view = build_view(&string_view_shape(), record);
            let (region, _) = ctx.memory_mut();
            view.scalar("data").unwrap().set(region, 0u32)?;
            view.scalar("len").unwrap().set(region, source.len() as u32)?;
            Ok(view.scalar("len").unwrap().get::<u32>(ctx.region())? == 5)
        }),
        BridgeConfig::default(),
    )
    .unwrap();
    assert!(interp.submit("hello").unwrap());
}

#[test]
fn unknown_import_aborts_the_run() {
    init_tracing();
    let mut interp = Interpreter::load(
        ScriptedGuest::new(|ctx, _| {
            ctx.dispatch("web_fopen", &[ImportValue::I32(0)])?;
            Ok(true)
        }),
        BridgeConfig::default(),
    )
    .unwrap();
    match interp.submit("open") {
        Err(SubmitError::Guest(HostError::Unimplemented { name, args })) => {
            assert_eq!(name, "web_fopen");
            assert_eq!(args, [ImportValue::I32(0)]);
        }
        other => panic!("expected Unimplemented, got {other:?}"),
    }
}

#[test]
fn exhaustion_returns_null_to_the_guest() {
    let config = BridgeConfig {
        region: RegionConfig {
            page_size: 65_536,
            max_pages: 3,
            alignment: 8,
        },
        staging_capacity: 1024,
    };
    let mut interp = Interpreter::load(
        ScriptedGuest::new(|ctx, _| {
            let big = ctx.malloc(200_000);
            let small = ctx.malloc(16);
            let grown = ctx.realloc(small, 500_000)?;
            Ok(big.is_null() && !small.is_null() && grown.is_null())
        }),
        config,
    )
    .unwrap();
    assert!(interp.submit("go").unwrap());
    assert_eq!(interp.context().region().pages(), 2);
}

#[test]
fn realloc_of_foreign_pointer_fails_the_submission() {
    let mut interp = Interpreter::load(
        ScriptedGuest::new(|ctx, _| {
            ctx.realloc(Address(0x40), 8)?;
            Ok(true)
        }),
        BridgeConfig::default(),
    )
    .unwrap();
    assert_eq!(
        interp.submit("x"),
        Err(SubmitError::Guest(HostError::Memory(
            MemoryError::IllegalPointer {
                address: Address(0x40)
            }
        )))
    );
}

#[test]
fn oversized_submission_never_reaches_the_guest() {
    let config = BridgeConfig {
        staging_capacity: 16,
        ..BridgeConfig::default()
    };
    let mut interp = Interpreter::load(ScriptedGuest::accept_all(), config).unwrap();
    let before = interp.context().region().as_slice().to_vec();
    assert!(matches!(
        interp.submit(&"x".repeat(17)),
        Err(SubmitError::SourceTooLarge { len: 17, capacity: 16 })
    ));
    assert!(interp.guest().runs().is_empty());
    assert_eq!(interp.context().region().as_slice(), before.as_slice());
}

#[test]
fn multibyte_source_is_staged_as_utf8() {
    let mut interp = Interpreter::load(ScriptedGuest::accept_all(), BridgeConfig::default()).unwrap();
    interp.submit("λx → x").unwrap();
    assert_eq!(interp.guest().runs(), ["λx → x"]);
}

#[test]
fn bad_guest_layout_fails_load() {
    let guest = ScriptedGuest::with_layout(
        GuestLayout {
            initial_pages: 1,
            heap_base: Address(70_000),
            heap_end: Address(70_000),
        },
        |_, _| Ok(true),
    );
    assert!(matches!(
        Interpreter::load(guest, BridgeConfig::default()),
        Err(ConfigError::InvalidLayout { .. })
    ));
}
