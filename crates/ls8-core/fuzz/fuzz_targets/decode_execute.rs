#![no_main]

use libfuzzer_sys::fuzz_target;
use ls8_core::{
    disassemble_program, parse_program, run, CpuConfig, CpuState, Decoder, RunExit, RunState,
    UnknownOpcodePolicy,
};

fuzz_target!(|data: &[u8]| {
    let Some((&policy, image)) = data.split_first() else {
        return;
    };

    if let Ok(text) = std::str::from_utf8(image) {
        let _ = parse_program(text);
    }

    let image = &image[..image.len().min(256)];
    let _ = disassemble_program(image);
    for (address, byte) in (0..=u8::MAX).zip(image) {
        let _ = Decoder::decode(*byte, address);
    }

    let Ok(mut state) = CpuState::with_program(image) else {
        return;
    };
    let config = CpuConfig {
        step_limit: Some(4096),
        unknown_opcode: if policy & 1 == 0 {
            UnknownOpcodePolicy::Fault
        } else {
            UnknownOpcodePolicy::Skip
        },
    };
    let mut console = Vec::new();
    let outcome = run(&mut state, &mut console, &config);

    match outcome.exit {
        RunExit::Halted => assert_eq!(state.run_state, RunState::Halted),
        RunExit::Fault(cause) => assert_eq!(state.run_state, RunState::Faulted(cause)),
        RunExit::StepLimit => assert!(outcome.steps == 4096),
    }
});
