use crate::builder::{BuildError, ImageBuilder};

use self::probes::{Expect, PROBES};

/// Catalog of probe routines as data records.
pub mod probes;

/// Load address of a CP/M COM program.
pub const BASE_ADDR: u16 = 0x0100;

/// Address of the BDOS entry point.
const BDOS: u16 = 0x0005;
/// BDOS function 9: print the `$`-terminated string pointed to by DE.
const BDOS_PRINT_STRING: u8 = 0x09;
/// BDOS function 0: terminate the program.
const BDOS_TERMINATE: u8 = 0x00;

/// Terminator byte BDOS function 9 stops printing at.
pub const STRING_TERMINATOR: u8 = b'$';

const PASS_MESSAGE: &str = "IXIY prefixed helpers PASS\r\n";

// Symbolic-operand instruction helpers. Each emits the opcode and a 2-byte
// placeholder resolved to the label's address at patch time.

fn ld_de(img: &mut ImageBuilder, label: &str) {
    img.emit(&[0x11]);
    img.word_ref(label);
}

fn call(img: &mut ImageBuilder, label: &str) {
    img.emit(&[0xCD]);
    img.word_ref(label);
}

fn jp(img: &mut ImageBuilder, label: &str) {
    img.emit(&[0xC3]);
    img.word_ref(label);
}

fn jp_nz(img: &mut ImageBuilder, label: &str) {
    img.emit(&[0xC2]);
    img.word_ref(label);
}

/// Emit a labeled, `$`-terminated message for BDOS function 9.
fn emit_string(img: &mut ImageBuilder, label: &str, text: &str) -> Result<(), BuildError> {
    debug_assert!(
        !text.contains(STRING_TERMINATOR as char),
        "message would truncate at an embedded terminator"
    );
    img.define_label(label)?;
    img.emit(text.as_bytes());
    img.emit(&[STRING_TERMINATOR]);
    Ok(())
}

fn message_label(handler: &str) -> String {
    format!("msg_{handler}")
}

/// Assemble the complete test image.
///
/// Layout, in emission order: entry block, shared report routine, the three
/// probe routines, one failure handler per checkpoint, then the message
/// strings. A single builder pass emits everything; `resolve` patches the
/// symbolic operands and yields the finished COM image.
#[tracing::instrument]
pub fn build_image() -> Result<Vec<u8>, BuildError> {
    let mut img = ImageBuilder::new(BASE_ADDR);

    // Entry block: run every probe, then fall into the success path.
    img.define_label("start")?;
    for probe in PROBES {
        call(&mut img, probe.routine);
    }
    ld_de(&mut img, "msg_pass");
    jp(&mut img, "report");

    // Shared report routine: print the message in DE, then terminate. The
    // success path and all 17 failure handlers converge here.
    img.define_label("report")?;
    img.emit(&[0x0E, BDOS_PRINT_STRING]); // LD C,9
    call_bdos(&mut img);
    img.emit(&[0x0E, BDOS_TERMINATE]); // LD C,0
    call_bdos(&mut img);
    img.emit(&[0xC9]); // RET

    // Probe routines: setup, then per checkpoint the instruction bytes, the
    // accumulator comparison where the expectation is a literal, and the
    // branch to the checkpoint's failure handler.
    for probe in PROBES {
        img.define_label(probe.routine)?;
        img.emit(probe.setup);
        for checkpoint in probe.checkpoints {
            img.emit(checkpoint.code);
            if let Expect::Acc(value) = checkpoint.expect {
                img.emit(&[0xFE, value]); // CP value
            }
            jp_nz(&mut img, checkpoint.handler);
        }
        img.emit(&[0xC9]); // RET
    }

    // Failure handlers: load the checkpoint's message and report.
    for probe in PROBES {
        for checkpoint in probe.checkpoints {
            img.define_label(checkpoint.handler)?;
            ld_de(&mut img, &message_label(checkpoint.handler));
            jp(&mut img, "report");
        }
    }

    // String data section.
    emit_string(&mut img, "msg_pass", PASS_MESSAGE)?;
    for probe in PROBES {
        for checkpoint in probe.checkpoints {
            emit_string(
                &mut img,
                &message_label(checkpoint.handler),
                checkpoint.message,
            )?;
        }
    }

    img.resolve()
}

fn call_bdos(img: &mut ImageBuilder) {
    let [lo, hi] = BDOS.to_le_bytes();
    img.emit(&[0xCD, lo, hi]); // CALL 5
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn image() -> Vec<u8> {
        build_image().expect("catalog must assemble")
    }

    /// Offset of the first probe routine: 15 bytes of entry block plus 11
    /// bytes of report routine.
    const FIRST_ROUTINE: u16 = BASE_ADDR + 26;

    #[test]
    fn entry_block_calls_first_probe() {
        let image = image();
        assert_eq!(image[0], 0xCD);
        assert_eq!(u16::from_le_bytes([image[1], image[2]]), FIRST_ROUTINE);
    }

    #[test]
    fn report_routine_bytes() {
        let image = image();
        // Entry block is 15 bytes; the report routine follows verbatim.
        assert_eq!(
            &image[15..26],
            &[
                /* LD C,9 */ 0x0E, 0x09, /* CALL 5 */ 0xCD, 0x05, 0x00,
                /* LD C,0 */ 0x0E, 0x00, /* CALL 5 */ 0xCD, 0x05, 0x00,
                /* RET */ 0xC9,
            ]
        );
    }

    #[test]
    fn no_unresolved_placeholders_in_code() {
        let image = image();
        // Every resolved address points into the image, so no patched word
        // can remain 0x0000. Scan the entry block's three CALLs.
        for call in image[..9].chunks(3) {
            assert_eq!(call[0], 0xCD);
            let target = u16::from_le_bytes([call[1], call[2]]);
            assert!(target >= BASE_ADDR);
            assert!((target as usize) < BASE_ADDR as usize + image.len());
        }
    }

    #[test]
    fn every_message_is_terminated() {
        let image = image();
        let mut messages = vec![PASS_MESSAGE.to_string()];
        for probe in PROBES {
            for checkpoint in probe.checkpoints {
                messages.push(checkpoint.message.to_string());
            }
        }

        for message in &messages {
            assert!(!message.contains(STRING_TERMINATOR as char));
            let mut terminated = message.clone().into_bytes();
            terminated.push(STRING_TERMINATOR);
            assert!(
                image
                    .windows(terminated.len())
                    .any(|window| window == terminated),
                "message not found terminated in image: {message:?}"
            );
        }
    }

    #[test]
    fn image_ends_with_terminator() {
        assert_eq!(image().last(), Some(&STRING_TERMINATOR));
    }

    #[test]
    fn image_fits_in_the_tpa() {
        // COM images load at 0x0100; this one is a few hundred bytes of
        // code plus the message strings.
        let image = image();
        assert!(image.len() < 0x1000, "image grew to {} bytes", image.len());
    }
}
