const STRIDE: usize = 16;

/// Hexdump of a program image, addressed at its load address.
pub fn hexdump(program: &[u8], base: u16) -> String {
    let mut str = String::new();

    for (line, bytes) in program.chunks(STRIDE).enumerate() {
        if line != 0 {
            str.push('\n');
        }
        str.push_str(format!("{:04x}:", base as usize + line * STRIDE).as_str());
        for byte in bytes {
            str.push(' ');
            str.push_str(format!("{:02x}", byte).as_str());
        }
    }

    str
}
