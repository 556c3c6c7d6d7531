use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("Label already defined: {0}")]
    LabelAlreadyDefined(String),
    #[error("Undefined label: {0}")]
    UndefinedLabel(String),
}

/// A label bound to the image address that was current when it was defined.
#[derive(Debug, PartialEq, Eq)]
struct Label {
    name: String,
    addr: u16,
}

/// A 2-byte address operand emitted before its target label was known.
///
/// `pos` is the buffer offset of the placeholder bytes, not an image
/// address.
#[derive(Debug, PartialEq, Eq)]
struct Fixup {
    pos: usize,
    target: String,
}

/// Accumulates bytes and symbolic address references into one linear image.
///
/// Emission is append-only, so every label's final address is already fixed
/// the moment it is defined; only the 2-byte operands pointing at labels
/// need the deferred [`resolve`](ImageBuilder::resolve) pass.
#[derive(Debug)]
pub struct ImageBuilder {
    base: u16,
    code: Vec<u8>,
    labels: Vec<Label>,
    fixups: Vec<Fixup>,
}

impl ImageBuilder {
    pub fn new(base: u16) -> ImageBuilder {
        ImageBuilder {
            base,
            code: Vec::new(),
            labels: Vec::new(),
            fixups: Vec::new(),
        }
    }

    /// Address the next emitted byte will occupy in the loaded image.
    pub fn current_address(&self) -> u16 {
        self.base + self.code.len() as u16
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    fn find_label(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|label| label.name == name)
    }

    /// Bind `name` to the current address. A name may be bound exactly once.
    #[tracing::instrument]
    pub fn define_label(&mut self, name: &str) -> Result<(), BuildError> {
        if self.find_label(name).is_some() {
            return Err(BuildError::LabelAlreadyDefined(name.to_string()));
        }
        self.labels.push(Label {
            name: name.to_string(),
            addr: self.current_address(),
        });
        Ok(())
    }

    /// Append raw bytes. Values are opaque; no opcode validation happens
    /// here.
    pub fn emit(&mut self, bytes: &[u8]) {
        self.code.extend_from_slice(bytes);
    }

    /// Append a 2-byte placeholder for the address of `name` and record a
    /// fixup for it. The label may be defined before or after this call, as
    /// long as it is defined by the time [`resolve`](ImageBuilder::resolve)
    /// runs.
    #[tracing::instrument]
    pub fn word_ref(&mut self, name: &str) {
        self.fixups.push(Fixup {
            pos: self.code.len(),
            target: name.to_string(),
        });
        self.emit(&[0x00, 0x00]);
    }

    /// Patch every fixup with the little-endian address of its label and
    /// return the finished image.
    ///
    /// Consumes the builder: resolution is the terminal step and the
    /// returned buffer is never touched again.
    #[tracing::instrument]
    pub fn resolve(mut self) -> Result<Vec<u8>, BuildError> {
        for fixup in &self.fixups {
            let addr = self
                .find_label(&fixup.target)
                .ok_or_else(|| BuildError::UndefinedLabel(fixup.target.clone()))?
                .addr;
            self.code[fixup.pos..fixup.pos + 2].copy_from_slice(&addr.to_le_bytes());
        }
        Ok(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn backward_reference() -> Result<(), BuildError> {
        let mut img = ImageBuilder::new(0x0100);
        img.define_label("l")?;
        img.word_ref("l");
        let code = img.resolve()?;

        // The single reference resolves to the base address itself.
        assert_eq!(code, vec![0x00, 0x01]);
        Ok(())
    }

    #[test]
    fn forward_reference() -> Result<(), BuildError> {
        let mut img = ImageBuilder::new(0x0100);
        img.word_ref("fwd");
        img.define_label("fwd")?;
        let code = img.resolve()?;

        // "fwd" sits right after the 2 placeholder bytes.
        assert_eq!(code, vec![0x02, 0x01]);
        Ok(())
    }

    #[test]
    fn reference_resolves_across_emitted_bytes() -> Result<(), BuildError> {
        let mut img = ImageBuilder::new(0x0100);
        img.define_label("back")?;
        img.emit(&[0xC9, 0xC9, 0xC9]);
        img.word_ref("back");
        img.word_ref("ahead");
        img.emit(&[0xC9]);
        img.define_label("ahead")?;
        let code = img.resolve()?;

        assert_eq!(
            code,
            vec![0xC9, 0xC9, 0xC9, 0x00, 0x01, 0x08, 0x01, 0xC9]
        );
        Ok(())
    }

    #[test]
    fn duplicate_label_fails() {
        let mut img = ImageBuilder::new(0x0100);
        img.define_label("twice").unwrap();
        img.emit(&[0x00]);
        assert_eq!(
            img.define_label("twice"),
            Err(BuildError::LabelAlreadyDefined("twice".to_string()))
        );
    }

    #[test]
    fn undefined_label_fails_at_resolve() {
        let mut img = ImageBuilder::new(0x0100);
        img.word_ref("nowhere");
        assert_eq!(
            img.resolve(),
            Err(BuildError::UndefinedLabel("nowhere".to_string()))
        );
    }

    #[test]
    fn length_tracks_every_emission() {
        let mut img = ImageBuilder::new(0x0100);
        assert!(img.is_empty());

        img.emit(&[0x01, 0x02, 0x03]);
        assert_eq!(img.len(), 3);
        assert_eq!(img.current_address(), 0x0103);

        img.word_ref("x");
        assert_eq!(img.len(), 5);
        assert_eq!(img.current_address(), 0x0105);

        img.emit(&[]);
        assert_eq!(img.len(), 5);
    }

    #[test]
    fn labels_do_not_consume_bytes() -> Result<(), BuildError> {
        let mut img = ImageBuilder::new(0x0100);
        img.define_label("a")?;
        img.define_label("b")?;
        assert_eq!(img.current_address(), 0x0100);
        assert!(img.is_empty());
        Ok(())
    }
}
