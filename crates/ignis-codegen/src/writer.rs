//! Output serialization for generated kernel functions.

use std::io::Write;

use crate::emit::KernelFunctions;

/// Writes generated functions to the destination stream.
///
/// Each pair is serialized init function first, then its work function —
/// the order the downstream compiler collaborator expects.
pub struct OutputWriter<W: Write> {
    out: W,
}

impl<W: Write> OutputWriter<W> {
    /// Wrap a destination stream.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Serialize one generated pair.
    pub fn write_kernel(&mut self, kernel: &KernelFunctions) -> std::io::Result<()> {
        self.out.write_all(kernel.init.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.write_all(kernel.work.as_bytes())?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Flush and hand back the underlying stream.
    pub fn into_inner(mut self) -> std::io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_precedes_work() {
        let kernel = KernelFunctions {
            key: "a_b_sse2_1t".into(),
            init: "int init_a_b_sse2_1t;\n".into(),
            work: "int asm_work_a_b_sse2_1t;\n".into(),
        };
        let mut writer = OutputWriter::new(Vec::new());
        writer.write_kernel(&kernel).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let init_at = text.find("init_a_b_sse2_1t").unwrap();
        let work_at = text.find("asm_work_a_b_sse2_1t").unwrap();
        assert!(init_at < work_at);
    }
}
