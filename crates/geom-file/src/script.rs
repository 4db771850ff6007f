//! Trigger scripts.
//!
//! Scripts are stored as a procedure table followed by fixed-size code
//! lines. Instruction semantics are not interpreted.

use std::fmt;

use geom_common::EndianReader;

use crate::Result;

/// A named entry point into a script's code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub start_line: u16,
    pub blocked: u8,
    pub kind: u8,
    pub name: String,
    pub exclusive: u8,
    pub locals: u8,
}

impl Procedure {
    pub const SIZE: usize = 16;

    fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            start_line: reader.read_u16()?,
            blocked: reader.read_u8()?,
            kind: reader.read_u8()?,
            name: reader.read_fixed_ascii(10)?,
            exclusive: reader.read_u8()?,
            locals: reader.read_u8()?,
        })
    }
}

/// One instruction: an opcode with three byte operands and a word operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeLine {
    pub op: u8,
    pub d1: u8,
    pub d2: u8,
    pub d3: u8,
    pub d4: i32,
}

impl CodeLine {
    pub const SIZE: usize = 8;

    fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        Ok(Self {
            op: reader.read_u8()?,
            d1: reader.read_u8()?,
            d2: reader.read_u8()?,
            d3: reader.read_u8()?,
            d4: reader.read_i32()?,
        })
    }
}

impl fmt::Display for CodeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X} {:02X} {:02X} {:02X} {}",
            self.op, self.d1, self.d2, self.d3, self.d4
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerScript {
    pub address: u64,
    pub vtable: [u8; 16],
    pub name: String,
    pub vars: u8,
    pub globals: u8,
    pub procedures: Vec<Procedure>,
    pub code: Vec<CodeLine>,
}

impl TriggerScript {
    pub fn read(reader: &mut EndianReader<'_>) -> Result<Self> {
        let address = reader.position() as u64;
        reader.advance(4);
        let vtable = reader.read_array::<16>()?;
        let lines = reader.read_u16()?;
        let name = reader.read_fixed_ascii(7)?;
        let vars = reader.read_u8()?;
        let globals = reader.read_u8()?;
        let procs = reader.read_u8()?;
        reader.advance(4);

        let procedures = (0..procs)
            .map(|_| Procedure::read(reader))
            .collect::<Result<Vec<_>>>()?;
        let code = (0..lines)
            .map(|_| CodeLine::read(reader))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            address,
            vtable,
            name,
            vars,
            globals,
            procedures,
            code,
        })
    }

    /// Code lines of a procedure, up to the next procedure's start.
    pub fn procedure_code(&self, index: usize) -> Option<&[CodeLine]> {
        let start = self.procedures.get(index)?.start_line as usize;
        let end = self
            .procedures
            .iter()
            .map(|p| p.start_line as usize)
            .filter(|&s| s > start)
            .min()
            .unwrap_or(self.code.len());
        self.code.get(start..end.min(self.code.len()))
    }
}

impl fmt::Display for TriggerScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "script {:?} | {} procs | {} lines | {} vars | {} globals",
            self.name,
            self.procedures.len(),
            self.code.len(),
            self.vars,
            self.globals
        )
    }
}

#[cfg(test)]
mod tests {
    use geom_common::Endian;

    use super::*;
    use crate::testing::ByteWriter;

    fn name(w: &mut ByteWriter, name: &str, len: usize) {
        let start = w.position();
        w.raw(name.as_bytes());
        w.pad_to(start + len);
    }

    #[test]
    fn test_read_script() {
        let mut w = ByteWriter::new(Endian::Big);
        w.u32(0).zeros(16).u16(3);
        name(&mut w, "door", 7);
        w.u8(2).u8(1).u8(2).zeros(4);
        w.u16(0).u8(0).u8(1);
        name(&mut w, "init", 10);
        w.u8(0).u8(3);
        w.u16(2).u8(1).u8(2);
        name(&mut w, "open", 10);
        w.u8(1).u8(0);
        for op in 0..3u8 {
            w.u8(op).u8(1).u8(2).u8(3).i32(-(op as i32));
        }
        let data = w.finish();

        let mut reader = EndianReader::new(&data, Endian::Big);
        let script = TriggerScript::read(&mut reader).unwrap();
        assert_eq!(reader.position(), data.len());
        assert_eq!(reader.position(), 36 + 2 * Procedure::SIZE + 3 * CodeLine::SIZE);

        assert_eq!(script.name, "door");
        assert_eq!((script.vars, script.globals), (2, 1));
        assert_eq!(script.procedures.len(), 2);
        assert_eq!(script.procedures[1].name, "open");
        assert_eq!(script.procedures[0].locals, 3);
        assert_eq!(script.code[2].d4, -2);

        assert_eq!(script.procedure_code(0).map(<[_]>::len), Some(2));
        assert_eq!(script.procedure_code(1).map(<[_]>::len), Some(1));
        assert!(script.procedure_code(2).is_none());
    }
}
